use thiserror::Error;

/// `spec.md` §7: faults the resolver handler cannot turn into a JSON
/// response of its own — these surface as HTTP 500 at the `serve` layer.
#[derive(Debug, Error)]
pub enum AdaptError {
    #[error("template error: {0}")]
    Template(#[from] domain::DomainError),

    #[error("catalog error: {0}")]
    Catalog(#[from] infra::CatalogError),
}
