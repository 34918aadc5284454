use thiserror::Error;

/// Errors raised validating or rendering the data model itself.
///
/// Storage- and HTTP-layer error taxonomies (`duplicate`, `stale`,
/// `not_found`, `internal`) live closer to where they're produced, in
/// `infra` and `adapt` respectively — this enum only covers what's true
/// independent of any backend.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("template error: {0}")]
    Template(String),
}
