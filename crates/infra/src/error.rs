use thiserror::Error;

/// `spec.md` §7 error taxonomy for everything that touches the catalog
/// store. `NotFound` is not a variant here — lookups legitimately return
/// `Option::None`; this enum only covers operations that can genuinely
/// fail.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("duplicate: ({scheme}, {prefix}, {value}) already exists")]
    Duplicate {
        scheme: String,
        prefix: String,
        value: String,
    },

    #[error("stale: update revision {incoming} is not newer than stored revision {stored}")]
    Stale { incoming: i64, stored: i64 },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<domain::DomainError> for CatalogError {
    fn from(e: domain::DomainError) -> Self {
        match e {
            domain::DomainError::Validation(msg) => CatalogError::Validation(msg),
            domain::DomainError::Template(msg) => CatalogError::Validation(msg),
        }
    }
}
