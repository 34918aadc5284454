use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The catalog's singleton metadata record (`spec.md` §3.3, `key = 0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub description: Option<String>,
    pub max_value_length: i64,
}

impl CatalogMetadata {
    pub fn new(description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            created: now,
            updated: now,
            description,
            max_value_length: 0,
        }
    }
}
