use domain::CatalogMetadata;
use infra::CatalogStore;
use serde::Serialize;

use crate::error::AdaptError;

/// `spec.md` §4.6 "/.info (no identifier)" response shape.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfoView {
    pub about: CatalogMetadata,
    pub api: String,
    pub schemes: Vec<String>,
}

/// `valid` restricts the scheme listing to schemes with a usable target:
/// at least one definition with a non-null `target`, or a non-null
/// `synonym_for` — `spec.md` §6, resolved via `CatalogStore::list_schemes`.
pub async fn service_info(store: &dyn CatalogStore, valid_only: bool) -> Result<ServiceInfoView, AdaptError> {
    let about = store.metadata().await?;
    let schemes = store.list_schemes(valid_only).await?;
    Ok(ServiceInfoView {
        about,
        api: "/api".to_string(),
        schemes,
    })
}
