use std::sync::Arc;

use domain::Settings;
use infra::CatalogStore;
use regex::Regex;

/// Shared application state handed to every `axum` handler.
///
/// `store` is `dyn` so `app` can wire a real `SqliteCatalogStore` while
/// tests wire a fake — `serve` never names `infra::SqliteCatalogStore`
/// directly.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub settings: Arc<Settings>,
    pub service_pattern: Option<Arc<Regex>>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, settings: Settings) -> Self {
        let service_pattern = settings
            .service_pattern
            .as_deref()
            .and_then(|p| Regex::new(p).ok())
            .map(Arc::new);
        Self {
            store,
            settings: Arc::new(settings),
            service_pattern,
        }
    }
}
