//! `spec.md` §6 external interfaces: the `axum::Router` wiring the three
//! core routes plus the out-of-core stubs the route table still lists.
//!
//! Handlers read the raw, still percent-encoded path off `axum::http::Uri`
//! rather than an auto-decoding `Path` extractor, so `adapt::normalize`'s
//! "decode exactly twice" invariant holds end to end.

pub mod error;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::ServeError;
pub use routes::router;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use domain::{PidDefinition, Settings};
    use infra::{CatalogStore, SqliteCatalogStore};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn seeded_state() -> AppState {
        let store = SqliteCatalogStore::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store.initialize(Some("test")).await.unwrap();

        let mut def = PidDefinition::new("ark", "99999", "");
        def.target = Some("https://example.99999.com/info/${content}".to_string());
        store.add(&mut def).await.unwrap();
        store.refresh_metadata().await.unwrap();

        AppState::new(Arc::new(store), Settings::default())
    }

    #[tokio::test]
    async fn resolve_route_redirects() {
        let app = router(seeded_state().await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ark:99999/foo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response.headers().get("location").unwrap().to_str().unwrap();
        assert_eq!(location, "https://example.99999.com/info/99999/foo");
    }

    #[tokio::test]
    async fn favicon_is_404() {
        let app = router(seeded_state().await);
        let response = app
            .oneshot(Request::builder().uri("/favicon.ico").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn introspect_route_returns_json() {
        let app = router(seeded_state().await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/.info/ark:99999/foo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn service_info_route_returns_json() {
        let app = router(seeded_state().await);
        let response = app
            .oneshot(Request::builder().uri("/.info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
