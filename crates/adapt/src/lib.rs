//! Framework-agnostic orchestration: `spec.md` §4.5 request normalizer and
//! §4.6 resolver state machine, plus the `/.info` service-info view.
//!
//! Consumes `&dyn infra::CatalogStore`; knows nothing about `axum` or HTTP
//! framework types, so it can be exercised directly in tests.

pub mod error;
pub mod normalize;
pub mod resolve;
pub mod service;

pub use error::AdaptError;
pub use normalize::{normalize, Normalized};
pub use resolve::{adjust, handle, handle_introspect, DefinitionView, Outcome, PartsView};
pub use service::{service_info, ServiceInfoView};
