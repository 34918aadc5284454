//! `spec.md` §4.3 catalog store: the only place in RSLV that speaks SQL.
//!
//! A `sqlx::SqlitePool`-backed implementation of `CatalogStore`, carrying
//! the unique-constraint validation, the longest-value-prefix lookup
//! (§4.4), and the bounded synonym chase (§4.4, §9).

pub mod error;
pub mod store;

pub use error::CatalogError;
pub use store::{CatalogStore, SqliteCatalogStore};
