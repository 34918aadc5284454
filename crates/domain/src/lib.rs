//! Value objects and configuration shared by every other RSLV crate.
//!
//! `domain` holds no I/O and no persistence logic — just the shapes
//! described in the specification's data model, plus the validation
//! rules that both the catalog store and the admin CLI must agree on.

pub mod definition;
pub mod error;
pub mod identifier;
pub mod metadata;
pub mod settings;

pub use definition::PidDefinition;
pub use error::DomainError;
pub use identifier::ParsedIdentifier;
pub use metadata::CatalogMetadata;
pub use settings::Settings;
