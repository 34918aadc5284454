//! Pure, I/O-free identifier logic: `spec.md` §4.1 (splitter) and §4.2
//! (template expander), plus the ARK hyphen post-processing hook.
//!
//! Nothing in this crate touches a database or the network — that's the
//! whole point of keeping it separate from `infra`/`adapt`.

pub mod ark;
pub mod splitter;
pub mod template;

pub use splitter::split;
pub use template::{expand, expand_target, TemplateParts};
