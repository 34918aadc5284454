use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::DomainError;

/// A catalog entry: `spec.md` §3.2.
///
/// `scheme`/`prefix`/`value` together form the identity tuple enforced by
/// the catalog store's unique constraint; `uniq` is derived from them and
/// is what synonym resolution targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidDefinition {
    pub scheme: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub uniq: String,
    pub target: Option<String>,
    #[serde(default = "default_canonical")]
    pub canonical: String,
    #[serde(default = "default_http_code")]
    pub http_code: u16,
    pub synonym_for: Option<String>,
    pub properties: Option<Json>,
    pub splitter: Option<String>,
}

fn default_canonical() -> String {
    "${pid}".to_string()
}

fn default_http_code() -> u16 {
    302
}

impl PidDefinition {
    /// Build a new definition, computing `uniq` from scheme/prefix/value.
    pub fn new(scheme: impl Into<String>, prefix: impl Into<String>, value: impl Into<String>) -> Self {
        let scheme = scheme.into();
        let prefix = prefix.into();
        let value = value.into();
        let uniq = uniq_for(&scheme, &prefix, &value);
        Self {
            scheme,
            prefix,
            value,
            uniq,
            target: None,
            canonical: default_canonical(),
            http_code: default_http_code(),
            synonym_for: None,
            properties: None,
            splitter: None,
        }
    }

    /// Recompute `uniq` from the identity fields. Call after mutating
    /// `scheme`, `prefix`, or `value` directly (e.g. when deserializing
    /// admin input that didn't set `uniq`).
    pub fn refresh_uniq(&mut self) {
        self.uniq = uniq_for(&self.scheme, &self.prefix, &self.value);
    }

    /// Whether this scheme participates in ARK-style hyphen stripping.
    /// `properties.strip_hyphens = false` opts a definition out even when
    /// its scheme is `ark` — see `spec.md` §4.1 "ARK hyphen policy".
    pub fn strip_hyphens(&self) -> bool {
        if self.scheme != "ark" {
            return false;
        }
        match self.properties.as_ref().and_then(|p| p.get("strip_hyphens")) {
            Some(Json::Bool(b)) => *b,
            _ => true,
        }
    }

    /// Validate the fields the catalog store's unique constraint and
    /// identity tuple depend on. Normalizes in place (trim/lowercase)
    /// matching the Python original's SQLAlchemy validators.
    pub fn validate_and_normalize(&mut self) -> Result<(), DomainError> {
        let scheme = self.scheme.trim_matches(|c| c == ':' || c == '/' || c == ' ').to_lowercase();
        if scheme.contains(':') {
            return Err(DomainError::Validation("scheme must not contain ':'".into()));
        }
        if scheme.contains('/') {
            return Err(DomainError::Validation("scheme must not contain '/'".into()));
        }
        self.scheme = scheme;

        let prefix = self.prefix.trim_matches(|c| c == '/' || c == ' ').to_string();
        if prefix.contains('/') {
            return Err(DomainError::Validation("prefix must not contain '/'".into()));
        }
        self.prefix = prefix;

        if !(301..=308).contains(&self.http_code) {
            return Err(DomainError::Validation(format!(
                "http_code must be in 301..=308, got {}",
                self.http_code
            )));
        }

        self.refresh_uniq();
        Ok(())
    }
}

/// `"{scheme}:{prefix}/{value}"` when `value` is non-empty, else
/// `"{scheme}:{prefix}"` — `spec.md` §3.2 `uniq`.
pub fn uniq_for(scheme: &str, prefix: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{scheme}:{prefix}")
    } else {
        format!("{scheme}:{prefix}/{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniq_omits_value_when_empty() {
        assert_eq!(uniq_for("ark", "99999", ""), "ark:99999");
        assert_eq!(uniq_for("ark", "99999", "fk4"), "ark:99999/fk4");
        assert_eq!(uniq_for("ark", "", ""), "ark:");
    }

    #[test]
    fn validate_normalizes_scheme_and_rejects_bad_http_code() {
        let mut def = PidDefinition::new(" ARK:", "99999/", "fk4");
        def.http_code = 200;
        assert!(def.validate_and_normalize().is_err());

        def.http_code = 302;
        def.validate_and_normalize().expect("should validate");
        assert_eq!(def.scheme, "ark");
        assert_eq!(def.prefix, "99999");
        assert_eq!(def.uniq, "ark:99999/fk4");
    }

    #[test]
    fn strip_hyphens_defaults_true_for_ark_unless_opted_out() {
        let mut def = PidDefinition::new("ark", "99999", "");
        assert!(def.strip_hyphens());
        def.properties = Some(serde_json::json!({ "strip_hyphens": false }));
        assert!(!def.strip_hyphens());

        let other = PidDefinition::new("purl", "", "");
        assert!(!other.strip_hyphens());
    }
}
