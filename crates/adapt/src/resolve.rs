use domain::{ParsedIdentifier, PidDefinition};
use infra::CatalogStore;
use rslv_core::TemplateParts;
use serde::Serialize;
use serde_json::Value as Json;

use crate::error::AdaptError;
use crate::normalize::{self, Normalized};

/// JSON-shaped view of a `ParsedIdentifier`, `spec.md` §6 field lists.
#[derive(Debug, Clone, Serialize)]
pub struct PartsView {
    pub pid: String,
    pub scheme: String,
    pub content: Option<String>,
    pub prefix: Option<String>,
    pub value: Option<String>,
    pub suffix: Option<String>,
}

impl From<&ParsedIdentifier> for PartsView {
    fn from(parts: &ParsedIdentifier) -> Self {
        Self {
            pid: parts.pid.clone(),
            scheme: parts.scheme.clone(),
            content: parts.content.clone(),
            prefix: parts.prefix.clone(),
            value: parts.value.clone(),
            suffix: parts.suffix.clone(),
        }
    }
}

/// JSON-shaped view of the matched `PidDefinition`, `spec.md` §6
/// "Introspection response (JSON)".
#[derive(Debug, Clone, Serialize)]
pub struct DefinitionView {
    pub uniq: String,
    pub scheme: String,
    pub prefix: String,
    pub value: String,
    pub target: Option<String>,
    pub canonical: String,
    pub synonym_for: Option<String>,
    pub http_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefixes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

/// The resolver state machine's result, `spec.md` §4.6. Framework-agnostic
/// — `serve` turns this into an `axum::Response`.
#[derive(Debug, Clone)]
pub enum Outcome {
    Redirect {
        status: u16,
        location: String,
        parts: PartsView,
        target: String,
        canonical: String,
    },
    Introspect {
        status: u16,
        parts: PartsView,
        target: String,
        canonical: String,
        properties: Option<Json>,
        definition: DefinitionView,
    },
    NotFound {
        parts: PartsView,
        error: String,
    },
}

/// `adjust(method, code)`: method-aware redirect status adjustment,
/// `spec.md` §4.6 "Method-aware status adjustment". Preserves the request
/// method across a redirect for non-idempotent methods per RFC 7231.
pub fn adjust(method: &str, code: u16) -> u16 {
    match method.to_ascii_uppercase().as_str() {
        "POST" | "PUT" | "DELETE" => match code {
            302 => 307,
            301 => 308,
            other => other,
        },
        _ => code,
    }
}

/// Orchestrate the full resolver state machine: normalize, split, catalog
/// lookup, template, and decide redirect vs. introspection vs. 404.
#[tracing::instrument(skip(store))]
pub async fn handle(
    method: &str,
    raw_url: &str,
    identifier_tail: &str,
    store: &dyn CatalogStore,
    auto_introspection: bool,
    service_pattern: Option<&regex::Regex>,
) -> Result<Outcome, AdaptError> {
    let normalized: Normalized = normalize::normalize(raw_url, identifier_tail, service_pattern);

    if normalized.is_introspection {
        return introspect(&normalized.cleaned, store, method).await;
    }

    let parts = rslv_core::split(&normalized.cleaned);
    let def = store
        .get(&parts.scheme, parts.prefix.as_deref(), parts.value.as_deref(), true)
        .await?;

    let Some(def) = def else {
        return Ok(Outcome::NotFound {
            parts: PartsView::from(&parts),
            error: format!("No match was found for {}", normalized.original),
        });
    };

    let mut working = parts;
    compute_suffix(&mut working, &def);
    apply_ark_hyphen_policy(&mut working, &def);

    let tp = TemplateParts::from(&working);
    let target = rslv_core::expand_target(def.target.as_deref(), &tp)?;

    if auto_introspection && working.value_or_empty().is_empty() {
        return introspect(&normalized.cleaned, store, method).await;
    }
    // Legacy N2T behavior: a value that resolves exactly to the matched
    // definition's own value also triggers introspection instead of a
    // redirect (`spec.md` §9 Open Questions). Toggled by the same flag.
    if auto_introspection && working.value_or_empty() == def.value {
        return introspect(&normalized.cleaned, store, method).await;
    }

    let canonical = rslv_core::expand(&def.canonical, &tp)?;
    let status = adjust(method, def.http_code);

    Ok(Outcome::Redirect {
        status,
        location: target.clone(),
        parts: PartsView::from(&working),
        target,
        canonical,
    })
}

/// Entry point for the `/.info/{identifier}` route, which always
/// introspects regardless of the resolve route's trigger-suffix test
/// (`spec.md` §6 route table).
#[tracing::instrument(skip(store))]
pub async fn handle_introspect(
    method: &str,
    raw_url: &str,
    identifier_tail: &str,
    store: &dyn CatalogStore,
    service_pattern: Option<&regex::Regex>,
) -> Result<Outcome, AdaptError> {
    let normalized = normalize::normalize(raw_url, identifier_tail, service_pattern);
    introspect(&normalized.cleaned, store, method).await
}

async fn introspect(cleaned: &str, store: &dyn CatalogStore, method: &str) -> Result<Outcome, AdaptError> {
    let parts = rslv_core::split(cleaned);
    let def = store
        .get(&parts.scheme, parts.prefix.as_deref(), parts.value.as_deref(), false)
        .await?;

    let Some(def) = def else {
        return Ok(Outcome::NotFound {
            parts: PartsView::from(&parts),
            error: format!("No match was found for {cleaned}"),
        });
    };

    let mut working = parts;
    compute_suffix(&mut working, &def);
    apply_ark_hyphen_policy(&mut working, &def);

    let tp = TemplateParts::from(&working);
    let target = rslv_core::expand_target(def.target.as_deref(), &tp)?;
    let canonical = rslv_core::expand(&def.canonical, &tp)?;
    let status = adjust(method, 200);

    let mut definition = DefinitionView {
        uniq: def.uniq.clone(),
        scheme: def.scheme.clone(),
        prefix: def.prefix.clone(),
        value: def.value.clone(),
        target: def.target.clone(),
        canonical: def.canonical.clone(),
        synonym_for: def.synonym_for.clone(),
        http_code: def.http_code,
        prefixes: None,
        values: None,
    };

    if working.prefix_or_empty().is_empty() {
        definition.prefixes = Some(store.list_prefixes(&working.scheme).await?);
    } else if working.value_or_empty().is_empty() {
        definition.values = Some(store.list_values(&working.scheme, working.prefix_or_empty()).await?);
    }

    Ok(Outcome::Introspect {
        status,
        parts: PartsView::from(&working),
        target,
        canonical,
        properties: def.properties.clone(),
        definition,
    })
}

/// `spec.md` §4.1 "Suffix computation": the tail of `pid` beyond the
/// matched definition's `prefix/value`, located by finding `content`
/// within `pid` and walking past `"{prefix}/{value}"` bytes from there.
fn compute_suffix(parts: &mut ParsedIdentifier, def: &PidDefinition) {
    let Some(content) = parts.content.as_deref() else {
        return;
    };
    let Some(content_pos) = parts.pid.find(content) else {
        return;
    };
    let matched_len = format!("{}/{}", def.prefix, def.value).len();
    let suffix_start = (content_pos + matched_len).min(parts.pid.len());
    parts.suffix = Some(parts.pid[suffix_start..].to_string());
}

/// `spec.md` §4.1 "ARK hyphen policy": applied post-split, keyed off the
/// *matched definition's* scheme (not the raw parsed scheme) so a synonym
/// chain that terminates on an `ark` entry still gets the policy, and a
/// `strip_hyphens=false` property opts a definition out.
fn apply_ark_hyphen_policy(parts: &mut ParsedIdentifier, def: &PidDefinition) {
    if !def.strip_hyphens() {
        return;
    }
    parts.content = parts.content.as_deref().map(rslv_core::ark::strip_hyphens);
    parts.value = parts.value.as_deref().map(rslv_core::ark::strip_hyphens);
    parts.suffix = parts.suffix.as_deref().map(rslv_core::ark::strip_hyphens);
}

#[cfg(test)]
mod tests {
    use super::*;
    use infra::SqliteCatalogStore;

    async fn seeded_store() -> SqliteCatalogStore {
        let store = SqliteCatalogStore::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store.initialize(Some("test")).await.unwrap();

        let seeds: &[(&str, &str, &str, Option<&str>)] = &[
            ("ark", "", "", Some("https://example.com/${pid}")),
            ("ark", "99999", "", Some("https://example.99999.com/info/${content}")),
            ("ark", "99999", "fk4", Some("https://fk4.example.com/${suffix}")),
            ("ark", "99999", "fk", Some("http://fk.example.com/${pid}")),
            ("ark", "99999", "9", Some("http://arks.org/ark:${suffix}")),
            ("purl", "", "", Some("http://purl.org/${content}")),
        ];
        for (scheme, prefix, value, target) in seeds {
            let mut def = PidDefinition::new(*scheme, *prefix, *value);
            def.target = target.map(|s| s.to_string());
            if *scheme == "purl" {
                def.properties = Some(serde_json::json!({"tag": 8}));
            }
            store.add(&mut def).await.unwrap();
        }

        let mut ark_example = PidDefinition::new("ark", "example", "");
        ark_example.synonym_for = Some("ark:99999".to_string());
        store.add(&mut ark_example).await.unwrap();

        let mut bark = PidDefinition::new("bark", "", "");
        bark.synonym_for = Some("ark:".to_string());
        store.add(&mut bark).await.unwrap();

        store.refresh_metadata().await.unwrap();
        store
    }

    #[tokio::test]
    async fn get_redirects_to_longest_value_prefix_match() {
        let store = seeded_store().await;
        let outcome = handle("GET", "http://host/ark:99999/foo", "ark:99999/foo", &store, true, None)
            .await
            .unwrap();
        match outcome {
            Outcome::Redirect { status, location, .. } => {
                assert_eq!(status, 302);
                assert_eq!(location, "https://example.99999.com/info/99999/foo");
            }
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn post_redirect_adjusts_status_to_307() {
        let store = seeded_store().await;
        let outcome = handle("POST", "http://host/ark:99999/foo", "ark:99999/foo", &store, true, None)
            .await
            .unwrap();
        match outcome {
            Outcome::Redirect { status, .. } => assert_eq!(status, 307),
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn suffix_template_uses_computed_suffix() {
        let store = seeded_store().await;
        let outcome = handle("GET", "http://host/ark:99999/fk4bar", "ark:99999/fk4bar", &store, true, None)
            .await
            .unwrap();
        match outcome {
            Outcome::Redirect { location, .. } => assert_eq!(location, "https://fk4.example.com/bar"),
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn info_trigger_returns_introspection_with_matched_uniq() {
        let store = seeded_store().await;
        let outcome = handle(
            "GET",
            "http://host/ark:99999/fkhhdd?info",
            "ark:99999/fkhhdd?info",
            &store,
            true,
            None,
        )
        .await
        .unwrap();
        match outcome {
            Outcome::Introspect { status, definition, .. } => {
                assert_eq!(status, 200);
                assert_eq!(definition.uniq, "ark:99999/fk");
            }
            other => panic!("expected introspection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn synonym_is_followed_for_redirect() {
        let store = seeded_store().await;
        let outcome = handle("GET", "http://host/bark:99999/hhdd", "bark:99999/hhdd", &store, true, None)
            .await
            .unwrap();
        match outcome {
            Outcome::Redirect { location, .. } => {
                assert_eq!(location, "https://example.99999.com/info/99999/hhdd");
            }
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn double_question_mark_introspection_exposes_properties() {
        let store = seeded_store().await;
        let outcome = handle(
            "GET",
            "http://host/purl:dc/terms/creator??",
            "purl:dc/terms/creator??",
            &store,
            true,
            None,
        )
        .await
        .unwrap();
        match outcome {
            Outcome::Introspect { status, properties, .. } => {
                assert_eq!(status, 200);
                assert_eq!(properties.unwrap()["tag"], 8);
            }
            other => panic!("expected introspection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn single_char_value_definitions_are_unreachable_and_fall_back_to_prefix_tier() {
        // Value-prefix candidate lengths start at 2, so `ark:99999/9`'s
        // one-character value can never be matched; a request whose value
        // happens to start with "9" instead settles on the `ark:99999`
        // prefix-tier definition.
        let store = seeded_store().await;
        let outcome = handle(
            "GET",
            "http://host/ark:99999/912345/foo",
            "ark:99999/912345/foo",
            &store,
            true,
            None,
        )
        .await
        .unwrap();
        match outcome {
            Outcome::Redirect { location, .. } => {
                assert_eq!(location, "https://example.99999.com/info/99999/912345/foo");
            }
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_value_auto_introspection_lists_prefixes() {
        let store = seeded_store().await;
        let outcome = handle("GET", "http://host/ark:", "ark:", &store, true, None)
            .await
            .unwrap();
        match outcome {
            Outcome::Introspect { definition, .. } => {
                assert_eq!(definition.prefixes, Some(vec!["99999".to_string(), "example".to_string()]));
            }
            other => panic!("expected introspection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_match_is_404_shaped() {
        let store = seeded_store().await;
        let outcome = handle("GET", "http://host/doi:10.5555/x", "doi:10.5555/x", &store, true, None)
            .await
            .unwrap();
        match outcome {
            Outcome::NotFound { error, .. } => assert!(error.contains("doi:10.5555/x")),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn service_url_prefix_is_stripped_before_lookup() {
        let store = seeded_store().await;
        let pattern = regex::Regex::new(r"(?i)^https?://rslv\.xyz/").unwrap();
        let outcome = handle(
            "GET",
            "http://host/http://rslv.xyz/ark:99999/hhdd",
            "http://rslv.xyz/ark:99999/hhdd",
            &store,
            true,
            Some(&pattern),
        )
        .await
        .unwrap();
        match outcome {
            Outcome::Redirect { location, .. } => {
                assert_eq!(location, "https://example.99999.com/info/99999/hhdd");
            }
            other => panic!("expected redirect, got {other:?}"),
        }
    }
}
