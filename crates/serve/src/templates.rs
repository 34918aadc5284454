use adapt::{DefinitionView, PartsView};
use askama::Template;

/// `spec.md` §4.6 INTROSPECT "render HTML template" branch.
#[derive(Template)]
#[template(path = "introspection.html")]
pub struct IntrospectionTemplate {
    pub pid: String,
    pub scheme: String,
    pub prefix: String,
    pub value: String,
    pub target: String,
    pub canonical: String,
    pub status_code: u16,
    pub prefixes: Option<Vec<String>>,
    pub values: Option<Vec<String>>,
}

impl IntrospectionTemplate {
    pub fn new(parts: &PartsView, target: &str, canonical: &str, status_code: u16, definition: &DefinitionView) -> Self {
        Self {
            pid: parts.pid.clone(),
            scheme: parts.scheme.clone(),
            prefix: parts.prefix.clone().unwrap_or_default(),
            value: parts.value.clone().unwrap_or_default(),
            target: target.to_string(),
            canonical: canonical.to_string(),
            status_code,
            prefixes: definition.prefixes.clone(),
            values: definition.values.clone(),
        }
    }
}
