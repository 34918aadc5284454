use serde::Deserialize;

/// Service configuration, `spec.md` §6 "Configuration".
///
/// Loaded by `app`/`operator` via the `config` crate: defaults from here,
/// then an optional `config/rslv.toml`, then a `.env` file, then
/// environment variables prefixed `RSLV_`. `domain` only owns the shape;
/// the layered loading lives in `app::config` since it needs filesystem
/// and env access this crate deliberately doesn't have.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub db_connection_string: String,
    pub static_dir: String,
    pub template_dir: String,
    pub log_filename: Option<String>,
    /// Regex stripping a self-referential URL prefix from identifiers,
    /// e.g. `^https?://rslv\.xyz/`.
    pub service_pattern: Option<String>,
    /// Enables the two `auto_introspection` shortcuts in the resolver
    /// state machine (`spec.md` §4.6, §9 Open Questions).
    pub auto_introspection: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8000,
            db_connection_string: "sqlite://data/pid_config.sqlite".to_string(),
            static_dir: "static".to_string(),
            template_dir: "templates".to_string(),
            log_filename: None,
            service_pattern: None,
            auto_introspection: true,
        }
    }
}
