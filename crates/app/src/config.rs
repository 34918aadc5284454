use domain::Settings;

/// Layered settings load, `spec.md` §6 "Configuration": struct defaults,
/// then an optional `config/rslv.toml`, then a `.env` file, then
/// environment variables prefixed `RSLV_`. Later sources win.
pub fn load() -> anyhow::Result<Settings> {
    let _ = dotenvy::dotenv();

    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/rslv").required(false))
        .add_source(config::Environment::with_prefix("RSLV"))
        .build()?
        .try_deserialize::<Settings>()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        // No config/rslv.toml in the test working directory and no
        // RSLV_* vars set: every field should come from Settings::default.
        std::env::remove_var("RSLV_HOST");
        std::env::remove_var("RSLV_PORT");
        let settings = load().expect("layered defaults should always deserialize");
        assert_eq!(settings.port, Settings::default().port);
    }

    #[test]
    fn env_override_wins_over_default() {
        std::env::set_var("RSLV_PORT", "9009");
        let settings = load().unwrap();
        assert_eq!(settings.port, 9009);
        std::env::remove_var("RSLV_PORT");
    }
}
