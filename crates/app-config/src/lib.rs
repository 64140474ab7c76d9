// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{DashboardSettings, ProviderSettings, ServerSettings, Settings};

/// Loads the application settings from the `config/` directory.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());
    load_settings_from(Path::new("config"), &environment)
}

/// Same layering as [`load_settings`], from an explicit directory and environment.
pub fn load_settings_from(config_dir: &Path, environment: &str) -> Result<Settings> {
    load_layered(config_dir, environment, environment_source())
}

/// Environment variables such as `APP__PROVIDER__BASE_URL=...`.
///
/// With only `separator` set, `__` also follows the `APP` prefix.
fn environment_source() -> Environment {
    Environment::with_prefix("APP").separator("__")
}

fn load_layered(config_dir: &Path, environment: &str, env_source: Environment) -> Result<Settings> {
    let settings = Config::builder()
        // 1. Load the base configuration file.
        .add_source(File::from(config_dir.join("base")))
        // 2. Load the environment-specific configuration file.
        .add_source(File::from(config_dir.join(environment)).required(false))
        // 3. Load settings from environment variables.
        .add_source(env_source)
        .build()?;

    let settings: Settings = settings.try_deserialize()?;

    // Reject a bad default threshold at startup rather than on every request.
    settings.dashboard.view_params()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::StrategyKind;
    use std::fs;

    const BASE: &str = r#"
[app]
environment = "development"
log_level = "info"

[provider]
base_url = "http://localhost:8000"

[server]
host = "127.0.0.1"
port = 3000
"#;

    #[test]
    fn loads_base_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.toml"), BASE).unwrap();

        let settings = load_settings_from(dir.path(), "development").unwrap();
        assert_eq!(settings.provider.base_url, "http://localhost:8000");
        assert_eq!(settings.provider.request_timeout_secs, 10);
        assert_eq!(settings.provider.refresh_interval_secs, None);
        assert_eq!(settings.server.port, 3000);

        let params = settings.dashboard.view_params().unwrap();
        assert_eq!(params.strategy, StrategyKind::LongShort);
        assert_eq!(params.confidence_threshold, 0.6);
    }

    #[test]
    fn environment_file_overrides_base() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.toml"), BASE).unwrap();
        fs::write(
            dir.path().join("staging.toml"),
            r#"
[provider]
base_url = "http://backtest.internal:8000"
refresh_interval_secs = 300

[dashboard]
strategy = "long-only"
confidence_threshold = 0.75
"#,
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), "staging").unwrap();
        assert_eq!(settings.provider.base_url, "http://backtest.internal:8000");
        assert_eq!(settings.provider.refresh_interval_secs, Some(300));
        assert_eq!(settings.dashboard.strategy, StrategyKind::LongOnly);
        assert_eq!(settings.dashboard.confidence_threshold, Some(0.75));
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let base = format!("{BASE}\n[dashboard]\nconfidence_threshold = 1.5\n");
        fs::write(dir.path().join("base.toml"), base).unwrap();

        let result = load_settings_from(dir.path(), "development");
        assert!(matches!(result, Err(Error::InvalidDashboard(_))));
    }

    #[test]
    fn missing_base_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_settings_from(dir.path(), "development"),
            Err(Error::LoadError(_))
        ));
    }

    #[test]
    fn environment_variables_use_double_underscore_after_prefix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.toml"), BASE).unwrap();

        let mut vars = config::Map::new();
        vars.insert("APP__PROVIDER__BASE_URL".to_string(), "http://from-env:9000".to_string());
        vars.insert("APP_PROVIDER__REQUEST_TIMEOUT_SECS".to_string(), "99".to_string());

        let settings = load_layered(dir.path(), "development", environment_source().source(Some(vars))).unwrap();
        assert_eq!(settings.provider.base_url, "http://from-env:9000");
        // A single underscore after the prefix is not picked up.
        assert_eq!(settings.provider.request_timeout_secs, 10);
    }
}
