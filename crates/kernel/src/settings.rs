use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "SENSELIB_ENV";
const CONFIG_DIR_ENV: &str = "SENSELIB_CONFIG_DIR";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    fn parse(name: &str) -> anyhow::Result<Self> {
        match name {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub listing: ListingSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    ///
    /// Environment variables use the `SENSELIB_` prefix and `__` between
    /// nested keys, e.g. `SENSELIB_API__BASE_URL`.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        Self::load_from(&config_dir, &environment)
    }

    /// Load configuration from an explicit directory and environment name.
    pub fn load_from(config_dir: &Path, environment: &str) -> anyhow::Result<Self> {
        let parsed_environment = Environment::parse(environment)?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix("SENSELIB")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;
        tracing::debug!(
            environment = ?settings.environment,
            dir = %config_dir.display(),
            "settings loaded"
        );

        Ok(settings)
    }
}

/// Where and how the REST collaborator is reached.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "ApiSettings::default_base_url")]
    pub base_url: String,
    #[serde(default = "ApiSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "ApiSettings::default_user_agent")]
    pub user_agent: String,
}

impl ApiSettings {
    fn default_base_url() -> String {
        "http://127.0.0.1:8080".to_string()
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }

    fn default_user_agent() -> String {
        "senselib-admin/0.1".to_string()
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            request_timeout_ms: Self::default_request_timeout_ms(),
            user_agent: Self::default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingSettings {
    #[serde(default = "ListingSettings::default_page_size")]
    pub page_size: u32,
}

impl ListingSettings {
    fn default_page_size() -> u32 {
        10
    }
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            page_size: Self::default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    /// Pending notifications kept for late readers; also the broadcast buffer.
    #[serde(default = "NotificationSettings::default_capacity")]
    pub capacity: usize,
}

impl NotificationSettings {
    fn default_capacity() -> usize {
        64
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            capacity: Self::default_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplaySettings {
    /// `time` format description, e.g. `[day]/[month]/[year]`.
    #[serde(default = "DisplaySettings::default_date_format")]
    pub date_format: String,
    #[serde(default = "DisplaySettings::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "DisplaySettings::default_thousands_separator")]
    pub thousands_separator: String,
}

impl DisplaySettings {
    fn default_date_format() -> String {
        "[day]/[month]/[year]".to_string()
    }

    fn default_currency_symbol() -> String {
        "₫".to_string()
    }

    fn default_thousands_separator() -> String {
        ".".to_string()
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            date_format: Self::default_date_format(),
            currency_symbol: Self::default_currency_symbol(),
            thousands_separator: Self::default_thousands_separator(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_page_size_is_ten() {
        let settings = Settings::default();
        assert_eq!(settings.listing.page_size, 10);
        assert_eq!(settings.api.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn environment_overlay_wins_over_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("base.toml"),
            "[listing]\npage_size = 25\n\n[api]\nbase_url = \"http://base\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("staging.toml"),
            "[api]\nbase_url = \"https://staging.senselib.test\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(dir.path(), "staging").unwrap();
        assert_eq!(settings.environment, Environment::Staging);
        assert_eq!(settings.listing.page_size, 25);
        assert_eq!(settings.api.base_url, "https://staging.senselib.test");
        assert_eq!(settings.telemetry.log_format, LogFormat::Pretty);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let error = Settings::load_from(dir.path(), "qa").unwrap_err();
        assert!(error.to_string().contains("unsupported environment 'qa'"));
    }
}
