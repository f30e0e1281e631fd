//! Configuration for the `codemap` binary
//!
//! Layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. `codemap.toml` in the working directory, or the file named by `CODEMAP_CONFIG`
//! 3. `CODEMAP__*` environment variables (`CODEMAP__API__BASE_URL`, ...)
//!
//! A `.env` file is read before the environment is consulted. A missing file
//! is fine; one that cannot be parsed is an error.

use anyhow::Context;
use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use codemap_client::{ClientConfig, DEFAULT_BASE_URL};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub text_to_cui_base_url: Option<String>,
    #[serde(default)]
    pub service_health_url: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        read_dotenv(dotenvy::dotenv())?;
        let file = std::env::var("CODEMAP_CONFIG").ok();
        let builder = match file.as_deref() {
            Some(path) => defaults()?.add_source(File::with_name(path).required(true)),
            None => defaults()?.add_source(File::with_name("codemap").required(false)),
        };
        builder
            .add_source(environment())
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// URL and timeout rules are the client's own; only the log level is
    /// checked here.
    pub fn validate(&self) -> Result<(), String> {
        self.client_config()
            .validate()
            .map_err(|e| format!("api: {e}"))?;
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            ));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            text_to_cui_base_url: self.api.text_to_cui_base_url.clone(),
            service_health_url: self.api.service_health_url.clone(),
            timeout: Duration::from_secs(self.api.timeout_seconds),
        }
    }
}

fn read_dotenv(result: Result<PathBuf, dotenvy::Error>) -> anyhow::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).context("Failed to read .env file"),
    }
}

fn defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
    Ok(config::Config::builder()
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.timeout_seconds", 30)?
        .set_default("logging.level", "info")?
        .set_default("logging.json", false)?)
}

fn environment() -> Environment {
    Environment::with_prefix("CODEMAP")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn build(toml: &str, env: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        Ok(defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(environment().source(Some(vars)))
            .build()?
            .try_deserialize()?)
    }

    #[test]
    fn defaults_are_valid() -> anyhow::Result<()> {
        let config = build("", &[])?;
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.api.text_to_cui_base_url, None);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.validate().is_ok());
        Ok(())
    }

    #[test]
    fn file_then_environment() -> anyhow::Result<()> {
        let config = build(
            r#"
            [api]
            base_url = "http://mapper.internal/research"
            timeout_seconds = 5

            [logging]
            json = true
            "#,
            &[
                ("CODEMAP__API__TIMEOUT_SECONDS", "12"),
                ("CODEMAP__API__TEXT_TO_CUI_BASE_URL", "http://cui.internal"),
            ],
        )?;
        assert_eq!(config.api.base_url, "http://mapper.internal/research");
        assert_eq!(config.api.timeout_seconds, 12);
        assert_eq!(
            config.api.text_to_cui_base_url.as_deref(),
            Some("http://cui.internal")
        );
        assert!(config.logging.json);

        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(12));
        Ok(())
    }

    #[test]
    fn validation_rejects_bad_values() -> anyhow::Result<()> {
        let mut config = build("", &[])?;
        config.api.base_url = "mapper.internal".into();
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("api: "));
        assert!(err.contains("base_url must be an http(s) URL"));

        let mut config = build("", &[])?;
        config.api.timeout_seconds = 0;
        assert!(config.validate().unwrap_err().contains("timeout"));

        let mut config = build("", &[])?;
        config.logging.level = "verbose".into();
        assert!(config.validate().unwrap_err().contains("logging.level"));

        let mut config = build("", &[])?;
        config.api.text_to_cui_base_url = Some("ftp://cui".into());
        assert!(config.validate().is_err());

        let mut config = build("", &[("CODEMAP__API__SERVICE_HEALTH_URL", "nlp:7000")])?;
        assert!(config
            .validate()
            .unwrap_err()
            .contains("service_health_url"));
        config.api.service_health_url = Some("http://nlp:7000/health".into());
        assert!(config.validate().is_ok());
        assert_eq!(
            config.client_config().service_health_url.as_deref(),
            Some("http://nlp:7000/health")
        );
        Ok(())
    }

    #[test]
    fn missing_dotenv_is_ignored_but_a_broken_one_is_not() {
        assert!(read_dotenv(Ok(PathBuf::from(".env"))).is_ok());

        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(read_dotenv(Err(dotenvy::Error::Io(missing))).is_ok());

        let broken = dotenvy::Error::LineParse("CODEMAP__API__BASE_URL http://x".into(), 22);
        let err = read_dotenv(Err(broken)).unwrap_err();
        assert!(err.to_string().contains(".env"));

        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(read_dotenv(Err(dotenvy::Error::Io(denied))).is_err());
    }
}
