use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domains::pipeline::PipelineSettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub local_url: String,
    pub model_name: String,
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub render_service_url: Option<String>,
    pub render_api_key: Option<String>,
    pub min_iteration_interval: Duration,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub link_attempts: u32,
    pub model_timeout: Duration,
    pub autostart: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let config = Self {
            local_url: env::var("LOCAL_URL")
                .unwrap_or_else(|_| ollama_client::DEFAULT_BASE_URL.to_string()),
            model_name: env::var("LOCAL_LLM_MODEL_NAME")
                .context("LOCAL_LLM_MODEL_NAME must be set")?,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8001).context("PORT must be a valid number")?,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            render_service_url: non_empty_var("RENDER_SERVICE_URL"),
            render_api_key: non_empty_var("RENDER_API_KEY"),
            min_iteration_interval: Duration::from_secs(
                parse_var("MIN_ITERATION_INTERVAL_SECS", 15)
                    .context("MIN_ITERATION_INTERVAL_SECS must be a whole number of seconds")?,
            ),
            base_backoff: Duration::from_secs(
                parse_var("BASE_BACKOFF_SECS", 10)
                    .context("BASE_BACKOFF_SECS must be a whole number of seconds")?,
            ),
            max_backoff: Duration::from_secs(
                parse_var("MAX_BACKOFF_SECS", 300)
                    .context("MAX_BACKOFF_SECS must be a whole number of seconds")?,
            ),
            link_attempts: parse_var("LINK_ATTEMPTS", 5)
                .context("LINK_ATTEMPTS must be a positive number")?,
            model_timeout: Duration::from_secs(
                parse_var("MODEL_TIMEOUT_SECS", 120)
                    .context("MODEL_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            autostart: parse_bool(env::var("AUTOSTART").ok().as_deref())
                .context("AUTOSTART must be true or false")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.model_name.trim().is_empty() {
            anyhow::bail!("LOCAL_LLM_MODEL_NAME must not be empty");
        }
        if self.link_attempts == 0 {
            anyhow::bail!("LINK_ATTEMPTS must be at least 1");
        }
        if self.max_backoff < self.base_backoff {
            anyhow::bail!("MAX_BACKOFF_SECS must be >= BASE_BACKOFF_SECS");
        }
        Ok(())
    }

    /// Bind address, `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Controller settings derived from this configuration
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            min_iteration_interval: self.min_iteration_interval,
            base_backoff: self.base_backoff,
            max_backoff: self.max_backoff,
            link_attempts: self.link_attempts,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value {:?} for {}", raw, name)),
        _ => Ok(default),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(raw: Option<&str>) -> Result<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "" | "0" | "false" | "no" | "off" => Ok(false),
            "1" | "true" | "yes" | "on" => Ok(true),
            other => anyhow::bail!("unrecognized boolean {:?}", other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(!parse_bool(None).unwrap());
        assert!(parse_bool(Some("TRUE")).unwrap());
        assert!(parse_bool(Some(" yes ")).unwrap());
        assert!(!parse_bool(Some("0")).unwrap());
        assert!(parse_bool(Some("maybe")).is_err());
    }

    #[test]
    fn test_pipeline_settings_and_bind_addr() {
        let config = Config {
            local_url: "http://localhost:11434".into(),
            model_name: "llama3".into(),
            host: "0.0.0.0".into(),
            port: 9000,
            data_dir: PathBuf::from("data"),
            render_service_url: None,
            render_api_key: None,
            min_iteration_interval: Duration::from_secs(15),
            base_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(300),
            link_attempts: 5,
            model_timeout: Duration::from_secs(120),
            autostart: false,
        };

        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert!(config.validate().is_ok());
        let settings = config.pipeline_settings();
        assert_eq!(settings.link_attempts, 5);
        assert_eq!(settings.max_backoff, Duration::from_secs(300));

        let bad = Config {
            max_backoff: Duration::from_secs(1),
            ..config
        };
        assert!(bad.validate().is_err());
    }
}
