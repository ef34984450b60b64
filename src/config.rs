use anyhow::Context;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

use crate::duration::{self, go_duration_serde};

pub const DEFAULT_TDARR_HOST: &str = "http://tdarr:8265";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration: optional TOML file named by `CONFIG_FILE`, then environment overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tdarr: TdarrConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TdarrConfig {
    /// Base URL of the Tdarr server, e.g. `http://tdarr:8265`.
    pub host: String,
    /// `false` accepts any TLS certificate from the Tdarr server.
    pub verify_ssl: bool,
    #[serde(deserialize_with = "go_duration_serde::deserialize")]
    pub request_timeout: Duration,
}

impl Default for TdarrConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TDARR_HOST.to_string(),
            verify_ssl: true,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9082,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
}

impl LoggingConfig {
    /// `level` as a tracing filter, or `None` when it is not a level name. Accepts the
    /// logrus spellings `warning`, `fatal` and `panic`.
    pub fn parse_level(&self) -> Option<LevelFilter> {
        let level = self.level.trim().to_ascii_lowercase();
        let level = match level.as_str() {
            "warning" => "warn",
            "fatal" | "panic" => "error",
            "" => return None,
            other => other,
        };
        level.parse().ok()
    }

    /// Like [`parse_level`](Self::parse_level), falling back to `info`.
    pub fn level_filter(&self) -> LevelFilter {
        self.parse_level().unwrap_or(LevelFilter::INFO)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// What the poll worker does when a cycle fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Stop the worker and exit the process with the error.
    #[default]
    Exit,
    /// Log the error and try again on the next tick.
    Continue,
}

impl FromStr for OnError {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exit" => Ok(OnError::Exit),
            "continue" => Ok(OnError::Continue),
            other => anyhow::bail!("on_error must be \"exit\" or \"continue\", got {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Time between polls of the Tdarr statistics endpoint.
    #[serde(deserialize_with = "go_duration_serde::deserialize")]
    pub interval: Duration,
    pub on_error: OnError,
    /// Warn when one cycle writes more label-keyed samples (breakdowns + languages) than this.
    pub cardinality_warn_threshold: usize,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            on_error: OnError::Exit,
            cardinality_warn_threshold: 10_000,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads using `lookup` in place of the process environment (e.g. for tests).
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = match lookup("CONFIG_FILE") {
            Some(path) => {
                let s = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {path}"))?;
                toml::from_str(&s).with_context(|| format!("parsing config file {path}"))?
            }
            None => AppConfig::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string, without environment overrides.
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(host) = lookup("TDARR_HOST").filter(|h| !h.is_empty()) {
            self.tdarr.host = host;
        }
        if let Some(verify) = lookup("TDARR_VERIFY_SSL") {
            self.tdarr.verify_ssl = verify != "false";
        }
        if let Some(timeout) = lookup("TDARR_REQUEST_TIMEOUT").filter(|t| !t.is_empty()) {
            self.tdarr.request_timeout = duration::parse(&timeout)
                .with_context(|| format!("TDARR_REQUEST_TIMEOUT {timeout:?}"))?;
        }
        if let Some(interval) = lookup("TDARR_INTERVAL").filter(|i| !i.is_empty()) {
            self.monitoring.interval = duration::parse(&interval)
                .with_context(|| format!("TDARR_INTERVAL {interval:?}"))?;
        }
        if let Some(on_error) = lookup("TDARR_ON_ERROR").filter(|o| !o.is_empty()) {
            self.monitoring.on_error = on_error.parse()?;
        }
        if let Some(host) = lookup("LISTEN_HOST").filter(|h| !h.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").filter(|p| !p.is_empty()) {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT must be a port number, got {port:?}"))?;
        }
        if let Some(level) = lookup("LOG_LEVEL").filter(|l| !l.is_empty()) {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Address the HTTP server binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.tdarr.host.starts_with("http://") || self.tdarr.host.starts_with("https://"),
            "tdarr.host must be an http:// or https:// URL, got {:?}",
            self.tdarr.host
        );
        anyhow::ensure!(
            !self.tdarr.request_timeout.is_zero(),
            "tdarr.request_timeout must be > 0"
        );
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            !self.monitoring.interval.is_zero(),
            "monitoring.interval must be > 0"
        );
        anyhow::ensure!(
            self.monitoring.cardinality_warn_threshold > 0,
            "monitoring.cardinality_warn_threshold must be > 0, got {}",
            self.monitoring.cardinality_warn_threshold
        );
        Ok(())
    }
}
