use crate::constants::{
    DEFAULT_PORT, DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_UPSTREAM_TIMEOUT_SECS, DEFAULT_UPSTREAM_URL,
    DEFAULT_USER_AGENT,
};
use crate::error::Error;
use std::path::PathBuf;
use std::time::Duration;

/// Process-wide configuration, read once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// Upstream price API base URL
    pub upstream_url: String,

    /// Identifying User-Agent sent upstream
    pub user_agent: String,

    /// Durable mirror project id; `None` disables mirroring
    pub mirror_project: Option<String>,

    /// Directory holding the mirror database
    pub data_dir: PathBuf,

    /// Static frontend bundle directory
    pub public_dir: PathBuf,

    /// In-process price refresh interval, zero disables the worker
    pub refresh_interval: Duration,

    /// Per-request upstream timeout
    pub upstream_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            mirror_project: None,
            data_dir: PathBuf::from("data"),
            public_dir: PathBuf::from("static"),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    /// Normalise and check the configuration before anything is started
    pub fn validate(mut self) -> Result<Self, Error> {
        self.upstream_url = self.upstream_url.trim().trim_end_matches('/').to_string();
        if !self.upstream_url.starts_with("http://") && !self.upstream_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "upstream url must start with http:// or https://, got '{}'",
                self.upstream_url
            )));
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("user agent must not be empty".to_string()));
        }

        if self.upstream_timeout.is_zero() {
            return Err(Error::Config("upstream timeout must be greater than zero".to_string()));
        }

        // An empty project id behaves like an unset one
        self.mirror_project = self
            .mirror_project
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(self)
    }

    pub fn worker_enabled(&self) -> bool {
        !self.refresh_interval.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default().validate().unwrap();
        assert_eq!(config.upstream_url, "https://prices.runescape.wiki/api/v1/osrs");
        assert_eq!(config.user_agent, "FlipTo5B-Dev/1.0");
        assert!(config.mirror_project.is_none());
        assert!(config.worker_enabled());
    }

    #[test]
    fn test_validate_normalises_values() {
        let config = ServerConfig {
            upstream_url: "http://localhost:9000/api/".to_string(),
            mirror_project: Some("   ".to_string()),
            refresh_interval: Duration::ZERO,
            ..ServerConfig::default()
        }
        .validate()
        .unwrap();

        assert_eq!(config.upstream_url, "http://localhost:9000/api");
        assert!(config.mirror_project.is_none());
        assert!(!config.worker_enabled());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = ServerConfig { upstream_url: "localhost".to_string(), ..ServerConfig::default() };
        assert!(matches!(bad_url.validate(), Err(Error::Config(_))));

        let bad_agent = ServerConfig { user_agent: " ".to_string(), ..ServerConfig::default() };
        assert!(bad_agent.validate().is_err());

        let bad_timeout = ServerConfig { upstream_timeout: Duration::ZERO, ..ServerConfig::default() };
        assert!(bad_timeout.validate().is_err());
    }
}
