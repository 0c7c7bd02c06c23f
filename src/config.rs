//! Configuration module for the daily mirror.

use serde::Deserialize;
use std::path::Path;

use crate::{MirrorError, Result};

/// Web server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty allows any origin).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5661
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/daily.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/daily-mirror.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the news API (day listings, articles, comments).
    #[serde(default = "default_news_base_url")]
    pub news_base_url: String,
    /// Base URL of the column articles API.
    #[serde(default = "default_column_base_url")]
    pub column_base_url: String,
    /// Public site URL used as the link of generated column feeds.
    #[serde(default = "default_column_site_url")]
    pub column_site_url: String,
    /// User agent sent with every upstream request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum response body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
}

fn default_news_base_url() -> String {
    "https://news-at.zhihu.com/api/4".to_string()
}

fn default_column_base_url() -> String {
    "https://www.zhihu.com/api/v4/columns".to_string()
}

fn default_column_site_url() -> String {
    "https://zhuanlan.zhihu.com".to_string()
}

fn default_user_agent() -> String {
    "daily-mirror/0.1".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> u64 {
    5 * 1024 * 1024 // 5MB
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            news_base_url: default_news_base_url(),
            column_base_url: default_column_base_url(),
            column_site_url: default_column_site_url(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Periodic update configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Whether the background updater runs while serving.
    #[serde(default = "default_schedule_enabled")]
    pub enabled: bool,
    /// Interval between update runs in seconds.
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,
    /// Timezone used to decide the target date (e.g., "Asia/Shanghai").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_schedule_enabled() -> bool {
    true
}

fn default_update_interval() -> u64 {
    3600 // 1 hour
}

fn default_timezone() -> String {
    "Asia/Shanghai".to_string()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: default_schedule_enabled(),
            update_interval_secs: default_update_interval(),
            timezone: default_timezone(),
        }
    }
}

/// Column feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnsConfig {
    /// Column names to republish as RSS.
    #[serde(default)]
    pub names: Vec<String>,
    /// Directory the generated feed files are written to.
    #[serde(default = "default_columns_output_dir")]
    pub output_dir: String,
}

fn default_columns_output_dir() -> String {
    "zhuanlan".to_string()
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            names: vec![],
            output_dir: default_columns_output_dir(),
        }
    }
}

/// Deploy webhook configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WebhookConfig {
    /// Executable spawned when a signed webhook call arrives.
    #[serde(default)]
    pub script: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Upstream API configuration.
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Periodic update configuration.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Column feed configuration.
    #[serde(default)]
    pub columns: ColumnsConfig,
    /// Deploy webhook configuration.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(MirrorError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| MirrorError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `DAILY_MIRROR_DB_PATH`: Override the database path
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("DAILY_MIRROR_DB_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self
            .schedule
            .timezone
            .parse::<chrono_tz::Tz>()
            .is_err()
        {
            return Err(MirrorError::Config(format!(
                "unknown timezone: {}",
                self.schedule.timezone
            )));
        }
        if self.schedule.update_interval_secs == 0 {
            return Err(MirrorError::Config(
                "schedule.update_interval_secs must be greater than zero".to_string(),
            ));
        }
        for (key, value) in [
            ("upstream.news_base_url", &self.upstream.news_base_url),
            ("upstream.column_base_url", &self.upstream.column_base_url),
            ("upstream.column_site_url", &self.upstream.column_site_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| MirrorError::Config(format!("invalid {key} '{value}': {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(MirrorError::Config(format!(
                    "{key} must use http or https: {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5661);
        assert!(config.server.cors_origins.is_empty());

        assert_eq!(config.database.path, "data/daily.db");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/daily-mirror.log");

        assert_eq!(
            config.upstream.news_base_url,
            "https://news-at.zhihu.com/api/4"
        );
        assert_eq!(config.upstream.connect_timeout_secs, 10);
        assert_eq!(config.upstream.total_timeout_secs, 30);
        assert_eq!(config.upstream.max_body_bytes, 5 * 1024 * 1024);

        assert!(config.schedule.enabled);
        assert_eq!(config.schedule.update_interval_secs, 3600);
        assert_eq!(config.schedule.timezone, "Asia/Shanghai");

        assert!(config.columns.names.is_empty());
        assert_eq!(config.columns.output_dir, "zhuanlan");

        assert!(config.webhook.script.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
cors_origins = ["http://localhost:3000"]

[database]
path = "custom/daily.sqlite"

[logging]
level = "debug"
file = "custom/logs/app.log"

[upstream]
news_base_url = "http://upstream.test/api/4"
column_base_url = "http://upstream.test/columns"
column_site_url = "http://columns.test"
user_agent = "test-agent"
connect_timeout_secs = 5
total_timeout_secs = 15
max_body_bytes = 1024

[schedule]
enabled = false
update_interval_secs = 600
timezone = "UTC"

[columns]
names = ["alpha", "beta"]
output_dir = "feeds"

[webhook]
script = "/opt/deploy.sh"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.database.path, "custom/daily.sqlite");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.upstream.news_base_url, "http://upstream.test/api/4");
        assert_eq!(config.upstream.user_agent, "test-agent");
        assert_eq!(config.upstream.max_body_bytes, 1024);
        assert!(!config.schedule.enabled);
        assert_eq!(config.schedule.update_interval_secs, 600);
        assert_eq!(config.schedule.timezone, "UTC");
        assert_eq!(config.columns.names, vec!["alpha", "beta"]);
        assert_eq!(config.columns.output_dir, "feeds");
        assert_eq!(config.webhook.script.as_deref(), Some("/opt/deploy.sh"));
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[columns]
names = ["only-one"]
"#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.columns.names, vec!["only-one"]);
        assert_eq!(config.columns.output_dir, "zhuanlan");
        assert_eq!(config.server.port, 5661);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("[server\nport = ");

        if let Err(MirrorError::Validation(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Validation error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(MirrorError::Io(_))));
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_timezone() {
        let mut config = Config::default();
        config.schedule.timezone = "Mars/Olympus_Mons".to_string();

        let result = config.validate();
        assert!(matches!(result, Err(MirrorError::Config(msg)) if msg.contains("timezone")));
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = Config::default();
        config.schedule.update_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_upstream_urls() {
        let mut config = Config::default();
        config.upstream.news_base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(MirrorError::Config(msg)) if msg.contains("news_base_url")));

        let mut config = Config::default();
        config.upstream.column_site_url = "ftp://zhuanlan.example.com".to_string();
        assert!(config.validate().is_err());
    }
}
