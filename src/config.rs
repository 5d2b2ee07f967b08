use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// TOML file holding the tracker definitions to run each tick.
    pub trackers_file: String,
    pub fetch: FetchConfig,
    pub browser: BrowserConfig,
    pub database: DatabaseConfig,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub user_agent: String,
    /// HTTP request timeout in seconds.
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub chrome_path: Option<String>,
    /// Bound on the document-ready wait, in seconds.
    pub page_ready_timeout: u64,
    /// Cached browser session cookies older than this are dropped.
    pub session_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Slack incoming-webhook URL. When unset, alerts are logged instead.
    pub webhook_url: Option<String>,
    pub username: String,
    pub alert_channel: String,
    pub error_channel: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "ARGUS_"
            .add_source(Environment::with_prefix("ARGUS").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        if config.browser.chrome_path.is_none() {
            config.browser.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trackers_file.is_empty() {
            return Err(ConfigError::Message("trackers_file must be set".into()));
        }

        if self.fetch.request_timeout == 0 {
            return Err(ConfigError::Message(
                "fetch.request_timeout must be greater than 0".into(),
            ));
        }

        if self.fetch.user_agent.is_empty() {
            return Err(ConfigError::Message("fetch.user_agent must be set".into()));
        }

        if self.browser.page_ready_timeout == 0 {
            return Err(ConfigError::Message(
                "browser.page_ready_timeout must be greater than 0".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if let Some(webhook_url) = &self.notifications.webhook_url {
            if Url::parse(webhook_url).is_err() {
                return Err(ConfigError::Message(
                    "notifications.webhook_url is not a valid URL".into(),
                ));
            }
        }

        if !self.notifications.alert_channel.starts_with('#') {
            return Err(ConfigError::Message(
                "notifications.alert_channel must start with '#'".into(),
            ));
        }

        if !self.notifications.error_channel.starts_with('#') {
            return Err(ConfigError::Message(
                "notifications.error_channel must start with '#'".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            trackers_file: "config/trackers.toml".to_string(),
            fetch: FetchConfig {
                user_agent: "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/41.0.2228.0 Safari/537.36".to_string(),
                request_timeout: 30,
            },
            browser: BrowserConfig {
                chrome_path: None,
                page_ready_timeout: 5,
                session_ttl_secs: 3600,
            },
            database: DatabaseConfig {
                url: "sqlite://data/argus.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            notifications: NotificationsConfig {
                webhook_url: Some("https://hooks.slack.com/services/T00/B00/XXX".to_string()),
                username: "ArgusBot".to_string(),
                alert_channel: "#alert".to_string(),
                error_channel: "#errors".to_string(),
            },
        }
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = valid_config();
        config.fetch.request_timeout = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("request_timeout must be greater than 0"));
    }

    #[test]
    fn test_config_validation_bad_webhook() {
        let mut config = valid_config();
        config.notifications.webhook_url = Some("not-a-url".to_string());

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("webhook_url"));
    }

    #[test]
    fn test_config_validation_missing_webhook_is_allowed() {
        let mut config = valid_config();
        config.notifications.webhook_url = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_channel_prefix() {
        let mut config = valid_config();
        config.notifications.alert_channel = "alert".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("alert_channel must start with '#'"));
    }

    #[test]
    fn test_config_validation_zero_page_ready_timeout() {
        let mut config = valid_config();
        config.browser.page_ready_timeout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_db_connections() {
        let mut config = valid_config();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }
}
