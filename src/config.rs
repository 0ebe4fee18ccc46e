use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use sms_core::{CompositeSecretValidator, StaticReply, EVENT_INCOMING_MESSAGE};
use sms_web_axum::WebhookAppBuilder;
use std::env;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Webhook adapter configuration
    pub webhook: WebhookSettings,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Server host (default: 0.0.0.0)
    pub host: String,
    /// Server port (default: 3000)
    pub port: u16,
}

/// How the webhook secret is checked
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SecretMode {
    /// `secret` must equal the configured value
    #[default]
    Static,
    /// Status callbacks carry `<secret>:<message id>`
    Composite,
}

/// Webhook adapter configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebhookSettings {
    /// Shared webhook secret (required)
    pub secret: Option<String>,
    /// Secret check mode (default: static)
    pub secret_mode: SecretMode,
    /// Event that triggers the auto-reply (default: incoming_message)
    pub incoming_event: String,
    /// Fixed reply for incoming messages
    pub auto_reply: Option<StaticReply>,
}

/// Security configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes (default: 1MB)
    pub max_body_size: usize,
    /// Request timeout in seconds (default: 30)
    pub request_timeout: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: json or pretty (default: json)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            secret: None,
            secret_mode: SecretMode::Static,
            incoming_event: EVENT_INCOMING_MESSAGE.to_string(),
            auto_reply: None,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
            request_timeout: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            webhook: WebhookSettings::default(),
            security: SecurityConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl WebhookSettings {
    /// Builder carrying these settings; `build()` applies the usual construction checks.
    pub fn to_builder(&self) -> WebhookAppBuilder {
        let mut builder = WebhookAppBuilder::default().incoming_event(self.incoming_event.clone());

        match (self.secret.as_deref(), self.secret_mode) {
            (Some(secret), SecretMode::Static) => {
                builder = builder.webhook_secret(secret);
            }
            (Some(secret), SecretMode::Composite) if !secret.is_empty() => {
                builder = builder.secret_validator(
                    CompositeSecretValidator::new(secret)
                        .with_incoming_event(self.incoming_event.clone()),
                );
            }
            _ => {}
        }

        if let Some(reply) = &self.auto_reply {
            builder = builder.auto_reply(reply.clone());
        }
        builder
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            // Add configuration file based on environment
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with SMSWEBHOOK__)
            .add_source(Environment::with_prefix("SMSWEBHOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Defaults overlaid with a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use sms_core::ConfigError as AdapterConfigError;

    const OVERRIDES: [(&str, &str); 4] = [
        ("SMSWEBHOOK__WEBHOOK__SECRET", "from-env"),
        ("SMSWEBHOOK__SERVER__PORT", "8081"),
        ("SMSWEBHOOK__SECURITY__REQUEST_TIMEOUT", "5"),
        ("SMSWEBHOOK__LOGGING__FORMAT", "pretty"),
    ];

    #[test]
    #[serial]
    fn load_without_sources_yields_defaults() {
        for (key, _) in OVERRIDES {
            unsafe { env::remove_var(key) };
        }
        unsafe { env::set_var("RUN_MODE", "test-no-such-file") };

        let config = AppConfig::load().unwrap();
        unsafe { env::remove_var("RUN_MODE") };

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.webhook.secret, None);
        assert_eq!(config.security.request_timeout, 30);
    }

    #[test]
    #[serial]
    fn load_applies_environment_overrides() {
        for (key, value) in OVERRIDES {
            unsafe { env::set_var(key, value) };
        }

        let config = AppConfig::load();
        for (key, _) in OVERRIDES {
            unsafe { env::remove_var(key) };
        }
        let config = config.unwrap();

        assert_eq!(config.webhook.secret.as_deref(), Some("from-env"));
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.security.request_timeout, 5);
        assert_eq!(config.security.max_body_size, 1024 * 1024);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.webhook.incoming_event, "incoming_message");
        assert_eq!(config.webhook.secret_mode, SecretMode::Static);
        assert_eq!(config.security.max_body_size, 1024 * 1024);
        assert_eq!(config.security.request_timeout, 30);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 8080

            [webhook]
            secret = "shh"
            secret_mode = "composite"
            incoming_event = "telerivet::incoming_message"

            [[webhook.auto_reply.messages]]
            content = "Thanks, we got your message"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.webhook.secret.as_deref(), Some("shh"));
        assert_eq!(config.webhook.secret_mode, SecretMode::Composite);
        let reply = config.webhook.auto_reply.unwrap();
        assert_eq!(reply.messages[0].content, "Thanks, we got your message");
    }

    #[test]
    fn settings_without_secret_fail_to_build() {
        let err = WebhookSettings::default().to_builder().build().unwrap_err();
        assert_eq!(err, AdapterConfigError::MissingSecret);
    }

    #[test]
    fn settings_with_empty_auto_reply_fail_to_build() {
        let settings = WebhookSettings {
            secret: Some("shh".into()),
            auto_reply: Some(StaticReply::default()),
            ..WebhookSettings::default()
        };
        let err = settings.to_builder().build().unwrap_err();
        assert!(matches!(err, AdapterConfigError::InvalidAutoReply(_)));
    }

    #[test]
    fn composite_settings_build() {
        let settings = WebhookSettings {
            secret: Some("shh".into()),
            secret_mode: SecretMode::Composite,
            ..WebhookSettings::default()
        };
        let app = settings.to_builder().build().unwrap();
        assert_eq!(app.processor().incoming_event(), "incoming_message");
    }
}
