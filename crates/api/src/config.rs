use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// Session token verification shared with the identity layer
    pub auth: AuthConfig,
    /// WhatsApp provider configuration
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
    /// Application-level settings (links, scheduling knobs)
    pub app: AppConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Shared secret gating the internal magic-token storage endpoint.
    pub internal_api_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for session tokens, shared with the identity layer.
    pub session_secret: String,

    /// Session expiration in seconds (default: 2592000 = 30 days)
    #[serde(default = "default_session_expiry")]
    pub session_expiry_secs: i64,
}

/// WhatsApp provider (Twilio) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WhatsAppConfig {
    /// Twilio account SID. Empty means sends are recorded as failed.
    #[serde(default)]
    pub account_sid: String,

    /// Twilio auth token.
    #[serde(default)]
    pub auth_token: String,

    /// WhatsApp sender number in `+` form.
    #[serde(default)]
    pub sender: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_whatsapp_timeout_ms")]
    pub timeout_ms: u64,

    /// Pre-approved template SIDs
    #[serde(default)]
    pub templates: WhatsAppTemplates,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            sender: String::new(),
            timeout_ms: default_whatsapp_timeout_ms(),
            templates: WhatsAppTemplates::default(),
        }
    }
}

/// Content template SIDs registered with the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhatsAppTemplates {
    #[serde(default)]
    pub visit_confirmation: String,

    #[serde(default)]
    pub visit_reminder: String,

    #[serde(default)]
    pub gap_alert: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL for links embedded in outbound messages.
    pub base_url: String,

    /// Days ahead the gap scan covers.
    #[serde(default = "default_gap_detection_days")]
    pub gap_detection_days: u32,

    /// Days without a visit before a member counts as inactive.
    #[serde(default = "default_inactive_threshold_days")]
    pub inactive_threshold_days: i64,

    /// Minutes between notification dispatch cycles.
    #[serde(default = "default_dispatch_interval_minutes")]
    pub dispatch_interval_minutes: u64,

    /// Pending notifications drained per dispatch cycle.
    #[serde(default = "default_dispatch_batch_size")]
    pub dispatch_batch_size: i64,

    /// Whether background jobs run in this process.
    #[serde(default = "default_jobs_enabled")]
    pub jobs_enabled: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_session_expiry() -> i64 {
    2592000 // 30 days
}
fn default_whatsapp_timeout_ms() -> u64 {
    15000
}
fn default_gap_detection_days() -> u32 {
    7
}
fn default_inactive_threshold_days() -> i64 {
    14
}
fn default_dispatch_interval_minutes() -> u64 {
    5
}
fn default_dispatch_batch_size() -> i64 {
    50
}
fn default_jobs_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with FV__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FV").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.check()
            .map_err(config::ConfigError::Message)?;
        Ok(cfg)
    }

    /// Load configuration entirely from embedded defaults plus overrides,
    /// without touching the filesystem (used by tests).
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 0

            [database]
            url = "postgres://localhost/family_visits_test"

            [logging]
            level = "debug"
            format = "pretty"

            [security]
            cors_origins = []
            internal_api_secret = "test-internal-secret"

            [auth]
            session_secret = "test-session-secret-at-least-32-bytes"

            [app]
            base_url = "http://localhost:3000"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Socket address for the HTTP listener.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }

    fn check(&self) -> Result<(), String> {
        if self.database.url.is_empty() {
            return Err("database.url must be set".to_string());
        }
        if self.auth.session_secret.len() < 16 {
            return Err("auth.session_secret must be at least 16 bytes".to_string());
        }
        if self.security.internal_api_secret.is_empty() {
            return Err("security.internal_api_secret must be set".to_string());
        }
        if self.app.base_url.is_empty() {
            return Err("app.base_url must be set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_for_test_defaults() {
        let cfg = Config::load_for_test(&[]).expect("load");
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.app.gap_detection_days, 7);
        assert_eq!(cfg.app.inactive_threshold_days, 14);
        assert_eq!(cfg.app.dispatch_interval_minutes, 5);
        assert_eq!(cfg.app.dispatch_batch_size, 50);
        assert!(cfg.app.jobs_enabled);
        assert_eq!(cfg.auth.session_expiry_secs, 2592000);
    }

    #[test]
    fn test_load_for_test_overrides() {
        let cfg = Config::load_for_test(&[
            ("app.gap_detection_days", "14"),
            ("app.jobs_enabled", "false"),
        ])
        .expect("load");
        assert_eq!(cfg.app.gap_detection_days, 14);
        assert!(!cfg.app.jobs_enabled);
    }

    #[test]
    fn test_whatsapp_defaults_empty() {
        let cfg = Config::load_for_test(&[]).expect("load");
        assert!(cfg.whatsapp.account_sid.is_empty());
        assert!(cfg.whatsapp.templates.visit_confirmation.is_empty());
        assert_eq!(cfg.whatsapp.timeout_ms, 15000);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_for_test(&[("server.port", "8081")]).expect("load");
        assert_eq!(cfg.socket_addr().port(), 8081);
    }

    #[test]
    fn test_check_rejects_short_session_secret() {
        let result = Config::load_for_test(&[("auth.session_secret", "short")])
            .expect("load")
            .check();
        assert!(result.is_err());
    }
}
