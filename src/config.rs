use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; the in-memory store is used when absent
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub postgres_max_connections: u32,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

fn default_max_connections() -> u32 {
    20
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "credit_exchange.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            gateway: GatewayConfig::default(),
            postgres_url: None,
            postgres_max_connections: default_max_connections(),
            auth: AuthConfig::default(),
            ledger: LedgerConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// Shared secret expected in `X-Admin-Secret` on admin routes
    pub admin_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-jwt-secret".to_string(),
            jwt_ttl_hours: 24,
            admin_secret: "dev-admin-secret".to_string(),
        }
    }
}

/// Append path tuning
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Max wait for an account lock before the attempt fails
    pub lock_timeout_ms: u64,
    /// Extra attempts after a retryable failure
    pub max_retries: u32,
    /// Base backoff, multiplied by the attempt number
    pub retry_backoff_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5_000,
            max_retries: 3,
            retry_backoff_ms: 20,
        }
    }
}

impl LedgerConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`, then apply environment overrides.
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", config_path))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// `DATABASE_URL`, `JWT_SECRET` and `ADMIN_SECRET` win over the file
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL") {
            self.postgres_url = Some(url);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(secret) = lookup("ADMIN_SECRET") {
            self.auth.admin_secret = secret;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEV_YAML: &str = r#"
log_level: info
log_dir: ./logs
log_file: credit_exchange.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8080
ledger:
  lock_timeout_ms: 250
  max_retries: 1
  retry_backoff_ms: 5
"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = AppConfig::from_yaml(DEV_YAML).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert!(config.postgres_url.is_none());
        assert_eq!(config.auth.jwt_ttl_hours, 24);
        assert_eq!(config.ledger.lock_timeout(), Duration::from_millis(250));
        assert_eq!(config.ledger.max_retries, 1);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::from_yaml(DEV_YAML).unwrap();
        config.apply_env_overrides(|key| match key {
            "DATABASE_URL" => Some("postgresql://u:p@localhost/credit".to_string()),
            "ADMIN_SECRET" => Some("s3cret".to_string()),
            _ => None,
        });
        assert_eq!(
            config.postgres_url.as_deref(),
            Some("postgresql://u:p@localhost/credit")
        );
        assert_eq!(config.auth.admin_secret, "s3cret");
        assert_eq!(config.auth.jwt_secret, "dev-jwt-secret");
    }

    #[test]
    fn test_shipped_configs_parse() {
        for env in ["dev", "prod"] {
            let content = fs::read_to_string(format!("config/{}.yaml", env)).unwrap();
            let config = AppConfig::from_yaml(&content).unwrap();
            assert!(config.ledger.lock_timeout_ms > 0);
        }
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(AppConfig::load("does-not-exist").is_err());
    }
}
