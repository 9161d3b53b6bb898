use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

// HS256 wants at least 256 bits of key material.
const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub kafka: KafkaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Token signing secret. Read once at startup; rotating it invalidates
    /// every outstanding token.
    pub secret: String,
    pub expiration_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    /// Topic receiving USER_REGISTERED events.
    pub registration_topic: String,
    /// Topic receiving USER_LOGGED_IN events.
    pub login_topic: String,
}

impl Config {
    /// Load configuration, layered lowest to highest:
    /// config/default.toml, then config/{RUN_MODE}.toml, then environment
    /// variables with `__` as the section separator (JWT__SECRET overrides
    /// jwt.secret).
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject configurations that cannot produce valid tokens: a weak
    /// signing secret or a non-positive token lifetime.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                self.jwt.secret.len()
            )));
        }
        if self.jwt.expiration_hours <= 0 {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours must be positive, got {}",
                self.jwt.expiration_hours
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(secret: &str, expiration_hours: i64) -> Config {
        Config {
            database: DatabaseConfig {
                url: "postgres://localhost/identity".to_string(),
            },
            server: ServerConfig { http_port: 8080 },
            jwt: JwtConfig {
                secret: secret.to_string(),
                expiration_hours,
            },
            kafka: KafkaConfig {
                brokers: "localhost:9092".to_string(),
                registration_topic: "user-registrations".to_string(),
                login_topic: "user-logins".to_string(),
            },
        }
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let config = base_config("too-short", 24);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_expiry() {
        let config = base_config("a-signing-secret-of-at-least-32-bytes!", 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        let config = base_config("a-signing-secret-of-at-least-32-bytes!", 24);
        assert!(config.validate().is_ok());
    }
}
