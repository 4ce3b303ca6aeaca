// Server configuration, read from the environment
//
//   BANK_HOST        bind address          (default 0.0.0.0)
//   BANK_PORT        bind port             (default 3000)
//   BANK_ENV         development|production (default production)
//   BANK_DB_PATH     SQLite file; unset = in-memory store
//   BANK_ACCOUNT_ID  static caller account (default 1)
//   BANK_USER_ID     static caller user    (default 1)

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("expected development or production, got {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub db_path: Option<PathBuf>,
    pub account_id: i64,
    pub user_id: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: Environment::Production,
            db_path: None,
            account_id: 1,
            user_id: 1,
        }
    }
}

impl AppConfig {
    /// Load from the process environment (and `.env`, if there is one)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary key lookup; unset keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        Ok(AppConfig {
            host: lookup("BANK_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "BANK_PORT", defaults.port)?,
            environment: parse_or(&lookup, "BANK_ENV", defaults.environment)?,
            db_path: lookup("BANK_DB_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            account_id: parse_or(&lookup, "BANK_ACCOUNT_ID", defaults.account_id)?,
            user_id: parse_or(&lookup, "BANK_USER_ID", defaults.user_id)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}
