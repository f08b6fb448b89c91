//! Typed configuration from environment variables.
//!
//! Loaded once at startup. A `.env` file in the working directory is read first
//! if present; real environment variables take precedence over it.

use secrecy::SecretString;

use crate::error::{Result, ServiceError};

pub const DEFAULT_MODEL: &str = "gemma-2-9b-it";
pub const DEFAULT_PORT: u16 = 3000;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug)]
pub struct Config {
    pub groq_api_key: SecretString,
    pub groq_model: String,
    /// When unset the service keeps records in memory only.
    pub database_url: Option<SecretString>,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Config {
    /// Load `.env` (if any) and then read the configuration from the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let groq_api_key = non_empty("GROQ_API_KEY")
            .ok_or_else(|| ServiceError::Config("GROQ_API_KEY is not set".to_string()))?;

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ServiceError::Config(format!("PORT is not a valid port: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let log_format = match non_empty("LOG_FORMAT").as_deref() {
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        Ok(Self {
            groq_api_key: SecretString::from(groq_api_key),
            groq_model: non_empty("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            database_url: non_empty("DATABASE_URL").map(SecretString::from),
            port,
            log_format,
        })
    }
}
