//! Configuration Module
//!
//! Provides configuration management for the authentication relay. Handles
//! loading and parsing of the YAML configuration file and environment
//! variable overrides.

use config::{Config as ConfigFile, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Application metadata configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Application {
    /// Name of the application, used in outbound message text
    pub name: String,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

/// Datastore configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection URL
    pub url: String,
    /// Maximum connections held by the pool
    pub max_connections: u32,
}

/// SMS gateway configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SmsConfig {
    /// Twilio account SID
    pub account_sid: String,
    /// Twilio auth token
    pub auth_token: String,
    /// Sender phone number, in international format
    pub from_number: String,
    /// Calling code prefixed to bare national numbers (e.g. "91")
    pub default_country_code: String,
}

/// Application configuration settings
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Application metadata
    pub application: Application,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Datastore configuration
    pub database: DatabaseConfig,
    /// SMS gateway configuration
    pub sms: SmsConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl Config {
    /// Creates a new Config instance by loading and merging configuration
    /// from multiple sources.
    ///
    /// # Configuration Sources
    /// Configuration is loaded in the following order (later sources override
    /// earlier ones):
    /// 1. Base configuration (`config/application.yml`)
    /// 2. Environment variables (prefixed with `APP__`, e.g.
    ///    `APP__DATABASE__URL`)
    ///
    /// # Errors
    /// Returns a `ConfigError` if the configuration file cannot be read or
    /// values cannot be parsed.
    pub fn new() -> Result<Self, ConfigError> {
        let builder = ConfigFile::builder()
            .add_source(File::with_name("config/application.yml"))
            .add_source(Environment::with_prefix("APP").separator("__"));

        let config = builder.build()?;
        config
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
