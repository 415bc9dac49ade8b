//! Discountmithra Authentication Relay
//!
//! This is the main entry point for the phone-number authentication relay.
//! The service issues one-time passcodes over SMS, verifies them against
//! Postgres, and maintains account registration state for the mobile app.
//!
//! # Architecture
//! The service is built using:
//! - axum for the HTTP API endpoints
//! - Postgres (via sqlx) for persistent storage
//! - Twilio for SMS delivery
//!
//! # Flow
//! 1. User registers with profile fields, creating an unverified account
//! 2. User requests a passcode for their phone number
//! 3. Service persists the code and dispatches it via SMS
//! 4. User submits the code
//! 5. Service consumes the code and marks the account verified

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use discountmithra_auth::config::Config;
use discountmithra_auth::db::PgStore;
use discountmithra_auth::http;
use discountmithra_auth::relay::AuthRelay;
use discountmithra_auth::sms::{SmsConfig, TwilioSmsClient};

/// Initializes the logging system with appropriate configuration.
///
/// Sets up structured logging with timestamps and log levels using the
/// tracing framework. Log level is configurable via `RUST_LOG`.
fn setup_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_level(true)
        .with_ansi(true)
        .with_writer(std::io::stdout)
        .try_init()
        .map_err(|e| e.into())
}

/// Initializes and starts all service dependencies.
///
/// Sets up the following components:
/// - Postgres connection pool (one per process, closed at shutdown)
/// - Twilio SMS client
/// - The auth relay and its HTTP router
///
/// # Arguments
/// * `config` - Application configuration
async fn setup_services(config: Config) -> anyhow::Result<()> {
    info!("Connecting to Postgres...");
    let store = PgStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("failed to initialize datastore")?;
    info!("Datastore initialized successfully");

    info!("Initializing SMS client...");
    let sms_client = TwilioSmsClient::new(SmsConfig {
        account_sid: config.sms.account_sid.clone(),
        auth_token: config.sms.auth_token.clone(),
        from_number: config.sms.from_number.clone(),
    })
    .context("failed to initialize SMS client")?;
    info!("SMS client initialized successfully");

    let relay = Arc::new(AuthRelay::new(
        Arc::new(store.clone()),
        Arc::new(sms_client),
        config.application.name.clone(),
        config.sms.default_country_code.clone(),
    ));

    let app = http::router(relay);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Datastore connection closed");

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

/// Main entry point for the authentication relay.
///
/// # Flow
/// 1. Initializes logging and configuration
/// 2. Sets up service dependencies (Postgres, Twilio)
/// 3. Starts the HTTP server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging().map_err(|e| anyhow::anyhow!(e))?;
    info!("Discountmithra authentication relay starting up...");

    info!("Loading configuration...");
    let config = Config::new().context("failed to load configuration")?;
    info!("Configuration loaded successfully");

    setup_services(config).await?;

    Ok(())
}
