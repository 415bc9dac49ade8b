//! Discountmithra Authentication Relay Library
//!
//! This library provides the core functionality for the Discountmithra
//! authentication backend: one-time passcode issuance and verification over
//! SMS, account registration and lookup against Postgres, and the HTTP API
//! surface the mobile app talks to.
//!
//! # Modules
//! - `config`: configuration management
//! - `db`: datastore trait and Postgres implementation
//! - `sms`: text-message delivery via the Twilio messaging API
//! - `otp`: passcode generation and expiry policy
//! - `relay`: the authentication relay service
//! - `http`: axum router and request handlers
//! - `client`: typed HTTP client for the relay API
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use discountmithra_auth::config::Config;
//! use discountmithra_auth::db::PgStore;
//! use discountmithra_auth::relay::AuthRelay;
//! use discountmithra_auth::sms::{SmsConfig, TwilioSmsClient};
//!
//! async fn setup_relay() {
//!     let config = Config::new().expect("Failed to load configuration");
//!     let store = PgStore::connect(&config.database.url, config.database.max_connections)
//!         .await
//!         .expect("Failed to connect to Postgres");
//!     let sms = TwilioSmsClient::new(SmsConfig {
//!         account_sid: config.sms.account_sid.clone(),
//!         auth_token: config.sms.auth_token.clone(),
//!         from_number: config.sms.from_number.clone(),
//!     })
//!     .expect("Failed to create SMS client");
//!     let relay = AuthRelay::new(
//!         Arc::new(store),
//!         Arc::new(sms),
//!         config.application.name.clone(),
//!         config.sms.default_country_code.clone(),
//!     );
//!     let _ = relay;
//! }
//! ```

pub mod client;
pub mod config;
pub mod db;
pub mod http;
pub mod otp;
pub mod relay;
pub mod sms;
