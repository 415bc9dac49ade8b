//! Datastore abstraction for accounts and OTP verification records.
//!
//! The relay only sees the [`Datastore`] trait; the Postgres implementation
//! lives in [`postgres`]. Keeping the storage operations behind a trait lets
//! tests substitute a mock or an in-memory fake for the real store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

pub mod postgres;

pub use postgres::PgStore;

/// A registered user row.
///
/// The phone number is the unique external identity; at most one account
/// exists per phone number, enforced by the table's uniqueness constraint.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub phone_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Profile fields supplied at registration.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub phone_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// A one-time passcode row.
///
/// Records are never deleted; a consumed code is marked `is_used` and the
/// row is retained as an audit trail.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OtpRecord {
    pub id: Uuid,
    pub phone_number: String,
    pub otp_code: String,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("An account with this phone number already exists")]
    Duplicate,
    #[error("Datastore query failed: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Row-level operations the relay needs from the backing store.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Datastore: Send + Sync {
    /// Inserts an unverified account. Fails with [`Error::Duplicate`] when
    /// the phone number is already registered.
    async fn create_account(&self, new: NewAccount) -> Result<Account, Error>;

    /// Looks up an account by phone number.
    async fn find_account(&self, phone_number: &str) -> Result<Option<Account>, Error>;

    /// Flips the account's verified flag. A missing account is not an error.
    async fn mark_account_verified(&self, phone_number: &str) -> Result<(), Error>;

    /// Persists a freshly issued passcode record.
    async fn insert_otp(&self, record: OtpRecord) -> Result<(), Error>;

    /// Atomically consumes the most recently created matching, unexpired,
    /// unused code. Returns `false` when nothing was consumed.
    async fn consume_otp(
        &self,
        phone_number: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, Error>;
}
