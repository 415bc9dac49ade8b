//! The authentication relay.
//!
//! Owns passcode generation and expiry policy, and exposes the four
//! operations the app drives: issue a code, verify a code, check whether an
//! account exists, and register an account. Stateless between requests; all
//! shared state lives behind the injected [`Datastore`] and [`SmsSender`]
//! collaborators.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::db::{self, Account, Datastore, NewAccount, OtpRecord};
use crate::otp;
use crate::sms::{self, SmsSender};

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed request field; the caller's fault.
    #[error("{0}")]
    Validation(String),
    /// Login attempted before registration.
    #[error("Phone number not registered. Please register first.")]
    AccountNotFound,
    /// Registration conflict on the phone number.
    #[error("An account with this phone number already exists")]
    DuplicatePhoneNumber,
    /// Deliberately undifferentiated: the caller is not told which codes
    /// exist or why the match failed.
    #[error("Invalid or expired OTP")]
    InvalidOrExpiredCode,
    #[error("Failed to send SMS")]
    DeliverySendFailed(#[source] sms::Error),
    #[error("Datastore failure")]
    Datastore(#[from] db::Error),
}

/// The relay service, shared across request handlers.
pub struct AuthRelay {
    datastore: Arc<dyn Datastore>,
    sms: Arc<dyn SmsSender>,
    product_name: String,
    default_country_code: String,
}

impl AuthRelay {
    pub fn new(
        datastore: Arc<dyn Datastore>,
        sms: Arc<dyn SmsSender>,
        product_name: String,
        default_country_code: String,
    ) -> Self {
        Self {
            datastore,
            sms,
            product_name,
            default_country_code,
        }
    }

    /// Issues a fresh passcode and dispatches it by SMS.
    ///
    /// For login attempts the account must already exist; otherwise the
    /// caller gets [`Error::AccountNotFound`] and nothing is written or
    /// sent. The record is made durable before any delivery attempt, and a
    /// failed send leaves it in place.
    pub async fn send_otp(&self, phone_number: &str, is_login: bool) -> Result<(), Error> {
        if is_login {
            debug!("Checking for existing account: {}", phone_number);
            if self.datastore.find_account(phone_number).await?.is_none() {
                info!(
                    "Login attempt for unregistered phone number: {}",
                    phone_number
                );
                return Err(Error::AccountNotFound);
            }
        }

        let code = otp::generate_code();
        let now = Utc::now();
        let record = OtpRecord {
            id: Uuid::new_v4(),
            phone_number: phone_number.to_string(),
            otp_code: code.clone(),
            expires_at: otp::expiry_from(now),
            is_used: false,
            created_at: now,
        };
        self.datastore.insert_otp(record).await?;

        let destination = otp::to_international(phone_number, &self.default_country_code);
        let body = otp::message_body(&self.product_name, &code);
        self.sms.send(&destination, &body).await.map_err(|e| {
            error!("Failed to send verification code to {}: {}", destination, e);
            Error::DeliverySendFailed(e)
        })?;

        info!("Sent verification code to {}", destination);
        Ok(())
    }

    /// Validates and consumes a candidate code.
    ///
    /// Consumption is atomic test-and-set on the newest matching record;
    /// a re-submitted code fails once the record is marked used. Success
    /// flips the account's verified flag.
    pub async fn verify_otp(&self, phone_number: &str, code: &str) -> Result<(), Error> {
        let consumed = self
            .datastore
            .consume_otp(phone_number, code, Utc::now())
            .await?;
        if !consumed {
            debug!("No consumable code for phone number: {}", phone_number);
            return Err(Error::InvalidOrExpiredCode);
        }

        self.datastore.mark_account_verified(phone_number).await?;
        info!("Verified phone number: {}", phone_number);
        Ok(())
    }

    /// Reports whether an account exists for the phone number. Pure read.
    pub async fn check_account(&self, phone_number: &str) -> Result<bool, Error> {
        Ok(self.datastore.find_account(phone_number).await?.is_some())
    }

    /// Creates an unverified account from profile fields. No passcode is
    /// issued; the caller drives issuance separately.
    pub async fn register(&self, new: NewAccount) -> Result<Account, Error> {
        match self.datastore.create_account(new).await {
            Ok(account) => Ok(account),
            Err(db::Error::Duplicate) => Err(Error::DuplicatePhoneNumber),
            Err(e) => Err(Error::Datastore(e)),
        }
    }
}
