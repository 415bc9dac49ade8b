//! Typed HTTP client for the relay API.
//!
//! Drives the registration and login flows from the app side: register a
//! profile, request a passcode, verify it. Explicitly constructed with a
//! base URL and injected wherever it is used, so tests can point it at a
//! fake server.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendOtpBody<'a> {
    phone_number: &'a str,
    is_login: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtpBody<'a> {
    phone_number: &'a str,
    otp_code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PhoneNumberBody<'a> {
    phone_number: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody<'a> {
    phone_number: &'a str,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    email: Option<&'a str>,
}

/// Loosely shaped response body; every endpoint fills a subset of these.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiBody {
    message: Option<String>,
    user_exists: Option<bool>,
    exists: Option<bool>,
    status: Option<String>,
}

/// Outcome of a relay call.
#[derive(Debug)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    /// Registration hint attached to login failures, used to redirect
    /// unregistered numbers to the registration flow.
    pub user_exists: Option<bool>,
}

#[derive(Debug)]
pub struct ExistenceOutcome {
    pub exists: bool,
    pub message: String,
}

pub struct RelayApiClient {
    base_url: String,
    client: Client,
}

impl RelayApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Requests a passcode for the number. `is_login` asks the relay to
    /// require an existing account first.
    pub async fn send_otp(&self, phone_number: &str, is_login: bool) -> Result<Outcome, Error> {
        let response = self
            .client
            .post(format!("{}/api/send-otp", self.base_url))
            .json(&SendOtpBody {
                phone_number,
                is_login,
            })
            .send()
            .await?;

        let success = response.status().is_success();
        let body: ApiBody = response.json().await?;

        Ok(Outcome {
            success,
            message: body
                .message
                .unwrap_or_else(|| "Failed to send OTP".to_string()),
            user_exists: body.user_exists,
        })
    }

    /// Submits a candidate passcode for verification.
    pub async fn verify_otp(&self, phone_number: &str, otp_code: &str) -> Result<Outcome, Error> {
        let response = self
            .client
            .post(format!("{}/api/verify-otp", self.base_url))
            .json(&VerifyOtpBody {
                phone_number,
                otp_code,
            })
            .send()
            .await?;

        let success = response.status().is_success();
        let body: ApiBody = response.json().await?;

        Ok(Outcome {
            success,
            message: body.message.unwrap_or_else(|| "Invalid OTP".to_string()),
            user_exists: None,
        })
    }

    /// Asks whether an account exists for the number.
    pub async fn check_user(&self, phone_number: &str) -> Result<ExistenceOutcome, Error> {
        let response = self
            .client
            .post(format!("{}/api/check-user", self.base_url))
            .json(&PhoneNumberBody { phone_number })
            .send()
            .await?;

        let body: ApiBody = response.json().await?;

        Ok(ExistenceOutcome {
            exists: body.exists.unwrap_or(false),
            message: body
                .message
                .unwrap_or_else(|| "User check completed".to_string()),
        })
    }

    /// Registers an unverified account from profile fields.
    pub async fn register(
        &self,
        phone_number: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Outcome, Error> {
        let response = self
            .client
            .post(format!("{}/api/register", self.base_url))
            .json(&RegisterBody {
                phone_number,
                first_name,
                last_name,
                email,
            })
            .send()
            .await?;

        let success = response.status().is_success();
        let body: ApiBody = response.json().await?;

        Ok(Outcome {
            success,
            message: body
                .message
                .unwrap_or_else(|| "Failed to create account".to_string()),
            user_exists: None,
        })
    }

    /// Liveness probe against `/api/health`.
    pub async fn health(&self) -> Result<bool, Error> {
        let response = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await?;

        let body: ApiBody = response.json().await?;
        Ok(body.status.as_deref() == Some("OK"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn send_otp_parses_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/send-otp")
            .match_body(Matcher::Json(json!({
                "phoneNumber": "9876543210",
                "isLogin": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"message":"OTP sent successfully"}"#)
            .create_async()
            .await;

        let client = RelayApiClient::new(server.url()).unwrap();
        let outcome = client.send_otp("9876543210", false).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message, "OTP sent successfully");
        assert_eq!(outcome.user_exists, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn login_send_otp_carries_registration_hint() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/send-otp")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"message":"Phone number not registered. Please register first.","userExists":false}"#,
            )
            .create_async()
            .await;

        let client = RelayApiClient::new(server.url()).unwrap();
        let outcome = client.send_otp("9876543210", true).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.user_exists, Some(false));
        assert_eq!(
            outcome.message,
            "Phone number not registered. Please register first."
        );
    }

    #[tokio::test]
    async fn verify_otp_reports_failure_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/verify-otp")
            .match_body(Matcher::Json(json!({
                "phoneNumber": "9876543210",
                "otpCode": "1234"
            })))
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Invalid or expired OTP"}"#)
            .create_async()
            .await;

        let client = RelayApiClient::new(server.url()).unwrap();
        let outcome = client.verify_otp("9876543210", "1234").await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.message, "Invalid or expired OTP");
    }

    #[tokio::test]
    async fn check_user_parses_existence() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/check-user")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"exists":true,"message":"User exists"}"#)
            .create_async()
            .await;

        let client = RelayApiClient::new(server.url()).unwrap();
        let outcome = client.check_user("9876543210").await.unwrap();

        assert!(outcome.exists);
        assert_eq!(outcome.message, "User exists");
    }

    #[tokio::test]
    async fn health_checks_status_field() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"OK","message":"API is running"}"#)
            .create_async()
            .await;

        let client = RelayApiClient::new(server.url()).unwrap();
        assert!(client.health().await.unwrap());
    }
}
