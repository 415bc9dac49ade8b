//! HTTP surface of the authentication relay.
//!
//! JSON request/response endpoints driven by the mobile app:
//! `/api/send-otp`, `/api/verify-otp`, `/api/check-user`, `/api/register`,
//! and `/api/health`. Field names on the wire are camelCase. Missing fields
//! are reported as 400s with a `message` body rather than framework
//! rejections, so request types carry `Option` fields.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::db::NewAccount;
use crate::relay::{AuthRelay, Error};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<AuthRelay>,
}

/// Builds the API router.
pub fn router(relay: Arc<AuthRelay>) -> Router {
    Router::new()
        .route("/api/send-otp", post(send_otp))
        .route("/api/verify-otp", post(verify_otp))
        .route("/api/check-user", post(check_user))
        .route("/api/register", post(register))
        .route("/api/health", get(health))
        .with_state(AppState { relay })
}

/// Maps relay errors to HTTP status codes and response bodies.
///
/// Infrastructure failures are logged with provider detail and surfaced to
/// the client only as a generic message.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::Validation(message) => (StatusCode::BAD_REQUEST, json!({ "message": message })),
            Error::AccountNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "message": self.to_string(), "userExists": false }),
            ),
            Error::DuplicatePhoneNumber => {
                (StatusCode::CONFLICT, json!({ "message": self.to_string() }))
            }
            Error::InvalidOrExpiredCode => {
                (StatusCode::BAD_REQUEST, json!({ "message": self.to_string() }))
            }
            Error::DeliverySendFailed(e) => {
                error!("SMS delivery failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Failed to send SMS" }),
                )
            }
            Error::Datastore(e) => {
                error!("Datastore failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_login: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub phone_number: Option<String>,
    pub otp_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckUserRequest {
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CheckUserResponse {
    pub exists: bool,
    pub message: String,
}

async fn send_otp(
    State(state): State<AppState>,
    Json(request): Json<SendOtpRequest>,
) -> Result<Json<StatusResponse>, Error> {
    let phone_number = request
        .phone_number
        .ok_or_else(|| Error::Validation("Phone number is required".to_string()))?;

    debug!("Received send-otp request for: {}", phone_number);
    state.relay.send_otp(&phone_number, request.is_login).await?;

    Ok(Json(StatusResponse {
        success: true,
        message: "OTP sent successfully".to_string(),
    }))
}

async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<StatusResponse>, Error> {
    let (phone_number, otp_code) = match (request.phone_number, request.otp_code) {
        (Some(phone_number), Some(otp_code)) => (phone_number, otp_code),
        _ => {
            return Err(Error::Validation(
                "Phone number and OTP are required".to_string(),
            ))
        }
    };

    debug!("Received verify-otp request for: {}", phone_number);
    state.relay.verify_otp(&phone_number, &otp_code).await?;

    Ok(Json(StatusResponse {
        success: true,
        message: "OTP verified successfully".to_string(),
    }))
}

async fn check_user(
    State(state): State<AppState>,
    Json(request): Json<CheckUserRequest>,
) -> Result<Json<CheckUserResponse>, Error> {
    let phone_number = request
        .phone_number
        .ok_or_else(|| Error::Validation("Phone number is required".to_string()))?;

    let exists = state.relay.check_account(&phone_number).await?;

    Ok(Json(CheckUserResponse {
        exists,
        message: if exists {
            "User exists".to_string()
        } else {
            "User not found".to_string()
        },
    }))
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<StatusResponse>, Error> {
    let phone_number = request
        .phone_number
        .ok_or_else(|| Error::Validation("Phone number is required".to_string()))?;

    debug!("Received register request for: {}", phone_number);
    state
        .relay
        .register(NewAccount {
            phone_number,
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
        })
        .await?;

    Ok(Json(StatusResponse {
        success: true,
        message: "Account created successfully".to_string(),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK", "message": "API is running" }))
}
