use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "Body")]
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
    status: String,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("SMS request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("SMS gateway rejected message ({status}): {detail}")]
    Rejected { status: u16, detail: String },
}

/// Delivers a text message to a phone number.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), Error>;
}

/// SMS delivery through the Twilio Messages API.
pub struct TwilioSmsClient {
    config: SmsConfig,
    client: Client,
    base_url: String,
}

impl TwilioSmsClient {
    pub fn new(config: SmsConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let base_url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/",
            config.account_sid
        );

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    #[cfg(test)]
    fn with_base_url(config: SmsConfig, base_url: String) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            config,
            client,
            base_url,
        })
    }
}

#[async_trait]
impl SmsSender for TwilioSmsClient {
    async fn send(&self, to: &str, body: &str) -> Result<(), Error> {
        let url = format!("{}Messages.json", self.base_url);

        let request = MessageRequest {
            to,
            from: &self.config.from_number,
            body,
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Failed to send SMS to {}: {} {}", to, status, detail);
            return Err(Error::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let message: MessageResponse = response.json().await?;
        info!(
            "Sent SMS to {}: sid={}, status={}",
            to, message.sid, message.status
        );

        Ok(())
    }
}
