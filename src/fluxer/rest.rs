//! Fluxer REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use tracing::debug;

use crate::common::error::{GatewayError, SendError};
use crate::common::messages::OutboundPayload;
use crate::common::sink::MessageSink;
use crate::common::types::Platform;
use crate::fluxer::types::{ApiErrorBody, GatewayBot};

/// API version used for REST paths and the gateway query.
pub const API_VERSION: u8 = 1;

const USER_AGENT: &str = concat!(
    "DiscordBot (",
    env!("CARGO_PKG_NAME"),
    ", ",
    env!("CARGO_PKG_VERSION"),
    ") DiscordFluxerBridge/1.0"
);

/// Authenticated HTTP client for the Fluxer API.
pub struct FluxerRest {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl FluxerRest {
    /// `api_url` is the API root without a version segment or trailing slash.
    pub fn new(api_url: String, token: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            api_url,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v{}{}", self.api_url, API_VERSION, path)
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Ask the API where to open the gateway websocket.
    pub async fn gateway_url(&self) -> Result<String, GatewayError> {
        let response = self
            .http
            .get(self.endpoint("/gateway/bot"))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(|e| GatewayError::Discovery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Discovery(format!("HTTP {}", status.as_u16())));
        }

        let body: GatewayBot = response
            .json()
            .await
            .map_err(|e| GatewayError::Discovery(e.to_string()))?;
        Ok(body.url)
    }

    /// `POST /channels/{id}/messages`.
    pub async fn create_message(
        &self,
        channel_id: &str,
        payload: &OutboundPayload,
    ) -> Result<(), SendError> {
        if !is_snowflake(channel_id) {
            return Err(SendError::InvalidChannel(channel_id.to_string()));
        }

        let response = self
            .http
            .post(self.endpoint(&format!("/channels/{channel_id}/messages")))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(payload)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let retry_after = header_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %body, "Fluxer rejected message");
        Err(response_error(status.as_u16(), retry_after, &body))
    }
}

#[async_trait]
impl MessageSink for FluxerRest {
    fn platform(&self) -> Platform {
        Platform::Fluxer
    }

    async fn send_message(
        &self,
        channel_id: &str,
        payload: &OutboundPayload,
    ) -> Result<(), SendError> {
        self.create_message(channel_id, payload).await
    }
}

fn is_snowflake(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

fn header_retry_after(headers: &HeaderMap) -> Option<f64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Map a non-success response to a [`SendError`].
fn response_error(status: u16, header_retry_after: Option<f64>, body: &str) -> SendError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();

    if status == 429 {
        return SendError::RateLimited {
            retry_after: header_retry_after.or(parsed.retry_after),
        };
    }

    let message = match parsed.message {
        Some(message) => message,
        None if body.is_empty() => "no response body".to_string(),
        None => body.to_string(),
    };
    SendError::Rejected { status, message }
}
