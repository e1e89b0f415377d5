use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use thiserror::Error;

use crate::blocks::ModalView;

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SlackApiError {
    #[error("slack {method} failed: {error}")]
    Api { method: String, error: String },
    #[error("slack {method} returned HTTP {status}: {body}")]
    Http { method: String, status: u16, body: String },
    #[error("slack {method} request failed: {message}")]
    Transport { method: String, message: String },
    #[error("slack {method} returned an unreadable response: {message}")]
    InvalidResponse { method: String, message: String },
}

impl SlackApiError {
    /// The Slack error code (`not_in_channel`, `invalid_auth`, ...) when the
    /// API answered with `ok: false`.
    pub fn slack_error(&self) -> Option<&str> {
        match self {
            Self::Api { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }
}

#[async_trait]
pub trait SlackApi: Send + Sync {
    /// `chat.postMessage`. A user id as `channel` sends a direct message.
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackApiError>;
    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackApiError>;
    /// Display name for the audit log, `None` when Slack does not know one.
    async fn user_name(&self, user_id: &str) -> Result<Option<String>, SlackApiError>;
}

pub struct WebApiClient {
    http: reqwest::Client,
    bot_token: SecretString,
    base_url: String,
}

impl WebApiClient {
    pub fn new(bot_token: SecretString) -> Result<Self, SlackApiError> {
        Self::with_base_url(bot_token, DEFAULT_API_BASE)
    }

    pub fn with_base_url(
        bot_token: SecretString,
        base_url: impl Into<String>,
    ) -> Result<Self, SlackApiError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build().map_err(
            |error| SlackApiError::Transport {
                method: "client".to_owned(),
                message: error.to_string(),
            },
        )?;
        Ok(Self { http, bot_token, base_url: base_url.into().trim_end_matches('/').to_owned() })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    async fn post_json(&self, method: &str, body: &Value) -> Result<Value, SlackApiError> {
        let response = self
            .http
            .post(self.url(method))
            .bearer_auth(self.bot_token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|error| transport_error(method, error))?;
        read_response(method, response).await
    }

    async fn get(&self, method: &str, query: &[(&str, &str)]) -> Result<Value, SlackApiError> {
        let response = self
            .http
            .get(self.url(method))
            .bearer_auth(self.bot_token.expose_secret())
            .query(query)
            .send()
            .await
            .map_err(|error| transport_error(method, error))?;
        read_response(method, response).await
    }
}

#[async_trait]
impl SlackApi for WebApiClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackApiError> {
        self.post_json("chat.postMessage", &json!({ "channel": channel, "text": text })).await?;
        Ok(())
    }

    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackApiError> {
        self.post_json("views.open", &json!({ "trigger_id": trigger_id, "view": view })).await?;
        Ok(())
    }

    async fn user_name(&self, user_id: &str) -> Result<Option<String>, SlackApiError> {
        let body = self.get("users.info", &[("user", user_id)]).await?;
        Ok(display_name(&body))
    }
}

fn transport_error(method: &str, error: reqwest::Error) -> SlackApiError {
    SlackApiError::Transport { method: method.to_owned(), message: error.to_string() }
}

async fn read_response(method: &str, response: reqwest::Response) -> Result<Value, SlackApiError> {
    let status = response.status();
    let body = response.text().await.map_err(|error| transport_error(method, error))?;

    if !status.is_success() {
        return Err(SlackApiError::Http { method: method.to_owned(), status: status.as_u16(), body });
    }

    let parsed: Value = serde_json::from_str(&body).map_err(|error| {
        SlackApiError::InvalidResponse { method: method.to_owned(), message: error.to_string() }
    })?;
    check_ok(method, parsed)
}

/// Slack answers most application errors with HTTP 200 and `ok: false`.
fn check_ok(method: &str, body: Value) -> Result<Value, SlackApiError> {
    if body.get("ok") == Some(&Value::Bool(true)) {
        return Ok(body);
    }
    let error = body.get("error").and_then(Value::as_str).unwrap_or("unknown").to_owned();
    Err(SlackApiError::Api { method: method.to_owned(), error })
}

fn display_name(body: &Value) -> Option<String> {
    let user = body.get("user")?;
    [
        user.get("real_name"),
        user.pointer("/profile/real_name"),
        user.pointer("/profile/display_name"),
        user.get("name"),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .map(str::trim)
    .find(|name| !name.is_empty())
    .map(str::to_owned)
}
