use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::credentials::{AssertionSigner, SCOPES};
use crate::error::SheetsError;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

struct CachedToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Exchanges signed assertions for access tokens and reuses them until they
/// are about to expire.
pub struct TokenProvider {
    http: reqwest::Client,
    signer: AssertionSigner,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(http: reqwest::Client, signer: AssertionSigner) -> Self {
        Self { http, signer, cached: Mutex::new(None) }
    }

    pub async fn access_token(&self) -> Result<SecretString, SheetsError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let token = self.exchange(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken, SheetsError> {
        let assertion = self.signer.assertion(&SCOPES, now.timestamp())?;
        let response = self
            .http
            .post(self.signer.audience())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|error| SheetsError::Auth(error.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|error| SheetsError::Auth(error.to_string()))?;
        if !status.is_success() {
            return Err(SheetsError::Auth(format!("HTTP {status}: {body}")));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|error| SheetsError::Auth(format!("unreadable token response: {error}")))?;
        debug!(
            event_name = "sheets.auth.token_refreshed",
            expires_in = token.expires_in,
            "refreshed Google access token"
        );

        Ok(CachedToken {
            value: token.access_token.into(),
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

pub(crate) fn bearer(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}
