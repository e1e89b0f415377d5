//! Google service-account keys and the RS256 assertions signed with them.

use std::fmt;
use std::path::Path;

use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::SheetsError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const SCOPES: [&str; 2] =
    ["https://www.googleapis.com/auth/spreadsheets", "https://www.googleapis.com/auth/drive"];

const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The fields of a `credentials.json` service-account key that token
/// exchange needs.
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key_id: Option<String>,
    pub token_uri: String,
    private_key: SecretString,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct RawServiceAccountKey {
    #[serde(rename = "type", default)]
    key_type: Option<String>,
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self, SheetsError> {
        let raw: RawServiceAccountKey = serde_json::from_str(raw)
            .map_err(|error| SheetsError::Credentials(format!("invalid key file: {error}")))?;

        if let Some(key_type) = raw.key_type.as_deref() {
            if key_type != "service_account" {
                return Err(SheetsError::Credentials(format!(
                    "expected a service_account key, found `{key_type}`"
                )));
            }
        }

        Ok(Self {
            client_email: raw.client_email,
            private_key_id: raw.private_key_id,
            token_uri: raw
                .token_uri
                .filter(|uri| !uri.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_owned()),
            private_key: raw.private_key.into(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, SheetsError> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            SheetsError::Credentials(format!("failed to read {}: {error}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn signer(&self) -> Result<AssertionSigner, SheetsError> {
        let key = load_private_key(self.private_key.expose_secret())?;
        Ok(AssertionSigner {
            key: SigningKey::<Sha256>::new(key),
            client_email: self.client_email.clone(),
            key_id: self.private_key_id.clone(),
            audience: self.token_uri.clone(),
        })
    }
}

/// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`).
pub fn load_private_key(pem: &str) -> Result<RsaPrivateKey, SheetsError> {
    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
        return Ok(key);
    }

    RsaPrivateKey::from_pkcs1_pem(pem)
        .map_err(|error| SheetsError::Credentials(format!("failed to parse private key: {error}")))
}

#[derive(Serialize)]
struct Header<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Signs JWT bearer assertions for the OAuth token endpoint.
pub struct AssertionSigner {
    key: SigningKey<Sha256>,
    client_email: String,
    key_id: Option<String>,
    audience: String,
}

impl AssertionSigner {
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// `header.claims.signature`, each part base64url without padding.
    pub fn assertion(&self, scopes: &[&str], issued_at: i64) -> Result<String, SheetsError> {
        let header = Header { alg: "RS256", typ: "JWT", kid: self.key_id.as_deref() };
        let claims = Claims {
            iss: &self.client_email,
            scope: scopes.join(" "),
            aud: &self.audience,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let signing_input = format!("{}.{}", encode_part(&header)?, encode_part(&claims)?);
        let signature = self.key.sign(signing_input.as_bytes());
        Ok(format!("{signing_input}.{}", BASE64_URL_SAFE_NO_PAD.encode(signature.to_bytes())))
    }
}

fn encode_part<T: Serialize>(part: &T) -> Result<String, SheetsError> {
    let json = serde_json::to_vec(part)
        .map_err(|error| SheetsError::Credentials(format!("failed to encode assertion: {error}")))?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
}
