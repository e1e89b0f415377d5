//! Slack request signing (`X-Slack-Signature`, version `v0`).

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const MAX_REQUEST_AGE_SECS: i64 = 60 * 5;

const VERSION: &str = "v0";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing `{0}` header")]
    MissingHeader(&'static str),
    #[error("request timestamp `{0}` is not a unix timestamp")]
    InvalidTimestamp(String),
    #[error("request timestamp is {age_secs}s away from server time")]
    Stale { age_secs: i64 },
    #[error("request signature does not match")]
    Mismatch,
}

#[derive(Clone, Debug)]
pub struct RequestVerifier {
    signing_secret: SecretString,
    max_age_secs: i64,
}

impl RequestVerifier {
    pub fn new(signing_secret: SecretString) -> Self {
        Self { signing_secret, max_age_secs: MAX_REQUEST_AGE_SECS }
    }

    /// Checks the headers of one request against its raw body. `now` is the
    /// current unix time in seconds.
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Result<(), SignatureError> {
        let timestamp = timestamp.ok_or(SignatureError::MissingHeader(TIMESTAMP_HEADER))?;
        let signature = signature.ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?;

        let issued_at: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::InvalidTimestamp(timestamp.to_owned()))?;
        let age_secs = now - issued_at;
        if age_secs.abs() > self.max_age_secs {
            return Err(SignatureError::Stale { age_secs });
        }

        let provided = signature
            .strip_prefix("v0=")
            .and_then(|digest| hex::decode(digest).ok())
            .ok_or(SignatureError::Mismatch)?;

        self.mac(timestamp, body)?.verify_slice(&provided).map_err(|_| SignatureError::Mismatch)
    }

    /// The `X-Slack-Signature` value Slack would send for this body.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
        let digest = self.mac(timestamp, body)?.finalize().into_bytes();
        Ok(format!("{VERSION}={}", hex::encode(digest)))
    }

    fn mac(&self, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.expose_secret().as_bytes())
            .map_err(|_| SignatureError::Mismatch)?;
        mac.update(VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        Ok(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestVerifier, SignatureError, SIGNATURE_HEADER, TIMESTAMP_HEADER};

    const NOW: i64 = 1_531_420_618;
    const BODY: &[u8] = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&command=%2Fkudos";

    fn verifier() -> RequestVerifier {
        RequestVerifier::new("8f742231b10e8888abcd99yyyzzz85a5".to_owned().into())
    }

    #[test]
    fn signed_request_verifies() {
        let verifier = verifier();
        let timestamp = NOW.to_string();
        let signature = verifier.sign(&timestamp, BODY).expect("sign");

        assert!(signature.starts_with("v0="));
        assert_eq!(verifier.verify(Some(&timestamp), Some(&signature), BODY, NOW), Ok(()));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let verifier = verifier();
        let timestamp = NOW.to_string();
        let signature = verifier.sign(&timestamp, BODY).expect("sign");

        assert_eq!(
            verifier.verify(Some(&timestamp), Some(&signature), b"command=%2Fother", NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn signature_from_another_secret_is_rejected() {
        let timestamp = NOW.to_string();
        let foreign = RequestVerifier::new("other-secret".to_owned().into())
            .sign(&timestamp, BODY)
            .expect("sign");

        assert_eq!(
            verifier().verify(Some(&timestamp), Some(&foreign), BODY, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn old_timestamps_are_rejected() {
        let verifier = verifier();
        let timestamp = (NOW - 301).to_string();
        let signature = verifier.sign(&timestamp, BODY).expect("sign");

        assert_eq!(
            verifier.verify(Some(&timestamp), Some(&signature), BODY, NOW),
            Err(SignatureError::Stale { age_secs: 301 })
        );
    }

    #[test]
    fn missing_and_malformed_headers_are_rejected() {
        let verifier = verifier();
        assert_eq!(
            verifier.verify(None, Some("v0=00"), BODY, NOW),
            Err(SignatureError::MissingHeader(TIMESTAMP_HEADER))
        );
        assert_eq!(
            verifier.verify(Some("1"), None, BODY, NOW),
            Err(SignatureError::MissingHeader(SIGNATURE_HEADER))
        );
        assert!(matches!(
            verifier.verify(Some("yesterday"), Some("v0=00"), BODY, NOW),
            Err(SignatureError::InvalidTimestamp(_))
        ));
        assert_eq!(
            verifier.verify(Some(&NOW.to_string()), Some("v1=zz"), BODY, NOW),
            Err(SignatureError::Mismatch)
        );
    }
}
