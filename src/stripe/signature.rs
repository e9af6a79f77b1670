//! Webhook Signature Verification
//!
//! Stripe signs every webhook delivery with the endpoint's signing secret.
//! The `stripe-signature` header looks like:
//!
//! ```text
//! t=1614556800,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd,v0=...
//! ```
//!
//! The expected `v1` value is the hex HMAC-SHA256 of `"{t}.{raw body}"`.
//! Verification has to run over the exact bytes Stripe sent; a re-serialized
//! JSON value will not hash to the same signature.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::stripe::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Default tolerance between the signed timestamp and now.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Only `v1` signatures are checked; `v0` is a test-mode legacy scheme.
const EXPECTED_SCHEME: &str = "v1";

/// Parsed `stripe-signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp the signature was produced at
    pub timestamp: i64,
    /// Every `v1` signature in the header (several during secret rotation)
    pub signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parse a raw header value.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::MalformedHeader(format!("bad item {part:?}")))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse::<i64>().map_err(|_| {
                        WebhookError::MalformedHeader(format!("bad timestamp {value:?}"))
                    })?);
                }
                EXPECTED_SCHEME => {
                    // Undecodable entries simply never match
                    if let Ok(bytes) = hex::decode(value) {
                        signatures.push(bytes);
                    }
                }
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::MalformedHeader("missing timestamp".into()))?;

        if signatures.is_empty() {
            return Err(WebhookError::MalformedHeader(
                "no v1 signatures found".into(),
            ));
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// Verifies `stripe-signature` headers against a signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl SignatureVerifier {
    /// Create a verifier with the default five minute tolerance.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Override the timestamp tolerance. Zero disables the check.
    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verify `payload` against `header` using the current time.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), WebhookError> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())
    }

    /// Verify `payload` against `header` as if the current time were `now`.
    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(header)?;
        let expected = self.compute(header.timestamp, payload);

        let matched = header
            .signatures
            .iter()
            .any(|candidate| bool::from(candidate.as_slice().ct_eq(expected.as_slice())));

        if !matched {
            return Err(WebhookError::SignatureMismatch);
        }

        if self.tolerance_secs > 0 {
            let age_secs = now.saturating_sub(header.timestamp);
            if age_secs.unsigned_abs() > self.tolerance_secs.unsigned_abs() {
                return Err(WebhookError::TimestampOutOfTolerance { age_secs });
            }
        }

        Ok(())
    }

    /// Produce a complete header for `payload` signed at `timestamp`.
    ///
    /// Used by tests and local tooling to forge deliveries.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> String {
        format!(
            "t={},{}={}",
            timestamp,
            EXPECTED_SCHEME,
            hex::encode(self.compute(timestamp, payload))
        )
    }

    fn compute(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length, so this never fails
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC-SHA256 takes any key length"));
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}
