//! Stripe webhook signature verification.
//!
//! Stripe signs `"{timestamp}.{raw body}"` with HMAC-SHA256 and sends the
//! result in the `Stripe-Signature` header as `t=<unix>,v1=<hex>`. During a
//! secret rotation the header carries one `v1` per active secret.

use {
    crate::domain::error::FulfillmentError,
    hmac::{Hmac, Mac},
    sha2::Sha256,
    std::time::Duration,
    subtle::ConstantTimeEq,
};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Stripe's own default tolerance.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    v1: Vec<Vec<u8>>,
}

impl SignatureHeader {
    fn parse(header: &str) -> Result<Self, FulfillmentError> {
        let mut timestamp = None;
        let mut v1 = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                return Err(invalid("malformed header"));
            };
            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| invalid("bad timestamp"))?);
                }
                "v1" => v1.push(hex::decode(value).map_err(|_| invalid("bad v1 hex"))?),
                // v0 and future schemes
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| invalid("missing timestamp"))?;
        if v1.is_empty() {
            return Err(invalid("no v1 signature"));
        }
        Ok(Self { timestamp, v1 })
    }
}

fn invalid(reason: &str) -> FulfillmentError {
    FulfillmentError::InvalidSignature(reason.to_string())
}

pub struct WebhookVerifier {
    secret: String,
    tolerance: Duration,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check `payload` (the exact request bytes) against the signature header.
    pub fn verify(&self, payload: &[u8], header: Option<&str>) -> Result<(), FulfillmentError> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        payload: &[u8],
        header: Option<&str>,
        now: i64,
    ) -> Result<(), FulfillmentError> {
        let header = header
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing Stripe-Signature header"))?;
        let header = SignatureHeader::parse(header)?;

        if now.abs_diff(header.timestamp) > self.tolerance.as_secs() {
            return Err(invalid("timestamp outside tolerance"));
        }

        let expected = self.compute(header.timestamp, payload)?;
        let matched = header.v1.iter().any(|candidate| {
            candidate.len() == expected.len()
                && bool::from(candidate.as_slice().ct_eq(expected.as_slice()))
        });

        if matched {
            Ok(())
        } else {
            Err(invalid("no matching v1 signature"))
        }
    }

    /// Build a `Stripe-Signature` header value for `payload`. Used to sign
    /// fixtures and locally forwarded events.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String, FulfillmentError> {
        let signature = self.compute(timestamp, payload)?;
        Ok(format!("t={timestamp},v1={}", hex::encode(signature)))
    }

    fn compute(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, FulfillmentError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| FulfillmentError::InvalidSignature(e.to_string()))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
