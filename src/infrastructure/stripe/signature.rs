//! `Stripe-Signature` verification.
//!
//! Header format: `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`. The signed
//! message is `"<t>." + raw body`, authenticated with HMAC-SHA256 under the
//! endpoint's webhook secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::domain::errors::DomainError;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("webhook secret is not configured")]
    MissingSecret,
    #[error("malformed signature header: {0}")]
    MalformedHeader(String),
    #[error("timestamp {timestamp} is outside the {tolerance}s tolerance (now {now})")]
    OutsideTolerance {
        timestamp: i64,
        now: i64,
        tolerance: i64,
    },
    #[error("no v1 signature matches the payload")]
    Mismatch,
}

impl From<SignatureError> for DomainError {
    fn from(e: SignatureError) -> Self {
        DomainError::SignatureInvalid(e.to_string())
    }
}

struct ParsedHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> Result<ParsedHeader<'_>, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = Some(value.parse::<i64>().map_err(|_| {
                    SignatureError::MalformedHeader(format!("bad timestamp '{value}'"))
                })?);
            }
            "v1" => signatures.push(value),
            // v0 and future schemes are ignored
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| SignatureError::MalformedHeader("missing timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(SignatureError::MalformedHeader(
            "no v1 signature present".to_string(),
        ));
    }
    Ok(ParsedHeader {
        timestamp,
        signatures,
    })
}

fn mac_for(payload: &[u8], secret: &str, timestamp: i64) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::MissingSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Checks `header` against `payload`; returns the signed timestamp on success.
pub fn verify(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<i64, SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::MissingSecret);
    }
    let parsed = parse_header(header)?;

    let mac = mac_for(payload, secret, parsed.timestamp)?;
    let matched = parsed.signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(SignatureError::Mismatch);
    }

    if now.abs_diff(parsed.timestamp) > tolerance_secs.unsigned_abs() {
        return Err(SignatureError::OutsideTolerance {
            timestamp: parsed.timestamp,
            now,
            tolerance: tolerance_secs,
        });
    }
    Ok(parsed.timestamp)
}

/// Produces a header value the way the processor signs its deliveries.
/// Used by tests and local tooling to replay events.
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let signature = HmacSha256::new_from_slice(secret.as_bytes())
        .map(|mut mac| {
            mac.update(timestamp.to_string().as_bytes());
            mac.update(b".");
            mac.update(payload);
            hex::encode(mac.finalize().into_bytes())
        })
        .unwrap_or_default();
    format!("t={timestamp},v1={signature}")
}
