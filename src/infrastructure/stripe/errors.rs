use serde::Deserialize;
use thiserror::Error;

use crate::domain::errors::DomainError;

// Stripe REST error envelope: { error: { type, code, message, param } }
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorEnvelope {
    pub error: StripeErrorDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetails {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub param: Option<String>,
}

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("http error: {0}")]
    Http(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("stripe {type_} (status {status}): {message} [code={code:?} param={param:?}]")]
    Stripe {
        type_: String,
        message: String,
        code: Option<String>,
        param: Option<String>,
        status: u16,
    },
}

impl StripeApiError {
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<StripeErrorEnvelope>(body) {
            Ok(env) => StripeApiError::Stripe {
                type_: env.error.type_,
                message: env.error.message.unwrap_or_default(),
                code: env.error.code,
                param: env.error.param,
                status,
            },
            Err(_) => StripeApiError::Http(format!("status={status} body={body}")),
        }
    }
}

impl From<StripeApiError> for DomainError {
    fn from(e: StripeApiError) -> Self {
        DomainError::Gateway(e.to_string())
    }
}
