use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use super::signature;
use crate::domain::errors::DomainError;
use crate::domain::payment::{EventCorrelation, PaymentEvent, VerifiedEvent};

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const PAYMENT_INTENT_FAILED: &str = "payment_intent.payment_failed";

/// Metadata key carrying the local order id on sessions and payment intents.
pub const ORDER_ID_METADATA_KEY: &str = "order_id";

#[derive(Debug, Deserialize)]
struct StripeEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CustomerRef {
    Id(String),
    Expanded { id: String },
}

/// The fields shared by checkout sessions and payment intents that matter
/// for correlation.
#[derive(Debug, Default, Deserialize)]
struct CorrelatedObject {
    #[serde(default)]
    customer: Option<CustomerRef>,
    #[serde(default)]
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
}

impl CorrelatedObject {
    fn into_correlation(self) -> EventCorrelation {
        let metadata_ref = self
            .metadata
            .as_ref()
            .and_then(|m| m.get(ORDER_ID_METADATA_KEY));
        let order_id = metadata_ref
            .into_iter()
            .chain(self.client_reference_id.as_ref())
            .find_map(|raw| match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    log::debug!("ignoring non-uuid order reference '{}'", raw);
                    None
                }
            });
        let gateway_customer_id = self.customer.map(|c| match c {
            CustomerRef::Id(id) | CustomerRef::Expanded { id } => id,
        });
        EventCorrelation {
            order_id,
            gateway_customer_id,
        }
    }
}

/// Decodes an already-authenticated event body.
pub fn decode_event(payload: &[u8]) -> Result<VerifiedEvent, DomainError> {
    let event: StripeEvent = serde_json::from_slice(payload)
        .map_err(|e| DomainError::InvalidInput(format!("malformed event payload: {e}")))?;

    let correlated = || -> Result<EventCorrelation, DomainError> {
        let object: CorrelatedObject = serde_json::from_value(event.data.object.clone())
            .map_err(|e| {
                DomainError::InvalidInput(format!(
                    "malformed {} object: {e}",
                    event.event_type
                ))
            })?;
        Ok(object.into_correlation())
    };

    let kind = match event.event_type.as_str() {
        CHECKOUT_SESSION_COMPLETED => PaymentEvent::CheckoutCompleted(correlated()?),
        PAYMENT_INTENT_FAILED => PaymentEvent::PaymentFailed(correlated()?),
        _ => PaymentEvent::Other(event.event_type.clone()),
    };

    Ok(VerifiedEvent { id: event.id, kind })
}

/// Verifies the signature header and then decodes the event.
pub fn construct_event(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<VerifiedEvent, DomainError> {
    signature::verify(payload, signature_header, secret, tolerance_secs, now)?;
    decode_event(payload)
}
