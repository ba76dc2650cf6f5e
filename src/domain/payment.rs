use uuid::Uuid;

use super::order::OrderLookup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLineItem {
    pub name: String,
    /// Unit price in minor units.
    pub unit_amount: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub order_id: Uuid,
    pub gateway_customer_id: String,
    pub currency: String,
    pub line_items: Vec<SessionLineItem>,
    pub success_url: String,
    pub cancel_url: String,
}

/// Handle of a hosted payment page; returned to the buyer for redirection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// Identifiers an event carries that can tie it back to a local order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCorrelation {
    pub order_id: Option<Uuid>,
    pub gateway_customer_id: Option<String>,
}

impl EventCorrelation {
    /// Direct order reference first, remote customer id as fallback.
    pub fn lookup(&self) -> Option<OrderLookup> {
        if let Some(id) = self.order_id {
            return Some(OrderLookup::ById(id));
        }
        self.gateway_customer_id
            .as_ref()
            .map(|c| OrderLookup::ByGatewayCustomer(c.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    CheckoutCompleted(EventCorrelation),
    PaymentFailed(EventCorrelation),
    Other(String),
}

/// An event whose signature has been checked against the webhook secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedEvent {
    pub id: String,
    pub kind: PaymentEvent,
}
