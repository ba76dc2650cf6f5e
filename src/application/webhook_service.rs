use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{OrderStatus, TransitionOutcome};
use crate::domain::payment::{EventCorrelation, PaymentEvent};
use crate::domain::ports::{OrderRepository, PaymentGateway};

/// What a verified delivery did to the order store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied { order_id: Uuid, status: OrderStatus },
    Unchanged { order_id: Uuid, current: OrderStatus },
    Unmatched,
    Ignored { event_type: String },
    StoreError,
}

pub struct WebhookReconciler {
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl WebhookReconciler {
    pub fn new(orders: Arc<dyn OrderRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { orders, gateway }
    }

    /// Authenticates a raw delivery and applies it.
    ///
    /// Only signature and envelope failures are returned as errors. Once the
    /// event is authentic every other problem is logged and acknowledged, so
    /// the processor does not keep redelivering.
    pub async fn handle_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<ReconcileOutcome, DomainError> {
        let event = self
            .gateway
            .construct_event(payload, signature_header)
            .inspect_err(|e| log::warn!("Webhook verification failed: {}", e))?;

        let (target, correlation) = match event.kind {
            PaymentEvent::CheckoutCompleted(c) => (OrderStatus::Completed, c),
            PaymentEvent::PaymentFailed(c) => (OrderStatus::Failed, c),
            PaymentEvent::Other(event_type) => {
                log::info!("Unhandled event type {} ({})", event_type, event.id);
                return Ok(ReconcileOutcome::Ignored { event_type });
            }
        };

        Ok(self.apply(&event.id, target, &correlation).await)
    }

    async fn apply(
        &self,
        event_id: &str,
        target: OrderStatus,
        correlation: &EventCorrelation,
    ) -> ReconcileOutcome {
        let Some(lookup) = correlation.lookup() else {
            log::warn!("Event {} carries no order or customer reference", event_id);
            return ReconcileOutcome::Unmatched;
        };

        match self.orders.transition_status(&lookup, target).await {
            Ok(TransitionOutcome::Applied { order_id }) => {
                log::info!("Order {} marked {} by event {}", order_id, target, event_id);
                ReconcileOutcome::Applied {
                    order_id,
                    status: target,
                }
            }
            Ok(TransitionOutcome::Unchanged { order_id, current }) => {
                log::info!(
                    "Order {} already {}; event {} ({}) ignored",
                    order_id,
                    current,
                    event_id,
                    target
                );
                ReconcileOutcome::Unchanged { order_id, current }
            }
            Ok(TransitionOutcome::NotFound) => {
                log::warn!("No order matches {} for event {}", lookup, event_id);
                ReconcileOutcome::Unmatched
            }
            Err(e) => {
                log::error!("Error updating order ({}) for event {}: {}", lookup, event_id, e);
                ReconcileOutcome::StoreError
            }
        }
    }
}
