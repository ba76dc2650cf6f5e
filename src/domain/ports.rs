use async_trait::async_trait;
use uuid::Uuid;

use super::customer::{Customer, NewCustomer};
use super::errors::DomainError;
use super::order::{NewOrder, Order, OrderLookup, OrderStatus, TransitionOutcome};
use super::payment::{CheckoutSession, CheckoutSessionRequest, VerifiedEvent};

#[async_trait]
pub trait CustomerRepository: Send + Sync + 'static {
    async fn create(&self, customer: NewCustomer) -> Result<Customer, DomainError>;
    /// Links the remote gateway id; an already-linked customer is left untouched.
    async fn attach_gateway_id(
        &self,
        customer_id: Uuid,
        gateway_customer_id: &str,
    ) -> Result<(), DomainError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Moves the matched order from `pending` to `target`; any other current
    /// status is reported as `Unchanged`.
    async fn transition_status(
        &self,
        lookup: &OrderLookup,
        target: OrderStatus,
    ) -> Result<TransitionOutcome, DomainError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_customer(&self, customer: &Customer) -> Result<String, DomainError>;
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, DomainError>;
    fn construct_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<VerifiedEvent, DomainError>;
}
