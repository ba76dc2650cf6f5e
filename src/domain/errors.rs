use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Checkout failed: {0}")]
    CheckoutFailed(String),
    #[error("Signature invalid: {0}")]
    SignatureInvalid(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Payment gateway error: {0}")]
    Gateway(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
