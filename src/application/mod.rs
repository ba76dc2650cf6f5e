pub mod checkout_service;
pub mod webhook_service;

pub use checkout_service::{CheckoutRequest, CheckoutService, CheckoutSettings};
pub use webhook_service::{ReconcileOutcome, WebhookReconciler};
