use std::sync::Arc;

use crate::domain::customer::{BuyerDetails, NewCustomer};
use crate::domain::errors::DomainError;
use crate::domain::order::{compute_total, validate_cart, CartItem, NewOrder};
use crate::domain::payment::{CheckoutSession, CheckoutSessionRequest, SessionLineItem};
use crate::domain::ports::{CustomerRepository, OrderRepository, PaymentGateway};

/// Gateway-facing parameters fixed at startup.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub buyer: BuyerDetails,
    pub items: Vec<CartItem>,
}

pub struct CheckoutService {
    customers: Arc<dyn CustomerRepository>,
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settings: CheckoutSettings,
}

impl CheckoutService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        orders: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            customers,
            orders,
            gateway,
            settings,
        }
    }

    /// Validates the cart, records a pending order and opens a hosted
    /// checkout session for it.
    ///
    /// Writes are not rolled back when a later step fails: an order whose
    /// session could not be created stays `pending`.
    pub async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, DomainError> {
        request.buyer.validate()?;
        validate_cart(&request.items)?;
        let line_items = request
            .items
            .iter()
            .map(|item| {
                Ok(SessionLineItem {
                    name: item.item_name.clone(),
                    unit_amount: item.unit_amount_minor()?,
                    quantity: i64::from(item.quantity),
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        self.open_session(request, line_items).await.map_err(|e| {
            log::error!("Error creating checkout session: {}", e);
            DomainError::CheckoutFailed(e.to_string())
        })
    }

    async fn open_session(
        &self,
        request: CheckoutRequest,
        line_items: Vec<SessionLineItem>,
    ) -> Result<CheckoutSession, DomainError> {
        let customer = self
            .customers
            .create(NewCustomer {
                details: request.buyer,
            })
            .await?;

        let total = compute_total(&request.items);
        let order = self
            .orders
            .create(NewOrder {
                customer_id: customer.id,
                lines: request.items,
                total,
            })
            .await?;
        log::info!(
            "Created pending order {} for customer {} (total {})",
            order.id,
            customer.id,
            order.total
        );

        let gateway_customer_id = self.gateway.create_customer(&customer).await?;
        self.customers
            .attach_gateway_id(customer.id, &gateway_customer_id)
            .await?;

        let session = self
            .gateway
            .create_checkout_session(&CheckoutSessionRequest {
                order_id: order.id,
                gateway_customer_id,
                currency: self.settings.currency.clone(),
                line_items,
                success_url: self.settings.success_url.clone(),
                cancel_url: self.settings.cancel_url.clone(),
            })
            .await?;
        log::info!("Opened checkout session {} for order {}", session.id, order.id);

        Ok(session)
    }
}
