use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::errors::StripeApiError;
use super::event::{self, ORDER_ID_METADATA_KEY};
use super::signature::DEFAULT_TOLERANCE_SECS;
use crate::domain::customer::Customer;
use crate::domain::errors::DomainError;
use crate::domain::payment::{CheckoutSession, CheckoutSessionRequest, VerifiedEvent};
use crate::domain::ports::PaymentGateway;

pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Deserialize)]
struct CustomerObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

/// Stripe REST gateway: customers, hosted checkout sessions and webhook events.
#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    api_key: String,
    api_base: String,
    webhook_secret: String,
    tolerance_secs: i64,
}

impl StripeClient {
    pub fn new(http: Client, api_key: String, webhook_secret: String) -> Self {
        Self {
            http,
            api_key,
            api_base: STRIPE_API_BASE.to_string(),
            webhook_secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
        idempotency_key: &str,
    ) -> Result<T, StripeApiError> {
        log::info!("stripe request POST {} idempotency_key={}", path, idempotency_key);

        let resp = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.api_key)
            .header("Idempotency-Key", idempotency_key)
            .form(form)
            .send()
            .await
            .map_err(|e| StripeApiError::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| StripeApiError::Decode(e.to_string()))?;
        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| StripeApiError::Decode(e.to_string()))
        } else {
            Err(StripeApiError::from_response(status.as_u16(), &text))
        }
    }
}

fn customer_form(customer: &Customer) -> Vec<(String, String)> {
    let details = &customer.details;
    vec![
        ("name".into(), details.name.clone()),
        ("address[line1]".into(), details.address.line1.clone()),
        ("address[postal_code]".into(), details.address.postal_code.clone()),
        ("address[city]".into(), details.address.city.clone()),
        ("address[state]".into(), details.address.state.clone()),
        ("address[country]".into(), details.address.country.clone()),
        ("metadata[customer_id]".into(), customer.id.to_string()),
    ]
}

fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let order_id = request.order_id.to_string();
    let mut form: Vec<(String, String)> = vec![
        ("mode".into(), "payment".into()),
        ("payment_method_types[0]".into(), "card".into()),
        ("customer".into(), request.gateway_customer_id.clone()),
        ("success_url".into(), request.success_url.clone()),
        ("cancel_url".into(), request.cancel_url.clone()),
        ("client_reference_id".into(), order_id.clone()),
        (format!("metadata[{ORDER_ID_METADATA_KEY}]"), order_id.clone()),
        (
            format!("payment_intent_data[metadata][{ORDER_ID_METADATA_KEY}]"),
            order_id,
        ),
    ];
    let currency = request.currency.to_ascii_lowercase();
    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((format!("{prefix}[price_data][currency]"), currency.clone()));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }
    form
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_customer(&self, customer: &Customer) -> Result<String, DomainError> {
        let created: CustomerObject = self
            .post_form(
                "/v1/customers",
                &customer_form(customer),
                &format!("customer-{}", customer.id),
            )
            .await?;
        Ok(created.id)
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, DomainError> {
        let session: SessionObject = self
            .post_form(
                "/v1/checkout/sessions",
                &session_form(request),
                &format!("checkout-session-{}", request.order_id),
            )
            .await?;
        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }

    fn construct_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<VerifiedEvent, DomainError> {
        event::construct_event(
            payload,
            signature_header,
            &self.webhook_secret,
            self.tolerance_secs,
            Utc::now().timestamp(),
        )
    }
}
