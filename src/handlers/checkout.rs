use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::CheckoutRequest;
use crate::domain::customer::{Address, BuyerDetails};
use crate::domain::order::CartItem;
use crate::errors::AppError;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddressRequest {
    pub line1: String,
    pub postal_code: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    /// Two-letter country code, e.g. "IN"
    pub country: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomerRequest {
    pub name: String,
    pub address: AddressRequest,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutProductRequest {
    pub dish: String,
    /// Unit price in major currency units, at most two decimals
    #[schema(value_type = f64, example = 250)]
    pub price: serde_json::Number,
    pub qnty: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCheckoutSessionRequest {
    pub customer: Option<CustomerRequest>,
    pub products: Vec<CheckoutProductRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCheckoutSessionResponse {
    /// Checkout session id used by the client to redirect the buyer
    pub id: String,
    /// Hosted payment page, when the processor returns one
    pub url: Option<String>,
}

impl CreateCheckoutSessionRequest {
    fn into_domain(self) -> Result<CheckoutRequest, AppError> {
        let customer = self
            .customer
            .ok_or_else(|| AppError::BadRequest("customer details are required".to_string()))?;

        let items = self
            .products
            .into_iter()
            .map(|p| {
                let unit_price = BigDecimal::from_str(&p.price.to_string()).map_err(|e| {
                    AppError::BadRequest(format!("Invalid price '{}': {}", p.price, e))
                })?;
                let quantity = i32::try_from(p.qnty).map_err(|_| {
                    AppError::BadRequest(format!("Invalid qnty {} for '{}'", p.qnty, p.dish))
                })?;
                Ok(CartItem {
                    item_name: p.dish,
                    unit_price,
                    quantity,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(CheckoutRequest {
            buyer: BuyerDetails {
                name: customer.name,
                address: Address {
                    line1: customer.address.line1,
                    postal_code: customer.address.postal_code,
                    city: customer.address.city,
                    state: customer.address.state,
                    country: customer.address.country,
                },
            },
            items,
        })
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/create-checkout-session
///
/// Records the buyer and a pending order for the cart, then opens a hosted
/// checkout session with the payment processor. The order is reconciled
/// later through `/webhook`.
#[utoipa::path(
    post,
    path = "/api/create-checkout-session",
    request_body = CreateCheckoutSessionRequest,
    responses(
        (status = 200, description = "Checkout session created", body = CreateCheckoutSessionResponse),
        (status = 400, description = "Invalid cart or customer details"),
        (status = 500, description = "Checkout failed"),
    ),
    tag = "checkout"
)]
pub async fn create_checkout_session(
    state: web::Data<AppState>,
    body: web::Json<CreateCheckoutSessionRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().into_domain()?;
    let session = state.checkout.create_checkout_session(request).await?;

    Ok(HttpResponse::Ok().json(CreateCheckoutSessionResponse {
        id: session.id,
        url: session.url,
    }))
}
