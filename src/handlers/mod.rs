pub mod checkout;
pub mod orders;
pub mod webhook;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        checkout::create_checkout_session,
        orders::get_order,
        webhook::stripe_webhook,
    ),
    components(schemas(
        checkout::AddressRequest,
        checkout::CustomerRequest,
        checkout::CheckoutProductRequest,
        checkout::CreateCheckoutSessionRequest,
        checkout::CreateCheckoutSessionResponse,
        orders::OrderProductResponse,
        orders::OrderResponse,
    )),
    tags(
        (name = "checkout", description = "Hosted checkout session creation"),
        (name = "orders", description = "Order status lookup"),
        (name = "webhooks", description = "Payment processor callbacks"),
    )
)]
pub struct ApiDoc;
