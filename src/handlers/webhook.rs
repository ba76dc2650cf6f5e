use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::AppState;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// POST /webhook
///
/// Receives signed event deliveries from the payment processor. The body
/// must be the exact bytes that were signed, so it is taken raw.
#[utoipa::path(
    post,
    path = "/webhook",
    request_body(
        content = String,
        description = "Raw signed event payload",
        content_type = "application/json"
    ),
    params(
        ("Stripe-Signature" = String, Header, description = "t=<unix>,v1=<hex hmac>"),
    ),
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Signature verification failed or malformed event"),
    ),
    tag = "webhooks"
)]
pub async fn stripe_webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Webhook("missing Stripe-Signature header".to_string()))?;

    state.reconciler.handle_event(&body, signature).await?;

    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}
