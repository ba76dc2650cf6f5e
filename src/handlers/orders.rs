use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::Order;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderProductResponse {
    pub dish: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub qnty: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub products: Vec<OrderProductResponse>,
    pub amount: String,
    /// One of `pending`, `completed`, `failed`
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            customer_id: order.customer_id,
            products: order
                .lines
                .into_iter()
                .map(|l| OrderProductResponse {
                    dish: l.item_name,
                    price: l.unit_price.to_string(),
                    qnty: l.quantity,
                })
                .collect(),
            amount: order.total.to_string(),
            status: order.status.to_string(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

/// GET /api/orders/{id}
///
/// Returns the order with its products and current payment status.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    match state.orders.find_by_id(order_id).await? {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}
