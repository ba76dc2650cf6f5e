use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// Gateway amounts are expressed in the currency's minor unit (paise, cents).
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
        }
    }

    /// `completed` and `failed` admit no further transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "failed" => Ok(OrderStatus::Failed),
            other => Err(DomainError::Internal(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

/// One cart entry as supplied by the buyer; persisted verbatim as an order line.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub item_name: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

impl CartItem {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }

    /// Unit price converted to the gateway's minor-unit integer amount.
    pub fn unit_amount_minor(&self) -> Result<i64, DomainError> {
        to_minor_units(&self.unit_price)
    }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub lines: Vec<CartItem>,
    pub total: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub lines: Vec<CartItem>,
    pub total: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How an inbound payment event identifies the order it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderLookup {
    ById(Uuid),
    /// Most recent order placed by the customer carrying this remote id.
    ByGatewayCustomer(String),
}

impl fmt::Display for OrderLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderLookup::ById(id) => write!(f, "order_id={id}"),
            OrderLookup::ByGatewayCustomer(c) => write!(f, "gateway_customer={c}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied { order_id: Uuid },
    /// The order had already left `pending`; nothing was written.
    Unchanged { order_id: Uuid, current: OrderStatus },
    NotFound,
}

/// Sum of unit price × quantity over every line.
pub fn compute_total(items: &[CartItem]) -> BigDecimal {
    items
        .iter()
        .fold(BigDecimal::zero(), |acc, item| acc + item.line_total())
}

pub fn to_minor_units(amount: &BigDecimal) -> Result<i64, DomainError> {
    let scaled = amount * BigDecimal::from(MINOR_UNITS_PER_MAJOR);
    if scaled.with_scale(0) != scaled {
        return Err(DomainError::InvalidInput(format!(
            "amount {amount} has more than two fractional digits"
        )));
    }
    scaled
        .with_scale(0)
        .to_i64()
        .ok_or_else(|| DomainError::InvalidInput(format!("amount {amount} is out of range")))
}

/// Width of `order_lines.item_name`, in characters.
pub const MAX_ITEM_NAME_LEN: usize = 255;

pub fn validate_cart(items: &[CartItem]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::InvalidInput("cart is empty".to_string()));
    }
    for (idx, item) in items.iter().enumerate() {
        if item.item_name.trim().is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "item {idx}: name must not be blank"
            )));
        }
        if item.item_name.chars().count() > MAX_ITEM_NAME_LEN {
            return Err(DomainError::InvalidInput(format!(
                "item {idx}: name must be at most {MAX_ITEM_NAME_LEN} characters"
            )));
        }
        if item.unit_price < BigDecimal::zero() {
            return Err(DomainError::InvalidInput(format!(
                "item {idx} ('{}'): unit price must not be negative",
                item.item_name
            )));
        }
        if item.quantity < 1 {
            return Err(DomainError::InvalidInput(format!(
                "item {idx} ('{}'): quantity must be at least 1",
                item.item_name
            )));
        }
        item.unit_amount_minor().map_err(|e| match e {
            DomainError::InvalidInput(msg) => {
                DomainError::InvalidInput(format!("item {idx} ('{}'): {msg}", item.item_name))
            }
            other => other,
        })?;
    }
    Ok(())
}
