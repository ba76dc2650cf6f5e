use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::customer::{Address, BuyerDetails, Customer};
use crate::domain::errors::DomainError;
use crate::domain::order::{CartItem, Order};
use crate::schema::{customers, order_lines, orders};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub address_line1: String,
    pub address_postal_code: String,
    pub address_city: String,
    pub address_state: String,
    pub address_country: String,
    pub gateway_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            details: BuyerDetails {
                name: row.name,
                address: Address {
                    line1: row.address_line1,
                    postal_code: row.address_postal_code,
                    city: row.address_city,
                    state: row.address_state,
                    country: row.address_country,
                },
            },
            gateway_customer_id: row.gateway_customer_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomerRow {
    pub id: Uuid,
    pub name: String,
    pub address_line1: String,
    pub address_postal_code: String,
    pub address_city: String,
    pub address_state: String,
    pub address_country: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = orders)]
#[diesel(belongs_to(CustomerRow, foreign_key = customer_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_order(self, lines: Vec<OrderLineRow>) -> Result<Order, DomainError> {
        Ok(Order {
            id: self.id,
            customer_id: self.customer_id,
            lines: lines.into_iter().map(CartItem::from).collect(),
            total: self.amount,
            status: self.status.parse()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: BigDecimal,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_lines)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub item_name: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<OrderLineRow> for CartItem {
    fn from(row: OrderLineRow) -> Self {
        CartItem {
            item_name: row.item_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_lines)]
pub struct NewOrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub item_name: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}
