use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{run_blocking, DbPool};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderLookup, OrderStatus, TransitionOutcome};
use crate::domain::ports::OrderRepository;
use crate::schema::{customers, order_lines, orders};

use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::StoreUnavailable(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::StoreUnavailable(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn resolve_order_id(
    conn: &mut PgConnection,
    lookup: &OrderLookup,
) -> Result<Option<Uuid>, DomainError> {
    let id = match lookup {
        OrderLookup::ById(id) => orders::table
            .filter(orders::id.eq(*id))
            .select(orders::id)
            .first::<Uuid>(conn)
            .optional()?,
        OrderLookup::ByGatewayCustomer(gateway_id) => orders::table
            .inner_join(customers::table)
            .filter(customers::gateway_customer_id.eq(gateway_id.as_str()))
            .order(orders::created_at.desc())
            .select(orders::id)
            .first::<Uuid>(conn)
            .optional()?,
    };
    Ok(id)
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                // 1. Insert the order
                let order_id = Uuid::new_v4();
                let row = diesel::insert_into(orders::table)
                    .values(&NewOrderRow {
                        id: order_id,
                        customer_id: order.customer_id,
                        amount: order.total.clone(),
                        status: OrderStatus::Pending.as_str().to_string(),
                    })
                    .returning(OrderRow::as_returning())
                    .get_result(conn)?;

                // 2. Insert order lines, keeping cart order
                let new_lines: Vec<NewOrderLineRow> = order
                    .lines
                    .iter()
                    .enumerate()
                    .map(|(position, l)| NewOrderLineRow {
                        id: Uuid::new_v4(),
                        order_id,
                        position: position as i32,
                        item_name: l.item_name.clone(),
                        unit_price: l.unit_price.clone(),
                        quantity: l.quantity,
                    })
                    .collect();
                let mut lines = diesel::insert_into(order_lines::table)
                    .values(&new_lines)
                    .returning(OrderLineRow::as_returning())
                    .get_results(conn)?;
                lines.sort_by_key(|l| l.position);

                row.into_order(lines)
            })
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        run_blocking(&self.pool, move |conn| {
            let order = orders::table
                .filter(orders::id.eq(id))
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?;

            let Some(order) = order else {
                return Ok(None);
            };

            let lines = order_lines::table
                .filter(order_lines::order_id.eq(order.id))
                .order(order_lines::position.asc())
                .select(OrderLineRow::as_select())
                .load(conn)?;

            order.into_order(lines).map(Some)
        })
        .await
    }

    async fn transition_status(
        &self,
        lookup: &OrderLookup,
        target: OrderStatus,
    ) -> Result<TransitionOutcome, DomainError> {
        if !target.is_terminal() {
            return Err(DomainError::InvalidInput(format!(
                "cannot transition an order to '{target}'"
            )));
        }
        let lookup = lookup.clone();

        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                let Some(order_id) = resolve_order_id(conn, &lookup)? else {
                    return Ok(TransitionOutcome::NotFound);
                };

                // Only a pending order may move; the WHERE clause is the guard.
                let updated = diesel::update(
                    orders::table
                        .filter(orders::id.eq(order_id))
                        .filter(orders::status.eq(OrderStatus::Pending.as_str())),
                )
                .set((
                    orders::status.eq(target.as_str()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

                if updated == 1 {
                    return Ok(TransitionOutcome::Applied { order_id });
                }

                let current: String = orders::table
                    .filter(orders::id.eq(order_id))
                    .select(orders::status)
                    .first(conn)?;
                Ok(TransitionOutcome::Unchanged {
                    order_id,
                    current: current.parse()?,
                })
            })
        })
        .await
    }
}
