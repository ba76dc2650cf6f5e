use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{run_blocking, DbPool};
use crate::domain::customer::{Customer, NewCustomer};
use crate::domain::errors::DomainError;
use crate::domain::ports::CustomerRepository;
use crate::schema::customers;

use super::models::{CustomerRow, NewCustomerRow};

pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for DieselCustomerRepository {
    async fn create(&self, customer: NewCustomer) -> Result<Customer, DomainError> {
        run_blocking(&self.pool, move |conn| {
            let details = customer.details;
            let row = diesel::insert_into(customers::table)
                .values(&NewCustomerRow {
                    id: Uuid::new_v4(),
                    name: details.name,
                    address_line1: details.address.line1,
                    address_postal_code: details.address.postal_code,
                    address_city: details.address.city,
                    address_state: details.address.state,
                    address_country: details.address.country,
                })
                .returning(CustomerRow::as_returning())
                .get_result(conn)?;
            Ok(row.into())
        })
        .await
    }

    async fn attach_gateway_id(
        &self,
        customer_id: Uuid,
        gateway_customer_id: &str,
    ) -> Result<(), DomainError> {
        let gateway_customer_id = gateway_customer_id.to_string();
        run_blocking(&self.pool, move |conn| {
            let updated = diesel::update(
                customers::table
                    .filter(customers::id.eq(customer_id))
                    .filter(customers::gateway_customer_id.is_null()),
            )
            .set(customers::gateway_customer_id.eq(Some(gateway_customer_id.as_str())))
            .execute(conn)?;
            if updated == 1 {
                return Ok(());
            }

            let existing: Option<Option<String>> = customers::table
                .filter(customers::id.eq(customer_id))
                .select(customers::gateway_customer_id)
                .first(conn)
                .optional()?;
            match existing {
                None => Err(DomainError::NotFound),
                Some(current) => {
                    log::debug!(
                        "customer {} already linked to {:?}; keeping it",
                        customer_id,
                        current
                    );
                    Ok(())
                }
            }
        })
        .await
    }
}
