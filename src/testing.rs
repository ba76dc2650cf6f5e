//! In-memory adapters and fixtures for service and handler tests.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::application::CheckoutSettings;
use crate::domain::customer::{Address, BuyerDetails, Customer, NewCustomer};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    CartItem, NewOrder, Order, OrderLookup, OrderStatus, TransitionOutcome,
};
use crate::domain::payment::{CheckoutSession, CheckoutSessionRequest, VerifiedEvent};
use crate::domain::ports::{CustomerRepository, OrderRepository, PaymentGateway};
use crate::infrastructure::stripe::{event, signature};
use crate::AppState;

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

pub fn sample_buyer() -> BuyerDetails {
    BuyerDetails {
        name: "Asha Rao".to_string(),
        address: Address {
            line1: "12 MG Road".to_string(),
            postal_code: "560001".to_string(),
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            country: "IN".to_string(),
        },
    }
}

pub fn cart_item(name: &str, price: &str, quantity: i32) -> CartItem {
    CartItem {
        item_name: name.to_string(),
        unit_price: BigDecimal::from_str(price).expect("valid decimal"),
        quantity,
    }
}

/// Returns `(body, Stripe-Signature header)` for an event signed just now.
pub fn signed_event(value: &serde_json::Value) -> (Vec<u8>, String) {
    let body = serde_json::to_vec(value).expect("serializable event");
    let header = signature::sign(&body, WEBHOOK_SECRET, Utc::now().timestamp());
    (body, header)
}

/// Application state over in-memory adapters, plus handles to inspect them.
pub fn test_state() -> (web::Data<AppState>, Arc<InMemoryStore>, Arc<FakeGateway>) {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(FakeGateway::default());
    let state = AppState::new(
        store.clone(),
        store.clone(),
        gateway.clone(),
        CheckoutSettings {
            currency: "inr".to_string(),
            success_url: "http://localhost:3000/success".to_string(),
            cancel_url: "http://localhost:3000/cancel".to_string(),
        },
    );
    (web::Data::new(state), store, gateway)
}

#[derive(Default)]
pub struct InMemoryStore {
    customers: Mutex<HashMap<Uuid, Customer>>,
    orders: Mutex<HashMap<Uuid, Order>>,
    pub unavailable: AtomicBool,
}

impl InMemoryStore {
    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::StoreUnavailable("store is down".to_string()));
        }
        Ok(())
    }

    pub fn customer_count(&self) -> usize {
        self.customers.lock().unwrap().len()
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn customers(&self) -> Vec<Customer> {
        self.customers.lock().unwrap().values().cloned().collect()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.lock().unwrap().values().cloned().collect()
    }

    pub fn status_of(&self, order_id: Uuid) -> Option<OrderStatus> {
        self.orders.lock().unwrap().get(&order_id).map(|o| o.status)
    }
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn create(&self, customer: NewCustomer) -> Result<Customer, DomainError> {
        self.check_available()?;
        let created = Customer {
            id: Uuid::new_v4(),
            details: customer.details,
            gateway_customer_id: None,
            created_at: Utc::now(),
        };
        self.customers
            .lock()
            .unwrap()
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn attach_gateway_id(
        &self,
        customer_id: Uuid,
        gateway_customer_id: &str,
    ) -> Result<(), DomainError> {
        self.check_available()?;
        let mut customers = self.customers.lock().unwrap();
        let customer = customers
            .get_mut(&customer_id)
            .ok_or(DomainError::NotFound)?;
        if customer.gateway_customer_id.is_none() {
            customer.gateway_customer_id = Some(gateway_customer_id.to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        self.check_available()?;
        let now = Utc::now();
        let created = Order {
            id: Uuid::new_v4(),
            customer_id: order.customer_id,
            lines: order.lines,
            total: order.total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.orders
            .lock()
            .unwrap()
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.check_available()?;
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    async fn transition_status(
        &self,
        lookup: &OrderLookup,
        target: OrderStatus,
    ) -> Result<TransitionOutcome, DomainError> {
        self.check_available()?;
        let order_id = match lookup {
            OrderLookup::ById(id) => Some(*id),
            OrderLookup::ByGatewayCustomer(gateway_id) => {
                let customers = self.customers.lock().unwrap();
                let orders = self.orders.lock().unwrap();
                let found = orders
                    .values()
                    .filter(|o| {
                        customers
                            .get(&o.customer_id)
                            .and_then(|c| c.gateway_customer_id.as_deref())
                            == Some(gateway_id.as_str())
                    })
                    .max_by_key(|o| o.created_at)
                    .map(|o| o.id);
                found
            }
        };

        let mut orders = self.orders.lock().unwrap();
        let Some(order) = order_id.and_then(|id| orders.get_mut(&id)) else {
            return Ok(TransitionOutcome::NotFound);
        };
        if order.status != OrderStatus::Pending {
            return Ok(TransitionOutcome::Unchanged {
                order_id: order.id,
                current: order.status,
            });
        }
        order.status = target;
        order.updated_at = Utc::now();
        Ok(TransitionOutcome::Applied { order_id: order.id })
    }
}

/// Records every call and hands out sequential remote ids.
#[derive(Default)]
pub struct FakeGateway {
    pub fail_customer: AtomicBool,
    pub fail_session: AtomicBool,
    next_id: AtomicUsize,
    pub registered: Mutex<Vec<Customer>>,
    pub sessions: Mutex<Vec<CheckoutSessionRequest>>,
}

impl FakeGateway {
    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_customer(&self, customer: &Customer) -> Result<String, DomainError> {
        if self.fail_customer.load(Ordering::SeqCst) {
            return Err(DomainError::Gateway("customer rejected".to_string()));
        }
        self.registered.lock().unwrap().push(customer.clone());
        Ok(format!("cus_test_{}", self.next()))
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, DomainError> {
        if self.fail_session.load(Ordering::SeqCst) {
            return Err(DomainError::Gateway("gateway unreachable".to_string()));
        }
        self.sessions.lock().unwrap().push(request.clone());
        let id = format!("cs_test_{}", self.next());
        Ok(CheckoutSession {
            url: Some(format!("https://checkout.example.test/{id}")),
            id,
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
            WEBHOOK_SECRET,
            signature::DEFAULT_TOLERANCE_SECS,
            Utc::now().timestamp(),
        )
    }
}
