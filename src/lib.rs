pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::{CheckoutService, CheckoutSettings, WebhookReconciler};
use domain::ports::{CustomerRepository, OrderRepository, PaymentGateway};
use errors::AppError;
use infrastructure::stripe::StripeClient;
use infrastructure::{DieselCustomerRepository, DieselOrderRepository};

pub use config::AppConfig;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Process-wide handles shared by every request.
pub struct AppState {
    pub checkout: CheckoutService,
    pub reconciler: WebhookReconciler,
    pub orders: Arc<dyn OrderRepository>,
}

impl AppState {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        orders: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            checkout: CheckoutService::new(customers, orders.clone(), gateway.clone(), settings),
            reconciler: WebhookReconciler::new(orders.clone(), gateway),
            orders,
        }
    }

    /// Wires the Postgres repositories and the Stripe gateway.
    pub fn from_config(pool: DbPool, config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(GATEWAY_TIMEOUT).build()?;
        let gateway = StripeClient::new(
            http,
            config.stripe_secret_key.clone(),
            config.stripe_webhook_secret.clone(),
        )
        .with_api_base(config.stripe_api_base.clone())
        .with_tolerance(config.webhook_tolerance_secs);

        Ok(Self::new(
            Arc::new(DieselCustomerRepository::new(pool.clone())),
            Arc::new(DieselOrderRepository::new(pool)),
            Arc::new(gateway),
            config.checkout_settings(),
        ))
    }
}

/// Registers the HTTP routes; shared by the server and handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route(
        "/api/create-checkout-session",
        web::post().to(handlers::checkout::create_checkout_session),
    )
    .route("/api/orders/{id}", web::get().to(handlers::orders::get_order))
    .route("/webhook", web::post().to(handlers::webhook::stripe_webhook));
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", handlers::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
