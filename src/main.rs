use std::io;

use actix_web::web;
use checkout_service::{build_server, create_pool, run_migrations, AppConfig, AppState};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;
    log::info!("Database connected");

    let state = AppState::from_config(pool, &config).map_err(io::Error::other)?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(web::Data::new(state), &config.host, config.port)?.await
}
