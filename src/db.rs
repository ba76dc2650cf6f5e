use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};

use crate::domain::errors::DomainError;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_pool(database_url: &str) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().build(manager)
}

/// Runs a Diesel closure on the blocking thread pool with a pooled connection.
pub async fn run_blocking<F, T>(pool: &DbPool, f: F) -> Result<T, DomainError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut conn)
    })
    .await
    .map_err(|e| DomainError::Internal(format!("blocking task failed: {e}")))?
}
