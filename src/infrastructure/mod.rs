pub mod customer_repo;
pub mod models;
pub mod order_repo;
pub mod stripe;

#[cfg(test)]
pub(crate) mod test_db;

pub use customer_repo::DieselCustomerRepository;
pub use order_repo::DieselOrderRepository;
