pub mod customer;
pub mod errors;
pub mod order;
pub mod payment;
pub mod ports;
