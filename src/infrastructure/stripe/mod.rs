pub mod client;
pub mod errors;
pub mod event;
pub mod signature;

pub use client::StripeClient;
