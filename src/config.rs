use thiserror::Error;

use crate::application::CheckoutSettings;
use crate::infrastructure::stripe::client::STRIPE_API_BASE;
use crate::infrastructure::stripe::signature::DEFAULT_TOLERANCE_SECS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base: String,
    pub webhook_tolerance_secs: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let or_default =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let port = or_default("PORT", "5000");
        let port = port.parse::<u16>().map_err(|_| ConfigError::Invalid {
            name: "PORT",
            value: port.clone(),
        })?;

        let tolerance = or_default("WEBHOOK_TOLERANCE_SECS", &DEFAULT_TOLERANCE_SECS.to_string());
        let webhook_tolerance_secs = tolerance
            .parse::<i64>()
            .ok()
            .filter(|t| *t > 0)
            .ok_or_else(|| ConfigError::Invalid {
                name: "WEBHOOK_TOLERANCE_SECS",
                value: tolerance.clone(),
            })?;

        let currency = or_default("CHECKOUT_CURRENCY", "inr").to_ascii_lowercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid {
                name: "CHECKOUT_CURRENCY",
                value: currency,
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: or_default("HOST", "0.0.0.0"),
            port,
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
            stripe_api_base: or_default("STRIPE_API_BASE", STRIPE_API_BASE),
            webhook_tolerance_secs,
            currency,
            success_url: or_default("CHECKOUT_SUCCESS_URL", "http://localhost:3000/success"),
            cancel_url: or_default("CHECKOUT_CANCEL_URL", "http://localhost:3000/cancel"),
        })
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            currency: self.currency.clone(),
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
        }
    }
}
