use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub postal_code: String,
    pub city: String,
    pub state: String,
    /// ISO 3166-1 alpha-2 country code, e.g. "IN".
    pub country: String,
}

/// Buyer identity supplied with a checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerDetails {
    pub name: String,
    pub address: Address,
}

/// Column widths of the `customers` table, in characters.
pub const MAX_TEXT_LEN: usize = 255;
pub const MAX_POSTAL_CODE_LEN: usize = 32;

impl BuyerDetails {
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("name", &self.name),
            ("address.line1", &self.address.line1),
            ("address.postal_code", &self.address.postal_code),
            ("address.city", &self.address.city),
            ("address.country", &self.address.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::InvalidInput(format!(
                    "customer {field} must not be blank"
                )));
            }
        }

        let bounded = [
            ("name", &self.name, MAX_TEXT_LEN),
            ("address.line1", &self.address.line1, MAX_TEXT_LEN),
            ("address.postal_code", &self.address.postal_code, MAX_POSTAL_CODE_LEN),
            ("address.city", &self.address.city, MAX_TEXT_LEN),
            ("address.state", &self.address.state, MAX_TEXT_LEN),
        ];
        for (field, value, max) in bounded {
            if value.chars().count() > max {
                return Err(DomainError::InvalidInput(format!(
                    "customer {field} must be at most {max} characters"
                )));
            }
        }

        // Stored as given, so surrounding whitespace is not tolerated here.
        let country = &self.address.country;
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidInput(format!(
                "customer address.country '{country}' is not a two-letter country code"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub details: BuyerDetails,
}

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: Uuid,
    pub details: BuyerDetails,
    /// Remote customer id assigned by the payment gateway, once registered.
    pub gateway_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
