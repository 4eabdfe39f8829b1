//! Patron (library member) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Patron row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patron {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub membership_date: DateTime<Utc>,
}

impl Patron {
    /// New member whose membership starts at `joined`
    pub fn register(data: CreatePatron, joined: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            membership_date: joined,
        }
    }

    pub fn apply(&mut self, data: UpdatePatron) {
        self.first_name = data.first_name;
        self.last_name = data.last_name;
        self.email = data.email;
    }
}

/// Patron as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatronDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub membership_date: DateTime<Utc>,
}

impl From<Patron> for PatronDto {
    fn from(patron: Patron) -> Self {
        Self {
            id: patron.id,
            first_name: patron.first_name,
            last_name: patron.last_name,
            email: patron.email,
            membership_date: patron.membership_date,
        }
    }
}

/// Create patron request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatron {
    #[validate(length(min = 1, max = 50, message = "First name is required (max 50 characters)"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required (max 50 characters)"))]
    pub last_name: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 256, message = "Email must be at most 256 characters")
    )]
    pub email: String,
}

/// Update patron request (full replacement)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatron {
    #[validate(length(min = 1, max = 50, message = "First name is required (max 50 characters)"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required (max 50 characters)"))]
    pub last_name: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 256, message = "Email must be at most 256 characters")
    )]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_email_rejected() {
        let data = CreatePatron {
            first_name: "Mariam".to_string(),
            last_name: "Barbakadze".to_string(),
            email: "not-an-email".to_string(),
        };
        let errors = data.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_valid_patron_accepted() {
        let data = CreatePatron {
            first_name: "Nika".to_string(),
            last_name: "K.".to_string(),
            email: "nika@example.com".to_string(),
        };
        assert!(data.validate().is_ok());

        let joined = Utc::now();
        let patron = Patron::register(data, joined);
        assert_eq!(patron.membership_date, joined);
        assert_eq!(patron.email, "nika@example.com");
    }
}
