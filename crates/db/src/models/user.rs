//! Depositor user model and DTOs.

use deposit_core::paths;
use deposit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::account::CreateAccount;

/// A depositor: an account joined with its `users` profile row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub account_id: DbId,
    pub username: String,
    pub email: String,
    pub organization: String,
    pub address: String,
    pub phone: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn url(&self) -> String {
        paths::user_path(&self.username)
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}

/// DTO for creating a depositor together with its account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[serde(flatten)]
    pub account: CreateAccount,
    #[validate(length(max = 150))]
    pub organization: String,
    #[validate(length(max = 255))]
    pub address: String,
    #[validate(length(max = 10))]
    pub phone: String,
}

/// DTO for updating a depositor profile. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(max = 150))]
    pub organization: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 10))]
    pub phone: Option<String>,
}
