use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::auth::password::{hash_password, PasswordError};

/// Upper bound (exclusive) for randomly drawn account numbers.
pub const ACCOUNT_NUMBER_SPACE: i64 = 1_000_000;

/// Account record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: i32, // store-assigned
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub number: i64, // externally visible, unique
    #[serde(skip_serializing, default)]
    pub encrypted_password: String, // Argon2 hash, not exposed in JSON
    pub balance: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// An account that has not been persisted yet, so it has no id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub encrypted_password: String,
    pub balance: i64,
    pub created_at: OffsetDateTime,
}

impl NewAccount {
    pub fn new(first_name: &str, last_name: &str, password: &str) -> Result<Self, PasswordError> {
        Ok(Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            number: random_account_number(),
            encrypted_password: hash_password(password)?,
            balance: 0,
            created_at: OffsetDateTime::now_utc(),
        })
    }

    /// Draws a fresh number, used when the store reports a collision.
    pub fn renumber(&mut self) {
        self.number = random_account_number();
    }
}

fn random_account_number() -> i64 {
    rand::thread_rng().gen_range(0..ACCOUNT_NUMBER_SPACE)
}
