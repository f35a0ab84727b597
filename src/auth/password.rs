use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::accounts::repo_types::Account;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("could not hash account password: {0}")]
    Hash(password_hash::Error),
    #[error("stored password hash of account {account_id} is unreadable: {cause}")]
    CorruptHash {
        account_id: i32,
        cause: password_hash::Error,
    },
}

/// Salted Argon2id hash in PHC string form, as stored in `encrypted_password`.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

impl Account {
    /// `Ok(false)` on a wrong password; `Err` only when the stored hash
    /// cannot be parsed.
    pub fn password_matches(&self, plain: &str) -> Result<bool, PasswordError> {
        let stored =
            PasswordHash::new(&self.encrypted_password).map_err(|cause| PasswordError::CorruptHash {
                account_id: self.id,
                cause,
            })?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &stored)
            .is_ok())
    }
}
