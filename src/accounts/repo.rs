use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::accounts::repo_types::{Account, NewAccount};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account not found")]
    NotFound,
    #[error("account number already taken")]
    Conflict,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Conflict,
            other => StoreError::Database(other),
        }
    }
}

/// Persistence capability for accounts. Handlers and the access guard only
/// see this trait, never the pool.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(&self, account: &NewAccount) -> Result<Account, StoreError>;
    async fn delete(&self, id: i32) -> Result<(), StoreError>;
    async fn update(&self, account: &Account) -> Result<(), StoreError>;
    async fn get_by_id(&self, id: i32) -> Result<Account, StoreError>;
    async fn get_by_number(&self, number: i64) -> Result<Account, StoreError>;
    async fn get_all(&self) -> Result<Vec<Account>, StoreError>;
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create the account table if it does not exist yet.
    pub async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS account (
                id                 SERIAL PRIMARY KEY,
                first_name         VARCHAR(50) NOT NULL,
                last_name          VARCHAR(50) NOT NULL,
                number             BIGINT NOT NULL UNIQUE,
                encrypted_password TEXT NOT NULL,
                balance            BIGINT NOT NULL DEFAULT 0,
                created_at         TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: &NewAccount) -> Result<Account, StoreError> {
        let created = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO account (first_name, last_name, number, encrypted_password, balance, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, first_name, last_name, number, encrypted_password, balance, created_at
            "#,
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.number)
        .bind(&account.encrypted_password)
        .bind(account.balance)
        .bind(account.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(created)
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM account WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE account
               SET first_name = $2, last_name = $3, balance = $4
             WHERE id = $1
            "#,
        )
        .bind(account.id)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.balance)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Account, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, first_name, last_name, number, encrypted_password, balance, created_at
            FROM account
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        Ok(account)
    }

    async fn get_by_number(&self, number: i64) -> Result<Account, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, first_name, last_name, number, encrypted_password, balance, created_at
            FROM account
            WHERE number = $1
            "#,
        )
        .bind(number)
        .fetch_one(&self.db)
        .await?;
        Ok(account)
    }

    async fn get_all(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, first_name, last_name, number, encrypted_password, balance, created_at
            FROM account
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
    }

    #[test]
    fn other_errors_stay_database_errors() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Database(_)));
        assert!(err.to_string().starts_with("database error"));
    }
}
