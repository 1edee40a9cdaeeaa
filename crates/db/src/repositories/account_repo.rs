//! Repository for the `accounts` table.

use deposit_core::types::DbId;
use sqlx::PgPool;
use validator::Validate;

use crate::error::DbError;
use crate::models::account::{Account, CreateAccount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, username, email, first_name, last_name, is_active, created_at, updated_at";

/// Provides CRUD operations for accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAccount) -> Result<Account, DbError> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        let account = Self::insert(&mut tx, input).await?;
        tx.commit().await?;
        Ok(account)
    }

    /// Find an account by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE username = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Insert inside an open transaction. Input must already be validated.
    pub(crate) async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateAccount,
    ) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (username, email, first_name, last_name, created_at, updated_at)
             VALUES ($1, $2, $3, $4, NOW(), NOW())
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .fetch_one(&mut **tx)
            .await
    }
}
