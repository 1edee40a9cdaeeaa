//! Repository for depositor users (`users` joined with `accounts`).

use deposit_core::types::DbId;
use sqlx::PgPool;
use validator::Validate;

use crate::error::DbError;
use crate::models::project::Project;
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::repositories::account_repo::AccountRepo;
use crate::repositories::project_repo;

/// Select clause producing [`User`] rows. Callers append `WHERE`/`ORDER BY`.
pub(crate) const USER_SELECT: &str = "SELECT u.account_id, a.username, a.email, \
     u.organization, u.address, u.phone, u.created_at, u.updated_at \
     FROM users u JOIN accounts a ON a.id = u.account_id";

/// Provides CRUD operations for depositor users.
pub struct UserRepo;

impl UserRepo {
    /// Create an account and its depositor profile in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, DbError> {
        input.account.validate()?;
        input.validate()?;

        let mut tx = pool.begin().await?;
        let account = AccountRepo::insert(&mut tx, &input.account).await?;

        sqlx::query(
            "INSERT INTO users (account_id, organization, address, phone, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW())",
        )
        .bind(account.id)
        .bind(&input.organization)
        .bind(&input.address)
        .bind(&input.phone)
        .execute(&mut *tx)
        .await?;

        let query = format!("{USER_SELECT} WHERE u.account_id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(account.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(account_id = user.account_id, username = %user.username, "User created");
        Ok(user)
    }

    /// Find a depositor by account ID.
    pub async fn find_by_id(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("{USER_SELECT} WHERE u.account_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("{USER_SELECT} WHERE a.username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// List all depositors ordered by username.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("{USER_SELECT} ORDER BY a.username");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Update a depositor profile. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no depositor with the given account ID exists.
    pub async fn update(
        pool: &PgPool,
        account_id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, DbError> {
        input.validate()?;

        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE users SET
                organization = COALESCE($2, organization),
                address = COALESCE($3, address),
                phone = COALESCE($4, phone),
                updated_at = NOW()
             WHERE account_id = $1
             RETURNING account_id",
        )
        .bind(account_id)
        .bind(&input.organization)
        .bind(&input.address)
        .bind(&input.phone)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => Ok(Self::find_by_id(pool, id).await?),
            None => Ok(None),
        }
    }

    /// List the projects a depositor belongs to, ordered by name.
    pub async fn list_projects(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects p
             JOIN project_users pu ON pu.project_id = p.id
             WHERE pu.user_id = $1
             ORDER BY p.name",
            project_repo::PREFIXED_COLUMNS
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }
}
