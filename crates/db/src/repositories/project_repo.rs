//! Repository for the `projects` table and project membership.

use deposit_core::types::DbId;
use sqlx::PgPool;
use validator::Validate;

use crate::error::DbError;
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::user::User;
use crate::repositories::user_repo::USER_SELECT;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, contact_name, contact_phone, contact_email, shipping_address, \
     received_policy, network_transfer_type, shipment_transfer_type, created_at, updated_at";

/// [`COLUMNS`] qualified with the `p` alias, for joins.
pub(crate) const PREFIXED_COLUMNS: &str = "p.id, p.name, p.contact_name, p.contact_phone, \
     p.contact_email, p.shipping_address, p.received_policy, p.network_transfer_type, \
     p.shipment_transfer_type, p.created_at, p.updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, DbError> {
        input.validate()?;
        input.validate_choices()?;

        let query = format!(
            "INSERT INTO projects (name, contact_name, contact_phone, contact_email,
                shipping_address, received_policy, network_transfer_type,
                shipment_transfer_type, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.contact_name)
            .bind(&input.contact_phone)
            .bind(&input.contact_email)
            .bind(&input.shipping_address)
            .bind(&input.received_policy)
            .bind(input.network_transfer_type.map(|t| t.as_str()))
            .bind(input.shipment_transfer_type.map(|t| t.as_str()))
            .fetch_one(pool)
            .await?;

        tracing::info!(project_id = project.id, name = %project.name, "Project created");
        Ok(project)
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY name, id");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, DbError> {
        input.validate()?;
        input.validate_choices()?;

        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                contact_name = COALESCE($3, contact_name),
                contact_phone = COALESCE($4, contact_phone),
                contact_email = COALESCE($5, contact_email),
                shipping_address = COALESCE($6, shipping_address),
                received_policy = COALESCE($7, received_policy),
                network_transfer_type = COALESCE($8, network_transfer_type),
                shipment_transfer_type = COALESCE($9, shipment_transfer_type),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.contact_name)
            .bind(&input.contact_phone)
            .bind(&input.contact_email)
            .bind(&input.shipping_address)
            .bind(&input.received_policy)
            .bind(input.network_transfer_type.map(|t| t.as_str()))
            .bind(input.shipment_transfer_type.map(|t| t.as_str()))
            .fetch_optional(pool)
            .await?;
        Ok(project)
    }

    /// Add a depositor to a project. Returns `false` if already a member.
    pub async fn add_user(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO project_users (project_id, user_id, created_at, updated_at)
             VALUES ($1, $2, NOW(), NOW())
             ON CONFLICT (project_id, user_id) DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a depositor from a project. Returns `true` if a membership was removed.
    pub async fn remove_user(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM project_users WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a project's depositors ordered by username.
    pub async fn list_users(pool: &PgPool, project_id: DbId) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "{USER_SELECT}
             JOIN project_users pu ON pu.user_id = u.account_id
             WHERE pu.project_id = $1
             ORDER BY a.username"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
