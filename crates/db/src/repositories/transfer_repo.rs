//! Repository for transfers and their detail tables.

use chrono::Utc;
use deposit_core::error::CoreError;
use deposit_core::lccn;
use deposit_core::package::validate_package_ids;
use deposit_core::transfer_type::TransferKind;
use deposit_core::types::{DbId, Timestamp};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::DbError;
use crate::models::transfer::{
    CreateNetworkDetails, CreateShipmentDetails, CreateTransfer, NdnpDetails, NetworkDetails,
    NewTransferDetails, ShipmentDetails, Transfer, TransferDetails, TransferRecord,
    UpdateNetworkDetails, UpdateShipmentDetails, UpdateTransfer,
};

/// Column list for `transfers` queries.
const COLUMNS: &str = "id, uuid, transfer_type, package_ids, user_id, project_id, \
     received, received_by, created_at, updated_at";

const NETWORK_COLUMNS: &str =
    "transfer_id, location, username, password, estimated_size, created_at, updated_at";

const SHIPMENT_COLUMNS: &str = "transfer_id, ship_date, ship_method, ship_tracking_number, \
     media_type, media_identifiers, number_media_shipped, addl_equipment, created_at, updated_at";

const NDNP_COLUMNS: &str = "transfer_id, lccns, created_at, updated_at";

/// Provides create, read, update and receipt operations for transfers.
///
/// Transfers are never deleted.
pub struct TransferRepo;

impl TransferRepo {
    /// Insert a transfer with its delivery payload, returning the full record.
    ///
    /// The subtype is derived from the payload and written once. A fresh v4
    /// UUID is assigned. LCCNs are normalized before storage.
    pub async fn create(pool: &PgPool, input: &CreateTransfer) -> Result<TransferRecord, DbError> {
        input.validate()?;
        input.details.validate()?;
        validate_package_ids(&input.package_ids)?;
        let lccns = input
            .details
            .ndnp()
            .map(|ndnp| lccn::format_lccns(&ndnp.lccns))
            .transpose()?;

        let transfer_type = input.transfer_type();
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO transfers (uuid, transfer_type, package_ids, user_id, project_id,
                created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
             RETURNING {COLUMNS}"
        );
        let transfer = sqlx::query_as::<_, Transfer>(&query)
            .bind(Uuid::new_v4())
            .bind(transfer_type.as_str())
            .bind(&input.package_ids)
            .bind(input.user_id)
            .bind(input.project_id)
            .fetch_one(&mut *tx)
            .await?;

        let ndnp = match &lccns {
            Some(lccns) => Some(Self::insert_ndnp(&mut tx, transfer.id, lccns).await?),
            None => None,
        };
        let details = match &input.details {
            NewTransferDetails::Network { network, .. } => TransferDetails::Network {
                network: Self::insert_network(&mut tx, transfer.id, network).await?,
                ndnp,
            },
            NewTransferDetails::Shipment { shipment, .. } => TransferDetails::Shipment {
                shipment: Self::insert_shipment(&mut tx, transfer.id, shipment).await?,
                ndnp,
            },
        };

        tx.commit().await?;
        tracing::info!(
            transfer_id = transfer.id,
            uuid = %transfer.uuid,
            transfer_type = %transfer_type,
            project_id = transfer.project_id,
            "Transfer created"
        );
        Ok(TransferRecord { transfer, details })
    }

    /// Find a transfer by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Transfer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transfers WHERE id = $1");
        sqlx::query_as::<_, Transfer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_uuid(
        pool: &PgPool,
        uuid: Uuid,
    ) -> Result<Option<Transfer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transfers WHERE uuid = $1");
        sqlx::query_as::<_, Transfer>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    /// Load a transfer with its delivery payload.
    ///
    /// A transfer whose detail rows are missing is reported as an internal
    /// error rather than silently returned without a payload.
    pub async fn find_record(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TransferRecord>, DbError> {
        let Some(transfer) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let transfer_type = transfer.transfer_type()?;

        let ndnp = if transfer_type.is_ndnp() {
            let query =
                format!("SELECT {NDNP_COLUMNS} FROM ndnp_transfers WHERE transfer_id = $1");
            let row = sqlx::query_as::<_, NdnpDetails>(&query)
                .bind(id)
                .fetch_optional(pool)
                .await?;
            Some(row.ok_or_else(|| missing_detail(id, "ndnp_transfers"))?)
        } else {
            None
        };

        let details = match transfer_type.kind() {
            TransferKind::Network => {
                let query = format!(
                    "SELECT {NETWORK_COLUMNS} FROM network_transfers WHERE transfer_id = $1"
                );
                let network = sqlx::query_as::<_, NetworkDetails>(&query)
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
                    .ok_or_else(|| missing_detail(id, "network_transfers"))?;
                TransferDetails::Network { network, ndnp }
            }
            TransferKind::Shipment => {
                let query = format!(
                    "SELECT {SHIPMENT_COLUMNS} FROM shipment_transfers WHERE transfer_id = $1"
                );
                let shipment = sqlx::query_as::<_, ShipmentDetails>(&query)
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
                    .ok_or_else(|| missing_detail(id, "shipment_transfers"))?;
                TransferDetails::Shipment { shipment, ndnp }
            }
        };

        Ok(Some(TransferRecord { transfer, details }))
    }

    /// List a project's transfers, most recently created first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Transfer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transfers WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Transfer>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// List transfers initiated by a depositor, most recently created first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Transfer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transfers WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Transfer>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List a project's transfers that have not been received, oldest first.
    pub async fn list_unreceived(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Transfer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transfers WHERE project_id = $1 AND received IS NULL
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Transfer>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update the base transfer row. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTransfer,
    ) -> Result<Option<Transfer>, DbError> {
        input.validate()?;
        if let Some(package_ids) = &input.package_ids {
            validate_package_ids(package_ids)?;
        }

        let query = format!(
            "UPDATE transfers SET
                package_ids = COALESCE($2, package_ids),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let transfer = sqlx::query_as::<_, Transfer>(&query)
            .bind(id)
            .bind(&input.package_ids)
            .fetch_optional(pool)
            .await?;
        Ok(transfer)
    }

    /// Update a network payload. Returns `None` if the transfer has none.
    pub async fn update_network(
        pool: &PgPool,
        transfer_id: DbId,
        input: &UpdateNetworkDetails,
    ) -> Result<Option<NetworkDetails>, DbError> {
        input.validate()?;

        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE network_transfers SET
                location = COALESCE($2, location),
                username = COALESCE($3, username),
                password = COALESCE($4, password),
                estimated_size = COALESCE($5, estimated_size),
                updated_at = NOW()
             WHERE transfer_id = $1
             RETURNING {NETWORK_COLUMNS}"
        );
        let network = sqlx::query_as::<_, NetworkDetails>(&query)
            .bind(transfer_id)
            .bind(&input.location)
            .bind(&input.username)
            .bind(&input.password)
            .bind(input.estimated_size)
            .fetch_optional(&mut *tx)
            .await?;

        if network.is_some() {
            Self::touch(&mut tx, transfer_id).await?;
        }
        tx.commit().await?;
        Ok(network)
    }

    /// Update a shipment payload. Returns `None` if the transfer has none.
    pub async fn update_shipment(
        pool: &PgPool,
        transfer_id: DbId,
        input: &UpdateShipmentDetails,
    ) -> Result<Option<ShipmentDetails>, DbError> {
        input.validate()?;

        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE shipment_transfers SET
                ship_date = COALESCE($2, ship_date),
                ship_method = COALESCE($3, ship_method),
                ship_tracking_number = COALESCE($4, ship_tracking_number),
                media_type = COALESCE($5, media_type),
                media_identifiers = COALESCE($6, media_identifiers),
                number_media_shipped = COALESCE($7, number_media_shipped),
                addl_equipment = COALESCE($8, addl_equipment),
                updated_at = NOW()
             WHERE transfer_id = $1
             RETURNING {SHIPMENT_COLUMNS}"
        );
        let shipment = sqlx::query_as::<_, ShipmentDetails>(&query)
            .bind(transfer_id)
            .bind(input.ship_date)
            .bind(&input.ship_method)
            .bind(&input.ship_tracking_number)
            .bind(input.media_type.map(|m| m.as_str()))
            .bind(&input.media_identifiers)
            .bind(input.number_media_shipped)
            .bind(&input.addl_equipment)
            .fetch_optional(&mut *tx)
            .await?;

        if shipment.is_some() {
            Self::touch(&mut tx, transfer_id).await?;
        }
        tx.commit().await?;
        Ok(shipment)
    }

    /// Replace the LCCN list of an NDNP transfer. Returns `None` if the
    /// transfer is not an NDNP transfer.
    pub async fn update_lccns(
        pool: &PgPool,
        transfer_id: DbId,
        lccns: &str,
    ) -> Result<Option<NdnpDetails>, DbError> {
        let normalized = lccn::format_lccns(lccns)?;

        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE ndnp_transfers SET lccns = $2, updated_at = NOW()
             WHERE transfer_id = $1
             RETURNING {NDNP_COLUMNS}"
        );
        let ndnp = sqlx::query_as::<_, NdnpDetails>(&query)
            .bind(transfer_id)
            .bind(&normalized)
            .fetch_optional(&mut *tx)
            .await?;

        if ndnp.is_some() {
            Self::touch(&mut tx, transfer_id).await?;
        }
        tx.commit().await?;
        Ok(ndnp)
    }

    /// Persist a receipt recorded in memory with
    /// [`Transfer::update_received`].
    ///
    /// The write only applies while the stored row is still unreceived, so a
    /// receipt that raced ahead of this one is reported as
    /// [`CoreError::AlreadyReceived`] instead of being overwritten.
    pub async fn save_receipt(pool: &PgPool, transfer: &Transfer) -> Result<Transfer, DbError> {
        let (Some(received), Some(received_by)) = (transfer.received, transfer.received_by) else {
            return Err(CoreError::Validation(format!(
                "Transfer {} has no receipt to save",
                transfer.id
            ))
            .into());
        };
        Self::write_receipt(pool, transfer.id, received_by, received).await
    }

    /// Mark a stored transfer received by `account_id` now.
    pub async fn mark_received(
        pool: &PgPool,
        id: DbId,
        account_id: DbId,
    ) -> Result<Transfer, DbError> {
        Self::write_receipt(pool, id, account_id, Utc::now()).await
    }

    async fn write_receipt(
        pool: &PgPool,
        id: DbId,
        account_id: DbId,
        received: Timestamp,
    ) -> Result<Transfer, DbError> {
        let query = format!(
            "UPDATE transfers SET
                received = $2,
                received_by = $3,
                updated_at = NOW()
             WHERE id = $1 AND received IS NULL
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Transfer>(&query)
            .bind(id)
            .bind(received)
            .bind(account_id)
            .fetch_optional(pool)
            .await?;

        if let Some(transfer) = updated {
            tracing::info!(transfer_id = id, received_by = account_id, "Transfer received");
            return Ok(transfer);
        }

        match Self::find_by_id(pool, id).await? {
            Some(_) => {
                tracing::warn!(transfer_id = id, account_id, "Transfer already received");
                Err(CoreError::AlreadyReceived { transfer_id: id }.into())
            }
            None => Err(CoreError::NotFound {
                entity: "transfer",
                id,
            }
            .into()),
        }
    }

    async fn insert_network(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        transfer_id: DbId,
        input: &CreateNetworkDetails,
    ) -> Result<NetworkDetails, sqlx::Error> {
        let query = format!(
            "INSERT INTO network_transfers (transfer_id, location, username, password,
                estimated_size, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
             RETURNING {NETWORK_COLUMNS}"
        );
        sqlx::query_as::<_, NetworkDetails>(&query)
            .bind(transfer_id)
            .bind(&input.location)
            .bind(&input.username)
            .bind(&input.password)
            .bind(input.estimated_size)
            .fetch_one(&mut **tx)
            .await
    }

    async fn insert_shipment(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        transfer_id: DbId,
        input: &CreateShipmentDetails,
    ) -> Result<ShipmentDetails, sqlx::Error> {
        let query = format!(
            "INSERT INTO shipment_transfers (transfer_id, ship_date, ship_method,
                ship_tracking_number, media_type, media_identifiers, number_media_shipped,
                addl_equipment, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
             RETURNING {SHIPMENT_COLUMNS}"
        );
        sqlx::query_as::<_, ShipmentDetails>(&query)
            .bind(transfer_id)
            .bind(input.ship_date)
            .bind(&input.ship_method)
            .bind(&input.ship_tracking_number)
            .bind(input.media_type.as_str())
            .bind(&input.media_identifiers)
            .bind(input.number_media_shipped)
            .bind(&input.addl_equipment)
            .fetch_one(&mut **tx)
            .await
    }

    async fn insert_ndnp(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        transfer_id: DbId,
        lccns: &str,
    ) -> Result<NdnpDetails, sqlx::Error> {
        let query = format!(
            "INSERT INTO ndnp_transfers (transfer_id, lccns, created_at, updated_at)
             VALUES ($1, $2, NOW(), NOW())
             RETURNING {NDNP_COLUMNS}"
        );
        sqlx::query_as::<_, NdnpDetails>(&query)
            .bind(transfer_id)
            .bind(lccns)
            .fetch_one(&mut **tx)
            .await
    }

    /// Bump the base row's `updated_at` after a detail-table change.
    async fn touch(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        transfer_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE transfers SET updated_at = NOW() WHERE id = $1")
            .bind(transfer_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

fn missing_detail(transfer_id: DbId, table: &str) -> CoreError {
    CoreError::Internal(format!("Transfer {transfer_id} has no {table} row"))
}
