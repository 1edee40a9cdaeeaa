//! Integration tests for transfer creation, updates and receipt.

use std::collections::HashSet;

use assert_matches::assert_matches;
use chrono::{NaiveDate, TimeZone, Utc};
use deposit_core::error::CoreError;
use deposit_core::transfer_type::{MediaType, TransferType};
use deposit_core::types::DbId;
use deposit_db::models::account::CreateAccount;
use deposit_db::models::project::CreateProject;
use deposit_db::models::transfer::{
    CreateNdnp, CreateNetworkDetails, CreateShipmentDetails, CreateTransfer, NewTransferDetails,
    TransferDetails, UpdateNetworkDetails, UpdateShipmentDetails, UpdateTransfer,
};
use deposit_db::models::user::CreateUser;
use deposit_db::repositories::{AccountRepo, ProjectRepo, TransferRepo, UserRepo};
use deposit_db::DbError;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    project_id: DbId,
    depositor_id: DbId,
    receiver_id: DbId,
}

async fn fixture(pool: &PgPool) -> Fixture {
    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            name: "Chronicling Ohio".to_string(),
            contact_name: "Pat Archivist".to_string(),
            contact_phone: "6142974444".to_string(),
            contact_email: "pat@example.org".to_string(),
            shipping_address: "800 E 17th Ave".to_string(),
            received_policy: "Received on media inventory.".to_string(),
            network_transfer_type: None,
            shipment_transfer_type: None,
        },
    )
    .await
    .unwrap();

    let depositor = UserRepo::create(
        pool,
        &CreateUser {
            account: CreateAccount {
                username: "depositor".to_string(),
                email: "depositor@example.org".to_string(),
                first_name: None,
                last_name: None,
            },
            organization: "Ohio History Connection".to_string(),
            address: "800 E 17th Ave".to_string(),
            phone: "6142974444".to_string(),
        },
    )
    .await
    .unwrap();

    let receiver = AccountRepo::create(
        pool,
        &CreateAccount {
            username: "receiver".to_string(),
            email: "receiver@example.org".to_string(),
            first_name: Some("Rae".to_string()),
            last_name: None,
        },
    )
    .await
    .unwrap();

    Fixture {
        project_id: project.id,
        depositor_id: depositor.account_id,
        receiver_id: receiver.id,
    }
}

fn network(location: &str) -> CreateNetworkDetails {
    CreateNetworkDetails {
        location: location.to_string(),
        username: Some("ftpuser".to_string()),
        password: Some("s3cret".to_string()),
        estimated_size: 120,
    }
}

fn dvd_shipment() -> CreateShipmentDetails {
    CreateShipmentDetails {
        ship_date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
        ship_method: "FedEx".to_string(),
        ship_tracking_number: "794612345678".to_string(),
        media_type: MediaType::Dvd,
        media_identifiers: None,
        number_media_shipped: 1,
        addl_equipment: None,
    }
}

fn new_transfer(fx: &Fixture, details: NewTransferDetails) -> CreateTransfer {
    CreateTransfer {
        package_ids: "batch_oh_alpha, batch_oh_beta".to_string(),
        user_id: fx.depositor_id,
        project_id: fx.project_id,
        details,
    }
}

fn ndnp(lccns: &str) -> Option<CreateNdnp> {
    Some(CreateNdnp {
        lccns: lccns.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transfer_type_matches_subtype(pool: PgPool) {
    let fx = fixture(&pool).await;
    let cases = [
        (
            NewTransferDetails::Network {
                network: network("https://example.org/a/"),
                ndnp: None,
            },
            TransferType::NetworkTransfer,
        ),
        (
            NewTransferDetails::Shipment {
                shipment: dvd_shipment(),
                ndnp: None,
            },
            TransferType::ShipmentTransfer,
        ),
        (
            NewTransferDetails::Network {
                network: network("https://example.org/b/"),
                ndnp: ndnp("sn83035143"),
            },
            TransferType::NdnpNetworkTransfer,
        ),
        (
            NewTransferDetails::Shipment {
                shipment: dvd_shipment(),
                ndnp: ndnp("sn84028490"),
            },
            TransferType::NdnpShipmentTransfer,
        ),
    ];

    for (details, expected) in cases {
        let record = TransferRepo::create(&pool, &new_transfer(&fx, details))
            .await
            .unwrap();
        assert_eq!(record.transfer.transfer_type, expected.as_str());
        assert_eq!(record.transfer.transfer_type().unwrap(), expected);
        assert_eq!(record.details.transfer_type(), expected);
        assert!(!record.transfer.is_received());
        assert_eq!(
            record.transfer.to_string(),
            format!("{} {}", expected.as_str(), record.transfer.id)
        );
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_uuids_are_unique(pool: PgPool) {
    let fx = fixture(&pool).await;
    let mut seen = HashSet::new();
    for _ in 0..5 {
        let details = NewTransferDetails::Shipment {
            shipment: dvd_shipment(),
            ndnp: None,
        };
        let record = TransferRepo::create(&pool, &new_transfer(&fx, details))
            .await
            .unwrap();
        assert!(seen.insert(record.transfer.uuid));

        let by_uuid = TransferRepo::find_by_uuid(&pool, record.transfer.uuid)
            .await
            .unwrap()
            .expect("transfer by uuid");
        assert_eq!(by_uuid.id, record.transfer.id);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_record_loads_payload(pool: PgPool) {
    let fx = fixture(&pool).await;
    let details = NewTransferDetails::Network {
        network: network("sftp://ingest.example.org/batch_oh_alpha"),
        ndnp: ndnp("sn 83035143, sn84-28490"),
    };
    let created = TransferRepo::create(&pool, &new_transfer(&fx, details))
        .await
        .unwrap();

    let record = TransferRepo::find_record(&pool, created.transfer.id)
        .await
        .unwrap()
        .expect("record exists");

    assert_matches!(
        &record.details,
        TransferDetails::Network { network, ndnp: Some(ndnp) } => {
            assert_eq!(network.location, "sftp://ingest.example.org/batch_oh_alpha");
            assert_eq!(network.estimated_size, 120);
            assert_eq!(ndnp.lccn_list(), vec!["sn83035143", "sn84028490"]);
        }
    );
    assert_eq!(
        record.transfer.package_id_list(),
        vec!["batch_oh_alpha", "batch_oh_beta"]
    );

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["details"]["kind"], "network");
    assert!(json["details"]["network"].get("password").is_none());

    assert!(TransferRepo::find_record(&pool, 999_999)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_lccn_rejected(pool: PgPool) {
    let fx = fixture(&pool).await;
    let details = NewTransferDetails::Shipment {
        shipment: dvd_shipment(),
        ndnp: ndnp("sn83035143, not-an-lccn"),
    };

    let result = TransferRepo::create(&pool, &new_transfer(&fx, details)).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));
    assert!(TransferRepo::list_for_project(&pool, fx.project_id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_payload_rejected(pool: PgPool) {
    let fx = fixture(&pool).await;
    let mut shipment = dvd_shipment();
    shipment.number_media_shipped = 0;
    let details = NewTransferDetails::Shipment {
        shipment,
        ndnp: None,
    };

    let result = TransferRepo::create(&pool, &new_transfer(&fx, details)).await;
    assert_matches!(result, Err(DbError::Validation(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_normalized_lccns_held_to_limit_on_create(pool: PgPool) {
    let fx = fixture(&pool).await;
    // 251 characters as entered, 460 once each serial is padded.
    let raw = ["n78-1"; 42].join(",");
    let details = NewTransferDetails::Network {
        network: network("sftp://depositor.example.org/batches"),
        ndnp: ndnp(&raw),
    };

    let result = TransferRepo::create(&pool, &new_transfer(&fx, details)).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));
    assert!(TransferRepo::list_for_project(&pool, fx.project_id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_lccns_held_to_limit(pool: PgPool) {
    let fx = fixture(&pool).await;
    let details = NewTransferDetails::Shipment {
        shipment: dvd_shipment(),
        ndnp: ndnp("sn83030214"),
    };
    let record = TransferRepo::create(&pool, &new_transfer(&fx, details))
        .await
        .unwrap();
    let id = record.transfer.id;

    let too_long = ["sn83030214"; 200].join(",");
    let result = TransferRepo::update_lccns(&pool, id, &too_long).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));

    let stored = TransferRepo::find_record(&pool, id)
        .await
        .unwrap()
        .expect("transfer exists");
    assert_eq!(
        stored.details.ndnp().map(|n| n.lccns.as_str()),
        Some("sn83030214")
    );
}

// ---------------------------------------------------------------------------
// Receipt
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dvd_shipment_received_once(pool: PgPool) {
    let fx = fixture(&pool).await;
    let details = NewTransferDetails::Shipment {
        shipment: dvd_shipment(),
        ndnp: None,
    };
    let record = TransferRepo::create(&pool, &new_transfer(&fx, details))
        .await
        .unwrap();
    let mut transfer = record.transfer;
    let at = Utc.with_ymd_and_hms(2026, 4, 9, 14, 30, 0).unwrap();

    transfer.update_received_at(fx.receiver_id, at).unwrap();
    let saved = TransferRepo::save_receipt(&pool, &transfer).await.unwrap();
    assert_eq!(saved.received, Some(at));
    assert_eq!(saved.received_by, Some(fx.receiver_id));

    let again = transfer.update_received_at(fx.receiver_id, Utc::now());
    assert_matches!(
        again,
        Err(CoreError::AlreadyReceived { transfer_id }) if transfer_id == transfer.id
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_copy_cannot_overwrite_receipt(pool: PgPool) {
    let fx = fixture(&pool).await;
    let details = NewTransferDetails::Network {
        network: network("https://example.org/c/"),
        ndnp: None,
    };
    let record = TransferRepo::create(&pool, &new_transfer(&fx, details))
        .await
        .unwrap();

    // Two callers load the same unreceived row.
    let mut first = record.transfer.clone();
    let mut second = record.transfer;
    let first_at = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
    first.update_received_at(fx.receiver_id, first_at).unwrap();
    second.update_received(fx.depositor_id).unwrap();

    TransferRepo::save_receipt(&pool, &first).await.unwrap();
    let result = TransferRepo::save_receipt(&pool, &second).await;
    assert_matches!(
        result,
        Err(DbError::Core(CoreError::AlreadyReceived { .. }))
    );

    let stored = TransferRepo::find_by_id(&pool, first.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.received, Some(first_at));
    assert_eq!(stored.received_by, Some(fx.receiver_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_received(pool: PgPool) {
    let fx = fixture(&pool).await;
    let details = NewTransferDetails::Shipment {
        shipment: dvd_shipment(),
        ndnp: ndnp("sn84028490"),
    };
    let record = TransferRepo::create(&pool, &new_transfer(&fx, details))
        .await
        .unwrap();
    let id = record.transfer.id;

    let unreceived = TransferRepo::list_unreceived(&pool, fx.project_id)
        .await
        .unwrap();
    assert_eq!(unreceived.len(), 1);

    let received = TransferRepo::mark_received(&pool, id, fx.receiver_id)
        .await
        .unwrap();
    assert!(received.received.is_some());
    assert_eq!(received.received_by, Some(fx.receiver_id));
    assert!(received.updated_at >= record.transfer.updated_at);

    let again = TransferRepo::mark_received(&pool, id, fx.depositor_id).await;
    assert_matches!(
        again,
        Err(DbError::Core(CoreError::AlreadyReceived { transfer_id })) if transfer_id == id
    );

    assert!(TransferRepo::list_unreceived(&pool, fx.project_id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_missing_transfer(pool: PgPool) {
    let fx = fixture(&pool).await;
    let result = TransferRepo::mark_received(&pool, 424_242, fx.receiver_id).await;
    assert_matches!(
        result,
        Err(DbError::Core(CoreError::NotFound { entity: "transfer", id: 424_242 }))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_save_receipt_requires_receipt(pool: PgPool) {
    let fx = fixture(&pool).await;
    let details = NewTransferDetails::Shipment {
        shipment: dvd_shipment(),
        ndnp: None,
    };
    let record = TransferRepo::create(&pool, &new_transfer(&fx, details))
        .await
        .unwrap();

    let result = TransferRepo::save_receipt(&pool, &record.transfer).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_updates_touch_transfer(pool: PgPool) {
    let fx = fixture(&pool).await;
    let details = NewTransferDetails::Shipment {
        shipment: dvd_shipment(),
        ndnp: ndnp("sn84028490"),
    };
    let record = TransferRepo::create(&pool, &new_transfer(&fx, details))
        .await
        .unwrap();
    let id = record.transfer.id;

    let shipment = TransferRepo::update_shipment(
        &pool,
        id,
        &UpdateShipmentDetails {
            media_type: Some(MediaType::ExternalHarddrive),
            addl_equipment: Some("USB 3 cable".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("shipment payload");
    assert_eq!(shipment.media_type().unwrap(), MediaType::ExternalHarddrive);
    assert_eq!(shipment.addl_equipment.as_deref(), Some("USB 3 cable"));
    assert_eq!(shipment.ship_method, "FedEx");

    let ndnp = TransferRepo::update_lccns(&pool, id, "sn84-28490\nsn83035143")
        .await
        .unwrap()
        .expect("ndnp payload");
    assert_eq!(ndnp.lccns, "sn84028490, sn83035143");

    // Not a network transfer.
    let none = TransferRepo::update_network(&pool, id, &UpdateNetworkDetails::default())
        .await
        .unwrap();
    assert!(none.is_none());

    let updated = TransferRepo::update(
        &pool,
        id,
        &UpdateTransfer {
            package_ids: Some("batch_oh_gamma".to_string()),
        },
    )
    .await
    .unwrap()
    .expect("transfer exists");
    assert_eq!(updated.package_ids, "batch_oh_gamma");
    assert_eq!(updated.transfer_type, "NdnpShipmentTransfer");
    assert_eq!(updated.uuid, record.transfer.uuid);
    assert!(updated.updated_at >= record.transfer.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_for_user_and_project(pool: PgPool) {
    let fx = fixture(&pool).await;
    for _ in 0..3 {
        let details = NewTransferDetails::Network {
            network: network("https://example.org/d/"),
            ndnp: None,
        };
        TransferRepo::create(&pool, &new_transfer(&fx, details))
            .await
            .unwrap();
    }

    let by_project = TransferRepo::list_for_project(&pool, fx.project_id)
        .await
        .unwrap();
    let by_user = TransferRepo::list_for_user(&pool, fx.depositor_id)
        .await
        .unwrap();
    assert_eq!(by_project.len(), 3);
    assert_eq!(
        by_project.iter().map(|t| t.id).collect::<Vec<_>>(),
        by_user.iter().map(|t| t.id).collect::<Vec<_>>()
    );
    assert!(by_project.windows(2).all(|w| w[0].id > w[1].id));
}
