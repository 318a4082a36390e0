//! Missing-item recovery integration tests

mod common;

use common::{api_for, manager, staff};
use serde_json::json;
use shared::models::{RecoveryTarget, SerialReceiptStatus};
use stockroom_client::workflows::RecoveryDesk;
use stockroom_client::{ClientError, ResourceKind};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_receipts(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/ReceivedTransfers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 70,
                "transferId": 31,
                "fromLocationId": 1,
                "fromLocationName": "Main Warehouse",
                "toLocationId": 2,
                "toLocationName": "Downtown Store",
                "receivedDate": "2024-05-04T10:00:00Z",
                "items": [
                    {
                        "id": 1,
                        "productId": 10,
                        "productName": "Paper Bags",
                        "hasSerial": false,
                        "quantity": 5,
                        "receivedQuantity": 3,
                        "missingQuantity": 2
                    },
                    {
                        "id": 2,
                        "productId": 20,
                        "productName": "Handheld Scanner",
                        "hasSerial": true,
                        "quantity": 2,
                        "receivedQuantity": 1,
                        "missingQuantity": 1,
                        "serials": [
                            { "serialNumberId": 501, "serialNumber": "SC-001", "status": "Received" },
                            { "serialNumberId": 502, "serialNumber": "SC-002", "status": "Missing" }
                        ]
                    }
                ]
            },
            {
                "id": 71,
                "transferId": 33,
                "fromLocationId": 1,
                "toLocationId": 3,
                "receivedDate": "2024-05-05T10:00:00Z",
                "items": [
                    {
                        "id": 3,
                        "productId": 10,
                        "quantity": 1,
                        "receivedQuantity": 1,
                        "missingQuantity": 0
                    }
                ]
            }
        ])))
        .mount(server)
        .await;
}

async fn desk(server: &MockServer) -> RecoveryDesk {
    let (api, bus) = api_for(server).await;
    let mut desk = RecoveryDesk::new(api, bus);
    desk.refresh().await.unwrap();
    desk
}

#[tokio::test]
async fn test_outstanding_lists_only_short_receipts() {
    let server = MockServer::start().await;
    mount_receipts(&server).await;
    let desk = desk(&server).await;

    let ids: Vec<i64> = desk.outstanding().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![70]);
}

#[tokio::test]
async fn test_quantity_recovery_confirms_then_sends() {
    let server = MockServer::start().await;
    mount_receipts(&server).await;
    Mock::given(method("POST"))
        .and(path("/ReceivedTransfers/70/items/1/recover"))
        .and(body_partial_json(json!({
            "quantity": 2,
            "target": "origin",
            "recoveredBy": "Dana"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let (api, bus) = api_for(&server).await;
    let mut watcher = bus.subscribe(&[ResourceKind::Inventory]);
    let mut desk = RecoveryDesk::new(api, bus);
    desk.refresh().await.unwrap();

    let confirmation = desk
        .plan_quantity(70, 1, 2, RecoveryTarget::Origin)
        .unwrap();
    assert_eq!(confirmation, "Recover 2 x Paper Bags to Main Warehouse (origin)?");
    assert_eq!(desk.preview().unwrap().missing_quantity, 0);

    desk.confirm(&manager()).await.unwrap();
    assert!(desk.pending().is_none());
    assert!(watcher.take_pending());
    assert!(desk.outstanding()[0].items[0].missing_quantity == 0);
}

#[tokio::test]
async fn test_quantity_above_missing_is_refused_locally() {
    let server = MockServer::start().await;
    mount_receipts(&server).await;
    let mut desk = desk(&server).await;

    let err = desk
        .plan_quantity(70, 1, 3, RecoveryTarget::Destination)
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(desk.pending().is_none());
}

#[tokio::test]
async fn test_serial_recovery_to_destination() {
    let server = MockServer::start().await;
    mount_receipts(&server).await;
    Mock::given(method("POST"))
        .and(path("/ReceivedTransfers/70/items/2/serials/502/found"))
        .and(body_partial_json(json!({ "target": "destination" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let mut desk = desk(&server).await;

    let confirmation = desk
        .plan_serial(70, 2, 502, RecoveryTarget::Destination)
        .unwrap();
    assert!(confirmation.contains("SC-002"));
    assert!(confirmation.contains("Downtown Store"));

    let preview = desk.preview().unwrap();
    assert_eq!(preview.serials[1].status, SerialReceiptStatus::Received);
    assert_eq!(preview.received_quantity, 2);

    desk.confirm(&manager()).await.unwrap();
}

#[tokio::test]
async fn test_cancelled_plan_sends_nothing() {
    let server = MockServer::start().await;
    mount_receipts(&server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let mut desk = desk(&server).await;

    desk.plan_quantity(70, 1, 1, RecoveryTarget::Origin).unwrap();
    desk.cancel_plan();
    assert!(desk.confirm(&manager()).await.is_err());
}

#[tokio::test]
async fn test_recovery_requires_capability() {
    let server = MockServer::start().await;
    mount_receipts(&server).await;
    let mut desk = desk(&server).await;

    desk.plan_quantity(70, 1, 1, RecoveryTarget::Origin).unwrap();
    let clerk = staff("stock_clerk");
    assert!(desk.confirm(&clerk).await.is_err());
    assert!(desk.pending().is_some());
}
