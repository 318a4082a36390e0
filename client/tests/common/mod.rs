//! Fixtures shared by the client integration tests

#![allow(dead_code)]

use std::collections::BTreeSet;

use serde_json::{json, Value};
use shared::models::{default_roles, Capability, Role, SessionUser};
use stockroom_client::{ApiClient, AppSession, InvalidationBus};
use wiremock::MockServer;

pub fn session_with(capabilities: &[Capability]) -> AppSession {
    AppSession::new(
        SessionUser {
            user_id: 12,
            name: "Dana".to_string(),
            role_id: 2,
            location_id: Some(1),
            location_name: Some("Main Warehouse".to_string()),
        },
        Role {
            id: 2,
            name: "Manager".to_string(),
            capabilities: capabilities.iter().copied().collect::<BTreeSet<_>>(),
        },
    )
}

pub fn manager() -> AppSession {
    session_with(&Capability::ALL)
}

/// Session for one of the stock staff roles
pub fn staff(role: &str) -> AppSession {
    let capabilities = default_roles()
        .into_iter()
        .find(|(name, _)| *name == role)
        .map(|(_, capabilities)| capabilities)
        .unwrap_or_else(|| panic!("no default role named {}", role));
    session_with(&capabilities)
}

pub async fn api_for(server: &MockServer) -> (ApiClient, InvalidationBus) {
    (ApiClient::with_base_url(server.uri()), InvalidationBus::default())
}

pub fn stock_row(product_id: i64, name: &str, count: i64, has_serial: bool) -> Value {
    json!({
        "productId": product_id,
        "productName": name,
        "locationId": 1,
        "uomId": 1,
        "uomName": "pcs",
        "stockCount": count,
        "hasSerial": has_serial
    })
}

pub fn serial(id: i64, number: &str) -> Value {
    json!({
        "id": id,
        "serialNumber": number,
        "batchName": "MAR-A",
        "productId": 20,
        "locationId": 1
    })
}

pub fn in_transit_transfer(id: i64, date: &str) -> Value {
    json!({
        "id": id,
        "fromLocationId": 1,
        "fromLocationName": "Main Warehouse",
        "toLocationId": 2,
        "toLocationName": "Downtown Store",
        "transferredDate": date,
        "status": "In Transit",
        "releaseBy": "Alex",
        "items": [
            {
                "id": 1,
                "productId": 10,
                "productName": "Paper Bags",
                "quantity": 5,
                "hasSerial": false,
                "serialNumberIds": []
            },
            {
                "id": 2,
                "productId": 20,
                "productName": "Handheld Scanner",
                "quantity": 2,
                "hasSerial": true,
                "serialNumberIds": [501, 502]
            }
        ]
    })
}
