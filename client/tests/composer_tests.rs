//! Transfer composer integration tests
//!
//! Covers:
//! - quantity bounded by available stock
//! - serialized auto-pick and manual picker swap
//! - submission, invalidation and the in-flight guard

mod common;

use common::{api_for, manager, serial, session_with, stock_row};
use proptest::prelude::*;
use serde_json::json;
use shared::models::Capability;
use shared::workflow::SubmitBlocker;
use stockroom_client::workflows::TransferComposer;
use stockroom_client::{ClientError, ResourceKind};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_source_stock(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/Products/stock-by-location/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            stock_row(10, "Paper Bags", 10, false),
            stock_row(20, "Handheld Scanner", 4, true),
            stock_row(30, "Gift Cards", 0, false)
        ])))
        .mount(server)
        .await;
}

async fn mount_scanner_serials(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/SerialNumbers/available"))
        .and(query_param("productId", "20"))
        .and(query_param("locationId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            serial(501, "SC-001"),
            serial(502, "SC-002"),
            serial(503, "SC-003"),
            serial(504, "SC-004")
        ])))
        .mount(server)
        .await;
}

async fn composer(server: &MockServer) -> TransferComposer {
    let (api, bus) = api_for(server).await;
    let mut composer = TransferComposer::new(api, bus);
    composer.select_source(1).await.unwrap();
    composer.select_destination(2);
    composer
}

// ============================================================================
// Unit Tests
// ============================================================================

#[tokio::test]
async fn test_quantity_over_available_is_rejected_and_prior_value_kept() {
    let server = MockServer::start().await;
    mount_source_stock(&server).await;
    let mut composer = composer(&server).await;

    composer.add_product(10).unwrap();
    let err = composer.set_quantity(10, 12).await.unwrap_err();
    assert_eq!(err.user_message(), "Only 10 available, cannot transfer 12");
    assert_eq!(composer.cart().line(10).unwrap().quantity, 0);

    assert_eq!(composer.set_quantity(10, 8).await.unwrap(), None);
    assert_eq!(composer.cart().line(10).unwrap().quantity, 8);
}

#[tokio::test]
async fn test_only_products_with_stock_are_offered() {
    let server = MockServer::start().await;
    mount_source_stock(&server).await;
    let mut composer = composer(&server).await;

    let names: Vec<&str> = composer
        .available_products("")
        .iter()
        .map(|s| s.product_name.as_str())
        .collect();
    assert_eq!(names, vec!["Handheld Scanner", "Paper Bags"]);
    assert!(composer.add_product(30).is_err());
}

#[tokio::test]
async fn test_serialized_auto_pick_then_manual_swap() {
    let server = MockServer::start().await;
    mount_source_stock(&server).await;
    mount_scanner_serials(&server).await;
    let mut composer = composer(&server).await;

    composer.add_product(20).unwrap();
    composer.set_quantity(20, 3).await.unwrap();
    assert_eq!(
        composer.cart().line(20).unwrap().selected_serial_ids,
        vec![501, 502, 503]
    );

    let mut picker = composer.open_picker(20).await.unwrap();
    picker.toggle(502);
    picker.toggle(504);
    composer.save_picker(20, &picker).unwrap();

    let line = composer.cart().line(20).unwrap();
    assert_eq!(line.quantity, 3);
    assert_eq!(line.selected_serial_ids, vec![501, 503, 504]);
    assert!(composer.cart().can_submit());
}

#[tokio::test]
async fn test_short_serial_lookup_keeps_line_blocked() {
    let server = MockServer::start().await;
    mount_source_stock(&server).await;
    Mock::given(method("GET"))
        .and(path("/SerialNumbers/available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([serial(501, "SC-001")])))
        .mount(&server)
        .await;
    let mut composer = composer(&server).await;

    composer.add_product(20).unwrap();
    let notice = composer.set_quantity(20, 2).await.unwrap();
    assert!(notice.is_some());
    assert!(composer.cart().blockers().iter().any(|b| matches!(
        b,
        SubmitBlocker::SerialCountMismatch { selected: 1, quantity: 2, .. }
    )));
}

#[tokio::test]
async fn test_submit_posts_request_clears_cart_and_invalidates() {
    let server = MockServer::start().await;
    mount_source_stock(&server).await;
    Mock::given(method("POST"))
        .and(path("/Transfers"))
        .and(body_partial_json(json!({
            "fromLocationId": 1,
            "toLocationId": 2,
            "releaseBy": "Dana",
            "items": [{ "productId": 10, "quantity": 8, "serialNumberIds": [] }]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 77 })))
        .expect(1)
        .mount(&server)
        .await;

    let (api, bus) = api_for(&server).await;
    let mut watcher = bus.subscribe(&[ResourceKind::Transfers]);
    let mut composer = TransferComposer::new(api, bus);
    composer.select_source(1).await.unwrap();
    composer.select_destination(2);
    composer.add_product(10).unwrap();
    composer.set_quantity(10, 8).await.unwrap();

    composer.submit(&manager()).await.unwrap();
    assert!(composer.cart().lines.is_empty());
    assert!(watcher.take_pending());
}

#[tokio::test]
async fn test_server_rejection_is_verbatim_and_cart_survives() {
    let server = MockServer::start().await;
    mount_source_stock(&server).await;
    Mock::given(method("POST"))
        .and(path("/Transfers"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Stock changed since the page loaded",
            "errors": { "items[0].quantity": ["Exceeds stock"] }
        })))
        .mount(&server)
        .await;
    let mut composer = composer(&server).await;
    composer.add_product(10).unwrap();
    composer.set_quantity(10, 8).await.unwrap();

    let err = composer.submit(&manager()).await.unwrap_err();
    assert_eq!(
        err.user_message(),
        "Stock changed since the page loaded (items[0].quantity: Exceeds stock)"
    );
    assert_eq!(composer.cart().line(10).unwrap().quantity, 8);
    assert!(!composer.submit_guard().is_busy());
}

#[tokio::test]
async fn test_blocked_cart_sends_nothing() {
    let server = MockServer::start().await;
    mount_source_stock(&server).await;
    Mock::given(method("POST"))
        .and(path("/Transfers"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let (api, bus) = api_for(&server).await;
    let mut composer = TransferComposer::new(api, bus);
    composer.select_source(1).await.unwrap();
    composer.select_destination(1);

    let err = composer.submit(&manager()).await.unwrap_err();
    match err {
        ClientError::Blocked(blockers) => {
            assert!(blockers.contains(&SubmitBlocker::SameLocation));
            assert!(blockers.contains(&SubmitBlocker::EmptyCart));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_second_submit_while_in_flight_fails() {
    let server = MockServer::start().await;
    mount_source_stock(&server).await;
    Mock::given(method("POST"))
        .and(path("/Transfers"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let mut composer = composer(&server).await;
    composer.add_product(10).unwrap();
    composer.set_quantity(10, 8).await.unwrap();

    let _outstanding = composer.submit_guard().try_acquire().unwrap();
    let err = composer.submit(&manager()).await.unwrap_err();
    assert!(matches!(err, ClientError::SubmissionInFlight));
    assert_eq!(composer.cart().line(10).unwrap().quantity, 8);
}

#[tokio::test]
async fn test_role_without_capability_cannot_submit() {
    let server = MockServer::start().await;
    mount_source_stock(&server).await;
    let mut composer = composer(&server).await;
    composer.add_product(10).unwrap();
    composer.set_quantity(10, 1).await.unwrap();

    let cashier = session_with(&[Capability::PointOfSale]);
    let err = composer.submit(&cashier).await.unwrap_err();
    assert!(err.is_client_side());
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Any entry above available stock leaves the line untouched
    #[test]
    fn prop_over_available_never_applies(available in 1i64..50, excess in 1i64..50, prior in 0i64..50) {
        tokio_test::block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/Products/stock-by-location/1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                    stock_row(10, "Paper Bags", available, false)
                ])))
                .mount(&server)
                .await;
            let mut composer = composer(&server).await;
            composer.add_product(10).unwrap();
            let prior = prior.min(available);
            composer.set_quantity(10, prior).await.unwrap();

            assert!(composer.set_quantity(10, available + excess).await.is_err());
            assert_eq!(composer.cart().line(10).unwrap().quantity, prior);
        });
    }
}
