//! Browser-side checks for the exported bindings
//!
//! Run with `wasm-pack test --headless --chrome wasm`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use stockroom_wasm::{auto_pick_serials, check_transfer_quantity, clamp_received};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn transfer_quantity_over_stock_throws_message() {
    assert!(check_transfer_quantity(8.0, 10.0).is_ok());
    let err = check_transfer_quantity(12.0, 10.0).unwrap_err();
    assert_eq!(
        err.as_string().as_deref(),
        Some("Only 10 available, cannot transfer 12")
    );
}

#[wasm_bindgen_test]
fn received_quantity_is_clamped() {
    assert_eq!(clamp_received(9.0, 5.0), 5.0);
}

#[wasm_bindgen_test]
fn auto_pick_returns_js_array_in_server_order() {
    let serials = r#"[{"id":9,"serialNumber":"SC-9"},{"id":3,"serialNumber":"SC-3"}]"#;
    let picked = auto_pick_serials(serials, 1).unwrap();
    assert_eq!(picked.length(), 1);
    assert_eq!(picked.get(0), JsValue::from_f64(9.0));

    assert!(auto_pick_serials("not json", 1).is_err());
}
