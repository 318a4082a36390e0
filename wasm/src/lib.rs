//! WebAssembly module for the Stockroom dashboard
//!
//! Provides client-side checks so the browser can refuse bad input before a
//! request is sent:
//! - Transfer quantity and received quantity bounds
//! - Serial auto-pick
//! - Physical inventory sheet validation
//! - Role-based menu filtering

use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::models::{
    default_menu, has_capability, visible_menu, Capability, InventorySnapshotRow, OverrideRow,
    PhysicalInventoryBaseRow, Role, RoleRecord, SerialNumber,
};
use shared::validation::{check_available_quantity, clamp_received_quantity};
use shared::workflow::{diff_rows, validate_rows, SerialPicker};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn parse<T: serde::de::DeserializeOwned>(label: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", label, e))
}

fn render<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

// ============================================================================
// Quantity checks
// ============================================================================

/// `None` when the quantity may be applied, otherwise the message to show
pub fn transfer_quantity_message(requested: i64, available: i64) -> Option<String> {
    check_available_quantity(requested, available)
        .err()
        .map(|e| e.to_string())
}

/// Check a transfer quantity against available stock; throws the message
#[wasm_bindgen(js_name = checkTransferQuantity)]
pub fn check_transfer_quantity(requested: f64, available: f64) -> Result<(), JsValue> {
    match transfer_quantity_message(requested as i64, available as i64) {
        Some(message) => Err(to_js_error(message)),
        None => Ok(()),
    }
}

#[wasm_bindgen(js_name = clampReceivedQuantity)]
pub fn clamp_received(value: f64, requested: f64) -> f64 {
    clamp_received_quantity(value as i64, requested as i64) as f64
}

// ============================================================================
// Serial auto-pick
// ============================================================================

/// First `quantity` serials in server order
pub fn auto_pick(available_json: &str, quantity: usize) -> Result<Vec<i64>, String> {
    let available: Vec<SerialNumber> = parse("serials", available_json)?;
    let mut picker = SerialPicker::new(available, &[]);
    picker.auto_pick_more(quantity);
    Ok(picker.selection())
}

#[wasm_bindgen(js_name = autoPickSerials)]
pub fn auto_pick_serials(available_json: &str, quantity: u32) -> Result<js_sys::Array, JsValue> {
    let ids = auto_pick(available_json, quantity as usize).map_err(to_js_error)?;
    Ok(ids.into_iter().map(|id| JsValue::from_f64(id as f64)).collect())
}

// ============================================================================
// Physical inventory sheet
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SheetReport {
    errors: Vec<shared::workflow::RowError>,
    changed_rows: usize,
}

/// Validate uploaded rows against the base snapshot.
///
/// Rows are numbered the way the sheet shows them, starting at 2 under the
/// header.
pub fn sheet_report(rows_json: &str, base_json: &str) -> Result<String, String> {
    let mut rows: Vec<OverrideRow> = parse("rows", rows_json)?;
    let base: Vec<PhysicalInventoryBaseRow> = parse("base", base_json)?;
    for (index, row) in rows.iter_mut().enumerate() {
        row.row_number = index + 2;
    }
    let errors = validate_rows(&rows, &base);
    let changed_rows = diff_rows(&rows, &base).iter().filter(|d| d.changed).count();
    render(&SheetReport {
        errors,
        changed_rows,
    })
}

#[wasm_bindgen(js_name = validateOverrideSheet)]
pub fn validate_override_sheet(rows_json: &str, base_json: &str) -> Result<String, JsValue> {
    sheet_report(rows_json, base_json).map_err(to_js_error)
}

/// Stock level label for one inventory row
pub fn stock_level_label(row_json: &str) -> Result<String, String> {
    let row: InventorySnapshotRow = parse("inventory row", row_json)?;
    Ok(row.stock_level().to_string())
}

#[wasm_bindgen(js_name = stockLevel)]
pub fn stock_level(row_json: &str) -> Result<String, JsValue> {
    stock_level_label(row_json).map_err(to_js_error)
}

// ============================================================================
// Roles
// ============================================================================

pub fn role_allows(role_json: &str, flag: &str) -> Result<bool, String> {
    let record: RoleRecord = parse("role", role_json)?;
    let capability =
        Capability::from_flag(flag).ok_or_else(|| format!("Unknown capability: {}", flag))?;
    Ok(has_capability(&Role::from_record(&record), capability))
}

#[wasm_bindgen(js_name = roleAllows)]
pub fn role_allows_js(role_json: &str, flag: &str) -> Result<bool, JsValue> {
    role_allows(role_json, flag).map_err(to_js_error)
}

pub fn menu_for_role(role_json: &str) -> Result<String, String> {
    let record: RoleRecord = parse("role", role_json)?;
    render(&visible_menu(&default_menu(), &Role::from_record(&record)))
}

/// Menu entries the role may see, as JSON
#[wasm_bindgen(js_name = visibleMenu)]
pub fn visible_menu_js(role_json: &str) -> Result<String, JsValue> {
    menu_for_role(role_json).map_err(to_js_error)
}
