//! Validation utilities applied before any request leaves the client

use thiserror::Error;

use crate::types::EntityId;

// ============================================================================
// Quantity Validations
// ============================================================================

/// Why a quantity entry was refused
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum QuantityRejection {
    #[error("Quantity cannot be negative")]
    Negative,

    #[error("Only {available} available, cannot transfer {requested}")]
    ExceedsAvailable { requested: i64, available: i64 },
}

/// Check a transfer quantity against the displayed available stock
pub fn check_available_quantity(requested: i64, available: i64) -> Result<(), QuantityRejection> {
    if requested < 0 {
        return Err(QuantityRejection::Negative);
    }
    if requested > available {
        return Err(QuantityRejection::ExceedsAvailable {
            requested,
            available,
        });
    }
    Ok(())
}

/// Clamp a received quantity into `[0, requested]`
pub fn clamp_received_quantity(value: i64, requested: i64) -> i64 {
    value.clamp(0, requested.max(0))
}

/// Validate a quantity recovery against the outstanding shortage
pub fn validate_recovery_quantity(quantity: i64, missing: i64) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Recovery quantity must be at least 1");
    }
    if quantity > missing {
        return Err("Recovery quantity exceeds the missing quantity");
    }
    Ok(())
}

// ============================================================================
// Free-text Validations
// ============================================================================

/// Audit notes and revert reasons must contain something other than whitespace
pub fn validate_required_text(text: &str) -> Result<(), &'static str> {
    if text.trim().is_empty() {
        return Err("This field is required");
    }
    Ok(())
}

// ============================================================================
// Spreadsheet Cell Validations
// ============================================================================

/// Convert an identifier cell back to its numeric id.
///
/// Cells may be stored as text to keep leading zeros, optionally with a
/// leading apostrophe.
pub fn parse_identifier(cell: &str) -> Result<EntityId, &'static str> {
    let trimmed = cell.trim().trim_start_matches('\'').trim();
    if trimmed.is_empty() {
        return Err("Identifier is empty");
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err("Identifier must be numeric");
    }
    trimmed
        .parse::<EntityId>()
        .map_err(|_| "Identifier is out of range")
}

/// Parse a quantity cell; blank cells count as zero
pub fn parse_quantity(cell: &str) -> Result<i64, &'static str> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    let value = if let Some(whole) = trimmed.strip_suffix(".0") {
        whole.parse::<i64>()
    } else {
        trimmed.parse::<i64>()
    }
    .map_err(|_| "Quantity must be a whole number")?;

    if value < 0 {
        return Err("Quantity cannot be negative");
    }
    Ok(value)
}

fn is_serial_separator(c: char) -> bool {
    matches!(c, ',' | ';' | '\n' | '\r')
}

fn push_serial(serials: &mut Vec<String>, token: &str) {
    let token = token.trim();
    if !token.is_empty() {
        serials.push(token.to_string());
    }
}

/// Split a serial cell on commas, semicolons and line breaks.
///
/// A double-quoted serial may contain separators; `""` inside quotes is a
/// literal quote.
pub fn split_serial_cell(cell: &str) -> Vec<String> {
    let mut serials = Vec::new();
    let mut token = String::new();
    let mut quoted = false;
    let mut chars = cell.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                chars.next();
                token.push('"');
            }
            '"' => quoted = !quoted,
            c if !quoted && is_serial_separator(c) => {
                push_serial(&mut serials, &token);
                token.clear();
            }
            c => token.push(c),
        }
    }
    push_serial(&mut serials, &token);
    serials
}

/// Join serials back into a single cell, quoting any that contain a
/// separator or a quote
pub fn join_serial_cell(serials: &[String]) -> String {
    serials
        .iter()
        .map(|serial| {
            if serial.chars().any(|c| c == '"' || is_serial_separator(c)) {
                format!("\"{}\"", serial.replace('"', "\"\""))
            } else {
                serial.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a yes/no style boolean cell
pub fn parse_flag(cell: &str) -> Result<bool, &'static str> {
    match cell.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" | "" => Ok(false),
        _ => Err("Expected yes or no"),
    }
}
