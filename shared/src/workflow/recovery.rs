//! Missing-item recovery planning

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ReceivedTransfer, RecoveryTarget, SerialReceiptStatus};
use crate::types::EntityId;
use crate::validation::validate_recovery_quantity;

/// What a confirmed recovery will send
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecoveryAction {
    Quantity {
        received_transfer_id: EntityId,
        item_id: EntityId,
        quantity: i64,
        target: RecoveryTarget,
    },
    Serial {
        received_transfer_id: EntityId,
        item_id: EntityId,
        serial_number_id: EntityId,
        target: RecoveryTarget,
    },
}

/// A recovery awaiting operator confirmation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryPlan {
    pub action: RecoveryAction,
    pub confirmation: String,
}

/// Recovery requests refused before confirmation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("Item {0} is not part of this receipt")]
    NoSuchItem(EntityId),

    #[error("{0} has no missing units to recover")]
    NothingMissing(String),

    #[error("{0} is serialized; recover individual serials")]
    SerializedItem(String),

    #[error("{0} is not serialized; recover by quantity")]
    NotSerialized(String),

    #[error("Serial {0} is not missing on this line")]
    SerialNotMissing(EntityId),

    #[error("{0}")]
    InvalidQuantity(&'static str),
}

/// Plan a bulk recovery for a non-serialized line
pub fn plan_quantity_recovery(
    receipt: &ReceivedTransfer,
    item_id: EntityId,
    quantity: i64,
    target: RecoveryTarget,
) -> Result<RecoveryPlan, RecoveryError> {
    let item = receipt
        .item(item_id)
        .ok_or(RecoveryError::NoSuchItem(item_id))?;
    if item.has_serial {
        return Err(RecoveryError::SerializedItem(item.product_name.clone()));
    }
    if item.missing_quantity <= 0 {
        return Err(RecoveryError::NothingMissing(item.product_name.clone()));
    }
    validate_recovery_quantity(quantity, item.missing_quantity)
        .map_err(RecoveryError::InvalidQuantity)?;

    Ok(RecoveryPlan {
        action: RecoveryAction::Quantity {
            received_transfer_id: receipt.id,
            item_id,
            quantity,
            target,
        },
        confirmation: format!(
            "Recover {} x {} to {} ({})?",
            quantity,
            item.product_name,
            receipt.target_location_name(target),
            target
        ),
    })
}

/// Plan the recovery of one missing serial
pub fn plan_serial_recovery(
    receipt: &ReceivedTransfer,
    item_id: EntityId,
    serial_number_id: EntityId,
    target: RecoveryTarget,
) -> Result<RecoveryPlan, RecoveryError> {
    let item = receipt
        .item(item_id)
        .ok_or(RecoveryError::NoSuchItem(item_id))?;
    if !item.has_serial {
        return Err(RecoveryError::NotSerialized(item.product_name.clone()));
    }
    let serial = item
        .serials
        .iter()
        .find(|s| {
            s.serial_number_id == serial_number_id && s.status == SerialReceiptStatus::Missing
        })
        .ok_or(RecoveryError::SerialNotMissing(serial_number_id))?;

    Ok(RecoveryPlan {
        action: RecoveryAction::Serial {
            received_transfer_id: receipt.id,
            item_id,
            serial_number_id,
            target,
        },
        confirmation: format!(
            "Recover 1 x {} (serial {}) to {} ({})?",
            item.product_name,
            serial.serial_number,
            receipt.target_location_name(target),
            target
        ),
    })
}
