//! Received (reconciled) transfer models and shortage recovery requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::EntityId;

/// Per-serial outcome of a receipt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SerialReceiptStatus {
    Received,
    Missing,
    #[serde(rename = "Found-Returned")]
    FoundReturned,
}

impl SerialReceiptStatus {
    /// Status a missing serial takes once recovered to `target`
    pub fn after_recovery(target: RecoveryTarget) -> Self {
        match target {
            RecoveryTarget::Origin => SerialReceiptStatus::FoundReturned,
            RecoveryTarget::Destination => SerialReceiptStatus::Received,
        }
    }
}

impl std::fmt::Display for SerialReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerialReceiptStatus::Received => write!(f, "Received"),
            SerialReceiptStatus::Missing => write!(f, "Missing"),
            SerialReceiptStatus::FoundReturned => write!(f, "Found-Returned"),
        }
    }
}

/// Where recovered stock is credited
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryTarget {
    /// Goods never left, or were found at the sender
    Origin,
    /// Goods arrived late, or were found at the receiver
    Destination,
}

impl std::fmt::Display for RecoveryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoveryTarget::Origin => write!(f, "origin"),
            RecoveryTarget::Destination => write!(f, "destination"),
        }
    }
}

/// A transfer after reconciliation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedTransfer {
    pub id: EntityId,
    pub transfer_id: EntityId,
    pub from_location_id: EntityId,
    #[serde(default)]
    pub from_location_name: String,
    pub to_location_id: EntityId,
    #[serde(default)]
    pub to_location_name: String,
    #[serde(default)]
    pub transferred_date: Option<DateTime<Utc>>,
    pub received_date: DateTime<Utc>,
    #[serde(default)]
    pub release_by: Option<String>,
    #[serde(default)]
    pub receive_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<ReceivedTransferItem>,
}

impl ReceivedTransfer {
    /// Whether any line still has an unresolved shortage
    pub fn has_outstanding_shortage(&self) -> bool {
        self.items.iter().any(|i| i.outstanding_missing() > 0)
    }

    pub fn item(&self, item_id: EntityId) -> Option<&ReceivedTransferItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Name of the location a recovery would credit
    pub fn target_location_name(&self, target: RecoveryTarget) -> &str {
        match target {
            RecoveryTarget::Origin => &self.from_location_name,
            RecoveryTarget::Destination => &self.to_location_name,
        }
    }
}

/// One reconciled line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedTransferItem {
    pub id: EntityId,
    pub product_id: EntityId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub has_serial: bool,
    pub quantity: i64,
    pub received_quantity: i64,
    pub missing_quantity: i64,
    #[serde(default)]
    pub serials: Vec<ReceivedSerial>,
}

impl ReceivedTransferItem {
    /// Serials still flagged missing
    pub fn missing_serials(&self) -> impl Iterator<Item = &ReceivedSerial> {
        self.serials
            .iter()
            .filter(|s| s.status == SerialReceiptStatus::Missing)
    }

    /// Units still recoverable on this line
    pub fn outstanding_missing(&self) -> i64 {
        if self.has_serial {
            self.missing_serials().count() as i64
        } else {
            self.missing_quantity.max(0)
        }
    }

    /// Local preview of a serial recovery; the server remains authoritative
    pub fn with_serial_recovered(&self, serial_number_id: EntityId, target: RecoveryTarget) -> Self {
        let mut next = self.clone();
        for serial in next.serials.iter_mut() {
            if serial.serial_number_id == serial_number_id
                && serial.status == SerialReceiptStatus::Missing
            {
                serial.status = SerialReceiptStatus::after_recovery(target);
                next.missing_quantity = (next.missing_quantity - 1).max(0);
                if target == RecoveryTarget::Destination {
                    next.received_quantity += 1;
                }
            }
        }
        next
    }

    /// Local preview of a quantity recovery; the server remains authoritative
    pub fn with_quantity_recovered(&self, quantity: i64, target: RecoveryTarget) -> Self {
        let mut next = self.clone();
        let applied = quantity.clamp(0, next.missing_quantity.max(0));
        next.missing_quantity -= applied;
        if target == RecoveryTarget::Destination {
            next.received_quantity += applied;
        }
        next
    }
}

/// Receipt status of one serial on a reconciled line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedSerial {
    pub serial_number_id: EntityId,
    #[serde(default)]
    pub serial_number: String,
    pub status: SerialReceiptStatus,
}

/// Body of `POST /ReceivedTransfers`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    pub transfer_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<ReconcileItem>,
}

/// Line of a reconciliation payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileItem {
    pub product_id: EntityId,
    pub quantity: i64,
    pub received_quantity: i64,
    pub missing_quantity: i64,
    /// Empty for bare-quantity lines
    #[serde(default)]
    pub serials: Vec<ReconcileSerial>,
}

/// Per-unit status entry of a reconciliation payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSerial {
    pub serial_number_id: EntityId,
    pub status: SerialReceiptStatus,
}

/// Body of the per-serial "mark found" action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkFoundRequest {
    pub target: RecoveryTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered_by: Option<String>,
}

/// Body of the per-item quantity recovery action
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecoverQuantityRequest {
    #[validate(range(min = 1, message = "Recovery quantity must be at least 1"))]
    pub quantity: i64,
    pub target: RecoveryTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered_by: Option<String>,
}
