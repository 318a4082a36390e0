//! Inter-location transfer models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{matches_filter, EntityId};

/// A stock movement between two locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: EntityId,
    pub from_location_id: EntityId,
    #[serde(default)]
    pub from_location_name: String,
    pub to_location_id: EntityId,
    #[serde(default)]
    pub to_location_name: String,
    pub transferred_date: DateTime<Utc>,
    pub status: TransferStatus,
    #[serde(default)]
    pub release_by: Option<String>,
    #[serde(default)]
    pub receive_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<TransferItem>,
}

impl Transfer {
    /// Free-text match over id, source and destination
    pub fn matches(&self, query: &str) -> bool {
        matches_filter(
            &[
                &self.id.to_string(),
                self.from_location_name.as_str(),
                self.to_location_name.as_str(),
            ],
            query,
        )
    }

    /// Total requested units across all lines
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Lifecycle of a transfer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransferStatus {
    #[serde(rename = "In Transit")]
    InTransit,
    Received,
    Reverted,
}

impl TransferStatus {
    /// Only in-transit transfers may change; received and reverted are final
    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        matches!(
            (self, next),
            (TransferStatus::InTransit, TransferStatus::Received)
                | (TransferStatus::InTransit, TransferStatus::Reverted)
        )
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, TransferStatus::InTransit)
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStatus::InTransit => write!(f, "In Transit"),
            TransferStatus::Received => write!(f, "Received"),
            TransferStatus::Reverted => write!(f, "Reverted"),
        }
    }
}

/// One product line of a transfer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferItem {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub product_id: EntityId,
    #[serde(default)]
    pub product_name: String,
    pub quantity: i64,
    #[serde(default)]
    pub has_serial: bool,
    /// Empty means the server picks serials FIFO at commit time
    #[serde(default)]
    pub serial_number_ids: Vec<EntityId>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TransferItem {
    /// Serial ids must cover the quantity exactly once a manual pick exists
    pub fn is_serial_consistent(&self) -> bool {
        !self.has_serial
            || self.serial_number_ids.is_empty()
            || self.serial_number_ids.len() as i64 == self.quantity
    }

    /// Badge shown in the manifest view
    pub fn kind_label(&self) -> &'static str {
        if self.has_serial {
            "Serialized"
        } else {
            "Standard"
        }
    }
}

/// Body of `POST /Transfers`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    pub from_location_id: EntityId,
    pub to_location_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "A transfer needs at least one item"))]
    pub items: Vec<CreateTransferItem>,
}

/// Line of a transfer creation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferItem {
    pub product_id: EntityId,
    #[validate(range(min = 1, message = "Quantity must be greater than zero"))]
    pub quantity: i64,
    pub serial_number_ids: Vec<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Read-only manifest line for the ledger's detail view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestLine {
    pub product_id: EntityId,
    pub product_name: String,
    pub quantity: i64,
    pub badge: String,
}

/// Build the manifest for a transfer
pub fn manifest(transfer: &Transfer) -> Vec<ManifestLine> {
    transfer
        .items
        .iter()
        .map(|item| ManifestLine {
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            badge: item.kind_label().to_string(),
        })
        .collect()
}

/// In-transit transfers, newest first
pub fn in_transit_newest_first(transfers: &[Transfer]) -> Vec<Transfer> {
    let mut out: Vec<Transfer> = transfers
        .iter()
        .filter(|t| t.status == TransferStatus::InTransit)
        .cloned()
        .collect();
    out.sort_by(|a, b| {
        b.transferred_date
            .cmp(&a.transferred_date)
            .then(b.id.cmp(&a.id))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn transfer(id: EntityId, day: u32, status: TransferStatus) -> Transfer {
        Transfer {
            id,
            from_location_id: 1,
            from_location_name: "Main Warehouse".to_string(),
            to_location_id: 2,
            to_location_name: "Downtown Store".to_string(),
            transferred_date: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
            status,
            release_by: None,
            receive_by: None,
            notes: None,
            items: vec![],
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TransferStatus::InTransit).unwrap(),
            "\"In Transit\""
        );
        let parsed: TransferStatus = serde_json::from_str("\"Reverted\"").unwrap();
        assert_eq!(parsed, TransferStatus::Reverted);
    }

    #[test]
    fn test_status_transitions() {
        assert!(TransferStatus::InTransit.can_transition_to(TransferStatus::Received));
        assert!(TransferStatus::InTransit.can_transition_to(TransferStatus::Reverted));
        assert!(!TransferStatus::Received.can_transition_to(TransferStatus::Reverted));
        assert!(!TransferStatus::Reverted.can_transition_to(TransferStatus::Received));
        assert!(TransferStatus::Received.is_final());
    }

    #[test]
    fn test_in_transit_sorted_newest_first() {
        let list = vec![
            transfer(1, 1, TransferStatus::InTransit),
            transfer(2, 5, TransferStatus::Received),
            transfer(3, 9, TransferStatus::InTransit),
            transfer(4, 3, TransferStatus::InTransit),
        ];
        let ids: Vec<EntityId> = in_transit_newest_first(&list).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 4, 1]);
    }

    #[test]
    fn test_serial_consistency() {
        let mut item = TransferItem {
            id: None,
            product_id: 1,
            product_name: "Scanner".to_string(),
            quantity: 2,
            has_serial: true,
            serial_number_ids: vec![],
            notes: None,
        };
        assert!(item.is_serial_consistent());
        item.serial_number_ids = vec![10];
        assert!(!item.is_serial_consistent());
        item.serial_number_ids = vec![10, 11];
        assert!(item.is_serial_consistent());
    }

    #[test]
    fn test_transfer_filter() {
        let t = transfer(42, 1, TransferStatus::InTransit);
        assert!(t.matches("42"));
        assert!(t.matches("downtown"));
        assert!(!t.matches("airport"));
    }
}
