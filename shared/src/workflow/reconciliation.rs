//! Receipt sheet: expected vs. received for one transfer

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    ReconcileItem, ReconcileRequest, ReconcileSerial, SerialReceiptStatus, Transfer,
};
use crate::types::EntityId;
use crate::validation::clamp_received_quantity;

/// One expected serial and whether it arrived
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SerialCheck {
    pub serial_number_id: EntityId,
    pub serial_number: String,
    pub missing: bool,
}

/// One transfer line under review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub product_id: EntityId,
    pub product_name: String,
    pub has_serial: bool,
    pub requested: i64,
    pub received: i64,
    pub serials: Vec<SerialCheck>,
    /// Unit ids carried by a non-serialized line, reported by index threshold
    pub hidden_units: Vec<EntityId>,
}

impl ReceiptLine {
    pub fn missing(&self) -> i64 {
        self.requested - self.received
    }

    /// Received count is driven by per-serial toggles rather than a number.
    ///
    /// A serialized line released without serial ids (the server picked them
    /// FIFO) has nothing to toggle and takes the numeric input instead.
    pub fn counts_by_serial(&self) -> bool {
        self.has_serial && !self.serials.is_empty()
    }
}

/// A line received short
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Shortage {
    pub product_id: EntityId,
    pub product_name: String,
    pub received: i64,
    pub requested: i64,
}

impl Shortage {
    pub fn missing(&self) -> i64 {
        self.requested - self.received
    }
}

impl std::fmt::Display for Shortage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} of {} received",
            self.product_name, self.received, self.requested
        )
    }
}

/// Confirmation text listing every shortfall
pub fn shortage_message(shortages: &[Shortage]) -> String {
    let lines: Vec<String> = shortages.iter().map(|s| s.to_string()).collect();
    format!(
        "The following items were received short:\n{}\nConfirm Shortage to record the missing units.",
        lines.join("\n")
    )
}

/// Receipt edits that were refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReceiptError {
    #[error("Line {0} does not exist")]
    NoSuchLine(usize),

    #[error("{0} is serialized; mark individual serials instead")]
    SerializedLine(String),

    #[error("{0} is not serialized")]
    NotSerialized(String),

    #[error("Serial {serial_number_id} is not part of {product_name}")]
    UnknownSerial {
        serial_number_id: EntityId,
        product_name: String,
    },
}

/// Editable receipt for one transfer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSheet {
    pub transfer_id: EntityId,
    pub lines: Vec<ReceiptLine>,
    pub notes: Option<String>,
}

impl ReceiptSheet {
    /// Start from a full receipt: every line received as requested
    pub fn from_transfer(transfer: &Transfer, serial_names: &HashMap<EntityId, String>) -> Self {
        let lines = transfer
            .items
            .iter()
            .map(|item| {
                let (serials, hidden_units) = if item.has_serial {
                    let checks = item
                        .serial_number_ids
                        .iter()
                        .map(|id| SerialCheck {
                            serial_number_id: *id,
                            serial_number: serial_names
                                .get(id)
                                .cloned()
                                .unwrap_or_else(|| format!("#{}", id)),
                            missing: false,
                        })
                        .collect();
                    (checks, Vec::new())
                } else {
                    (Vec::new(), item.serial_number_ids.clone())
                };

                ReceiptLine {
                    product_id: item.product_id,
                    product_name: item.product_name.clone(),
                    has_serial: item.has_serial,
                    requested: item.quantity,
                    received: item.quantity,
                    serials,
                    hidden_units,
                }
            })
            .collect();

        Self {
            transfer_id: transfer.id,
            lines,
            notes: None,
        }
    }

    fn line_mut(&mut self, index: usize) -> Result<&mut ReceiptLine, ReceiptError> {
        self.lines.get_mut(index).ok_or(ReceiptError::NoSuchLine(index))
    }

    /// Flip a serial between received and missing; returns the new received count
    pub fn toggle_serial(
        &mut self,
        index: usize,
        serial_number_id: EntityId,
    ) -> Result<i64, ReceiptError> {
        let line = self.line_mut(index)?;
        if !line.has_serial {
            return Err(ReceiptError::NotSerialized(line.product_name.clone()));
        }
        let check = line
            .serials
            .iter_mut()
            .find(|s| s.serial_number_id == serial_number_id)
            .ok_or_else(|| ReceiptError::UnknownSerial {
                serial_number_id,
                product_name: line.product_name.clone(),
            })?;
        check.missing = !check.missing;

        line.received = line.serials.iter().filter(|s| !s.missing).count() as i64;
        Ok(line.received)
    }

    /// Set a line's received quantity, clamped to `[0, requested]`.
    ///
    /// Refused for lines whose count comes from serial toggles.
    pub fn set_received(&mut self, index: usize, value: i64) -> Result<i64, ReceiptError> {
        let line = self.line_mut(index)?;
        if line.counts_by_serial() {
            return Err(ReceiptError::SerializedLine(line.product_name.clone()));
        }
        line.received = clamp_received_quantity(value, line.requested);
        Ok(line.received)
    }

    pub fn shortages(&self) -> Vec<Shortage> {
        self.lines
            .iter()
            .filter(|l| l.received < l.requested)
            .map(|l| Shortage {
                product_id: l.product_id,
                product_name: l.product_name.clone(),
                received: l.received,
                requested: l.requested,
            })
            .collect()
    }

    /// Build the reconciliation payload
    pub fn to_request(&self, receive_by: Option<String>) -> ReconcileRequest {
        let items = self
            .lines
            .iter()
            .map(|line| {
                let serials = if line.has_serial {
                    line.serials
                        .iter()
                        .map(|s| ReconcileSerial {
                            serial_number_id: s.serial_number_id,
                            status: if s.missing {
                                SerialReceiptStatus::Missing
                            } else {
                                SerialReceiptStatus::Received
                            },
                        })
                        .collect()
                } else {
                    line.hidden_units
                        .iter()
                        .enumerate()
                        .map(|(slot, id)| ReconcileSerial {
                            serial_number_id: *id,
                            status: if (slot as i64) < line.received {
                                SerialReceiptStatus::Received
                            } else {
                                SerialReceiptStatus::Missing
                            },
                        })
                        .collect()
                };

                ReconcileItem {
                    product_id: line.product_id,
                    quantity: line.requested,
                    received_quantity: line.received,
                    missing_quantity: line.missing(),
                    serials,
                }
            })
            .collect();

        ReconcileRequest {
            transfer_id: self.transfer_id,
            receive_by,
            notes: self.notes.clone().filter(|n| !n.trim().is_empty()),
            items,
        }
    }
}
