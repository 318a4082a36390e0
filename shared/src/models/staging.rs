//! Staged bulk receiving records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::EntityId;

/// A staged receiving record awaiting commit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchStaging {
    pub id: EntityId,
    pub location_id: EntityId,
    #[serde(default)]
    pub location_name: String,
    pub product_id: EntityId,
    #[serde(default)]
    pub product_name: String,
    pub quantity: i64,
    #[serde(default)]
    pub serial_numbers: Vec<String>,
    pub status: StagingStatus,
    #[serde(default)]
    pub staged_by: Option<String>,
    pub staged_at: DateTime<Utc>,
}

/// Lifecycle of a staging record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StagingStatus {
    Staged,
    Committed,
    Cancelled,
}

/// One entry of the staging history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchStagingHistory {
    pub id: EntityId,
    pub staging_id: EntityId,
    pub action: String,
    #[serde(default)]
    pub actor: Option<String>,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Body of `POST /BatchStagings`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchStagingRequest {
    pub location_id: EntityId,
    pub product_id: EntityId,
    #[validate(range(min = 1, message = "Quantity must be greater than zero"))]
    pub quantity: i64,
    #[serde(default)]
    pub serial_numbers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staged_by: Option<String>,
}

impl CreateBatchStagingRequest {
    /// Field ranges plus the serial/quantity match for serialized products
    pub fn check(&self, has_serial: bool) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;
        if has_serial && self.serial_numbers.len() as i64 != self.quantity {
            return Err(format!(
                "Expected {} serial numbers, got {}",
                self.quantity,
                self.serial_numbers.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(quantity: i64, serials: &[&str]) -> CreateBatchStagingRequest {
        CreateBatchStagingRequest {
            location_id: 1,
            product_id: 2,
            quantity,
            serial_numbers: serials.iter().map(|s| s.to_string()).collect(),
            staged_by: None,
        }
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(request(0, &[]).check(false).is_err());
        assert!(request(4, &[]).check(false).is_ok());
    }

    #[test]
    fn test_serialized_staging_needs_matching_serials() {
        assert!(request(2, &["A1"]).check(true).is_err());
        assert!(request(2, &["A1", "A2"]).check(true).is_ok());
    }
}
