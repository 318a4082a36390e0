//! Physical inventory override (bulk correction) and adjustment batch models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::EntityId;

/// Good / sold / bad counts of one product at one location
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub good: i64,
    pub sold: i64,
    pub bad: i64,
}

impl StatusCounts {
    pub fn total(&self) -> i64 {
        self.good + self.sold + self.bad
    }
}

/// Status column of the override sheet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Good,
    Sold,
    Bad,
}

impl StockStatus {
    pub const ALL: [StockStatus; 3] = [StockStatus::Good, StockStatus::Sold, StockStatus::Bad];
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::Good => write!(f, "Good"),
            StockStatus::Sold => write!(f, "Sold"),
            StockStatus::Bad => write!(f, "Bad"),
        }
    }
}

/// Server-reported current counts for one product × location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalInventoryBaseRow {
    pub product_id: EntityId,
    #[serde(default)]
    pub product_name: String,
    pub location_id: EntityId,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub has_serial: bool,
    pub good_quantity: i64,
    pub sold_quantity: i64,
    pub bad_quantity: i64,
    #[serde(default)]
    pub good_serials: Vec<String>,
    #[serde(default)]
    pub sold_serials: Vec<String>,
    #[serde(default)]
    pub bad_serials: Vec<String>,
}

impl PhysicalInventoryBaseRow {
    pub fn key(&self) -> (EntityId, EntityId) {
        (self.product_id, self.location_id)
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            good: self.good_quantity,
            sold: self.sold_quantity,
            bad: self.bad_quantity,
        }
    }

    pub fn serials(&self, status: StockStatus) -> &[String] {
        match status {
            StockStatus::Good => &self.good_serials,
            StockStatus::Sold => &self.sold_serials,
            StockStatus::Bad => &self.bad_serials,
        }
    }
}

/// One parsed row of an uploaded override sheet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRow {
    /// 1-based data row number in the uploaded sheet
    #[serde(skip)]
    pub row_number: usize,
    pub product_id: EntityId,
    pub location_id: EntityId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub location_name: String,
    pub has_serial: bool,
    pub good_quantity: i64,
    pub sold_quantity: i64,
    pub bad_quantity: i64,
    #[serde(default)]
    pub good_serials: Vec<String>,
    #[serde(default)]
    pub sold_serials: Vec<String>,
    #[serde(default)]
    pub bad_serials: Vec<String>,
}

impl OverrideRow {
    pub fn key(&self) -> (EntityId, EntityId) {
        (self.product_id, self.location_id)
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            good: self.good_quantity,
            sold: self.sold_quantity,
            bad: self.bad_quantity,
        }
    }

    pub fn quantity(&self, status: StockStatus) -> i64 {
        match status {
            StockStatus::Good => self.good_quantity,
            StockStatus::Sold => self.sold_quantity,
            StockStatus::Bad => self.bad_quantity,
        }
    }

    pub fn serials(&self, status: StockStatus) -> &[String] {
        match status {
            StockStatus::Good => &self.good_serials,
            StockStatus::Sold => &self.sold_serials,
            StockStatus::Bad => &self.bad_serials,
        }
    }

    /// Row as exported from the current server counts
    pub fn from_base(row_number: usize, base: &PhysicalInventoryBaseRow) -> Self {
        Self {
            row_number,
            product_id: base.product_id,
            location_id: base.location_id,
            product_name: base.product_name.clone(),
            location_name: base.location_name.clone(),
            has_serial: base.has_serial,
            good_quantity: base.good_quantity,
            sold_quantity: base.sold_quantity,
            bad_quantity: base.bad_quantity,
            good_serials: base.good_serials.clone(),
            sold_serials: base.sold_serials.clone(),
            bad_serials: base.bad_serials.clone(),
        }
    }
}

/// Body of `POST /Products/BulkOverride`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BulkOverrideRequest {
    pub reference_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "An audit note is required"))]
    pub note: String,
    pub user_id: EntityId,
    #[serde(default)]
    pub user_name: String,
    #[validate(length(min = 1, message = "The upload contains no rows"))]
    pub rows: Vec<OverrideRow>,
}

/// A revertible group of corrections applied by one upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentBatch {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub batch_date: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
    pub user_id: EntityId,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub row_count: i64,
    #[serde(default)]
    pub reverted: bool,
}

/// Body of `POST /Products/RevertBatch`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RevertBatchRequest {
    pub batch_date: DateTime<Utc>,
    pub user_id: EntityId,
    #[validate(length(min = 1, message = "A reason is required to revert a batch"))]
    pub reason: String,
}

impl RevertBatchRequest {
    /// Build a revert request, rejecting a blank reason
    pub fn new(batch: &AdjustmentBatch, reason: &str) -> Result<Self, String> {
        let request = Self {
            batch_date: batch.batch_date,
            user_id: batch.user_id,
            reason: reason.trim().to_string(),
        };
        request.validate().map_err(|e| e.to_string())?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn batch() -> AdjustmentBatch {
        AdjustmentBatch {
            id: Some(3),
            batch_date: Utc.with_ymd_and_hms(2024, 5, 2, 14, 30, 0).unwrap(),
            note: Some("Quarterly count".to_string()),
            user_id: 12,
            user_name: "Dana".to_string(),
            row_count: 40,
            reverted: false,
        }
    }

    #[test]
    fn test_revert_requires_reason() {
        assert!(RevertBatchRequest::new(&batch(), "").is_err());
        assert!(RevertBatchRequest::new(&batch(), "   ").is_err());
    }

    #[test]
    fn test_revert_carries_batch_identity() {
        let req = RevertBatchRequest::new(&batch(), " wrong file ").unwrap();
        assert_eq!(req.user_id, 12);
        assert_eq!(req.batch_date, batch().batch_date);
        assert_eq!(req.reason, "wrong file");
    }
}
