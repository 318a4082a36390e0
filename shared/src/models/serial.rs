//! Serial number records for serialized products

use serde::{Deserialize, Serialize};

use crate::types::{matches_filter, EntityId};

/// A single serialized unit available at a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SerialNumber {
    pub id: EntityId,
    pub serial_number: String,
    #[serde(default)]
    pub batch_name: Option<String>,
    #[serde(default)]
    pub product_id: Option<EntityId>,
    #[serde(default)]
    pub location_id: Option<EntityId>,
}

impl SerialNumber {
    /// Whether the serial or its batch name matches a picker search
    pub fn matches(&self, query: &str) -> bool {
        matches_filter(
            &[
                self.serial_number.as_str(),
                self.batch_name.as_deref().unwrap_or_default(),
            ],
            query,
        )
    }
}

/// Request body for the bulk id -> serial lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialLookupRequest {
    pub ids: Vec<EntityId>,
}
