//! Stock-holding locations (stores, warehouses)

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// A location that holds stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Look up a location name, falling back to the numeric id
pub fn location_label(locations: &[Location], id: EntityId) -> String {
    locations
        .iter()
        .find(|l| l.id == id)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| format!("Location #{}", id))
}
