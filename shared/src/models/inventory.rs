//! Inventory snapshot models

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Stock counts of one product at one location in one unit of measure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshotRow {
    pub product_id: EntityId,
    #[serde(default)]
    pub product_name: String,
    pub location_id: EntityId,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub uom_id: Option<EntityId>,
    #[serde(default)]
    pub uom_name: Option<String>,
    /// Good stock
    pub unsold_count: i64,
    pub sold_count: i64,
    pub bad_stock: i64,
    #[serde(default)]
    pub min_stock: Option<i64>,
    #[serde(default)]
    pub max_stock: Option<i64>,
    #[serde(default)]
    pub has_serial: bool,
}

impl InventorySnapshotRow {
    /// Displayed total; the server's figures stay authoritative
    pub fn total_count(&self) -> i64 {
        self.unsold_count + self.sold_count + self.bad_stock
    }

    /// Classify good stock against the configured thresholds
    pub fn stock_level(&self) -> StockLevel {
        match (self.min_stock, self.max_stock) {
            (None, None) => StockLevel::Untracked,
            (Some(min), _) if self.unsold_count < min => StockLevel::BelowMin,
            (_, Some(max)) if self.unsold_count > max => StockLevel::AboveMax,
            _ => StockLevel::Normal,
        }
    }
}

/// Stock position relative to min/max thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    BelowMin,
    Normal,
    AboveMax,
    Untracked,
}

impl std::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockLevel::BelowMin => write!(f, "Below Minimum"),
            StockLevel::Normal => write!(f, "Normal"),
            StockLevel::AboveMax => write!(f, "Above Maximum"),
            StockLevel::Untracked => write!(f, "Untracked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(unsold: i64, min: Option<i64>, max: Option<i64>) -> InventorySnapshotRow {
        InventorySnapshotRow {
            product_id: 1,
            product_name: "Receipt Paper".to_string(),
            location_id: 1,
            location_name: "Main Warehouse".to_string(),
            uom_id: None,
            uom_name: None,
            unsold_count: unsold,
            sold_count: 4,
            bad_stock: 1,
            min_stock: min,
            max_stock: max,
            has_serial: false,
        }
    }

    #[test]
    fn test_total_count() {
        assert_eq!(row(10, None, None).total_count(), 15);
    }

    #[test]
    fn test_stock_levels() {
        assert_eq!(row(3, Some(5), Some(20)).stock_level(), StockLevel::BelowMin);
        assert_eq!(row(5, Some(5), Some(20)).stock_level(), StockLevel::Normal);
        assert_eq!(row(21, Some(5), Some(20)).stock_level(), StockLevel::AboveMax);
        assert_eq!(row(21, None, None).stock_level(), StockLevel::Untracked);
        assert_eq!(row(0, None, Some(3)).stock_level(), StockLevel::Normal);
    }
}
