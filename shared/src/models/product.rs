//! Product catalog and stock-by-location models

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{matches_filter, EntityId};

/// A catalog product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub has_serial: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub min_stock: Option<i64>,
    #[serde(default)]
    pub max_stock: Option<i64>,
}

/// Stock of one product at one location in one unit of measure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockByLocation {
    pub product_id: EntityId,
    pub product_name: String,
    pub location_id: EntityId,
    #[serde(default)]
    pub uom_id: Option<EntityId>,
    #[serde(default)]
    pub uom_name: Option<String>,
    #[serde(default = "base_rate")]
    pub conversion_rate: Decimal,
    pub stock_count: i64,
    #[serde(default)]
    pub has_serial: bool,
    #[serde(default)]
    pub sku: Option<String>,
}

fn base_rate() -> Decimal {
    Decimal::ONE
}

impl StockByLocation {
    /// Whether this row is in the base unit of measure
    pub fn is_base_unit(&self) -> bool {
        self.conversion_rate == Decimal::ONE
    }

    /// Whether the row matches a product search
    pub fn matches(&self, query: &str) -> bool {
        matches_filter(
            &[
                self.product_name.as_str(),
                self.sku.as_deref().unwrap_or_default(),
                &self.product_id.to_string(),
            ],
            query,
        )
    }
}

/// Collapse stock rows to one row per product.
///
/// A base-unit row (conversion rate 1) wins; otherwise the row with the
/// higher stock count. Output is ordered by product name.
pub fn preferred_stock_rows(rows: &[StockByLocation]) -> Vec<StockByLocation> {
    let mut chosen: BTreeMap<EntityId, &StockByLocation> = BTreeMap::new();

    for row in rows {
        match chosen.get(&row.product_id) {
            None => {
                chosen.insert(row.product_id, row);
            }
            Some(current) => {
                if prefer_over(row, current) {
                    chosen.insert(row.product_id, row);
                }
            }
        }
    }

    let mut out: Vec<StockByLocation> = chosen.into_values().cloned().collect();
    out.sort_by(|a, b| {
        a.product_name
            .to_lowercase()
            .cmp(&b.product_name.to_lowercase())
            .then(a.product_id.cmp(&b.product_id))
    });
    out
}

fn prefer_over(candidate: &StockByLocation, current: &StockByLocation) -> bool {
    match (candidate.is_base_unit(), current.is_base_unit()) {
        (true, false) => true,
        (false, true) => false,
        _ => candidate.stock_count > current.stock_count,
    }
}

/// Products with available stock that match a search query
pub fn search_available<'a>(
    rows: &'a [StockByLocation],
    query: &str,
) -> Vec<&'a StockByLocation> {
    rows.iter()
        .filter(|r| r.stock_count > 0 && r.matches(query))
        .collect()
}

/// Threshold update for a product's min/max stock
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdUpdate {
    #[validate(range(min = 0, message = "Minimum stock cannot be negative"))]
    pub min_stock: i64,
    #[validate(range(min = 0, message = "Maximum stock cannot be negative"))]
    pub max_stock: i64,
}

impl ThresholdUpdate {
    /// Validate field ranges and ordering
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;
        if self.min_stock > self.max_stock {
            return Err("Minimum stock cannot exceed maximum stock".to_string());
        }
        Ok(())
    }
}
