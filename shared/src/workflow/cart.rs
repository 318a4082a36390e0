//! Transfer cart: the composer's in-progress request

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CreateTransferItem, CreateTransferRequest, SerialNumber, StockByLocation};
use crate::types::EntityId;
use crate::validation::{check_available_quantity, QuantityRejection};

/// How a serialized line's serials were chosen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PickMode {
    /// Provisional first-N pick from the availability lookup
    #[default]
    Auto,
    /// Chosen in the serial picker
    Manual,
}

/// One product line in the cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: EntityId,
    pub product_name: String,
    pub has_serial: bool,
    pub available: i64,
    pub quantity: i64,
    pub selected_serial_ids: Vec<EntityId>,
    pub pick_mode: PickMode,
    pub notes: Option<String>,
}

impl CartLine {
    fn from_stock(stock: &StockByLocation) -> Self {
        Self {
            product_id: stock.product_id,
            product_name: stock.product_name.clone(),
            has_serial: stock.has_serial,
            available: stock.stock_count,
            quantity: 0,
            selected_serial_ids: Vec::new(),
            pick_mode: PickMode::Auto,
            notes: None,
        }
    }

    /// Serialized lines need exactly `quantity` selected serials
    pub fn serials_resolved(&self) -> bool {
        !self.has_serial || self.selected_serial_ids.len() as i64 == self.quantity
    }
}

/// Result of a quantity change that was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityChange {
    /// Non-serialized line updated
    Applied,
    /// Serialized line updated; serials for `quantity` must be looked up
    NeedsSerialLookup { product_id: EntityId, quantity: i64 },
}

/// Cart operations that were refused without changing state
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Select a source location first")]
    SourceNotSelected,

    #[error("{0} has no available stock at this location")]
    NoStock(String),

    #[error("{0} is already in the transfer")]
    AlreadyInCart(String),

    #[error("Product {0} is not in the transfer")]
    NotInCart(EntityId),

    #[error("Product {0} is not serialized")]
    NotSerialized(EntityId),

    #[error("{0}")]
    Quantity(#[from] QuantityRejection),
}

/// Why the transfer cannot be submitted yet
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmitBlocker {
    #[error("Select a source location")]
    SourceUnset,

    #[error("Select a destination location")]
    DestinationUnset,

    #[error("Destination must differ from the source")]
    SameLocation,

    #[error("Add at least one product")]
    EmptyCart,

    #[error("{product_name}: quantity must be greater than zero")]
    NonPositiveQuantity {
        product_id: EntityId,
        product_name: String,
    },

    #[error("{product_name}: {selected} serial numbers selected for quantity {quantity}")]
    SerialCountMismatch {
        product_id: EntityId,
        product_name: String,
        quantity: i64,
        selected: usize,
    },
}

/// The composer's cart
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferCart {
    pub from_location_id: Option<EntityId>,
    pub to_location_id: Option<EntityId>,
    pub notes: Option<String>,
    pub lines: Vec<CartLine>,
}

impl TransferCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the source; a different source empties the cart
    pub fn set_source(&mut self, location_id: EntityId) {
        if self.from_location_id != Some(location_id) {
            self.lines.clear();
        }
        self.from_location_id = Some(location_id);
    }

    pub fn set_destination(&mut self, location_id: EntityId) {
        self.to_location_id = Some(location_id);
    }

    pub fn line(&self, product_id: EntityId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: EntityId) -> Result<&mut CartLine, CartError> {
        self.lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CartError::NotInCart(product_id))
    }

    /// Add a product from the source's stock list with quantity 0
    pub fn add_product(&mut self, stock: &StockByLocation) -> Result<(), CartError> {
        if self.from_location_id.is_none() {
            return Err(CartError::SourceNotSelected);
        }
        if stock.stock_count <= 0 {
            return Err(CartError::NoStock(stock.product_name.clone()));
        }
        if self.line(stock.product_id).is_some() {
            return Err(CartError::AlreadyInCart(stock.product_name.clone()));
        }
        self.lines.push(CartLine::from_stock(stock));
        Ok(())
    }

    pub fn remove_product(&mut self, product_id: EntityId) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(CartError::NotInCart(product_id));
        }
        Ok(())
    }

    /// Set a line's quantity; refused entries leave the line unchanged
    pub fn set_quantity(
        &mut self,
        product_id: EntityId,
        quantity: i64,
    ) -> Result<QuantityChange, CartError> {
        let line = self.line_mut(product_id)?;
        check_available_quantity(quantity, line.available)?;

        line.quantity = quantity;
        if !line.has_serial {
            return Ok(QuantityChange::Applied);
        }

        line.selected_serial_ids.clear();
        line.pick_mode = PickMode::Auto;
        Ok(QuantityChange::NeedsSerialLookup {
            product_id,
            quantity,
        })
    }

    /// Provisional pick: the first `quantity` serials in the order given
    pub fn apply_auto_pick(
        &mut self,
        product_id: EntityId,
        available: &[SerialNumber],
    ) -> Result<usize, CartError> {
        let line = self.line_mut(product_id)?;
        if !line.has_serial {
            return Err(CartError::NotSerialized(product_id));
        }
        let wanted = line.quantity.max(0) as usize;
        line.selected_serial_ids = available.iter().take(wanted).map(|s| s.id).collect();
        line.pick_mode = PickMode::Auto;
        Ok(line.selected_serial_ids.len())
    }

    /// Save a manual selection; the quantity follows the selection size
    pub fn apply_manual_selection(
        &mut self,
        product_id: EntityId,
        serial_ids: Vec<EntityId>,
    ) -> Result<(), CartError> {
        let line = self.line_mut(product_id)?;
        if !line.has_serial {
            return Err(CartError::NotSerialized(product_id));
        }
        let quantity = serial_ids.len() as i64;
        check_available_quantity(quantity, line.available)?;
        line.quantity = quantity;
        line.selected_serial_ids = serial_ids;
        line.pick_mode = PickMode::Manual;
        Ok(())
    }

    pub fn set_line_notes(&mut self, product_id: EntityId, notes: Option<String>) -> Result<(), CartError> {
        let line = self.line_mut(product_id)?;
        line.notes = notes.filter(|n| !n.trim().is_empty());
        Ok(())
    }

    /// Everything currently blocking submission
    pub fn blockers(&self) -> Vec<SubmitBlocker> {
        let mut blockers = Vec::new();

        match (self.from_location_id, self.to_location_id) {
            (None, None) => {
                blockers.push(SubmitBlocker::SourceUnset);
                blockers.push(SubmitBlocker::DestinationUnset);
            }
            (None, Some(_)) => blockers.push(SubmitBlocker::SourceUnset),
            (Some(_), None) => blockers.push(SubmitBlocker::DestinationUnset),
            (Some(from), Some(to)) if from == to => blockers.push(SubmitBlocker::SameLocation),
            _ => {}
        }

        if self.lines.is_empty() {
            blockers.push(SubmitBlocker::EmptyCart);
        }

        for line in &self.lines {
            if line.quantity <= 0 {
                blockers.push(SubmitBlocker::NonPositiveQuantity {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                });
            } else if !line.serials_resolved() {
                blockers.push(SubmitBlocker::SerialCountMismatch {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    quantity: line.quantity,
                    selected: line.selected_serial_ids.len(),
                });
            }
        }

        blockers
    }

    pub fn can_submit(&self) -> bool {
        self.blockers().is_empty()
    }

    /// Build the creation request, or report what blocks it
    pub fn to_request(
        &self,
        release_by: Option<String>,
    ) -> Result<CreateTransferRequest, Vec<SubmitBlocker>> {
        let blockers = self.blockers();
        if !blockers.is_empty() {
            return Err(blockers);
        }
        let (Some(from_location_id), Some(to_location_id)) =
            (self.from_location_id, self.to_location_id)
        else {
            return Err(vec![SubmitBlocker::SourceUnset]);
        };

        Ok(CreateTransferRequest {
            from_location_id,
            to_location_id,
            release_by,
            notes: self.notes.clone().filter(|n| !n.trim().is_empty()),
            items: self
                .lines
                .iter()
                .map(|line| CreateTransferItem {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    serial_number_ids: line.selected_serial_ids.clone(),
                    notes: line.notes.clone(),
                })
                .collect(),
        })
    }

    /// Reset after a successful submission
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
