//! Transfer composer: source/destination, cart and serial picking

use shared::models::{preferred_stock_rows, search_available, Capability, Location, StockByLocation};
use shared::types::{EntityId, Notice};
use shared::workflow::{CartError, QuantityChange, SerialPicker, TransferCart};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::inflight::SubmitGuard;
use crate::invalidation::{InvalidationBus, ResourceKind};
use crate::session::AppSession;

pub struct TransferComposer {
    api: ApiClient,
    bus: InvalidationBus,
    guard: SubmitGuard,
    cart: TransferCart,
    locations: Vec<Location>,
    stock: Vec<StockByLocation>,
}

impl TransferComposer {
    pub fn new(api: ApiClient, bus: InvalidationBus) -> Self {
        Self {
            api,
            bus,
            guard: SubmitGuard::new(),
            cart: TransferCart::new(),
            locations: Vec::new(),
            stock: Vec::new(),
        }
    }

    pub fn cart(&self) -> &TransferCart {
        &self.cart
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Shared handle on the in-flight state, for disabling the submit button
    pub fn submit_guard(&self) -> SubmitGuard {
        self.guard.clone()
    }

    pub async fn load_locations(&mut self) -> ClientResult<&[Location]> {
        self.locations = self
            .api
            .list_locations()
            .await?
            .into_iter()
            .filter(|l| l.is_active)
            .collect();
        Ok(&self.locations)
    }

    /// Pick the source and load what it has on hand
    pub async fn select_source(&mut self, location_id: EntityId) -> ClientResult<()> {
        let rows = self.api.stock_by_location(location_id).await?;
        self.cart.set_source(location_id);
        self.stock = preferred_stock_rows(&rows);
        tracing::debug!(location_id, products = self.stock.len(), "Source stock loaded");
        Ok(())
    }

    pub fn select_destination(&mut self, location_id: EntityId) {
        self.cart.set_destination(location_id);
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.cart.notes = notes;
    }

    /// Products with stock at the source matching the search
    pub fn available_products(&self, query: &str) -> Vec<&StockByLocation> {
        search_available(&self.stock, query)
    }

    pub fn add_product(&mut self, product_id: EntityId) -> ClientResult<()> {
        if self.cart.from_location_id.is_none() {
            return Err(CartError::SourceNotSelected.into());
        }
        let stock = self
            .stock
            .iter()
            .find(|s| s.product_id == product_id)
            .ok_or_else(|| ClientError::NotFound(format!("Product {} at the source", product_id)))?;
        self.cart.add_product(stock)?;
        Ok(())
    }

    pub fn remove_product(&mut self, product_id: EntityId) -> ClientResult<()> {
        self.cart.remove_product(product_id)?;
        Ok(())
    }

    pub fn set_line_notes(&mut self, product_id: EntityId, notes: Option<String>) -> ClientResult<()> {
        self.cart.set_line_notes(product_id, notes)?;
        Ok(())
    }

    /// Change a line's quantity.
    ///
    /// Over-available entries are refused and leave the line as it was. For
    /// serialized lines the first serials the server offers are picked; a
    /// warning is returned when fewer exist than requested.
    pub async fn set_quantity(
        &mut self,
        product_id: EntityId,
        quantity: i64,
    ) -> ClientResult<Option<Notice>> {
        let change = match self.cart.set_quantity(product_id, quantity) {
            Ok(change) => change,
            Err(err @ CartError::Quantity(_)) => {
                tracing::warn!(product_id, quantity, reason = %err, "Quantity refused");
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        let QuantityChange::NeedsSerialLookup { product_id, quantity } = change else {
            return Ok(None);
        };
        if quantity == 0 {
            return Ok(None);
        }
        let Some(source) = self.cart.from_location_id else {
            return Err(CartError::SourceNotSelected.into());
        };

        let serials = self.api.available_serials(product_id, source).await?;
        let picked = self.cart.apply_auto_pick(product_id, &serials)?;
        if (picked as i64) < quantity {
            tracing::warn!(product_id, quantity, picked, "Not enough serials to auto-pick");
            return Ok(Some(Notice::warning(format!(
                "Only {} serial numbers are available; {} requested",
                picked, quantity
            ))));
        }
        Ok(None)
    }

    /// Open the manual picker with the line's current selection checked
    pub async fn open_picker(&self, product_id: EntityId) -> ClientResult<SerialPicker> {
        let line = self
            .cart
            .line(product_id)
            .ok_or(CartError::NotInCart(product_id))?;
        if !line.has_serial {
            return Err(CartError::NotSerialized(product_id).into());
        }
        let source = self
            .cart
            .from_location_id
            .ok_or(CartError::SourceNotSelected)?;
        let serials = self.api.available_serials(product_id, source).await?;
        Ok(SerialPicker::new(serials, &line.selected_serial_ids))
    }

    /// Save the picker; the line quantity becomes the selection size
    pub fn save_picker(&mut self, product_id: EntityId, picker: &SerialPicker) -> ClientResult<()> {
        self.cart
            .apply_manual_selection(product_id, picker.selection())?;
        Ok(())
    }

    /// Post the transfer. The cart survives a failure untouched.
    pub async fn submit(&mut self, session: &AppSession) -> ClientResult<()> {
        session.require(Capability::CreateTransfer)?;
        let _token = self.guard.try_acquire()?;

        let request = self.cart.to_request(Some(session.actor_name()))?;
        self.api.create_transfer(&request).await?;

        tracing::info!(
            from = request.from_location_id,
            to = request.to_location_id,
            items = request.items.len(),
            "Transfer created"
        );
        self.cart.clear();
        self.stock.clear();
        self.bus
            .publish(&[ResourceKind::Transfers, ResourceKind::Inventory]);
        Ok(())
    }
}
