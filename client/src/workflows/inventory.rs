//! Inventory overview with stock-level classification

use shared::models::{Capability, InventorySnapshotRow, Product, StockLevel, ThresholdUpdate};
use shared::types::{matches_filter, EntityId};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::invalidation::{InvalidationBus, ResourceKind, Subscription};
use crate::session::AppSession;

pub struct InventoryOverview {
    api: ApiClient,
    bus: InvalidationBus,
    invalidations: Subscription,
    location_id: Option<EntityId>,
    rows: Vec<InventorySnapshotRow>,
    filter: String,
}

impl InventoryOverview {
    pub fn new(api: ApiClient, bus: InvalidationBus) -> Self {
        let invalidations = bus.subscribe(&[ResourceKind::Inventory, ResourceKind::Products]);
        Self {
            api,
            bus,
            invalidations,
            location_id: None,
            rows: Vec::new(),
            filter: String::new(),
        }
    }

    pub async fn load(&mut self, location_id: Option<EntityId>) -> ClientResult<()> {
        self.rows = self.api.inventory(location_id).await?;
        self.location_id = location_id;
        Ok(())
    }

    pub async fn refresh_if_invalidated(&mut self) -> ClientResult<bool> {
        if !self.invalidations.take_pending() {
            return Ok(false);
        }
        self.load(self.location_id).await?;
        Ok(true)
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn rows(&self) -> &[InventorySnapshotRow] {
        &self.rows
    }

    pub fn visible(&self) -> Vec<&InventorySnapshotRow> {
        self.rows
            .iter()
            .filter(|r| matches_filter(&[r.product_name.as_str(), r.location_name.as_str()], &self.filter))
            .collect()
    }

    /// Rows at the given stock level
    pub fn at_level(&self, level: StockLevel) -> Vec<&InventorySnapshotRow> {
        self.rows
            .iter()
            .filter(|r| r.stock_level() == level)
            .collect()
    }

    pub async fn update_threshold(
        &mut self,
        product_id: EntityId,
        update: ThresholdUpdate,
        session: &AppSession,
    ) -> ClientResult<()> {
        session.require(Capability::ManageThresholds)?;
        update.check().map_err(ClientError::Validation)?;
        self.api.update_threshold(product_id, &update).await?;

        tracing::info!(product_id, min = update.min_stock, max = update.max_stock, "Threshold updated");
        for row in self.rows.iter_mut().filter(|r| r.product_id == product_id) {
            row.min_stock = Some(update.min_stock);
            row.max_stock = Some(update.max_stock);
        }
        self.bus
            .publish(&[ResourceKind::Products, ResourceKind::Inventory]);
        Ok(())
    }

    pub async fn zero_stock(&self, location_id: EntityId) -> ClientResult<Vec<Product>> {
        self.api.zero_stock(location_id).await
    }
}
