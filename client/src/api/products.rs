//! Products, stock-by-location and inventory snapshot endpoints

use shared::models::{InventorySnapshotRow, Product, StockByLocation, ThresholdUpdate};
use shared::types::EntityId;

use super::ApiClient;
use crate::error::{ClientError, ClientResult};

impl ApiClient {
    /// `GET /Products`
    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.get("/Products").await
    }

    /// `GET /Products/stock-by-location/{locationId}`, one row per unit of measure
    pub async fn stock_by_location(&self, location_id: EntityId) -> ClientResult<Vec<StockByLocation>> {
        self.get(&format!("/Products/stock-by-location/{}", location_id))
            .await
    }

    /// `GET /Products/zero-stock/{locationId}`
    pub async fn zero_stock(&self, location_id: EntityId) -> ClientResult<Vec<Product>> {
        self.get(&format!("/Products/zero-stock/{}", location_id)).await
    }

    /// `PUT /Products/{id}/threshold`
    pub async fn update_threshold(
        &self,
        product_id: EntityId,
        update: &ThresholdUpdate,
    ) -> ClientResult<()> {
        update.check().map_err(ClientError::Validation)?;
        self.put_no_content(&format!("/Products/{}/threshold", product_id), update)
            .await
    }

    /// `GET /Products/inventory[?locationId=]`
    pub async fn inventory(
        &self,
        location_id: Option<EntityId>,
    ) -> ClientResult<Vec<InventorySnapshotRow>> {
        match location_id {
            Some(id) => {
                self.get_with_query("/Products/inventory", &[("locationId", id)])
                    .await
            }
            None => self.get("/Products/inventory").await,
        }
    }
}
