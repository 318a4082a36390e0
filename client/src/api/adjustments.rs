//! Physical inventory override and checkpoint endpoints

use shared::models::{AdjustmentBatch, BulkOverrideRequest, PhysicalInventoryBaseRow, RevertBatchRequest};
use shared::types::EntityId;
use validator::Validate;

use super::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// `GET /Products/physical-inventory-base[?locationId=]`
    pub async fn physical_inventory_base(
        &self,
        location_id: Option<EntityId>,
    ) -> ClientResult<Vec<PhysicalInventoryBaseRow>> {
        match location_id {
            Some(id) => {
                self.get_with_query("/Products/physical-inventory-base", &[("locationId", id)])
                    .await
            }
            None => self.get("/Products/physical-inventory-base").await,
        }
    }

    /// `POST /Products/BulkOverride`
    pub async fn bulk_override(&self, request: &BulkOverrideRequest) -> ClientResult<()> {
        request.validate()?;
        self.post_no_content("/Products/BulkOverride", request).await
    }

    /// `GET /Products/adjustment-batches`
    pub async fn adjustment_batches(&self) -> ClientResult<Vec<AdjustmentBatch>> {
        self.get("/Products/adjustment-batches").await
    }

    /// `POST /Products/RevertBatch`
    pub async fn revert_batch(&self, request: &RevertBatchRequest) -> ClientResult<()> {
        request.validate()?;
        self.post_no_content("/Products/RevertBatch", request).await
    }
}
