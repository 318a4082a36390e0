//! Serial number endpoints

use std::collections::HashMap;

use shared::models::{SerialLookupRequest, SerialNumber};
use shared::types::EntityId;

use super::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// `GET /SerialNumbers/available?productId=&locationId=`, in the server's FIFO order
    pub async fn available_serials(
        &self,
        product_id: EntityId,
        location_id: EntityId,
    ) -> ClientResult<Vec<SerialNumber>> {
        self.get_with_query(
            "/SerialNumbers/available",
            &[("productId", product_id), ("locationId", location_id)],
        )
        .await
    }

    /// `POST /SerialNumbers/lookup`
    pub async fn lookup_serials(&self, ids: &[EntityId]) -> ClientResult<Vec<SerialNumber>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let request = SerialLookupRequest { ids: ids.to_vec() };
        self.post("/SerialNumbers/lookup", &request).await
    }

    /// Bulk id → display name lookup
    pub async fn serial_names(&self, ids: &[EntityId]) -> ClientResult<HashMap<EntityId, String>> {
        let serials = self.lookup_serials(ids).await?;
        Ok(serials
            .into_iter()
            .map(|s| (s.id, s.serial_number))
            .collect())
    }
}
