//! Receipt reconciliation and recovery endpoints

use shared::models::{MarkFoundRequest, ReceivedTransfer, ReconcileRequest, RecoverQuantityRequest};
use shared::types::EntityId;
use validator::Validate;

use super::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// `POST /ReceivedTransfers`
    pub async fn reconcile_transfer(&self, request: &ReconcileRequest) -> ClientResult<()> {
        self.post_no_content("/ReceivedTransfers", request).await
    }

    /// `GET /ReceivedTransfers`
    pub async fn list_received_transfers(&self) -> ClientResult<Vec<ReceivedTransfer>> {
        self.get("/ReceivedTransfers").await
    }

    /// `POST /ReceivedTransfers/{id}/items/{itemId}/serials/{serialId}/found`
    pub async fn mark_serial_found(
        &self,
        received_transfer_id: EntityId,
        item_id: EntityId,
        serial_number_id: EntityId,
        request: &MarkFoundRequest,
    ) -> ClientResult<()> {
        self.post_no_content(
            &format!(
                "/ReceivedTransfers/{}/items/{}/serials/{}/found",
                received_transfer_id, item_id, serial_number_id
            ),
            request,
        )
        .await
    }

    /// `POST /ReceivedTransfers/{id}/items/{itemId}/recover`
    pub async fn recover_quantity(
        &self,
        received_transfer_id: EntityId,
        item_id: EntityId,
        request: &RecoverQuantityRequest,
    ) -> ClientResult<()> {
        request.validate()?;
        self.post_no_content(
            &format!(
                "/ReceivedTransfers/{}/items/{}/recover",
                received_transfer_id, item_id
            ),
            request,
        )
        .await
    }
}
