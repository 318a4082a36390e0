//! Transfer endpoints

use shared::models::{CreateTransferRequest, Transfer};
use shared::types::EntityId;
use validator::Validate;

use super::ApiClient;
use crate::error::{ClientError, ClientResult};

impl ApiClient {
    /// `POST /Transfers`
    pub async fn create_transfer(&self, request: &CreateTransferRequest) -> ClientResult<()> {
        request.validate()?;
        for item in &request.items {
            item.validate()?;
        }
        self.post_no_content("/Transfers", request).await
    }

    /// `GET /Transfers`
    pub async fn list_transfers(&self) -> ClientResult<Vec<Transfer>> {
        self.get("/Transfers").await
    }

    /// `GET /Transfers/{id}`
    pub async fn get_transfer(&self, transfer_id: EntityId) -> ClientResult<Transfer> {
        match self.get(&format!("/Transfers/{}", transfer_id)).await {
            Err(ClientError::Server { status: 404, .. }) => {
                Err(ClientError::NotFound(format!("Transfer {}", transfer_id)))
            }
            other => other,
        }
    }

    /// `POST /Transfers/{id}/revert`
    pub async fn revert_transfer(&self, transfer_id: EntityId) -> ClientResult<()> {
        self.post_no_content(
            &format!("/Transfers/{}/revert", transfer_id),
            &serde_json::json!({}),
        )
        .await
    }
}
