use shared::models::{BatchStaging, BatchStagingHistory, CreateBatchStagingRequest};
use validator::Validate;

use super::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// `GET /BatchStagings`
    pub async fn list_stagings(&self) -> ClientResult<Vec<BatchStaging>> {
        self.get("/BatchStagings").await
    }

    /// `POST /BatchStagings`
    pub async fn create_staging(&self, request: &CreateBatchStagingRequest) -> ClientResult<()> {
        request.validate()?;
        self.post_no_content("/BatchStagings", request).await
    }

    /// `GET /BatchStagingsHistory`
    pub async fn staging_history(&self) -> ClientResult<Vec<BatchStagingHistory>> {
        self.get("/BatchStagingsHistory").await
    }
}
