use shared::models::{BatchStaging, BatchStagingHistory, Capability, CreateBatchStagingRequest};
use shared::types::EntityId;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::inflight::SubmitGuard;
use crate::invalidation::{InvalidationBus, ResourceKind};
use crate::session::AppSession;

/// Staged bulk receiving records and their history
pub struct StagingBoard {
    api: ApiClient,
    bus: InvalidationBus,
    guard: SubmitGuard,
    stagings: Vec<BatchStaging>,
    history: Vec<BatchStagingHistory>,
}

impl StagingBoard {
    pub fn new(api: ApiClient, bus: InvalidationBus) -> Self {
        Self {
            api,
            bus,
            guard: SubmitGuard::new(),
            stagings: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn stagings(&self) -> &[BatchStaging] {
        &self.stagings
    }

    pub fn submit_guard(&self) -> SubmitGuard {
        self.guard.clone()
    }

    pub async fn refresh(&mut self) -> ClientResult<()> {
        self.stagings = self.api.list_stagings().await?;
        self.history = self.api.staging_history().await?;
        Ok(())
    }

    /// History of one staging record, oldest first
    pub fn history_for(&self, staging_id: EntityId) -> Vec<&BatchStagingHistory> {
        let mut entries: Vec<&BatchStagingHistory> = self
            .history
            .iter()
            .filter(|h| h.staging_id == staging_id)
            .collect();
        entries.sort_by_key(|h| h.occurred_at);
        entries
    }

    pub async fn create(
        &mut self,
        mut request: CreateBatchStagingRequest,
        has_serial: bool,
        session: &AppSession,
    ) -> ClientResult<()> {
        session.require(Capability::ManageBatchStaging)?;
        request.check(has_serial).map_err(ClientError::Validation)?;
        if request.staged_by.is_none() {
            request.staged_by = Some(session.actor_name());
        }
        let _token = self.guard.try_acquire()?;

        self.api.create_staging(&request).await?;

        tracing::info!(
            product_id = request.product_id,
            location_id = request.location_id,
            quantity = request.quantity,
            "Batch staged"
        );
        self.bus.publish(&[ResourceKind::BatchStagings]);

        // The staging exists now; a failed reload must not invite a resubmit
        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "Staging list reload failed after create");
        }
        Ok(())
    }
}
