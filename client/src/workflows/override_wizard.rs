//! Physical inventory override: upload, review, confirm and checkpoint revert

use chrono::{DateTime, Utc};
use shared::models::{AdjustmentBatch, Capability, PhysicalInventoryBaseRow, RevertBatchRequest};
use shared::types::EntityId;
use shared::workflow::{OverrideWizard, WizardStep};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::inflight::SubmitGuard;
use crate::invalidation::{InvalidationBus, ResourceKind};
use crate::session::AppSession;
use crate::spreadsheet::{export_sheet, import_sheet};

pub struct InventoryOverride {
    api: ApiClient,
    bus: InvalidationBus,
    guard: SubmitGuard,
    location_id: Option<EntityId>,
    base: Vec<PhysicalInventoryBaseRow>,
    wizard: OverrideWizard,
    batches: Vec<AdjustmentBatch>,
}

impl InventoryOverride {
    pub fn new(api: ApiClient, bus: InvalidationBus) -> Self {
        Self {
            api,
            bus,
            guard: SubmitGuard::new(),
            location_id: None,
            base: Vec::new(),
            wizard: OverrideWizard::new(),
            batches: Vec::new(),
        }
    }

    pub fn wizard(&self) -> &OverrideWizard {
        &self.wizard
    }

    pub fn base(&self) -> &[PhysicalInventoryBaseRow] {
        &self.base
    }

    pub fn batches(&self) -> &[AdjustmentBatch] {
        &self.batches
    }

    pub fn submit_guard(&self) -> SubmitGuard {
        self.guard.clone()
    }

    /// Fetch current server counts the upload is checked against
    pub async fn load_base(&mut self, location_id: Option<EntityId>) -> ClientResult<()> {
        self.base = self.api.physical_inventory_base(location_id).await?;
        self.location_id = location_id;
        tracing::debug!(?location_id, rows = self.base.len(), "Override base loaded");
        Ok(())
    }

    /// Sheet for operators to edit
    pub fn export(&self) -> ClientResult<Vec<u8>> {
        export_sheet(&self.base)
    }

    /// Parse an upload and move to review; a file that cannot be read resets to Upload
    pub async fn upload(&mut self, data: &[u8]) -> ClientResult<&OverrideWizard> {
        if self.base.is_empty() {
            self.load_base(self.location_id).await?;
        }

        let parsed = match import_sheet(data) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(error = %err, "Override sheet rejected");
                self.wizard.reset();
                return Err(err);
            }
        };

        self.wizard.load(parsed.rows, parsed.errors, &self.base);
        tracing::debug!(
            rows = self.wizard.rows.len(),
            errors = self.wizard.errors.len(),
            changed = self.wizard.changed_rows(),
            "Override sheet loaded"
        );
        Ok(&self.wizard)
    }

    /// Review → Confirm; row errors block the move
    pub fn advance(&mut self) -> ClientResult<()> {
        if self.wizard.step == WizardStep::Review && !self.wizard.errors.is_empty() {
            return Err(ClientError::RowErrors(self.wizard.errors.clone()));
        }
        self.wizard.advance()?;
        Ok(())
    }

    pub fn back(&mut self) -> ClientResult<()> {
        self.wizard.back()?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.wizard.reset();
    }

    /// Commit the reviewed upload as one adjustment batch
    pub async fn commit(
        &mut self,
        note: &str,
        reference_date: Option<DateTime<Utc>>,
        session: &AppSession,
    ) -> ClientResult<()> {
        session.require(Capability::OverrideInventory)?;
        let request = self
            .wizard
            .commit_request(note, reference_date, &session.user)?;
        let _token = self.guard.try_acquire()?;

        if let Err(err) = self.api.bulk_override(&request).await {
            self.wizard.record_failure(err.user_message());
            return Err(err);
        }

        tracing::info!(
            rows = request.rows.len(),
            reference_date = %request.reference_date,
            "Inventory override committed"
        );
        self.wizard.record_success();
        self.base.clear();
        self.bus.publish(&[
            ResourceKind::Inventory,
            ResourceKind::Products,
            ResourceKind::AdjustmentBatches,
        ]);
        Ok(())
    }

    /// Checkpoint list, newest first
    pub async fn load_batches(&mut self) -> ClientResult<&[AdjustmentBatch]> {
        let mut batches = self.api.adjustment_batches().await?;
        batches.sort_by(|a, b| b.batch_date.cmp(&a.batch_date));
        self.batches = batches;
        Ok(&self.batches)
    }

    /// Revert a whole batch; a blank reason is refused before any request
    pub async fn revert_batch(
        &mut self,
        batch: &AdjustmentBatch,
        reason: &str,
        session: &AppSession,
    ) -> ClientResult<()> {
        let request = RevertBatchRequest::new(batch, reason).map_err(|e| {
            tracing::warn!(batch_date = %batch.batch_date, "Revert refused: {}", e);
            ClientError::Validation("A reason is required to revert a batch".to_string())
        })?;
        session.require(Capability::RevertAdjustmentBatch)?;
        if batch.reverted {
            return Err(ClientError::Validation(
                "This batch has already been reverted".to_string(),
            ));
        }
        let _token = self.guard.try_acquire()?;

        self.api.revert_batch(&request).await?;

        tracing::info!(batch_date = %request.batch_date, user_id = request.user_id, "Adjustment batch reverted");
        for existing in self
            .batches
            .iter_mut()
            .filter(|b| b.batch_date == batch.batch_date && b.user_id == batch.user_id)
        {
            existing.reverted = true;
        }
        self.base.clear();
        self.bus.publish(&[
            ResourceKind::Inventory,
            ResourceKind::Products,
            ResourceKind::AdjustmentBatches,
        ]);
        Ok(())
    }
}
