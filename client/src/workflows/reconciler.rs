//! Receipt reconciler: expected vs. received for one transfer

use std::collections::HashMap;

use serde::Serialize;
use shared::models::{Capability, Transfer};
use shared::types::EntityId;
use shared::workflow::{shortage_message, ReceiptSheet, Shortage};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::inflight::SubmitGuard;
use crate::invalidation::{InvalidationBus, ResourceKind};
use crate::session::AppSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ReconcileStage {
    Review,
    /// Waiting for the operator to acknowledge the listed shortfalls
    ConfirmingShortage {
        shortages: Vec<Shortage>,
        message: String,
    },
    Submitted,
}

/// What a submit attempt led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    NeedsConfirmation(String),
    Submitted,
}

pub struct ReceiptReconciler {
    api: ApiClient,
    bus: InvalidationBus,
    guard: SubmitGuard,
    transfer: Transfer,
    sheet: ReceiptSheet,
    stage: ReconcileStage,
}

impl ReceiptReconciler {
    pub fn new(
        api: ApiClient,
        bus: InvalidationBus,
        transfer: Transfer,
        serial_names: &HashMap<EntityId, String>,
    ) -> Self {
        let sheet = ReceiptSheet::from_transfer(&transfer, serial_names);
        Self {
            api,
            bus,
            guard: SubmitGuard::new(),
            transfer,
            sheet,
            stage: ReconcileStage::Review,
        }
    }

    pub fn transfer(&self) -> &Transfer {
        &self.transfer
    }

    pub fn sheet(&self) -> &ReceiptSheet {
        &self.sheet
    }

    pub fn stage(&self) -> &ReconcileStage {
        &self.stage
    }

    pub fn submit_guard(&self) -> SubmitGuard {
        self.guard.clone()
    }

    fn ensure_reviewing(&self) -> ClientResult<()> {
        match self.stage {
            ReconcileStage::Review => Ok(()),
            _ => Err(ClientError::Validation(
                "The receipt is not open for editing".to_string(),
            )),
        }
    }

    pub fn toggle_serial(&mut self, line: usize, serial_number_id: EntityId) -> ClientResult<i64> {
        self.ensure_reviewing()?;
        Ok(self.sheet.toggle_serial(line, serial_number_id)?)
    }

    pub fn set_received(&mut self, line: usize, value: i64) -> ClientResult<i64> {
        self.ensure_reviewing()?;
        Ok(self.sheet.set_received(line, value)?)
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.sheet.notes = notes;
    }

    /// Submit, or stop for confirmation when anything was received short
    pub async fn submit(&mut self, session: &AppSession) -> ClientResult<SubmitOutcome> {
        self.ensure_reviewing()?;
        session.require(Capability::ReceiveTransfer)?;

        let shortages = self.sheet.shortages();
        if shortages.is_empty() {
            self.send(session).await?;
            return Ok(SubmitOutcome::Submitted);
        }

        let message = shortage_message(&shortages);
        tracing::debug!(
            transfer_id = self.transfer.id,
            short_lines = shortages.len(),
            "Shortage confirmation required"
        );
        self.stage = ReconcileStage::ConfirmingShortage {
            shortages,
            message: message.clone(),
        };
        Ok(SubmitOutcome::NeedsConfirmation(message))
    }

    /// Back to review without sending anything
    pub fn cancel_shortage(&mut self) {
        if matches!(self.stage, ReconcileStage::ConfirmingShortage { .. }) {
            self.stage = ReconcileStage::Review;
        }
    }

    /// "Confirm Shortage"
    pub async fn confirm_shortage(&mut self, session: &AppSession) -> ClientResult<()> {
        if !matches!(self.stage, ReconcileStage::ConfirmingShortage { .. }) {
            return Err(ClientError::Validation(
                "There is no shortage awaiting confirmation".to_string(),
            ));
        }
        session.require(Capability::ReceiveTransfer)?;
        self.send(session).await
    }

    async fn send(&mut self, session: &AppSession) -> ClientResult<()> {
        let _token = self.guard.try_acquire()?;
        let request = self.sheet.to_request(Some(session.actor_name()));

        if let Err(err) = self.api.reconcile_transfer(&request).await {
            self.stage = ReconcileStage::Review;
            return Err(err);
        }

        tracing::info!(
            transfer_id = self.transfer.id,
            missing = request.items.iter().map(|i| i.missing_quantity).sum::<i64>(),
            "Transfer reconciled"
        );
        self.stage = ReconcileStage::Submitted;
        self.bus.publish(&[
            ResourceKind::Transfers,
            ResourceKind::ReceivedTransfers,
            ResourceKind::Inventory,
        ]);
        Ok(())
    }
}
