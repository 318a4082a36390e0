//! Missing-item recovery desk

use shared::models::{
    Capability, MarkFoundRequest, ReceivedTransfer, ReceivedTransferItem, RecoverQuantityRequest,
    RecoveryTarget,
};
use shared::types::EntityId;
use shared::workflow::{plan_quantity_recovery, plan_serial_recovery, RecoveryAction, RecoveryPlan};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::inflight::SubmitGuard;
use crate::invalidation::{InvalidationBus, ResourceKind, Subscription};
use crate::session::AppSession;

pub struct RecoveryDesk {
    api: ApiClient,
    bus: InvalidationBus,
    guard: SubmitGuard,
    invalidations: Subscription,
    receipts: Vec<ReceivedTransfer>,
    pending: Option<RecoveryPlan>,
}

impl RecoveryDesk {
    pub fn new(api: ApiClient, bus: InvalidationBus) -> Self {
        let invalidations = bus.subscribe(&[ResourceKind::ReceivedTransfers]);
        Self {
            api,
            bus,
            guard: SubmitGuard::new(),
            invalidations,
            receipts: Vec::new(),
            pending: None,
        }
    }

    pub fn submit_guard(&self) -> SubmitGuard {
        self.guard.clone()
    }

    pub async fn refresh(&mut self) -> ClientResult<()> {
        self.receipts = self.api.list_received_transfers().await?;
        Ok(())
    }

    pub async fn refresh_if_invalidated(&mut self) -> ClientResult<bool> {
        if !self.invalidations.take_pending() {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Receipts that still have something missing
    pub fn outstanding(&self) -> Vec<&ReceivedTransfer> {
        self.receipts
            .iter()
            .filter(|r| r.has_outstanding_shortage())
            .collect()
    }

    fn receipt(&self, received_transfer_id: EntityId) -> ClientResult<&ReceivedTransfer> {
        self.receipts
            .iter()
            .find(|r| r.id == received_transfer_id)
            .ok_or_else(|| ClientError::NotFound(format!("Receipt {}", received_transfer_id)))
    }

    /// Plan a bulk recovery; returns the confirmation text
    pub fn plan_quantity(
        &mut self,
        received_transfer_id: EntityId,
        item_id: EntityId,
        quantity: i64,
        target: RecoveryTarget,
    ) -> ClientResult<String> {
        let receipt = self.receipt(received_transfer_id)?;
        let plan = plan_quantity_recovery(receipt, item_id, quantity, target)?;
        let confirmation = plan.confirmation.clone();
        self.pending = Some(plan);
        Ok(confirmation)
    }

    /// Plan recovery of one missing serial; returns the confirmation text
    pub fn plan_serial(
        &mut self,
        received_transfer_id: EntityId,
        item_id: EntityId,
        serial_number_id: EntityId,
        target: RecoveryTarget,
    ) -> ClientResult<String> {
        let receipt = self.receipt(received_transfer_id)?;
        let plan = plan_serial_recovery(receipt, item_id, serial_number_id, target)?;
        let confirmation = plan.confirmation.clone();
        self.pending = Some(plan);
        Ok(confirmation)
    }

    pub fn pending(&self) -> Option<&RecoveryPlan> {
        self.pending.as_ref()
    }

    pub fn cancel_plan(&mut self) {
        self.pending = None;
    }

    /// The line as it will look once the pending plan is applied
    pub fn preview(&self) -> Option<ReceivedTransferItem> {
        let plan = self.pending.as_ref()?;
        apply_locally(&self.receipts, &plan.action)
    }

    /// Send the confirmed plan
    pub async fn confirm(&mut self, session: &AppSession) -> ClientResult<()> {
        session.require(Capability::RecoverMissing)?;
        let plan = self
            .pending
            .clone()
            .ok_or_else(|| ClientError::Validation("Nothing to confirm".to_string()))?;
        let _token = self.guard.try_acquire()?;
        let recovered_by = Some(session.actor_name());

        match &plan.action {
            RecoveryAction::Quantity {
                received_transfer_id,
                item_id,
                quantity,
                target,
            } => {
                let request = RecoverQuantityRequest {
                    quantity: *quantity,
                    target: *target,
                    recovered_by,
                };
                self.api
                    .recover_quantity(*received_transfer_id, *item_id, &request)
                    .await?;
            }
            RecoveryAction::Serial {
                received_transfer_id,
                item_id,
                serial_number_id,
                target,
            } => {
                let request = MarkFoundRequest {
                    target: *target,
                    recovered_by,
                };
                self.api
                    .mark_serial_found(*received_transfer_id, *item_id, *serial_number_id, &request)
                    .await?;
            }
        }

        tracing::info!(action = ?plan.action, "Missing stock recovered");
        if let Some(updated) = apply_locally(&self.receipts, &plan.action) {
            replace_item(&mut self.receipts, &plan.action, updated);
        }
        self.pending = None;
        self.bus
            .publish(&[ResourceKind::ReceivedTransfers, ResourceKind::Inventory]);
        Ok(())
    }
}

fn action_ids(action: &RecoveryAction) -> (EntityId, EntityId) {
    match action {
        RecoveryAction::Quantity {
            received_transfer_id,
            item_id,
            ..
        }
        | RecoveryAction::Serial {
            received_transfer_id,
            item_id,
            ..
        } => (*received_transfer_id, *item_id),
    }
}

fn apply_locally(receipts: &[ReceivedTransfer], action: &RecoveryAction) -> Option<ReceivedTransferItem> {
    let (receipt_id, item_id) = action_ids(action);
    let item = receipts
        .iter()
        .find(|r| r.id == receipt_id)?
        .item(item_id)?;
    Some(match action {
        RecoveryAction::Quantity {
            quantity, target, ..
        } => item.with_quantity_recovered(*quantity, *target),
        RecoveryAction::Serial {
            serial_number_id,
            target,
            ..
        } => item.with_serial_recovered(*serial_number_id, *target),
    })
}

fn replace_item(receipts: &mut [ReceivedTransfer], action: &RecoveryAction, updated: ReceivedTransferItem) {
    let (receipt_id, item_id) = action_ids(action);
    if let Some(slot) = receipts
        .iter_mut()
        .filter(|r| r.id == receipt_id)
        .flat_map(|r| r.items.iter_mut())
        .find(|i| i.id == item_id)
    {
        *slot = updated;
    }
}
