//! In-transit transfer ledger

use std::collections::HashSet;

use shared::models::{in_transit_newest_first, manifest, Capability, ManifestLine, Transfer, TransferStatus};
use shared::types::EntityId;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::inflight::SubmitGuard;
use crate::invalidation::{InvalidationBus, ResourceKind, Subscription};
use crate::session::AppSession;
use crate::workflows::ReceiptReconciler;

pub struct TransferLedger {
    api: ApiClient,
    bus: InvalidationBus,
    guard: SubmitGuard,
    invalidations: Subscription,
    transfers: Vec<Transfer>,
    filter: String,
    /// Transfer whose cancellation is awaiting confirmation
    pending_cancel: Option<EntityId>,
}

impl TransferLedger {
    pub fn new(api: ApiClient, bus: InvalidationBus) -> Self {
        let invalidations = bus.subscribe(&[ResourceKind::Transfers]);
        Self {
            api,
            bus,
            guard: SubmitGuard::new(),
            invalidations,
            transfers: Vec::new(),
            filter: String::new(),
            pending_cancel: None,
        }
    }

    pub fn submit_guard(&self) -> SubmitGuard {
        self.guard.clone()
    }

    /// Refetch, keeping only in-transit transfers, newest first
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let all = self.api.list_transfers().await?;
        self.transfers = in_transit_newest_first(&all);
        tracing::debug!(in_transit = self.transfers.len(), "Ledger refreshed");
        Ok(())
    }

    /// Refetch when a transfer invalidation arrived since the last look
    pub async fn refresh_if_invalidated(&mut self) -> ClientResult<bool> {
        if !self.invalidations.take_pending() {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// Transfers matching the free-text filter
    pub fn visible(&self) -> Vec<&Transfer> {
        self.transfers
            .iter()
            .filter(|t| t.matches(&self.filter))
            .collect()
    }

    fn find(&self, transfer_id: EntityId) -> ClientResult<&Transfer> {
        self.transfers
            .iter()
            .find(|t| t.id == transfer_id)
            .ok_or_else(|| ClientError::NotFound(format!("Transfer {}", transfer_id)))
    }

    /// Read-only item list
    pub fn manifest(&self, transfer_id: EntityId) -> ClientResult<Vec<ManifestLine>> {
        Ok(manifest(self.find(transfer_id)?))
    }

    /// Stage a cancellation; returns the text the operator must confirm
    pub fn plan_cancel(&mut self, transfer_id: EntityId) -> ClientResult<String> {
        let transfer = self.find(transfer_id)?;
        if !transfer.status.can_transition_to(TransferStatus::Reverted) {
            return Err(ClientError::Validation(format!(
                "Transfer #{} is {} and cannot be cancelled",
                transfer_id, transfer.status
            )));
        }
        let confirmation = format!(
            "Cancel transfer #{} from {} to {}? Stock returns to {}.",
            transfer.id,
            transfer.from_location_name,
            transfer.to_location_name,
            transfer.from_location_name
        );
        self.pending_cancel = Some(transfer_id);
        Ok(confirmation)
    }

    pub fn pending_cancel(&self) -> Option<EntityId> {
        self.pending_cancel
    }

    pub fn dismiss_cancel(&mut self) {
        self.pending_cancel = None;
    }

    /// Revert the transfer staged by [`plan_cancel`](Self::plan_cancel)
    pub async fn confirm_cancel(&mut self, session: &AppSession) -> ClientResult<()> {
        session.require(Capability::RevertTransfer)?;
        let transfer_id = self
            .pending_cancel
            .ok_or_else(|| ClientError::Validation("No cancellation to confirm".to_string()))?;
        let _token = self.guard.try_acquire()?;
        self.api.revert_transfer(transfer_id).await?;

        tracing::info!(transfer_id, "Transfer reverted");
        self.pending_cancel = None;
        self.transfers.retain(|t| t.id != transfer_id);
        self.bus
            .publish(&[ResourceKind::Transfers, ResourceKind::Inventory]);
        Ok(())
    }

    /// Re-fetch the full transfer and open it for receiving
    pub async fn open_receipt(&self, transfer_id: EntityId) -> ClientResult<ReceiptReconciler> {
        let transfer = self.api.get_transfer(transfer_id).await?;
        if transfer.status != TransferStatus::InTransit {
            return Err(ClientError::Validation(format!(
                "Transfer #{} is {} and cannot be received",
                transfer_id, transfer.status
            )));
        }

        let mut seen = HashSet::new();
        let serial_ids: Vec<EntityId> = transfer
            .items
            .iter()
            .filter(|i| i.has_serial)
            .flat_map(|i| i.serial_number_ids.iter().copied())
            .filter(|id| seen.insert(*id))
            .collect();
        let names = self.api.serial_names(&serial_ids).await?;

        Ok(ReceiptReconciler::new(
            self.api.clone(),
            self.bus.clone(),
            transfer,
            &names,
        ))
    }
}
