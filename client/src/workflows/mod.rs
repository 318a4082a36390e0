//! Async orchestrators: pure workflow state plus the REST calls behind it

mod composer;
mod inventory;
mod ledger;
mod override_wizard;
mod reconciler;
mod recovery;
mod staging;

pub use composer::TransferComposer;
pub use inventory::InventoryOverview;
pub use ledger::TransferLedger;
pub use override_wizard::InventoryOverride;
pub use reconciler::{ReceiptReconciler, ReconcileStage, SubmitOutcome};
pub use recovery::RecoveryDesk;
pub use staging::StagingBoard;
