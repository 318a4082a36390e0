//! Stockroom client
//!
//! Typed access to the inventory REST API and the async orchestrators that
//! drive the transfer, reconciliation, recovery and override workflows.

pub mod api;
pub mod config;
pub mod error;
pub mod inflight;
pub mod invalidation;
pub mod session;
pub mod spreadsheet;
pub mod workflows;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use inflight::{InFlightToken, SubmitGuard};
pub use invalidation::{InvalidationBus, ResourceKind, Subscription};
pub use session::{AppSession, SessionStore};
