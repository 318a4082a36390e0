//! Shared types and models for the Stockroom inventory workspace
//!
//! This crate contains the domain records exchanged with the inventory API,
//! the validation rules applied before any request is sent, and the pure
//! workflow state used by the client orchestrators and the browser (via WASM).

pub mod models;
pub mod types;
pub mod validation;
pub mod workflow;

pub use models::*;
pub use types::*;
pub use validation::*;
