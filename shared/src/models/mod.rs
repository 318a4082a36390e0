//! Domain models for the Stockroom inventory workspace

mod adjustment;
mod inventory;
mod location;
mod product;
mod received;
mod serial;
mod staging;
mod transfer;
mod user;

pub use adjustment::*;
pub use inventory::*;
pub use location::*;
pub use product::*;
pub use received::*;
pub use serial::*;
pub use staging::*;
pub use transfer::*;
pub use user::*;
