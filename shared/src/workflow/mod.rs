//! Pure workflow state shared by the client orchestrators and the browser
//!
//! Nothing here performs I/O; every operation either updates local state or
//! reports why it was refused.

mod cart;
mod override_sheet;
mod picker;
mod reconciliation;
mod recovery;

pub use cart::*;
pub use override_sheet::*;
pub use picker::*;
pub use reconciliation::*;
pub use recovery::*;
