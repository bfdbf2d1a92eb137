//! Position settlement.
//!
//! Rendering stays deactivated while the player position is unsettled (spawn, teleport) and
//! is resumed with a `teleport` followed by `activate_rendering` once the destination is ready.

mod error;
mod gate;

pub use error::{SettlementError, SettlementErrorExt};
pub use gate::{DeadlineOutcome, SettlementGate};
