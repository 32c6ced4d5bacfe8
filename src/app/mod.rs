//! Application core: sensor-node domain logic, zero direct I/O.
//!
//! Health supervision, aggregation and the mold model run inside the
//! periodic [`tasks`]; everything outside the process goes through the
//! **port traits** in [`ports`], so this layer is testable with scripted
//! adapters.

pub mod messages;
pub mod ports;
pub mod reporter;
pub mod tasks;
