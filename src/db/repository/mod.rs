//! Repository layer — entity-scoped database operations.
//!
//! Free functions over `&Connection`, one sub-module per entity.
//! All public functions are re-exported here.

mod counter;
mod patient;
mod triage;

pub use counter::*;
pub use patient::*;
pub use triage::*;
