//! Domain layer containing the traceability rules and types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamps, ids, errors, state machines)
//! - `identity` - Lot/pallet identifier formats and the scan codec
//! - `trace` - Event log model and the lot/pallet sequence validators
//! - `lineage` - Lot to pallet split, links, and resolution

pub mod foundation;
pub mod identity;
pub mod lineage;
pub mod trace;
