//! Lineage module - the lot to pallet split and its resolution.
//!
//! # Module Organization
//!
//! - `records` - Lot and pallet rows kept by the store, `PalletState`
//! - `split` - The two split signals and their combination
//! - `link` - Lot↔pallet associations and the rules for creating them
//! - `resolution` - Which pallets carry a lot, with box reconciliation
//! - `state_patch` - Label/location updates implied by accepted events

mod link;
mod records;
mod resolution;
mod split;
mod state_patch;

pub use link::{LinkRejection, LinkRequest, LotPalletLink};
pub use records::{LotRecord, PalletRecord, PalletState};
pub use resolution::{
    BoxReconciliation, LineageCondition, LineageResolution, PalletSummary, ReconciliationStatus,
};
pub use split::{is_post_split_label, SplitStatus, POST_SPLIT_STATE_LABELS};
pub use state_patch::{SubjectStatePatch, DEFAULT_COLD_STORAGE, LOT_PALLETIZED_LABEL};
