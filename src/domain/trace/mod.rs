//! Trace module - the event log model and sequence validators.
//!
//! # Module Organization
//!
//! - `stage` - The 9-name stage vocabulary
//! - `payload` - Stage-specific typed details
//! - `event` - The immutable `TraceEvent` record
//! - `history` - Derived queries over a history (`stages_present`, `most_recent`)
//! - `sequence` - Canonical sequences as data and the shared next-stage rule
//! - `lot_trace` / `pallet_trace` - Per-subject validators
//! - `rejection` - Why a proposed stage is refused

mod event;
pub mod history;
mod lot_trace;
mod pallet_trace;
mod payload;
mod rejection;
mod sequence;
mod stage;

pub use event::TraceEvent;
pub use history::{most_recent, stages_present};
pub use lot_trace::LotTrace;
pub use pallet_trace::PalletTrace;
pub use payload::{
    CoolingDetails, DispatchDetails, HarvestCompleteDetails, HarvestStartDetails,
    PackingDetails, PackingReceptionDetails, PalletizingDetails, QualityControlDetails,
    SortingDetails, StagePayload,
};
pub use rejection::StageRejection;
pub use sequence::{SequenceProgress, StageSequence, StepStatus, LOT_SEQUENCE, PALLET_SEQUENCE};
pub use stage::EventStage;
