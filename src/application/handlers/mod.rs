//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.
//!
//! - `trace` - Recording events and next-stage queries
//! - `lineage` - Lot↔pallet links and lineage resolution
//! - `identity` - Scan resolution

pub mod identity;
pub mod lineage;
pub mod trace;

pub use identity::{
    ResolveScanError, ResolveScanHandler, ResolveScanQuery, ResolvedScan, SubjectRecord,
};
pub use lineage::{
    CreateLotPalletLinkCommand, CreateLotPalletLinkError, CreateLotPalletLinkHandler,
    CreateLotPalletLinkResult, GetPalletLotsError, GetPalletLotsHandler, GetPalletLotsQuery,
    LotContribution, PalletLotsView, ResolvePalletsError, ResolvePalletsHandler,
    ResolvePalletsQuery,
};
pub use trace::{
    GetNextStageError, GetNextStageHandler, GetNextStageQuery, NextStageView, PalletNextStage,
    RecordTraceEventCommand, RecordTraceEventError, RecordTraceEventHandler,
    RecordTraceEventResult,
};
