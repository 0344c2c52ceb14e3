//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;
mod state;

pub use handlers::{
    // Commands
    CreateLotPalletLinkCommand, CreateLotPalletLinkHandler, RecordTraceEventCommand,
    RecordTraceEventHandler,
    // Queries
    GetNextStageHandler, GetNextStageQuery, GetPalletLotsHandler, GetPalletLotsQuery,
    ResolvePalletsHandler, ResolvePalletsQuery, ResolveScanHandler, ResolveScanQuery,
};
pub use state::TraceAppState;
