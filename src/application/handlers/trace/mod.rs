//! Trace handlers - recording events and asking what comes next.

mod get_next_stage;
mod record_event;

pub use get_next_stage::{
    GetNextStageError, GetNextStageHandler, GetNextStageQuery, NextStageView, PalletNextStage,
};
pub use record_event::{
    RecordTraceEventCommand, RecordTraceEventError, RecordTraceEventHandler,
    RecordTraceEventResult,
};

use crate::domain::foundation::DomainError;
use crate::domain::identity::{LotId, PalletId, SubjectRef};
use crate::domain::trace::{LotTrace, PalletTrace};
use crate::ports::TraceEventStore;

/// Loads a lot's trace from the store.
pub(crate) async fn load_lot_trace(
    store: &dyn TraceEventStore,
    lot_id: &LotId,
) -> Result<LotTrace, DomainError> {
    let events = store.fetch_events(&SubjectRef::Lot(lot_id.clone())).await?;
    Ok(LotTrace::from_history(lot_id, &events))
}

/// Loads a pallet's trace from the store.
pub(crate) async fn load_pallet_trace(
    store: &dyn TraceEventStore,
    pallet_id: &PalletId,
) -> Result<PalletTrace, DomainError> {
    let events = store
        .fetch_events(&SubjectRef::Pallet(pallet_id.clone()))
        .await?;
    Ok(PalletTrace::from_history(pallet_id, &events))
}
