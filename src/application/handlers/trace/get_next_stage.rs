//! GetNextStageHandler - Query handler for "what can be recorded next".
//!
//! For a pallet the answer comes from its own sequence. For a lot the
//! nominal next stage is always reported; once the lot has split, the
//! remaining work happens on its pallets, so the answer also lists each
//! linked pallet with that pallet's own next stage.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::{load_lot_trace, load_pallet_trace};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::identity::{LotId, PalletId, SubjectRef};
use crate::domain::lineage::SplitStatus;
use crate::domain::trace::{EventStage, SequenceProgress};
use crate::ports::{LotPalletLinkRepository, SubjectDirectory, TraceEventStore};

/// Query for the next admissible stage of a lot or pallet.
#[derive(Debug, Clone)]
pub struct GetNextStageQuery {
    pub subject: SubjectRef,
}

/// A pallet's own next stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletNextStage {
    pub pallet_id: PalletId,
    pub next_stage: Option<EventStage>,
    pub complete: bool,
}

/// Answer to a next-stage query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "subjectType", rename_all = "lowercase")]
pub enum NextStageView {
    #[serde(rename_all = "camelCase")]
    Lot {
        lot_id: LotId,
        progress: SequenceProgress,
        /// Nominal next stage in the lot sequence, reported even after split.
        next_stage: Option<EventStage>,
        /// Whether `next_stage` may be recorded against the lot itself.
        admissible_at_lot: bool,
        split: SplitStatus,
        /// Pallets now carrying the lot; empty before split.
        pallets: Vec<PalletNextStage>,
    },
    #[serde(rename_all = "camelCase")]
    Pallet {
        pallet_id: PalletId,
        progress: SequenceProgress,
        next_stage: Option<EventStage>,
    },
}

impl NextStageView {
    pub fn next_stage(&self) -> Option<EventStage> {
        match self {
            NextStageView::Lot { next_stage, .. } | NextStageView::Pallet { next_stage, .. } => {
                *next_stage
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.next_stage().is_none()
    }
}

/// Error type for next-stage queries.
#[derive(Debug, Clone)]
pub enum GetNextStageError {
    SubjectNotFound(SubjectRef),
    Store(DomainError),
}

impl GetNextStageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GetNextStageError::SubjectNotFound(SubjectRef::Lot(_)) => ErrorCode::LotNotFound,
            GetNextStageError::SubjectNotFound(SubjectRef::Pallet(_)) => ErrorCode::PalletNotFound,
            GetNextStageError::Store(err) => err.code,
        }
    }
}

impl std::fmt::Display for GetNextStageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GetNextStageError::SubjectNotFound(subject) => {
                write!(f, "Subject not found: {}", subject)
            }
            GetNextStageError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for GetNextStageError {}

impl From<DomainError> for GetNextStageError {
    fn from(err: DomainError) -> Self {
        GetNextStageError::Store(err)
    }
}

/// Handler for next-stage queries.
pub struct GetNextStageHandler {
    event_store: Arc<dyn TraceEventStore>,
    directory: Arc<dyn SubjectDirectory>,
    links: Arc<dyn LotPalletLinkRepository>,
}

impl GetNextStageHandler {
    pub fn new(
        event_store: Arc<dyn TraceEventStore>,
        directory: Arc<dyn SubjectDirectory>,
        links: Arc<dyn LotPalletLinkRepository>,
    ) -> Self {
        Self {
            event_store,
            directory,
            links,
        }
    }

    pub async fn handle(&self, query: GetNextStageQuery) -> Result<NextStageView, GetNextStageError> {
        match query.subject {
            SubjectRef::Lot(lot_id) => self.for_lot(lot_id).await,
            SubjectRef::Pallet(pallet_id) => self.for_pallet(pallet_id).await,
        }
    }

    async fn for_pallet(&self, pallet_id: PalletId) -> Result<NextStageView, GetNextStageError> {
        if self.directory.find_pallet(&pallet_id).await?.is_none() {
            return Err(GetNextStageError::SubjectNotFound(SubjectRef::Pallet(
                pallet_id,
            )));
        }

        let trace = load_pallet_trace(self.event_store.as_ref(), &pallet_id).await?;
        Ok(NextStageView::Pallet {
            next_stage: trace.next_valid_stage(),
            progress: trace.progress(),
            pallet_id,
        })
    }

    async fn for_lot(&self, lot_id: LotId) -> Result<NextStageView, GetNextStageError> {
        let record = self
            .directory
            .find_lot(&lot_id)
            .await?
            .ok_or_else(|| GetNextStageError::SubjectNotFound(SubjectRef::Lot(lot_id.clone())))?;

        let trace = load_lot_trace(self.event_store.as_ref(), &lot_id).await?;
        let split = SplitStatus::assess(&trace, record.state_label.as_deref());
        if let Some(warning) = split.warning() {
            warn!(lot_id = %lot_id, state_label = ?record.state_label, "{}", warning);
        }

        let mut pallets = Vec::new();
        if split.has_split() {
            for link in self.links.find_by_lot(&lot_id).await? {
                let pallet = load_pallet_trace(self.event_store.as_ref(), &link.pallet_id).await?;
                pallets.push(PalletNextStage {
                    next_stage: pallet.next_valid_stage(),
                    complete: pallet.is_complete(),
                    pallet_id: link.pallet_id,
                });
            }
        }

        let next_stage = trace.next_valid_stage();
        Ok(NextStageView::Lot {
            admissible_at_lot: !split.has_split() && next_stage.is_some(),
            progress: trace.progress(),
            next_stage,
            split,
            pallets,
            lot_id,
        })
    }
}
