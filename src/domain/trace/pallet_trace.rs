//! PalletTrace - sequence validation for a single pallet.
//!
//! Same rule as the lot sequence, over the 3-stage pallet sequence. Each
//! pallet is validated only against its own events, so pallets that share a
//! lot progress independently.

use std::collections::BTreeSet;

use super::history::{for_subject, stages_present};
use super::{EventStage, SequenceProgress, StageRejection, TraceEvent, PALLET_SEQUENCE};
use crate::domain::identity::{EntityType, PalletId, SubjectRef};

/// Snapshot of one pallet's recorded stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalletTrace {
    subject: SubjectRef,
    present: BTreeSet<EventStage>,
}

impl PalletTrace {
    /// Builds the snapshot from a history, ignoring events of other subjects.
    pub fn from_history(pallet_id: &PalletId, events: &[TraceEvent]) -> Self {
        let subject = SubjectRef::Pallet(pallet_id.clone());
        let present = stages_present(for_subject(events, &subject));
        Self { subject, present }
    }

    pub fn subject(&self) -> &SubjectRef {
        &self.subject
    }

    pub fn stages_present(&self) -> &BTreeSet<EventStage> {
        &self.present
    }

    pub fn next_valid_stage(&self) -> Option<EventStage> {
        PALLET_SEQUENCE.next_valid_stage(&self.present)
    }

    /// True when `Enfriado`, `Control Calidad` and `Despacho` are all recorded.
    pub fn is_complete(&self) -> bool {
        PALLET_SEQUENCE.is_complete(&self.present)
    }

    pub fn is_admissible(&self, proposed: EventStage) -> bool {
        self.check(proposed).is_ok()
    }

    /// Validates a proposed pallet-level stage.
    ///
    /// # Errors
    ///
    /// - `WrongLevel` if `proposed` is a lot-only stage
    /// - `ProcessComplete` if all pallet stages are recorded
    /// - `SequenceViolation` if `proposed` is not the next stage
    pub fn check(&self, proposed: EventStage) -> Result<(), StageRejection> {
        if !PALLET_SEQUENCE.contains(proposed) {
            return Err(StageRejection::WrongLevel {
                subject: self.subject.clone(),
                proposed,
                required_level: EntityType::Lot,
            });
        }

        match self.next_valid_stage() {
            None => Err(StageRejection::ProcessComplete {
                subject: self.subject.clone(),
            }),
            Some(expected) if expected != proposed => Err(StageRejection::SequenceViolation {
                subject: self.subject.clone(),
                expected,
                proposed,
            }),
            Some(_) => Ok(()),
        }
    }

    pub fn progress(&self) -> SequenceProgress {
        PALLET_SEQUENCE.progress(&self.present)
    }
}
