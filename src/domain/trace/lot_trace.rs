//! LotTrace - sequence validation for a single lot.
//!
//! A lot follows the 9-stage lot sequence until it records `Paletizado`.
//! From then on the lot is frozen: it still reports the remaining stages as
//! its nominal next steps, but those are recorded against its pallets.

use std::collections::BTreeSet;

use super::history::{for_subject, packed_box_total, stages_present};
use super::{EventStage, SequenceProgress, StageRejection, TraceEvent, LOT_SEQUENCE, PALLET_SEQUENCE};
use crate::domain::identity::{EntityType, LotId, SubjectRef};

/// Snapshot of one lot's recorded stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotTrace {
    subject: SubjectRef,
    present: BTreeSet<EventStage>,
    packed_boxes: Option<u32>,
}

impl LotTrace {
    /// Builds the snapshot from a history, ignoring events of other subjects.
    pub fn from_history(lot_id: &LotId, events: &[TraceEvent]) -> Self {
        let subject = SubjectRef::Lot(lot_id.clone());
        let present = stages_present(for_subject(events, &subject));
        let packed_boxes = packed_box_total(for_subject(events, &subject));
        Self {
            subject,
            present,
            packed_boxes,
        }
    }

    pub fn subject(&self) -> &SubjectRef {
        &self.subject
    }

    pub fn stages_present(&self) -> &BTreeSet<EventStage> {
        &self.present
    }

    /// Nominal next stage in the lot sequence.
    ///
    /// Still reports `Enfriado`, `Control Calidad`, `Despacho` after the
    /// split, even though those are no longer admissible at lot level.
    pub fn next_valid_stage(&self) -> Option<EventStage> {
        LOT_SEQUENCE.next_valid_stage(&self.present)
    }

    /// True when all 9 stages are recorded.
    pub fn is_complete(&self) -> bool {
        LOT_SEQUENCE.is_complete(&self.present)
    }

    /// True once `Paletizado` has been recorded for the lot.
    pub fn has_recorded_split(&self) -> bool {
        self.present.contains(&EventStage::Paletizado)
    }

    /// Boxes recorded by the lot's packing events.
    pub fn packed_boxes(&self) -> Option<u32> {
        self.packed_boxes
    }

    /// True iff `proposed` may be recorded against the lot right now.
    pub fn is_admissible(&self, proposed: EventStage) -> bool {
        self.check(proposed).is_ok()
    }

    /// Validates a proposed lot-level stage using the event split signal.
    pub fn check(&self, proposed: EventStage) -> Result<(), StageRejection> {
        self.check_with_split(proposed, self.has_recorded_split())
    }

    /// Validates a proposed lot-level stage given the combined split signal.
    ///
    /// `has_split` may be true without a recorded `Paletizado` when the
    /// store's state label already says the lot is palletized.
    ///
    /// # Errors
    ///
    /// - `ProcessComplete` if every stage is already recorded
    /// - `WrongLevel` if the lot has split; the stage belongs to a pallet
    /// - `SequenceViolation` if `proposed` is not the next stage
    pub fn check_with_split(
        &self,
        proposed: EventStage,
        has_split: bool,
    ) -> Result<(), StageRejection> {
        let expected = match self.next_valid_stage() {
            Some(stage) => stage,
            None => {
                return Err(StageRejection::ProcessComplete {
                    subject: self.subject.clone(),
                })
            }
        };

        if has_split {
            let required_level = if PALLET_SEQUENCE.contains(proposed) {
                EntityType::Pallet
            } else {
                EntityType::Lot
            };
            return Err(StageRejection::WrongLevel {
                subject: self.subject.clone(),
                proposed,
                required_level,
            });
        }

        if proposed != expected {
            return Err(StageRejection::SequenceViolation {
                subject: self.subject.clone(),
                expected,
                proposed,
            });
        }

        Ok(())
    }

    pub fn progress(&self) -> SequenceProgress {
        LOT_SEQUENCE.progress(&self.present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::identity::PalletId;
    use crate::domain::trace::StagePayload;
    use serde_json::Map;

    fn lot_id() -> LotId {
        LotId::parse("LP-2024-CHIL-001").unwrap()
    }

    fn history(subject: SubjectRef, stages: &[EventStage]) -> Vec<TraceEvent> {
        stages
            .iter()
            .enumerate()
            .map(|(i, stage)| {
                TraceEvent::new(
                    subject.clone(),
                    StagePayload::bare(*stage),
                    "",
                    "operador",
                    Timestamp::now().plus_minutes(i as i64),
                    Map::new(),
                )
                .unwrap()
            })
            .collect()
    }

    fn trace_with(stages: &[EventStage]) -> LotTrace {
        LotTrace::from_history(&lot_id(), &history(SubjectRef::Lot(lot_id()), stages))
    }

    fn through_paletizado() -> LotTrace {
        trace_with(&LOT_SEQUENCE.stages()[..6])
    }

    #[test]
    fn new_lot_expects_harvest_start() {
        let trace = trace_with(&[]);
        assert_eq!(trace.next_valid_stage(), Some(EventStage::InicioCosecha));
        assert!(trace.is_admissible(EventStage::InicioCosecha));
        assert!(!trace.has_recorded_split());
    }

    #[test]
    fn out_of_order_submission_is_sequence_violation() {
        let trace = trace_with(&[EventStage::InicioCosecha]);
        let err = trace.check(EventStage::Empaque).unwrap_err();
        assert_eq!(
            err,
            StageRejection::SequenceViolation {
                subject: SubjectRef::Lot(lot_id()),
                expected: EventStage::CosechaCompleta,
                proposed: EventStage::Empaque,
            }
        );
        assert!(!trace.is_admissible(EventStage::Empaque));
    }

    #[test]
    fn repeating_a_stage_is_rejected() {
        let trace = trace_with(&[EventStage::InicioCosecha]);
        assert!(!trace.is_admissible(EventStage::InicioCosecha));
    }

    #[test]
    fn paletizado_is_admissible_after_packing() {
        let trace = trace_with(&LOT_SEQUENCE.stages()[..5]);
        assert!(trace.is_admissible(EventStage::Paletizado));
    }

    #[test]
    fn split_lot_still_reports_nominal_next_stage() {
        let trace = through_paletizado();
        assert!(trace.has_recorded_split());
        assert_eq!(trace.next_valid_stage(), Some(EventStage::Enfriado));
        assert!(!trace.is_complete());
    }

    #[test]
    fn split_lot_rejects_pallet_stages_as_wrong_level() {
        let trace = through_paletizado();
        for stage in PALLET_SEQUENCE.stages() {
            let err = trace.check(*stage).unwrap_err();
            assert_eq!(
                err,
                StageRejection::WrongLevel {
                    subject: SubjectRef::Lot(lot_id()),
                    proposed: *stage,
                    required_level: EntityType::Pallet,
                }
            );
            assert!(!trace.is_admissible(*stage));
        }
    }

    #[test]
    fn split_lot_rejects_lot_stages_as_wrong_level_too() {
        let trace = through_paletizado();
        let err = trace.check(EventStage::Empaque).unwrap_err();
        assert!(matches!(
            err,
            StageRejection::WrongLevel {
                required_level: EntityType::Lot,
                ..
            }
        ));
    }

    #[test]
    fn external_split_signal_blocks_lot_level_stages() {
        let trace = trace_with(&LOT_SEQUENCE.stages()[..5]);
        assert!(trace.check(EventStage::Paletizado).is_ok());
        assert_eq!(
            trace.check_with_split(EventStage::Paletizado, true),
            Err(StageRejection::WrongLevel {
                subject: SubjectRef::Lot(lot_id()),
                proposed: EventStage::Paletizado,
                required_level: EntityType::Lot,
            })
        );
    }

    #[test]
    fn fully_recorded_lot_is_process_complete() {
        let trace = trace_with(LOT_SEQUENCE.stages());
        assert!(trace.is_complete());
        assert_eq!(trace.next_valid_stage(), None);
        assert!(matches!(
            trace.check(EventStage::Despacho),
            Err(StageRejection::ProcessComplete { .. })
        ));
    }

    #[test]
    fn pallet_events_do_not_count_toward_lot() {
        let pallet = SubjectRef::Pallet(PalletId::parse("PAL-2024-CHIL-00001").unwrap());
        let mut events = history(SubjectRef::Lot(lot_id()), &[EventStage::InicioCosecha]);
        events.extend(history(pallet, &[EventStage::Enfriado]));

        let trace = LotTrace::from_history(&lot_id(), &events);
        assert_eq!(trace.stages_present().len(), 1);
        assert_eq!(trace.next_valid_stage(), Some(EventStage::CosechaCompleta));
    }

    #[test]
    fn other_lots_do_not_count() {
        let other = LotId::parse("LP-2024-CHIL-002").unwrap();
        let events = history(SubjectRef::Lot(other), &LOT_SEQUENCE.stages()[..6]);
        let trace = LotTrace::from_history(&lot_id(), &events);
        assert!(!trace.has_recorded_split());
        assert_eq!(trace.next_valid_stage(), Some(EventStage::InicioCosecha));
    }

    #[test]
    fn progress_reflects_split_point() {
        let progress = through_paletizado().progress();
        assert_eq!(progress.completed_count(), 6);
        assert_eq!(progress.percent_complete(), 66);
    }
}
