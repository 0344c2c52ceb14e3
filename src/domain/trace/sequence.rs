//! StageSequence - canonical stage ordering as data.
//!
//! Lots and pallets follow the same rule over different sequences: the
//! next admissible stage is the first sequence member not yet recorded.
//! Histories that are not a clean prefix are tolerated: any recorded stage
//! counts as consumed.
//!
//! # Sequences
//!
//! Lot: Inicio Cosecha → Cosecha Completa → Recepción Packing → Selección →
//! Empaque → Paletizado → Enfriado → Control Calidad → Despacho
//!
//! Pallet: Enfriado → Control Calidad → Despacho

use serde::Serialize;
use std::collections::BTreeSet;

use super::EventStage;

/// An ordered, fixed list of stages that must be satisfied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSequence {
    stages: &'static [EventStage],
}

/// The 9-stage lot sequence.
pub const LOT_SEQUENCE: StageSequence = StageSequence {
    stages: &[
        EventStage::InicioCosecha,
        EventStage::CosechaCompleta,
        EventStage::RecepcionPacking,
        EventStage::Seleccion,
        EventStage::Empaque,
        EventStage::Paletizado,
        EventStage::Enfriado,
        EventStage::ControlCalidad,
        EventStage::Despacho,
    ],
};

/// The 3-stage pallet sequence.
pub const PALLET_SEQUENCE: StageSequence = StageSequence {
    stages: &[
        EventStage::Enfriado,
        EventStage::ControlCalidad,
        EventStage::Despacho,
    ],
};

impl StageSequence {
    pub fn stages(&self) -> &'static [EventStage] {
        self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn contains(&self, stage: EventStage) -> bool {
        self.stages.contains(&stage)
    }

    /// First stage not present, or `None` when every stage is recorded.
    pub fn next_valid_stage(&self, present: &BTreeSet<EventStage>) -> Option<EventStage> {
        self.stages.iter().copied().find(|stage| !present.contains(stage))
    }

    /// Strict check: only the computed next stage is admissible.
    pub fn is_admissible(&self, present: &BTreeSet<EventStage>, proposed: EventStage) -> bool {
        self.next_valid_stage(present) == Some(proposed)
    }

    pub fn is_complete(&self, present: &BTreeSet<EventStage>) -> bool {
        self.next_valid_stage(present).is_none()
    }

    /// Snapshot of which stages are done.
    pub fn progress(&self, present: &BTreeSet<EventStage>) -> SequenceProgress {
        SequenceProgress {
            steps: self
                .stages
                .iter()
                .map(|&stage| StepStatus {
                    stage,
                    recorded: present.contains(&stage),
                })
                .collect(),
            next_stage: self.next_valid_stage(present),
        }
    }
}

/// Whether one stage of a sequence has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepStatus {
    pub stage: EventStage,
    pub recorded: bool,
}

/// Read-only progress snapshot over a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceProgress {
    steps: Vec<StepStatus>,
    next_stage: Option<EventStage>,
}

impl SequenceProgress {
    pub fn steps(&self) -> &[StepStatus] {
        &self.steps
    }

    pub fn next_stage(&self) -> Option<EventStage> {
        self.next_stage
    }

    pub fn completed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.recorded).count()
    }

    pub fn total_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns the completion percentage (0-100).
    pub fn percent_complete(&self) -> u8 {
        if self.steps.is_empty() {
            return 100;
        }
        ((self.completed_count() * 100) / self.total_count()) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.next_stage.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(stages: &[EventStage]) -> BTreeSet<EventStage> {
        stages.iter().copied().collect()
    }

    #[test]
    fn lot_sequence_matches_stage_vocabulary_order() {
        assert_eq!(LOT_SEQUENCE.stages(), EventStage::all());
        assert_eq!(LOT_SEQUENCE.len(), 9);
    }

    #[test]
    fn pallet_sequence_is_tail_of_lot_sequence() {
        assert_eq!(PALLET_SEQUENCE.len(), 3);
        assert_eq!(PALLET_SEQUENCE.stages(), &LOT_SEQUENCE.stages()[6..]);
        assert!(!PALLET_SEQUENCE.contains(EventStage::Paletizado));
    }

    #[test]
    fn every_prefix_yields_following_stage() {
        let stages = LOT_SEQUENCE.stages();
        for k in 0..stages.len() {
            let history = present(&stages[..k]);
            assert_eq!(LOT_SEQUENCE.next_valid_stage(&history), Some(stages[k]));
            assert!(!LOT_SEQUENCE.is_complete(&history));
        }
        assert_eq!(LOT_SEQUENCE.next_valid_stage(&present(stages)), None);
        assert!(LOT_SEQUENCE.is_complete(&present(stages)));
    }

    #[test]
    fn non_prefix_history_picks_first_gap() {
        let history = present(&[EventStage::InicioCosecha, EventStage::Seleccion]);
        assert_eq!(
            LOT_SEQUENCE.next_valid_stage(&history),
            Some(EventStage::CosechaCompleta)
        );
    }

    #[test]
    fn admissibility_is_strict_equality_with_next() {
        let history = present(&[EventStage::InicioCosecha]);
        assert!(LOT_SEQUENCE.is_admissible(&history, EventStage::CosechaCompleta));
        assert!(!LOT_SEQUENCE.is_admissible(&history, EventStage::Empaque));
        assert!(!LOT_SEQUENCE.is_admissible(&history, EventStage::InicioCosecha));
    }

    #[test]
    fn nothing_is_admissible_once_complete() {
        let history = present(PALLET_SEQUENCE.stages());
        for stage in EventStage::all() {
            assert!(!PALLET_SEQUENCE.is_admissible(&history, *stage));
        }
    }

    #[test]
    fn progress_counts_recorded_steps() {
        let history = present(&[EventStage::Enfriado]);
        let progress = PALLET_SEQUENCE.progress(&history);
        assert_eq!(progress.completed_count(), 1);
        assert_eq!(progress.total_count(), 3);
        assert_eq!(progress.percent_complete(), 33);
        assert_eq!(progress.next_stage(), Some(EventStage::ControlCalidad));
        assert!(progress.steps()[0].recorded);
        assert!(!progress.steps()[1].recorded);
    }

    #[test]
    fn progress_ignores_stages_outside_sequence() {
        let history = present(&[EventStage::Empaque, EventStage::Paletizado]);
        let progress = PALLET_SEQUENCE.progress(&history);
        assert_eq!(progress.completed_count(), 0);
        assert_eq!(progress.percent_complete(), 0);
    }
}
