//! Denormalized state updates that follow an accepted event.

use serde::Serialize;

use super::records::PalletState;
use crate::domain::foundation::StateMachine;
use crate::domain::identity::SubjectRef;
use crate::domain::trace::{StagePayload, TraceEvent};

/// Location recorded when a cooling event names no chamber.
pub const DEFAULT_COLD_STORAGE: &str = "camara_frio";

/// Lot label written once the lot has been palletized.
pub const LOT_PALLETIZED_LABEL: &str = "paletizado";

/// Partial update of a subject's state label and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStatePatch {
    pub state_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl SubjectStatePatch {
    pub fn label(state_label: impl Into<String>) -> Self {
        Self {
            state_label: state_label.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// True unless both labels are known pallet states and the target is
    /// behind `current_label` or off its path. Skipped states are allowed,
    /// since an earlier best-effort update may have been lost.
    pub fn permitted_from(&self, current_label: &str) -> bool {
        match (
            PalletState::from_label(current_label),
            PalletState::from_label(&self.state_label),
        ) {
            (Some(current), Some(target)) => current.can_reach(&target),
            _ => true,
        }
    }

    /// The patch an accepted event implies, if any.
    pub fn after(event: &TraceEvent) -> Option<Self> {
        match (event.subject(), event.payload()) {
            (SubjectRef::Lot(_), StagePayload::Paletizado(_)) => {
                Some(Self::label(LOT_PALLETIZED_LABEL))
            }
            (SubjectRef::Pallet(_), StagePayload::Enfriado(details)) => {
                let location = details
                    .chamber
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COLD_STORAGE.to_string());
                Some(Self::label(PalletState::EnCamara.label()).with_location(location))
            }
            (SubjectRef::Pallet(_), StagePayload::ControlCalidad(_)) => {
                Some(Self::label(PalletState::Inspeccionado.label()))
            }
            (SubjectRef::Pallet(_), StagePayload::Despacho(_)) => {
                Some(Self::label(PalletState::EnTransito.label()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::identity::{LotId, PalletId};
    use crate::domain::trace::{CoolingDetails, EventStage};
    use serde_json::Map;

    fn event(subject: SubjectRef, payload: StagePayload) -> TraceEvent {
        TraceEvent::new(subject, payload, "", "operador", Timestamp::now(), Map::new()).unwrap()
    }

    fn pallet() -> SubjectRef {
        SubjectRef::Pallet(PalletId::parse("PAL-2024-CHIL-00001").unwrap())
    }

    fn lot() -> SubjectRef {
        SubjectRef::Lot(LotId::parse("LP-2024-CHIL-001").unwrap())
    }

    #[test]
    fn cooling_moves_pallet_into_cold_storage() {
        let patch = SubjectStatePatch::after(&event(
            pallet(),
            StagePayload::bare(EventStage::Enfriado),
        ))
        .unwrap();
        assert_eq!(patch.state_label, "en_camara");
        assert_eq!(patch.location.as_deref(), Some(DEFAULT_COLD_STORAGE));
    }

    #[test]
    fn cooling_uses_named_chamber() {
        let payload = StagePayload::Enfriado(CoolingDetails {
            chamber: Some("Cámara 2".to_string()),
            target_temperature_c: Some(0.5),
        });
        let patch = SubjectStatePatch::after(&event(pallet(), payload)).unwrap();
        assert_eq!(patch.location.as_deref(), Some("Cámara 2"));
    }

    #[test]
    fn inspection_and_dispatch_labels() {
        let qc = SubjectStatePatch::after(&event(
            pallet(),
            StagePayload::bare(EventStage::ControlCalidad),
        ))
        .unwrap();
        assert_eq!(qc.state_label, "inspeccionado");

        let dispatch =
            SubjectStatePatch::after(&event(pallet(), StagePayload::bare(EventStage::Despacho)))
                .unwrap();
        assert_eq!(dispatch.state_label, "en_transito");
        assert_eq!(dispatch.location, None);
    }

    #[test]
    fn lot_palletizing_marks_lot() {
        let patch =
            SubjectStatePatch::after(&event(lot(), StagePayload::bare(EventStage::Paletizado)))
                .unwrap();
        assert_eq!(patch.state_label, LOT_PALLETIZED_LABEL);
    }

    #[test]
    fn pallet_patches_follow_state_transitions() {
        let cold = SubjectStatePatch::label(PalletState::EnCamara.label());
        assert!(cold.permitted_from("armado"));
        assert!(cold.permitted_from("en_camara"));
        assert!(!cold.permitted_from("devuelto"));
        assert!(!cold.permitted_from("en_transito"));
        assert!(cold.permitted_from("en_revision"));

        let dispatch = SubjectStatePatch::label(PalletState::EnTransito.label());
        assert!(dispatch.permitted_from("inspeccionado"));
        assert!(dispatch.permitted_from("armado"));
        assert!(!dispatch.permitted_from("entregado"));
    }

    #[test]
    fn other_events_have_no_patch() {
        assert!(SubjectStatePatch::after(&event(lot(), StagePayload::bare(EventStage::Empaque))).is_none());
        assert!(
            SubjectStatePatch::after(&event(lot(), StagePayload::bare(EventStage::InicioCosecha)))
                .is_none()
        );
    }
}
