//! Lot and pallet records as kept by the external store.
//!
//! These carry the denormalized state labels that the store maintains next to
//! the event log. The event log stays authoritative; labels are read for
//! display, terminal-state checks, and the split cross-check.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;
use crate::domain::identity::{LotId, PalletId};

/// Lot row from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotRecord {
    pub id: LotId,
    /// Free-form state label, updatable outside of event recording.
    #[serde(default)]
    pub state_label: Option<String>,
    /// Box count declared at packing, used when events carry none.
    #[serde(default)]
    pub declared_boxes: Option<u32>,
    #[serde(default)]
    pub variety: Option<String>,
    #[serde(default)]
    pub producer: Option<String>,
}

impl LotRecord {
    pub fn new(id: LotId) -> Self {
        Self {
            id,
            state_label: None,
            declared_boxes: None,
            variety: None,
            producer: None,
        }
    }

    pub fn with_state_label(mut self, label: impl Into<String>) -> Self {
        self.state_label = Some(label.into());
        self
    }

    pub fn with_declared_boxes(mut self, boxes: u32) -> Self {
        self.declared_boxes = Some(boxes);
        self
    }
}

/// Pallet row from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletRecord {
    pub id: PalletId,
    pub state_label: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub total_boxes: Option<u32>,
    #[serde(default)]
    pub total_weight_kg: Option<f64>,
}

impl PalletRecord {
    /// A freshly assembled pallet.
    pub fn assembled(id: PalletId) -> Self {
        Self {
            id,
            state_label: PalletState::Armado.label().to_string(),
            location: None,
            total_boxes: None,
            total_weight_kg: None,
        }
    }

    pub fn with_state(mut self, state: PalletState) -> Self {
        self.state_label = state.label().to_string();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_totals(mut self, boxes: u32, weight_kg: f64) -> Self {
        self.total_boxes = Some(boxes);
        self.total_weight_kg = Some(weight_kg);
        self
    }

    /// Parsed state, if the label is one this engine knows.
    pub fn state(&self) -> Option<PalletState> {
        PalletState::from_label(&self.state_label)
    }

    /// True when the pallet has been delivered or returned.
    pub fn is_terminal(&self) -> bool {
        self.state().map(|s| s.is_terminal()).unwrap_or(false)
    }
}

/// Physical state of a pallet, as labeled in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PalletState {
    Armado,
    EnCamara,
    Inspeccionado,
    EnTransito,
    Entregado,
    Devuelto,
}

impl PalletState {
    pub fn label(&self) -> &'static str {
        match self {
            PalletState::Armado => "armado",
            PalletState::EnCamara => "en_camara",
            PalletState::Inspeccionado => "inspeccionado",
            PalletState::EnTransito => "en_transito",
            PalletState::Entregado => "entregado",
            PalletState::Devuelto => "devuelto",
        }
    }

    /// Parses a store label. Case and surrounding whitespace are ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "armado" => Some(PalletState::Armado),
            "en_camara" => Some(PalletState::EnCamara),
            "inspeccionado" => Some(PalletState::Inspeccionado),
            "en_transito" => Some(PalletState::EnTransito),
            "entregado" => Some(PalletState::Entregado),
            "devuelto" => Some(PalletState::Devuelto),
            _ => None,
        }
    }
}

impl StateMachine for PalletState {
    fn valid_transitions(&self) -> Vec<Self> {
        use PalletState::*;
        match self {
            Armado => vec![EnCamara],
            EnCamara => vec![Inspeccionado],
            Inspeccionado => vec![EnTransito],
            EnTransito => vec![Entregado, Devuelto],
            Entregado | Devuelto => vec![],
        }
    }
}

impl fmt::Display for PalletState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pallet_id() -> PalletId {
        PalletId::parse("PAL-2024-CHIL-00001").unwrap()
    }

    #[test]
    fn delivered_and_returned_are_terminal() {
        assert!(PalletState::Entregado.is_terminal());
        assert!(PalletState::Devuelto.is_terminal());
        assert!(!PalletState::Armado.is_terminal());
        assert!(!PalletState::EnTransito.is_terminal());
    }

    #[test]
    fn pallet_states_follow_physical_flow() {
        assert_eq!(PalletState::Armado.valid_transitions(), vec![PalletState::EnCamara]);
        assert!(PalletState::EnTransito
            .valid_transitions()
            .contains(&PalletState::Devuelto));
        assert!(PalletState::Armado.can_reach(&PalletState::EnTransito));
        assert!(!PalletState::Entregado.can_reach(&PalletState::Armado));
        assert!(!PalletState::Devuelto.can_reach(&PalletState::EnCamara));
    }

    #[test]
    fn labels_round_trip() {
        for state in [
            PalletState::Armado,
            PalletState::EnCamara,
            PalletState::Inspeccionado,
            PalletState::EnTransito,
            PalletState::Entregado,
            PalletState::Devuelto,
        ] {
            assert_eq!(PalletState::from_label(state.label()), Some(state));
        }
        assert_eq!(PalletState::from_label(" Entregado "), Some(PalletState::Entregado));
        assert_eq!(PalletState::from_label("perdido"), None);
    }

    #[test]
    fn record_terminal_check_reads_label() {
        let delivered = PalletRecord::assembled(pallet_id()).with_state(PalletState::Entregado);
        assert!(delivered.is_terminal());

        let mut unknown = PalletRecord::assembled(pallet_id());
        unknown.state_label = "en_revision".to_string();
        assert!(!unknown.is_terminal());
        assert_eq!(unknown.state(), None);
    }

    #[test]
    fn assembled_pallet_starts_armado() {
        let record = PalletRecord::assembled(pallet_id());
        assert_eq!(record.state(), Some(PalletState::Armado));
        assert!(!record.is_terminal());
    }
}
