//! EventStage enum - the traceability stage vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The 9 stages a lot passes through from harvest to dispatch.
///
/// The last three (`Enfriado`, `ControlCalidad`, `Despacho`) are recorded
/// against pallets once the lot has been palletized. Names are exact and
/// case-sensitive on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventStage {
    #[serde(rename = "Inicio Cosecha")]
    InicioCosecha,
    #[serde(rename = "Cosecha Completa")]
    CosechaCompleta,
    #[serde(rename = "Recepción Packing")]
    RecepcionPacking,
    #[serde(rename = "Selección")]
    Seleccion,
    #[serde(rename = "Empaque")]
    Empaque,
    #[serde(rename = "Paletizado")]
    Paletizado,
    #[serde(rename = "Enfriado")]
    Enfriado,
    #[serde(rename = "Control Calidad")]
    ControlCalidad,
    #[serde(rename = "Despacho")]
    Despacho,
}

impl EventStage {
    /// Returns all stages in canonical order.
    pub fn all() -> &'static [EventStage] {
        &[
            EventStage::InicioCosecha,
            EventStage::CosechaCompleta,
            EventStage::RecepcionPacking,
            EventStage::Seleccion,
            EventStage::Empaque,
            EventStage::Paletizado,
            EventStage::Enfriado,
            EventStage::ControlCalidad,
            EventStage::Despacho,
        ]
    }

    /// Returns the exact wire name.
    pub fn name(&self) -> &'static str {
        match self {
            EventStage::InicioCosecha => "Inicio Cosecha",
            EventStage::CosechaCompleta => "Cosecha Completa",
            EventStage::RecepcionPacking => "Recepción Packing",
            EventStage::Seleccion => "Selección",
            EventStage::Empaque => "Empaque",
            EventStage::Paletizado => "Paletizado",
            EventStage::Enfriado => "Enfriado",
            EventStage::ControlCalidad => "Control Calidad",
            EventStage::Despacho => "Despacho",
        }
    }

    /// Parses an exact wire name. No synonyms, no case folding.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|stage| stage.name() == name)
    }
}

impl fmt::Display for EventStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EventStage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| ValidationError::invalid_format("stage", format!("unknown stage '{}'", s)))
    }
}
