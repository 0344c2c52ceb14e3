//! Stage-specific event payloads.
//!
//! Each stage historically records a different set of fields. `StagePayload`
//! keys the typed details by stage name; anything not modeled here goes in
//! the event's free-form `attributes` map.

use serde::{Deserialize, Serialize};

use super::EventStage;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestStartDetails {
    pub field_block: Option<String>,
    pub variety: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestCompleteDetails {
    pub bins: Option<u32>,
    pub gross_weight_kg: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingReceptionDetails {
    pub bins_received: Option<u32>,
    pub pulp_temperature_c: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingDetails {
    pub rejected_kg: Option<f64>,
    pub export_grade: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingDetails {
    pub box_count: Option<u32>,
    pub box_format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PalletizingDetails {
    pub pallet_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoolingDetails {
    pub chamber: Option<String>,
    pub target_temperature_c: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityControlDetails {
    pub approved: Option<bool>,
    pub inspector: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchDetails {
    pub carrier: Option<String>,
    pub destination: Option<String>,
    pub dispatch_guide: Option<String>,
}

/// Typed details of an event, tagged by stage name.
///
/// Serialized as `{"stage": "Empaque", "details": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "details")]
pub enum StagePayload {
    #[serde(rename = "Inicio Cosecha")]
    InicioCosecha(HarvestStartDetails),
    #[serde(rename = "Cosecha Completa")]
    CosechaCompleta(HarvestCompleteDetails),
    #[serde(rename = "Recepción Packing")]
    RecepcionPacking(PackingReceptionDetails),
    #[serde(rename = "Selección")]
    Seleccion(SortingDetails),
    #[serde(rename = "Empaque")]
    Empaque(PackingDetails),
    #[serde(rename = "Paletizado")]
    Paletizado(PalletizingDetails),
    #[serde(rename = "Enfriado")]
    Enfriado(CoolingDetails),
    #[serde(rename = "Control Calidad")]
    ControlCalidad(QualityControlDetails),
    #[serde(rename = "Despacho")]
    Despacho(DispatchDetails),
}

impl StagePayload {
    /// A payload for `stage` with no typed details filled in.
    pub fn bare(stage: EventStage) -> Self {
        match stage {
            EventStage::InicioCosecha => StagePayload::InicioCosecha(Default::default()),
            EventStage::CosechaCompleta => StagePayload::CosechaCompleta(Default::default()),
            EventStage::RecepcionPacking => StagePayload::RecepcionPacking(Default::default()),
            EventStage::Seleccion => StagePayload::Seleccion(Default::default()),
            EventStage::Empaque => StagePayload::Empaque(Default::default()),
            EventStage::Paletizado => StagePayload::Paletizado(Default::default()),
            EventStage::Enfriado => StagePayload::Enfriado(Default::default()),
            EventStage::ControlCalidad => StagePayload::ControlCalidad(Default::default()),
            EventStage::Despacho => StagePayload::Despacho(Default::default()),
        }
    }

    pub fn stage(&self) -> EventStage {
        match self {
            StagePayload::InicioCosecha(_) => EventStage::InicioCosecha,
            StagePayload::CosechaCompleta(_) => EventStage::CosechaCompleta,
            StagePayload::RecepcionPacking(_) => EventStage::RecepcionPacking,
            StagePayload::Seleccion(_) => EventStage::Seleccion,
            StagePayload::Empaque(_) => EventStage::Empaque,
            StagePayload::Paletizado(_) => EventStage::Paletizado,
            StagePayload::Enfriado(_) => EventStage::Enfriado,
            StagePayload::ControlCalidad(_) => EventStage::ControlCalidad,
            StagePayload::Despacho(_) => EventStage::Despacho,
        }
    }

    /// Boxes packed, when this is an `Empaque` payload that records them.
    pub fn packed_boxes(&self) -> Option<u32> {
        match self {
            StagePayload::Empaque(details) => details.box_count,
            _ => None,
        }
    }
}

impl From<EventStage> for StagePayload {
    fn from(stage: EventStage) -> Self {
        StagePayload::bare(stage)
    }
}
