//! Validated lot and pallet identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::format::{detect_entity_type, EntityType};
use crate::domain::foundation::ValidationError;

/// Identifier of a harvested lot (`LP-YYYY-CHIL-NNN`).
///
/// Can only be constructed from a string with the lot shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LotId(String);

impl LotId {
    /// Parses a lot identifier, rejecting any other shape.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if EntityType::Lot.matches(&raw) {
            Ok(Self(raw))
        } else {
            Err(ValidationError::invalid_format(
                "lot_id",
                format!("expected {}, got '{}'", EntityType::Lot.format_hint(), raw),
            ))
        }
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LotId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LotId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<LotId> for String {
    fn from(id: LotId) -> Self {
        id.0
    }
}

/// Identifier of a pallet (`PAL-YYYY-CHIL-NNNNN`).
///
/// Can only be constructed from a string with the pallet shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PalletId(String);

impl PalletId {
    /// Parses a pallet identifier, rejecting any other shape.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if EntityType::Pallet.matches(&raw) {
            Ok(Self(raw))
        } else {
            Err(ValidationError::invalid_format(
                "pallet_id",
                format!("expected {}, got '{}'", EntityType::Pallet.format_hint(), raw),
            ))
        }
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PalletId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PalletId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PalletId> for String {
    fn from(id: PalletId) -> Self {
        id.0
    }
}

/// A reference to the subject an event or query is about.
///
/// Serialized as `{"subjectType": "lot", "subjectId": "LP-..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "subjectType", content = "subjectId", rename_all = "lowercase")]
pub enum SubjectRef {
    Lot(LotId),
    Pallet(PalletId),
}

impl SubjectRef {
    /// Builds a subject from a raw string by inferring its type.
    pub fn detect(raw: &str) -> Option<Self> {
        detect_entity_type(raw).and_then(|et| Self::for_entity(et, raw))
    }

    /// Builds a subject of the given type, if `raw` has that type's shape.
    pub fn for_entity(entity_type: EntityType, raw: &str) -> Option<Self> {
        match entity_type {
            EntityType::Lot => LotId::parse(raw).ok().map(SubjectRef::Lot),
            EntityType::Pallet => PalletId::parse(raw).ok().map(SubjectRef::Pallet),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            SubjectRef::Lot(_) => EntityType::Lot,
            SubjectRef::Pallet(_) => EntityType::Pallet,
        }
    }

    pub fn id_str(&self) -> &str {
        match self {
            SubjectRef::Lot(id) => id.as_str(),
            SubjectRef::Pallet(id) => id.as_str(),
        }
    }
}

impl From<LotId> for SubjectRef {
    fn from(id: LotId) -> Self {
        SubjectRef::Lot(id)
    }
}

impl From<PalletId> for SubjectRef {
    fn from(id: PalletId) -> Self {
        SubjectRef::Pallet(id)
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity_type(), self.id_str())
    }
}
