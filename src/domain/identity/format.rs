//! Identifier formats for lots and pallets.
//!
//! Lot and pallet identifiers are fixed-width and visually distinct, so the
//! entity type can always be inferred from the string alone:
//!
//! - Lot: `LP-YYYY-CHIL-NNN`
//! - Pallet: `PAL-YYYY-CHIL-NNNNN`

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// `\d` is Unicode-aware in `regex`; identifiers are ASCII digits only.
static LOT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^LP-[0-9]{4}-CHIL-[0-9]{3}$").expect("lot pattern is a valid regex")
});

static PALLET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^PAL-[0-9]{4}-CHIL-[0-9]{5}$").expect("pallet pattern is a valid regex")
});

/// The two kinds of traceable subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Lot,
    Pallet,
}

impl EntityType {
    /// Wire name used in envelopes and event records.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Lot => "lot",
            EntityType::Pallet => "pallet",
        }
    }

    /// Parses a wire name. Exact, case-sensitive match.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lot" => Some(EntityType::Lot),
            "pallet" => Some(EntityType::Pallet),
            _ => None,
        }
    }

    /// Human-readable format hint, used in validation messages.
    pub fn format_hint(&self) -> &'static str {
        match self {
            EntityType::Lot => "LP-YYYY-CHIL-NNN",
            EntityType::Pallet => "PAL-YYYY-CHIL-NNNNN",
        }
    }

    /// Returns true if `raw` has the shape of this entity type's identifier.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            EntityType::Lot => LOT_PATTERN.is_match(raw),
            EntityType::Pallet => PALLET_PATTERN.is_match(raw),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Infers the entity type of a raw scanned or typed string.
///
/// Tries the lot pattern first, then the pallet pattern. Returns `None` when
/// neither matches.
pub fn detect_entity_type(raw: &str) -> Option<EntityType> {
    if EntityType::Lot.matches(raw) {
        Some(EntityType::Lot)
    } else if EntityType::Pallet.matches(raw) {
        Some(EntityType::Pallet)
    } else {
        None
    }
}
