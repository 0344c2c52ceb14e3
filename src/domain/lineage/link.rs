//! LotPalletLink - the many-to-many association between lots and pallets.
//!
//! A pallet may consolidate several lots and a lot may be spread over
//! several pallets. Each link records how much of the lot went onto the
//! pallet.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::records::PalletRecord;
use crate::domain::foundation::{ErrorCode, Timestamp, ValidationError};
use crate::domain::identity::{LotId, PalletId};
use crate::domain::trace::LotTrace;

/// A request to put part of a lot onto a pallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub lot_id: LotId,
    pub pallet_id: PalletId,
    pub box_count: u32,
    pub weight_kg: f64,
    #[serde(default)]
    pub position: Option<u32>,
}

impl LinkRequest {
    /// Checks the quantities on the request.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.box_count == 0 {
            return Err(ValidationError::out_of_range(
                "box_count",
                "must be greater than zero",
            ));
        }
        if !self.weight_kg.is_finite() || self.weight_kg < 0.0 {
            return Err(ValidationError::out_of_range(
                "weight_kg",
                format!("must be a non-negative number, got {}", self.weight_kg),
            ));
        }
        Ok(())
    }
}

/// Why a link could not be created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkRejection {
    #[error("Lot {lot_id} has not recorded Paletizado")]
    LotNotSplit { lot_id: LotId },

    #[error("Pallet {pallet_id} is in terminal state '{state}'")]
    PalletTerminal { pallet_id: PalletId, state: String },

    #[error("Lot {lot_id} is already linked to pallet {pallet_id}")]
    DuplicateLink { lot_id: LotId, pallet_id: PalletId },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl LinkRejection {
    /// Stable error kind for this rejection.
    pub fn code(&self) -> ErrorCode {
        match self {
            LinkRejection::LotNotSplit { .. } => ErrorCode::LotNotSplit,
            LinkRejection::PalletTerminal { .. } => ErrorCode::PalletTerminal,
            LinkRejection::DuplicateLink { .. } => ErrorCode::DuplicateLink,
            LinkRejection::Invalid(_) => ErrorCode::ValidationFailed,
        }
    }
}

/// An established lot↔pallet association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotPalletLink {
    pub lot_id: LotId,
    pub pallet_id: PalletId,
    pub box_count: u32,
    pub weight_kg: f64,
    #[serde(default)]
    pub position: Option<u32>,
    pub created_at: Timestamp,
}

impl LotPalletLink {
    /// Applies the link rules and builds the link.
    ///
    /// `lot` must be the trace of `request.lot_id`, `pallet` the record of
    /// `request.pallet_id`, and `existing` the links already stored for the
    /// lot.
    ///
    /// # Errors
    ///
    /// - `Invalid` for a zero box count or a negative/non-finite weight
    /// - `LotNotSplit` if the lot has not recorded `Paletizado`
    /// - `PalletTerminal` if the pallet was delivered or returned
    /// - `DuplicateLink` if the pair is already linked
    pub fn establish(
        request: LinkRequest,
        lot: &LotTrace,
        pallet: &PalletRecord,
        existing: &[LotPalletLink],
    ) -> Result<Self, LinkRejection> {
        request.validate()?;

        if !lot.has_recorded_split() {
            return Err(LinkRejection::LotNotSplit {
                lot_id: request.lot_id,
            });
        }

        if pallet.is_terminal() {
            return Err(LinkRejection::PalletTerminal {
                pallet_id: request.pallet_id,
                state: pallet.state_label.clone(),
            });
        }

        if existing
            .iter()
            .any(|link| link.links(&request.lot_id, &request.pallet_id))
        {
            return Err(LinkRejection::DuplicateLink {
                lot_id: request.lot_id,
                pallet_id: request.pallet_id,
            });
        }

        Ok(Self {
            lot_id: request.lot_id,
            pallet_id: request.pallet_id,
            box_count: request.box_count,
            weight_kg: request.weight_kg,
            position: request.position,
            created_at: Timestamp::now(),
        })
    }

    /// True if this link joins exactly this lot and pallet.
    pub fn links(&self, lot_id: &LotId, pallet_id: &PalletId) -> bool {
        &self.lot_id == lot_id && &self.pallet_id == pallet_id
    }
}
