//! Lineage resolution - which pallets now carry a lot's traceability.

use serde::Serialize;

use super::link::LotPalletLink;
use super::records::PalletRecord;
use super::split::SplitStatus;
use crate::domain::identity::{LotId, PalletId};
use crate::domain::trace::EventStage;

/// One pallet as seen from a lot.
///
/// `box_count`/`weight_kg` are the lot's contribution to the pallet; the
/// pallet totals are reported separately because a pallet may consolidate
/// several lots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletSummary {
    pub pallet_id: PalletId,
    pub box_count: u32,
    pub weight_kg: f64,
    pub position: Option<u32>,
    /// `None` when the link points at a pallet the store no longer knows.
    pub state_label: Option<String>,
    pub location: Option<String>,
    pub pallet_total_boxes: Option<u32>,
    pub pallet_total_weight_kg: Option<f64>,
    pub next_stage: Option<EventStage>,
}

impl PalletSummary {
    pub fn resolve(
        link: &LotPalletLink,
        pallet: Option<&PalletRecord>,
        next_stage: Option<EventStage>,
    ) -> Self {
        Self {
            pallet_id: link.pallet_id.clone(),
            box_count: link.box_count,
            weight_kg: link.weight_kg,
            position: link.position,
            state_label: pallet.map(|p| p.state_label.clone()),
            location: pallet.and_then(|p| p.location.clone()),
            pallet_total_boxes: pallet.and_then(|p| p.total_boxes),
            pallet_total_weight_kg: pallet.and_then(|p| p.total_weight_kg),
            next_stage,
        }
    }
}

/// Operator-facing condition of a lot's lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineageCondition {
    /// The lot has not been palletized; normal.
    NotSplit,
    /// Split declared but no pallets registered yet; a data-entry gap.
    AwaitingPallets,
    /// Split with at least one pallet linked.
    Resolved,
}

/// How the boxes linked to pallets compare with the lot's recorded boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    /// The lot has no recorded box count to compare against.
    Unknown,
    Balanced,
    /// Fewer boxes linked than recorded; some output is not on a pallet yet.
    Underlinked,
    /// More boxes linked than recorded.
    Overlinked,
}

/// Soft check of linked boxes against the lot's recorded box count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxReconciliation {
    pub recorded_boxes: Option<u32>,
    pub linked_boxes: u32,
}

impl BoxReconciliation {
    pub fn new(recorded_boxes: Option<u32>, links: &[LotPalletLink]) -> Self {
        Self {
            recorded_boxes,
            linked_boxes: links
                .iter()
                .fold(0u32, |total, l| total.saturating_add(l.box_count)),
        }
    }

    pub fn status(&self) -> ReconciliationStatus {
        match self.recorded_boxes {
            None => ReconciliationStatus::Unknown,
            Some(recorded) if recorded == self.linked_boxes => ReconciliationStatus::Balanced,
            Some(recorded) if self.linked_boxes < recorded => ReconciliationStatus::Underlinked,
            Some(_) => ReconciliationStatus::Overlinked,
        }
    }

    /// Signed difference `linked - recorded`, when a recorded count exists.
    pub fn discrepancy(&self) -> Option<i64> {
        self.recorded_boxes
            .map(|recorded| i64::from(self.linked_boxes) - i64::from(recorded))
    }
}

/// The pallets responsible for a lot's continued traceability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageResolution {
    pub lot_id: LotId,
    pub split: SplitStatus,
    pub pallets: Vec<PalletSummary>,
    pub reconciliation: BoxReconciliation,
}

impl LineageResolution {
    pub fn condition(&self) -> LineageCondition {
        if !self.split.has_split() {
            LineageCondition::NotSplit
        } else if self.pallets.is_empty() {
            LineageCondition::AwaitingPallets
        } else {
            LineageCondition::Resolved
        }
    }

    /// Boxes of this lot placed on pallets, saturating at `u32::MAX`.
    pub fn linked_boxes(&self) -> u32 {
        self.pallets
            .iter()
            .fold(0u32, |total, p| total.saturating_add(p.box_count))
    }

    /// Weight of this lot placed on pallets.
    pub fn linked_weight_kg(&self) -> f64 {
        self.pallets.iter().map(|p| p.weight_kg).sum()
    }
}
