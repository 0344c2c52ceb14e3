//! SplitStatus - has a lot handed its traceability over to pallets?
//!
//! Two independent signals answer the question: the lot's event history
//! (`Paletizado` recorded) and the lot's state label in the store, which can
//! be updated outside of event recording. They are OR-combined, and a
//! disagreement is surfaced to the operator rather than reconciled.

use serde::Serialize;

use crate::domain::trace::LotTrace;

/// State labels that mean the lot has already been palletized.
pub const POST_SPLIT_STATE_LABELS: &[&str] = &[
    "paletizado",
    "en_pallets",
    "enfriado",
    "en_camara",
    "inspeccionado",
    "despachado",
    "en_transito",
];

/// Returns true if `label` is one of the post-split state labels.
pub fn is_post_split_label(label: &str) -> bool {
    let normalized = label.trim().to_lowercase();
    POST_SPLIT_STATE_LABELS.contains(&normalized.as_str())
}

/// Both split signals for a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitStatus {
    pub by_events: bool,
    pub by_state_label: bool,
}

impl SplitStatus {
    pub fn assess(trace: &LotTrace, state_label: Option<&str>) -> Self {
        Self {
            by_events: trace.has_recorded_split(),
            by_state_label: state_label.map(is_post_split_label).unwrap_or(false),
        }
    }

    /// True if either signal says the lot has split.
    pub fn has_split(&self) -> bool {
        self.by_events || self.by_state_label
    }

    /// True when exactly one signal says the lot has split.
    pub fn signals_disagree(&self) -> bool {
        self.by_events != self.by_state_label
    }

    /// Operator-facing warning for a disagreement, if any.
    pub fn warning(&self) -> Option<&'static str> {
        match (self.by_events, self.by_state_label) {
            (true, false) => Some("Paletizado recorded but lot state label is not post-split"),
            (false, true) => Some("lot state label is post-split but no Paletizado event is recorded"),
            _ => None,
        }
    }
}
