//! Read-only derived queries over an event history.
//!
//! Histories are slices in insertion order. Nothing here mutates or removes
//! events.

use std::collections::BTreeSet;

use super::{EventStage, TraceEvent};
use crate::domain::identity::SubjectRef;

/// Distinct stages recorded, ignoring order and duplicates.
pub fn stages_present<'a, I>(events: I) -> BTreeSet<EventStage>
where
    I: IntoIterator<Item = &'a TraceEvent>,
{
    events.into_iter().map(TraceEvent::stage).collect()
}

/// The latest event by `occurred_at`; ties go to the later insertion.
pub fn most_recent(events: &[TraceEvent]) -> Option<&TraceEvent> {
    // max_by_key returns the last maximum, which is the latest insertion.
    events.iter().max_by_key(|event| event.occurred_at())
}

/// Events that belong to `subject`, in insertion order.
pub fn for_subject<'a>(
    events: &'a [TraceEvent],
    subject: &'a SubjectRef,
) -> impl Iterator<Item = &'a TraceEvent> + 'a {
    events.iter().filter(move |event| event.is_about(subject))
}

/// Total boxes recorded by packing events, if any packing event carries a
/// box count. Saturates at `u32::MAX`.
pub fn packed_box_total<'a, I>(events: I) -> Option<u32>
where
    I: IntoIterator<Item = &'a TraceEvent>,
{
    events
        .into_iter()
        .filter_map(|event| event.payload().packed_boxes())
        .fold(None, |acc: Option<u32>, boxes| {
            Some(acc.unwrap_or(0).saturating_add(boxes))
        })
}
