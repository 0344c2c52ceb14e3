//! Trace event store port.
//!
//! The append-only event log for lots and pallets.
//!
//! # Design
//!
//! - **Append-only**: events are never updated or deleted
//! - **Uniqueness**: a subject records each stage at most once; the store
//!   enforces `(subject_id, stage)` and reports a second append as `Conflict`

use crate::domain::foundation::DomainError;
use crate::domain::identity::SubjectRef;
use crate::domain::trace::TraceEvent;
use async_trait::async_trait;

/// Port for reading and appending trace events.
#[async_trait]
pub trait TraceEventStore: Send + Sync {
    /// All events recorded for a subject, in insertion order.
    ///
    /// Returns an empty list for a subject with no history.
    async fn fetch_events(&self, subject: &SubjectRef) -> Result<Vec<TraceEvent>, DomainError>;

    /// Append an event and return it as stored.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the subject already recorded this stage
    /// - `DatabaseError` on persistence failure
    async fn append_event(&self, event: TraceEvent) -> Result<TraceEvent, DomainError>;
}
