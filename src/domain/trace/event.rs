//! TraceEvent - the immutable record of a stage transition.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EventStage, StagePayload};
use crate::domain::foundation::{EventId, Timestamp, ValidationError};
use crate::domain::identity::SubjectRef;

/// A recorded stage transition for a lot or pallet.
///
/// Events are append-only: there are no setters, and corrections are
/// modeled as new events rather than edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEvent {
    id: EventId,
    subject: SubjectRef,
    payload: StagePayload,
    description: String,
    occurred_at: Timestamp,
    responsible: String,
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl TraceEvent {
    /// Creates a new event with a fresh id.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if `responsible` is blank
    pub fn new(
        subject: SubjectRef,
        payload: StagePayload,
        description: impl Into<String>,
        responsible: impl Into<String>,
        occurred_at: Timestamp,
        attributes: Map<String, Value>,
    ) -> Result<Self, ValidationError> {
        let responsible = responsible.into();
        if responsible.trim().is_empty() {
            return Err(ValidationError::empty_field("responsible"));
        }

        Ok(Self {
            id: EventId::new(),
            subject,
            payload,
            description: description.into(),
            occurred_at,
            responsible,
            attributes,
        })
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn subject(&self) -> &SubjectRef {
        &self.subject
    }

    pub fn stage(&self) -> EventStage {
        self.payload.stage()
    }

    pub fn payload(&self) -> &StagePayload {
        &self.payload
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }

    pub fn responsible(&self) -> &str {
        &self.responsible
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Returns true if this event belongs to `subject`.
    pub fn is_about(&self, subject: &SubjectRef) -> bool {
        &self.subject == subject
    }
}
