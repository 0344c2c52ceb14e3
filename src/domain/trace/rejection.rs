//! Reasons a proposed stage is refused for a subject.

use thiserror::Error;

use super::EventStage;
use crate::domain::foundation::ErrorCode;
use crate::domain::identity::{EntityType, SubjectRef};

/// A domain-level refusal of a proposed event.
///
/// These are expected outcomes, not failures: callers map each variant to a
/// corrective message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageRejection {
    #[error("{subject}: expected '{expected}' next, got '{proposed}'")]
    SequenceViolation {
        subject: SubjectRef,
        expected: EventStage,
        proposed: EventStage,
    },

    #[error("{subject}: process complete, no further stages are admissible")]
    ProcessComplete { subject: SubjectRef },

    #[error("{subject}: '{proposed}' must be recorded against a {required_level}")]
    WrongLevel {
        subject: SubjectRef,
        proposed: EventStage,
        required_level: EntityType,
    },
}

impl StageRejection {
    /// Stable error kind for this rejection.
    pub fn code(&self) -> ErrorCode {
        match self {
            StageRejection::SequenceViolation { .. } => ErrorCode::SequenceViolation,
            StageRejection::ProcessComplete { .. } => ErrorCode::ProcessComplete,
            StageRejection::WrongLevel { .. } => ErrorCode::WrongLevel,
        }
    }

    pub fn subject(&self) -> &SubjectRef {
        match self {
            StageRejection::SequenceViolation { subject, .. }
            | StageRejection::ProcessComplete { subject }
            | StageRejection::WrongLevel { subject, .. } => subject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::LotId;

    fn lot() -> SubjectRef {
        SubjectRef::Lot(LotId::parse("LP-2024-CHIL-001").unwrap())
    }

    #[test]
    fn wrong_level_message_points_to_pallet() {
        let rejection = StageRejection::WrongLevel {
            subject: lot(),
            proposed: EventStage::Despacho,
            required_level: EntityType::Pallet,
        };
        assert_eq!(rejection.code(), ErrorCode::WrongLevel);
        assert_eq!(
            rejection.to_string(),
            "lot LP-2024-CHIL-001: 'Despacho' must be recorded against a pallet"
        );
    }

    #[test]
    fn each_variant_has_distinct_code() {
        let violation = StageRejection::SequenceViolation {
            subject: lot(),
            expected: EventStage::CosechaCompleta,
            proposed: EventStage::Empaque,
        };
        let complete = StageRejection::ProcessComplete { subject: lot() };
        assert_eq!(violation.code(), ErrorCode::SequenceViolation);
        assert_eq!(complete.code(), ErrorCode::ProcessComplete);
        assert_eq!(complete.subject(), &lot());
    }
}
