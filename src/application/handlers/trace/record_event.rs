//! RecordTraceEventHandler - Command handler for recording a stage event.
//!
//! The event is validated against the subject's freshest history and then
//! appended. Once stored, the subject's denormalized state label is updated
//! on a best-effort basis: a failed update is logged and never undoes or
//! fails the recording.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, ValidationError};
use crate::domain::identity::{LotId, PalletId, SubjectRef};
use crate::domain::lineage::{SplitStatus, SubjectStatePatch};
use crate::domain::trace::{
    EventStage, LotTrace, PalletTrace, StagePayload, StageRejection, TraceEvent,
};
use crate::ports::{SubjectDirectory, SubjectStateWriter, TraceEventStore};

/// Command to record a stage event for a lot or pallet.
#[derive(Debug, Clone)]
pub struct RecordTraceEventCommand {
    pub subject: SubjectRef,
    /// The stage and its typed details.
    pub payload: StagePayload,
    pub description: String,
    /// Person accountable for the event.
    pub responsible: String,
    /// When it happened; defaults to now.
    pub occurred_at: Option<Timestamp>,
    pub attributes: Map<String, Value>,
}

impl RecordTraceEventCommand {
    pub fn new(
        subject: SubjectRef,
        payload: impl Into<StagePayload>,
        responsible: impl Into<String>,
    ) -> Self {
        Self {
            subject,
            payload: payload.into(),
            description: String::new(),
            responsible: responsible.into(),
            occurred_at: None,
            attributes: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn occurred_at(mut self, at: Timestamp) -> Self {
        self.occurred_at = Some(at);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Result of successfully recording an event.
#[derive(Debug, Clone)]
pub struct RecordTraceEventResult {
    /// The event as stored.
    pub event: TraceEvent,
    /// The state update the event implied, if any.
    pub state_patch: Option<SubjectStatePatch>,
    /// False when a state update was attempted and failed.
    pub state_updated: bool,
}

/// Error type for recording an event.
#[derive(Debug, Clone)]
pub enum RecordTraceEventError {
    /// The subject is not registered.
    SubjectNotFound(SubjectRef),
    /// The command itself is malformed.
    Invalid(ValidationError),
    /// The stage is not admissible for the subject.
    Rejected(StageRejection),
    /// Storage failure, including a concurrent duplicate (`Conflict`).
    Store(DomainError),
}

impl RecordTraceEventError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RecordTraceEventError::SubjectNotFound(SubjectRef::Lot(_)) => ErrorCode::LotNotFound,
            RecordTraceEventError::SubjectNotFound(SubjectRef::Pallet(_)) => {
                ErrorCode::PalletNotFound
            }
            RecordTraceEventError::Invalid(_) => ErrorCode::ValidationFailed,
            RecordTraceEventError::Rejected(rejection) => rejection.code(),
            RecordTraceEventError::Store(err) => err.code,
        }
    }
}

impl std::fmt::Display for RecordTraceEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordTraceEventError::SubjectNotFound(subject) => {
                write!(f, "Subject not found: {}", subject)
            }
            RecordTraceEventError::Invalid(err) => write!(f, "{}", err),
            RecordTraceEventError::Rejected(rejection) => write!(f, "{}", rejection),
            RecordTraceEventError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RecordTraceEventError {}

impl From<DomainError> for RecordTraceEventError {
    fn from(err: DomainError) -> Self {
        RecordTraceEventError::Store(err)
    }
}

impl From<StageRejection> for RecordTraceEventError {
    fn from(rejection: StageRejection) -> Self {
        RecordTraceEventError::Rejected(rejection)
    }
}

impl From<ValidationError> for RecordTraceEventError {
    fn from(err: ValidationError) -> Self {
        RecordTraceEventError::Invalid(err)
    }
}

/// Handler for recording trace events.
pub struct RecordTraceEventHandler {
    event_store: Arc<dyn TraceEventStore>,
    directory: Arc<dyn SubjectDirectory>,
    state_writer: Arc<dyn SubjectStateWriter>,
}

impl RecordTraceEventHandler {
    pub fn new(
        event_store: Arc<dyn TraceEventStore>,
        directory: Arc<dyn SubjectDirectory>,
        state_writer: Arc<dyn SubjectStateWriter>,
    ) -> Self {
        Self {
            event_store,
            directory,
            state_writer,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordTraceEventCommand,
    ) -> Result<RecordTraceEventResult, RecordTraceEventError> {
        // 1. Build the event (validates the command fields)
        let event = TraceEvent::new(
            cmd.subject.clone(),
            cmd.payload,
            cmd.description,
            cmd.responsible,
            cmd.occurred_at.unwrap_or_else(Timestamp::now),
            cmd.attributes,
        )?;

        // 2-3. The subject must be registered; validate against the freshest history
        let check = match &cmd.subject {
            SubjectRef::Lot(id) => self.check_lot(id, event.stage()).await?,
            SubjectRef::Pallet(id) => self.check_pallet(id, event.stage()).await?,
        };
        if let Err(rejection) = check {
            info!(
                subject = %cmd.subject,
                stage = %event.stage(),
                code = %rejection.code(),
                "Trace event rejected"
            );
            return Err(rejection.into());
        }

        // 4. Append; the store arbitrates concurrent duplicates
        let stored = self.event_store.append_event(event).await?;
        info!(
            subject = %stored.subject(),
            stage = %stored.stage(),
            event_id = %stored.id(),
            "Trace event recorded"
        );

        // 5. Best-effort state update
        let state_patch = SubjectStatePatch::after(&stored);
        let state_updated = match &state_patch {
            Some(patch) => self.apply_state_patch(stored.subject(), patch).await,
            None => true,
        };

        Ok(RecordTraceEventResult {
            event: stored,
            state_patch,
            state_updated,
        })
    }

    /// Lot-level check; the split is the event signal OR the lot's state label.
    async fn check_lot(
        &self,
        lot_id: &LotId,
        stage: EventStage,
    ) -> Result<Result<(), StageRejection>, RecordTraceEventError> {
        let subject = SubjectRef::Lot(lot_id.clone());
        let record = self
            .directory
            .find_lot(lot_id)
            .await?
            .ok_or_else(|| RecordTraceEventError::SubjectNotFound(subject.clone()))?;

        let history = self.event_store.fetch_events(&subject).await?;
        let trace = LotTrace::from_history(lot_id, &history);
        let split = SplitStatus::assess(&trace, record.state_label.as_deref());
        if let Some(warning) = split.warning() {
            warn!(lot_id = %lot_id, state_label = ?record.state_label, "{}", warning);
        }
        Ok(trace.check_with_split(stage, split.has_split()))
    }

    async fn check_pallet(
        &self,
        pallet_id: &PalletId,
        stage: EventStage,
    ) -> Result<Result<(), StageRejection>, RecordTraceEventError> {
        let subject = SubjectRef::Pallet(pallet_id.clone());
        if self.directory.find_pallet(pallet_id).await?.is_none() {
            return Err(RecordTraceEventError::SubjectNotFound(subject));
        }

        let history = self.event_store.fetch_events(&subject).await?;
        Ok(PalletTrace::from_history(pallet_id, &history).check(stage))
    }

    /// Writes the patch unless it would move a pallet backwards through its
    /// states. Returns whether the subject's state now reflects the event.
    async fn apply_state_patch(&self, subject: &SubjectRef, patch: &SubjectStatePatch) -> bool {
        if let SubjectRef::Pallet(id) = subject {
            match self.directory.find_pallet(id).await {
                Ok(Some(current)) if !patch.permitted_from(&current.state_label) => {
                    warn!(
                        subject = %subject,
                        from = %current.state_label,
                        to = %patch.state_label,
                        "Pallet state transition not allowed; state left unchanged"
                    );
                    return false;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(subject = %subject, error = %err, "Could not read pallet state");
                    return false;
                }
            }
        }

        match self.state_writer.upsert_subject_state(subject, patch).await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    subject = %subject,
                    state = %patch.state_label,
                    error = %err,
                    "Failed to update subject state after recording event"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryTraceStore;
    use crate::domain::identity::EntityType;
    use crate::domain::lineage::{LotRecord, PalletRecord, PalletState};
    use crate::domain::trace::LOT_SEQUENCE;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ─────────────────────────────────────────────────────────────────────
    // Mock implementations
    // ─────────────────────────────────────────────────────────────────────

    struct FailingStateWriter {
        attempts: Mutex<Vec<SubjectStatePatch>>,
    }

    impl FailingStateWriter {
        fn new() -> Self {
            Self {
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> Vec<SubjectStatePatch> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SubjectStateWriter for FailingStateWriter {
        async fn upsert_subject_state(
            &self,
            _subject: &SubjectRef,
            patch: &SubjectStatePatch,
        ) -> Result<(), DomainError> {
            self.attempts.lock().unwrap().push(patch.clone());
            Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated state update failure",
            ))
        }
    }

    struct FailingAppendStore;

    #[async_trait]
    impl TraceEventStore for FailingAppendStore {
        async fn fetch_events(&self, _: &SubjectRef) -> Result<Vec<TraceEvent>, DomainError> {
            Ok(vec![])
        }

        async fn append_event(&self, _: TraceEvent) -> Result<TraceEvent, DomainError> {
            Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated append failure",
            ))
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Test helpers
    // ─────────────────────────────────────────────────────────────────────

    fn lot_id() -> LotId {
        LotId::parse("LP-2024-CHIL-001").unwrap()
    }

    fn pallet_id() -> PalletId {
        PalletId::parse("PAL-2024-CHIL-00001").unwrap()
    }

    fn seeded_store() -> Arc<InMemoryTraceStore> {
        let store = Arc::new(InMemoryTraceStore::new());
        store.register_lot(LotRecord::new(lot_id())).unwrap();
        store.register_pallet(PalletRecord::assembled(pallet_id())).unwrap();
        store
    }

    fn create_handler(store: Arc<InMemoryTraceStore>) -> RecordTraceEventHandler {
        RecordTraceEventHandler::new(store.clone(), store.clone(), store)
    }

    async fn record_lot_stages(handler: &RecordTraceEventHandler, count: usize) {
        for stage in &LOT_SEQUENCE.stages()[..count] {
            handler
                .handle(RecordTraceEventCommand::new(
                    SubjectRef::Lot(lot_id()),
                    *stage,
                    "operador",
                ))
                .await
                .unwrap();
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tests
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn records_first_lot_stage() {
        let store = seeded_store();
        let handler = create_handler(store.clone());

        let cmd = RecordTraceEventCommand::new(
            SubjectRef::Lot(lot_id()),
            EventStage::InicioCosecha,
            "Juan Pérez",
        )
        .with_description("Inicio de cosecha cuartel 4")
        .with_attribute("cuartel", "4");
        let result = handler.handle(cmd).await.unwrap();

        assert_eq!(result.event.stage(), EventStage::InicioCosecha);
        assert_eq!(result.event.responsible(), "Juan Pérez");
        assert_eq!(result.event.attributes()["cuartel"], "4");
        assert!(result.state_patch.is_none());
        assert_eq!(store.event_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn rejects_out_of_order_stage() {
        let store = seeded_store();
        let handler = create_handler(store.clone());

        let cmd = RecordTraceEventCommand::new(SubjectRef::Lot(lot_id()), EventStage::Empaque, "op");
        let result = handler.handle(cmd).await;

        match result {
            Err(RecordTraceEventError::Rejected(StageRejection::SequenceViolation {
                expected,
                proposed,
                ..
            })) => {
                assert_eq!(expected, EventStage::InicioCosecha);
                assert_eq!(proposed, EventStage::Empaque);
            }
            other => panic!("expected sequence violation, got {:?}", other),
        }
        assert_eq!(store.event_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn redirects_lot_stages_after_split() {
        let store = seeded_store();
        let handler = create_handler(store.clone());
        record_lot_stages(&handler, 6).await;

        let cmd =
            RecordTraceEventCommand::new(SubjectRef::Lot(lot_id()), EventStage::Enfriado, "op");
        let err = handler.handle(cmd).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::WrongLevel);
        assert!(matches!(
            err,
            RecordTraceEventError::Rejected(StageRejection::WrongLevel {
                required_level: EntityType::Pallet,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn post_split_label_alone_redirects_lot_stages() {
        let store = seeded_store();
        let handler = create_handler(store.clone());
        record_lot_stages(&handler, 5).await;
        // Label moved on outside of event recording
        store
            .upsert_subject_state(
                &SubjectRef::Lot(lot_id()),
                &SubjectStatePatch::label("en_camara"),
            )
            .await
            .unwrap();

        let cmd =
            RecordTraceEventCommand::new(SubjectRef::Lot(lot_id()), EventStage::Paletizado, "op");
        let err = handler.handle(cmd).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::WrongLevel);
        assert!(matches!(
            err,
            RecordTraceEventError::Rejected(StageRejection::WrongLevel {
                proposed: EventStage::Paletizado,
                required_level: EntityType::Lot,
                ..
            })
        ));
        assert_eq!(store.event_count().unwrap(), 5);
    }

    #[tokio::test]
    async fn palletizing_marks_lot_label() {
        let store = seeded_store();
        let handler = create_handler(store.clone());
        record_lot_stages(&handler, 6).await;

        let lot = store.find_lot(&lot_id()).await.unwrap().unwrap();
        assert_eq!(lot.state_label.as_deref(), Some("paletizado"));
    }

    #[tokio::test]
    async fn pallet_cooling_moves_pallet_to_cold_storage() {
        let store = seeded_store();
        let handler = create_handler(store.clone());

        let cmd = RecordTraceEventCommand::new(
            SubjectRef::Pallet(pallet_id()),
            EventStage::Enfriado,
            "op",
        );
        let result = handler.handle(cmd).await.unwrap();

        assert!(result.state_updated);
        let pallet = store.find_pallet(&pallet_id()).await.unwrap().unwrap();
        assert_eq!(pallet.state_label, "en_camara");
        assert!(pallet.location.is_some());
    }

    #[tokio::test]
    async fn failed_state_update_does_not_fail_recording() {
        let store = seeded_store();
        let writer = Arc::new(FailingStateWriter::new());
        let handler = RecordTraceEventHandler::new(store.clone(), store.clone(), writer.clone());

        let cmd = RecordTraceEventCommand::new(
            SubjectRef::Pallet(pallet_id()),
            EventStage::Enfriado,
            "op",
        );
        let result = handler.handle(cmd).await.unwrap();

        assert!(!result.state_updated);
        assert_eq!(writer.attempts().len(), 1);
        assert_eq!(store.event_count().unwrap(), 1);
        let pallet = store.find_pallet(&pallet_id()).await.unwrap().unwrap();
        assert_eq!(pallet.state_label, "armado");
    }

    #[tokio::test]
    async fn returned_pallet_keeps_its_state() {
        let store = Arc::new(InMemoryTraceStore::new());
        store
            .register_pallet(PalletRecord::assembled(pallet_id()).with_state(PalletState::Devuelto))
            .unwrap();
        let handler = create_handler(store.clone());

        let cmd = RecordTraceEventCommand::new(
            SubjectRef::Pallet(pallet_id()),
            EventStage::Enfriado,
            "op",
        );
        let result = handler.handle(cmd).await.unwrap();

        assert!(!result.state_updated);
        assert_eq!(store.event_count().unwrap(), 1);
        let pallet = store.find_pallet(&pallet_id()).await.unwrap().unwrap();
        assert_eq!(pallet.state_label, "devuelto");
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let store = Arc::new(InMemoryTraceStore::new());
        let handler = create_handler(store);

        let cmd = RecordTraceEventCommand::new(
            SubjectRef::Pallet(pallet_id()),
            EventStage::Enfriado,
            "op",
        );
        let err = handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, RecordTraceEventError::SubjectNotFound(_)));
        assert_eq!(err.code(), ErrorCode::PalletNotFound);
    }

    #[tokio::test]
    async fn blank_responsible_is_invalid() {
        let handler = create_handler(seeded_store());
        let cmd = RecordTraceEventCommand::new(
            SubjectRef::Lot(lot_id()),
            EventStage::InicioCosecha,
            "  ",
        );
        let err = handler.handle(cmd).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn store_failures_propagate_unchanged() {
        let store = seeded_store();
        let handler =
            RecordTraceEventHandler::new(Arc::new(FailingAppendStore), store.clone(), store);

        let cmd = RecordTraceEventCommand::new(
            SubjectRef::Lot(lot_id()),
            EventStage::InicioCosecha,
            "op",
        );
        let err = handler.handle(cmd).await.unwrap_err();

        match err {
            RecordTraceEventError::Store(inner) => {
                assert_eq!(inner.code, ErrorCode::DatabaseError);
                assert_eq!(inner.message, "Simulated append failure");
            }
            other => panic!("expected store error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn completed_pallet_rejects_further_events() {
        let store = seeded_store();
        let handler = create_handler(store);
        for stage in [EventStage::Enfriado, EventStage::ControlCalidad, EventStage::Despacho] {
            handler
                .handle(RecordTraceEventCommand::new(
                    SubjectRef::Pallet(pallet_id()),
                    stage,
                    "op",
                ))
                .await
                .unwrap();
        }

        let err = handler
            .handle(RecordTraceEventCommand::new(
                SubjectRef::Pallet(pallet_id()),
                EventStage::Despacho,
                "op",
            ))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProcessComplete);
    }
}
