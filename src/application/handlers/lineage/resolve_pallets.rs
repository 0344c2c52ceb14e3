//! ResolvePalletsHandler - Query handler for a lot's pallets.
//!
//! Answers which pallets are now responsible for a lot's traceability,
//! with each pallet's state and the lot's contribution to it.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::handlers::trace::{load_lot_trace, load_pallet_trace};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::identity::LotId;
use crate::domain::lineage::{
    BoxReconciliation, LineageCondition, LineageResolution, PalletSummary, ReconciliationStatus,
    SplitStatus,
};
use crate::ports::{LotPalletLinkRepository, SubjectDirectory, TraceEventStore};

/// Query for the pallets carrying a lot.
#[derive(Debug, Clone)]
pub struct ResolvePalletsQuery {
    pub lot_id: LotId,
}

/// Error type for pallet resolution.
#[derive(Debug, Clone)]
pub enum ResolvePalletsError {
    LotNotFound(LotId),
    Store(DomainError),
}

impl ResolvePalletsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolvePalletsError::LotNotFound(_) => ErrorCode::LotNotFound,
            ResolvePalletsError::Store(err) => err.code,
        }
    }
}

impl std::fmt::Display for ResolvePalletsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvePalletsError::LotNotFound(id) => write!(f, "Lot not found: {}", id),
            ResolvePalletsError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ResolvePalletsError {}

impl From<DomainError> for ResolvePalletsError {
    fn from(err: DomainError) -> Self {
        ResolvePalletsError::Store(err)
    }
}

/// Handler for resolving a lot to its pallets.
pub struct ResolvePalletsHandler {
    event_store: Arc<dyn TraceEventStore>,
    directory: Arc<dyn SubjectDirectory>,
    links: Arc<dyn LotPalletLinkRepository>,
    warn_on_box_mismatch: bool,
}

impl ResolvePalletsHandler {
    pub fn new(
        event_store: Arc<dyn TraceEventStore>,
        directory: Arc<dyn SubjectDirectory>,
        links: Arc<dyn LotPalletLinkRepository>,
    ) -> Self {
        Self {
            event_store,
            directory,
            links,
            warn_on_box_mismatch: true,
        }
    }

    /// Enables or disables the box reconciliation warning.
    pub fn with_box_mismatch_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_box_mismatch = enabled;
        self
    }

    pub fn warns_on_box_mismatch(&self) -> bool {
        self.warn_on_box_mismatch
    }

    pub async fn handle(
        &self,
        query: ResolvePalletsQuery,
    ) -> Result<LineageResolution, ResolvePalletsError> {
        let lot_id = query.lot_id;

        // 1. Lot row and history
        let record = self
            .directory
            .find_lot(&lot_id)
            .await?
            .ok_or_else(|| ResolvePalletsError::LotNotFound(lot_id.clone()))?;
        let trace = load_lot_trace(self.event_store.as_ref(), &lot_id).await?;

        // 2. Split signals
        let split = SplitStatus::assess(&trace, record.state_label.as_deref());
        if let Some(warning) = split.warning() {
            warn!(lot_id = %lot_id, state_label = ?record.state_label, "{}", warning);
        }

        // 3. Linked pallets with their current state
        let links = self.links.find_by_lot(&lot_id).await?;
        let mut pallets = Vec::with_capacity(links.len());
        for link in &links {
            let pallet = self.directory.find_pallet(&link.pallet_id).await?;
            if pallet.is_none() {
                warn!(lot_id = %lot_id, pallet_id = %link.pallet_id, "Link points at unknown pallet");
            }
            let pallet_trace = load_pallet_trace(self.event_store.as_ref(), &link.pallet_id).await?;
            pallets.push(PalletSummary::resolve(
                link,
                pallet.as_ref(),
                pallet_trace.next_valid_stage(),
            ));
        }

        // 4. Box reconciliation
        let recorded = trace.packed_boxes().or(record.declared_boxes);
        let reconciliation = BoxReconciliation::new(recorded, &links);

        let resolution = LineageResolution {
            lot_id,
            split,
            pallets,
            reconciliation,
        };

        if resolution.condition() == LineageCondition::AwaitingPallets {
            warn!(lot_id = %resolution.lot_id, "Lot has split but no pallets are linked");
        }
        if self.warn_on_box_mismatch && resolution.condition() == LineageCondition::Resolved {
            self.report_reconciliation(&resolution);
        }

        debug!(
            lot_id = %resolution.lot_id,
            pallets = resolution.pallets.len(),
            condition = ?resolution.condition(),
            "Resolved lot lineage"
        );
        Ok(resolution)
    }

    fn report_reconciliation(&self, resolution: &LineageResolution) {
        let reconciliation = &resolution.reconciliation;
        match reconciliation.status() {
            ReconciliationStatus::Underlinked | ReconciliationStatus::Overlinked => {
                warn!(
                    lot_id = %resolution.lot_id,
                    recorded_boxes = ?reconciliation.recorded_boxes,
                    linked_boxes = reconciliation.linked_boxes,
                    discrepancy = ?reconciliation.discrepancy(),
                    "Linked boxes do not match the lot's recorded boxes"
                );
            }
            ReconciliationStatus::Balanced | ReconciliationStatus::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryTraceStore;
    use crate::domain::foundation::Timestamp;
    use crate::domain::identity::{PalletId, SubjectRef};
    use crate::domain::lineage::{LotPalletLink, LotRecord, PalletRecord, PalletState};
    use crate::domain::trace::{EventStage, PackingDetails, StagePayload, TraceEvent, LOT_SEQUENCE};
    use async_trait::async_trait;
    use serde_json::Map;

    // ─────────────────────────────────────────────────────────────────────
    // Mock implementations
    // ─────────────────────────────────────────────────────────────────────

    struct FailingLinkRepository;

    #[async_trait]
    impl LotPalletLinkRepository for FailingLinkRepository {
        async fn find_by_lot(&self, _: &LotId) -> Result<Vec<LotPalletLink>, DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "Simulated query failure"))
        }

        async fn find_by_pallet(&self, _: &PalletId) -> Result<Vec<LotPalletLink>, DomainError> {
            Ok(vec![])
        }

        async fn insert(&self, _: &LotPalletLink) -> Result<(), DomainError> {
            Ok(())
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Test helpers
    // ─────────────────────────────────────────────────────────────────────

    fn lot_id() -> LotId {
        LotId::parse("LP-2024-CHIL-001").unwrap()
    }

    fn pallet_id(n: u32) -> PalletId {
        PalletId::parse(&format!("PAL-2024-CHIL-{:05}", n)).unwrap()
    }

    async fn lot_with_stages(store: &InMemoryTraceStore, count: usize, boxes: Option<u32>) {
        for stage in &LOT_SEQUENCE.stages()[..count] {
            let payload = match stage {
                EventStage::Empaque => StagePayload::Empaque(PackingDetails {
                    box_count: boxes,
                    box_format: None,
                }),
                other => StagePayload::bare(*other),
            };
            let event = TraceEvent::new(
                SubjectRef::Lot(lot_id()),
                payload,
                "",
                "op",
                Timestamp::now(),
                Map::new(),
            )
            .unwrap();
            store.append_event(event).await.unwrap();
        }
    }

    async fn link(store: &InMemoryTraceStore, pallet: PalletRecord, boxes: u32, position: u32) {
        let pallet_id = pallet.id.clone();
        store.register_pallet(pallet).unwrap();
        store
            .insert(&LotPalletLink {
                lot_id: lot_id(),
                pallet_id,
                box_count: boxes,
                weight_kg: f64::from(boxes) * 5.0,
                position: Some(position),
                created_at: Timestamp::now(),
            })
            .await
            .unwrap();
    }

    fn seeded_store() -> Arc<InMemoryTraceStore> {
        let store = Arc::new(InMemoryTraceStore::new());
        store.register_lot(LotRecord::new(lot_id())).unwrap();
        store
    }

    fn create_handler(store: Arc<InMemoryTraceStore>) -> ResolvePalletsHandler {
        ResolvePalletsHandler::new(store.clone(), store.clone(), store)
    }

    fn query() -> ResolvePalletsQuery {
        ResolvePalletsQuery { lot_id: lot_id() }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tests
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn unsplit_lot_is_not_split() {
        let store = seeded_store();
        lot_with_stages(&store, 3, None).await;

        let resolution = create_handler(store).handle(query()).await.unwrap();

        assert_eq!(resolution.condition(), LineageCondition::NotSplit);
        assert!(resolution.pallets.is_empty());
    }

    #[tokio::test]
    async fn split_without_pallets_is_awaiting() {
        let store = seeded_store();
        lot_with_stages(&store, 6, None).await;

        let resolution = create_handler(store).handle(query()).await.unwrap();

        assert_eq!(resolution.condition(), LineageCondition::AwaitingPallets);
    }

    #[tokio::test]
    async fn resolves_pallets_with_state_and_contribution() {
        let store = seeded_store();
        lot_with_stages(&store, 6, Some(100)).await;
        link(
            &store,
            PalletRecord::assembled(pallet_id(1))
                .with_state(PalletState::EnCamara)
                .with_location("Cámara 1")
                .with_totals(120, 600.0),
            60,
            1,
        )
        .await;
        link(&store, PalletRecord::assembled(pallet_id(2)), 40, 2).await;

        let resolution = create_handler(store).handle(query()).await.unwrap();

        assert_eq!(resolution.condition(), LineageCondition::Resolved);
        assert_eq!(resolution.pallets.len(), 2);
        let first = &resolution.pallets[0];
        assert_eq!(first.pallet_id, pallet_id(1));
        assert_eq!(first.box_count, 60);
        assert_eq!(first.pallet_total_boxes, Some(120));
        assert_eq!(first.state_label.as_deref(), Some("en_camara"));
        assert_eq!(resolution.linked_boxes(), 100);
        assert_eq!(
            resolution.reconciliation.status(),
            ReconciliationStatus::Balanced
        );
    }

    #[tokio::test]
    async fn declared_boxes_back_up_missing_packing_count() {
        let store = Arc::new(InMemoryTraceStore::new());
        store
            .register_lot(LotRecord::new(lot_id()).with_declared_boxes(90))
            .unwrap();
        lot_with_stages(&store, 6, None).await;
        link(&store, PalletRecord::assembled(pallet_id(1)), 60, 1).await;

        let resolution = create_handler(store)
            .with_box_mismatch_warnings(false)
            .handle(query())
            .await
            .unwrap();

        assert_eq!(resolution.reconciliation.recorded_boxes, Some(90));
        assert_eq!(
            resolution.reconciliation.status(),
            ReconciliationStatus::Underlinked
        );
    }

    #[tokio::test]
    async fn unknown_lot_is_not_found() {
        let store = Arc::new(InMemoryTraceStore::new());
        let err = create_handler(store).handle(query()).await.unwrap_err();
        assert!(matches!(err, ResolvePalletsError::LotNotFound(_)));
    }

    #[tokio::test]
    async fn link_store_failure_propagates() {
        let store = seeded_store();
        let handler =
            ResolvePalletsHandler::new(store.clone(), store, Arc::new(FailingLinkRepository));

        let err = handler.handle(query()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }
}
