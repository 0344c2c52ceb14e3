//! In-memory implementation of every store port.
//!
//! Keeps events, links, and subject rows behind a single `RwLock` so that the
//! `(subject_id, stage)` uniqueness check and the append happen atomically,
//! the way a unique index arbitrates concurrent submissions in a database.
//!
//! Intended for tests and local tooling. Nothing is persisted.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::identity::{LotId, PalletId, SubjectRef};
use crate::domain::lineage::{LotPalletLink, LotRecord, PalletRecord, SubjectStatePatch};
use crate::domain::trace::TraceEvent;
use crate::ports::{LotPalletLinkRepository, SubjectDirectory, SubjectStateWriter, TraceEventStore};

#[derive(Default)]
struct Tables {
    events: Vec<TraceEvent>,
    links: Vec<LotPalletLink>,
    lots: HashMap<LotId, LotRecord>,
    pallets: HashMap<PalletId, PalletRecord>,
}

/// Event log, link table, and subject directory held in memory.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemoryTraceStore::new());
/// store.register_lot(LotRecord::new(lot_id.clone()))?;
///
/// let handler = RecordTraceEventHandler::new(store.clone(), store.clone(), store.clone());
/// ```
#[derive(Default)]
pub struct InMemoryTraceStore {
    tables: RwLock<Tables>,
}

impl InMemoryTraceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, DomainError> {
        self.tables
            .read()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "trace store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, DomainError> {
        self.tables
            .write()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "trace store lock poisoned"))
    }

    // === Seeding ===

    /// Adds or replaces a lot row.
    pub fn register_lot(&self, record: LotRecord) -> Result<(), DomainError> {
        self.write()?.lots.insert(record.id.clone(), record);
        Ok(())
    }

    /// Adds or replaces a pallet row.
    pub fn register_pallet(&self, record: PalletRecord) -> Result<(), DomainError> {
        self.write()?.pallets.insert(record.id.clone(), record);
        Ok(())
    }

    // === Inspection ===

    /// Total number of stored events.
    pub fn event_count(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.events.len())
    }

    /// Total number of stored links.
    pub fn link_count(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.links.len())
    }
}

#[async_trait]
impl TraceEventStore for InMemoryTraceStore {
    async fn fetch_events(&self, subject: &SubjectRef) -> Result<Vec<TraceEvent>, DomainError> {
        Ok(self
            .read()?
            .events
            .iter()
            .filter(|e| e.is_about(subject))
            .cloned()
            .collect())
    }

    async fn append_event(&self, event: TraceEvent) -> Result<TraceEvent, DomainError> {
        let mut tables = self.write()?;

        let duplicate = tables
            .events
            .iter()
            .any(|e| e.is_about(event.subject()) && e.stage() == event.stage());
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("{} already recorded {}", event.subject(), event.stage()),
            )
            .with_detail("subject_id", event.subject().id_str())
            .with_detail("stage", event.stage().name()));
        }

        tables.events.push(event.clone());
        Ok(event)
    }
}

#[async_trait]
impl LotPalletLinkRepository for InMemoryTraceStore {
    async fn find_by_lot(&self, lot_id: &LotId) -> Result<Vec<LotPalletLink>, DomainError> {
        let mut links: Vec<LotPalletLink> = self
            .read()?
            .links
            .iter()
            .filter(|l| &l.lot_id == lot_id)
            .cloned()
            .collect();
        // Positioned links first, in position order; the sort is stable so
        // creation order breaks ties.
        links.sort_by_key(|l| (l.position.is_none(), l.position));
        Ok(links)
    }

    async fn find_by_pallet(
        &self,
        pallet_id: &PalletId,
    ) -> Result<Vec<LotPalletLink>, DomainError> {
        Ok(self
            .read()?
            .links
            .iter()
            .filter(|l| &l.pallet_id == pallet_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, link: &LotPalletLink) -> Result<(), DomainError> {
        let mut tables = self.write()?;
        if tables
            .links
            .iter()
            .any(|l| l.links(&link.lot_id, &link.pallet_id))
        {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("{} is already linked to {}", link.lot_id, link.pallet_id),
            ));
        }
        tables.links.push(link.clone());
        Ok(())
    }
}

#[async_trait]
impl SubjectDirectory for InMemoryTraceStore {
    async fn find_lot(&self, id: &LotId) -> Result<Option<LotRecord>, DomainError> {
        Ok(self.read()?.lots.get(id).cloned())
    }

    async fn find_pallet(&self, id: &PalletId) -> Result<Option<PalletRecord>, DomainError> {
        Ok(self.read()?.pallets.get(id).cloned())
    }
}

#[async_trait]
impl SubjectStateWriter for InMemoryTraceStore {
    async fn upsert_subject_state(
        &self,
        subject: &SubjectRef,
        patch: &SubjectStatePatch,
    ) -> Result<(), DomainError> {
        let mut tables = self.write()?;
        match subject {
            SubjectRef::Lot(id) => {
                let record = tables
                    .lots
                    .entry(id.clone())
                    .or_insert_with(|| LotRecord::new(id.clone()));
                record.state_label = Some(patch.state_label.clone());
            }
            SubjectRef::Pallet(id) => {
                let record = tables
                    .pallets
                    .entry(id.clone())
                    .or_insert_with(|| PalletRecord::assembled(id.clone()));
                record.state_label = patch.state_label.clone();
                if let Some(location) = &patch.location {
                    record.location = Some(location.clone());
                }
            }
        }
        Ok(())
    }
}
