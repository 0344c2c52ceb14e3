//! GetPalletLotsHandler - Query handler for the lots a pallet consolidates.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::identity::{LotId, PalletId};
use crate::domain::lineage::PalletRecord;
use crate::ports::{LotPalletLinkRepository, SubjectDirectory};

/// Query for a pallet's source lots.
#[derive(Debug, Clone)]
pub struct GetPalletLotsQuery {
    pub pallet_id: PalletId,
}

/// One lot's share of a pallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotContribution {
    pub lot_id: LotId,
    pub box_count: u32,
    pub weight_kg: f64,
    pub position: Option<u32>,
    pub variety: Option<String>,
    pub producer: Option<String>,
}

/// A pallet and the lots on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletLotsView {
    pub pallet: PalletRecord,
    pub lots: Vec<LotContribution>,
}

impl PalletLotsView {
    pub fn linked_boxes(&self) -> u32 {
        self.lots
            .iter()
            .fold(0u32, |total, l| total.saturating_add(l.box_count))
    }

    pub fn linked_weight_kg(&self) -> f64 {
        self.lots.iter().map(|l| l.weight_kg).sum()
    }
}

/// Error type for pallet lot queries.
#[derive(Debug, Clone)]
pub enum GetPalletLotsError {
    PalletNotFound(PalletId),
    Store(DomainError),
}

impl GetPalletLotsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GetPalletLotsError::PalletNotFound(_) => ErrorCode::PalletNotFound,
            GetPalletLotsError::Store(err) => err.code,
        }
    }
}

impl std::fmt::Display for GetPalletLotsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GetPalletLotsError::PalletNotFound(id) => write!(f, "Pallet not found: {}", id),
            GetPalletLotsError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for GetPalletLotsError {}

impl From<DomainError> for GetPalletLotsError {
    fn from(err: DomainError) -> Self {
        GetPalletLotsError::Store(err)
    }
}

/// Handler for pallet→lot lookups.
pub struct GetPalletLotsHandler {
    directory: Arc<dyn SubjectDirectory>,
    links: Arc<dyn LotPalletLinkRepository>,
}

impl GetPalletLotsHandler {
    pub fn new(
        directory: Arc<dyn SubjectDirectory>,
        links: Arc<dyn LotPalletLinkRepository>,
    ) -> Self {
        Self { directory, links }
    }

    pub async fn handle(
        &self,
        query: GetPalletLotsQuery,
    ) -> Result<PalletLotsView, GetPalletLotsError> {
        let pallet = self
            .directory
            .find_pallet(&query.pallet_id)
            .await?
            .ok_or_else(|| GetPalletLotsError::PalletNotFound(query.pallet_id.clone()))?;

        let mut lots = Vec::new();
        for link in self.links.find_by_pallet(&query.pallet_id).await? {
            let record = self.directory.find_lot(&link.lot_id).await?;
            lots.push(LotContribution {
                variety: record.as_ref().and_then(|r| r.variety.clone()),
                producer: record.as_ref().and_then(|r| r.producer.clone()),
                lot_id: link.lot_id,
                box_count: link.box_count,
                weight_kg: link.weight_kg,
                position: link.position,
            });
        }

        Ok(PalletLotsView { pallet, lots })
    }
}
