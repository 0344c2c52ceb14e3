//! CreateLotPalletLinkHandler - Command handler for putting part of a lot
//! onto a pallet.
//!
//! The lot must have recorded `Paletizado` and the pallet must still be
//! open. A stored link is visible to the next resolution immediately.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::handlers::trace::load_lot_trace;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::identity::{LotId, PalletId};
use crate::domain::lineage::{
    BoxReconciliation, LinkRejection, LinkRequest, LotPalletLink, ReconciliationStatus,
};
use crate::ports::{LotPalletLinkRepository, SubjectDirectory, TraceEventStore};

/// Command to link a lot to a pallet.
pub type CreateLotPalletLinkCommand = LinkRequest;

/// Result of successfully linking a lot to a pallet.
#[derive(Debug, Clone)]
pub struct CreateLotPalletLinkResult {
    pub link: LotPalletLink,
    /// Reconciliation over all of the lot's links, including the new one.
    pub reconciliation: BoxReconciliation,
}

/// Error type for creating a link.
#[derive(Debug, Clone)]
pub enum CreateLotPalletLinkError {
    LotNotFound(LotId),
    PalletNotFound(PalletId),
    Rejected(LinkRejection),
    Store(DomainError),
}

impl CreateLotPalletLinkError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CreateLotPalletLinkError::LotNotFound(_) => ErrorCode::LotNotFound,
            CreateLotPalletLinkError::PalletNotFound(_) => ErrorCode::PalletNotFound,
            CreateLotPalletLinkError::Rejected(rejection) => rejection.code(),
            CreateLotPalletLinkError::Store(err) => err.code,
        }
    }
}

impl std::fmt::Display for CreateLotPalletLinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateLotPalletLinkError::LotNotFound(id) => write!(f, "Lot not found: {}", id),
            CreateLotPalletLinkError::PalletNotFound(id) => write!(f, "Pallet not found: {}", id),
            CreateLotPalletLinkError::Rejected(rejection) => write!(f, "{}", rejection),
            CreateLotPalletLinkError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CreateLotPalletLinkError {}

impl From<DomainError> for CreateLotPalletLinkError {
    fn from(err: DomainError) -> Self {
        CreateLotPalletLinkError::Store(err)
    }
}

impl From<LinkRejection> for CreateLotPalletLinkError {
    fn from(rejection: LinkRejection) -> Self {
        CreateLotPalletLinkError::Rejected(rejection)
    }
}

/// Handler for creating lot↔pallet links.
pub struct CreateLotPalletLinkHandler {
    event_store: Arc<dyn TraceEventStore>,
    directory: Arc<dyn SubjectDirectory>,
    links: Arc<dyn LotPalletLinkRepository>,
    warn_on_box_mismatch: bool,
}

impl CreateLotPalletLinkHandler {
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

    /// Enables or disables the over-linking warning.
    pub fn with_box_mismatch_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_box_mismatch = enabled;
        self
    }

    pub fn warns_on_box_mismatch(&self) -> bool {
        self.warn_on_box_mismatch
    }

    pub async fn handle(
        &self,
        cmd: CreateLotPalletLinkCommand,
    ) -> Result<CreateLotPalletLinkResult, CreateLotPalletLinkError> {
        // 1. Both ends must exist
        let lot = self
            .directory
            .find_lot(&cmd.lot_id)
            .await?
            .ok_or_else(|| CreateLotPalletLinkError::LotNotFound(cmd.lot_id.clone()))?;
        let pallet = self
            .directory
            .find_pallet(&cmd.pallet_id)
            .await?
            .ok_or_else(|| CreateLotPalletLinkError::PalletNotFound(cmd.pallet_id.clone()))?;

        // 2. Apply the link rules
        let trace = load_lot_trace(self.event_store.as_ref(), &cmd.lot_id).await?;
        let mut existing = self.links.find_by_lot(&cmd.lot_id).await?;
        let link = LotPalletLink::establish(cmd, &trace, &pallet, &existing)?;

        // 3. Persist; a concurrent request for the same pair loses here
        if let Err(err) = self.links.insert(&link).await {
            if err.code == ErrorCode::Conflict {
                return Err(LinkRejection::DuplicateLink {
                    lot_id: link.lot_id,
                    pallet_id: link.pallet_id,
                }
                .into());
            }
            return Err(err.into());
        }
        info!(
            lot_id = %link.lot_id,
            pallet_id = %link.pallet_id,
            box_count = link.box_count,
            weight_kg = link.weight_kg,
            "Lot linked to pallet"
        );

        // 4. Soft box check; linking more than was packed is worth flagging
        existing.push(link.clone());
        let recorded = trace.packed_boxes().or(lot.declared_boxes);
        let reconciliation = BoxReconciliation::new(recorded, &existing);
        if self.warn_on_box_mismatch && reconciliation.status() == ReconciliationStatus::Overlinked
        {
            warn!(
                lot_id = %link.lot_id,
                recorded_boxes = ?reconciliation.recorded_boxes,
                linked_boxes = reconciliation.linked_boxes,
                "More boxes linked to pallets than the lot recorded"
            );
        }

        Ok(CreateLotPalletLinkResult {
            link,
            reconciliation,
        })
    }
}
