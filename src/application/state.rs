//! Shared handler dependencies.
//!
//! Holds the ports and the configured settings once, and builds each
//! handler from them so settings reach every handler the same way.

use std::sync::Arc;

use crate::application::handlers::{
    CreateLotPalletLinkHandler, GetNextStageHandler, GetPalletLotsHandler,
    RecordTraceEventHandler, ResolvePalletsHandler, ResolveScanHandler,
};
use crate::config::{AppConfig, LineageConfig};
use crate::domain::identity::IdentityCodec;
use crate::ports::{LotPalletLinkRepository, SubjectDirectory, SubjectStateWriter, TraceEventStore};

/// Ports plus the settings handlers are built with.
#[derive(Clone)]
pub struct TraceAppState {
    pub event_store: Arc<dyn TraceEventStore>,
    pub links: Arc<dyn LotPalletLinkRepository>,
    pub directory: Arc<dyn SubjectDirectory>,
    pub state_writer: Arc<dyn SubjectStateWriter>,
    pub codec: IdentityCodec,
    pub lineage: LineageConfig,
}

impl TraceAppState {
    /// Builds the state from one store that implements every port.
    pub fn from_store<S>(store: Arc<S>, config: &AppConfig) -> Self
    where
        S: TraceEventStore + LotPalletLinkRepository + SubjectDirectory + SubjectStateWriter + 'static,
    {
        Self {
            event_store: store.clone(),
            links: store.clone(),
            directory: store.clone(),
            state_writer: store,
            codec: config.identity.codec(),
            lineage: config.lineage.clone(),
        }
    }

    pub fn record_event_handler(&self) -> RecordTraceEventHandler {
        RecordTraceEventHandler::new(
            self.event_store.clone(),
            self.directory.clone(),
            self.state_writer.clone(),
        )
    }

    pub fn next_stage_handler(&self) -> GetNextStageHandler {
        GetNextStageHandler::new(
            self.event_store.clone(),
            self.directory.clone(),
            self.links.clone(),
        )
    }

    pub fn create_link_handler(&self) -> CreateLotPalletLinkHandler {
        CreateLotPalletLinkHandler::new(
            self.event_store.clone(),
            self.directory.clone(),
            self.links.clone(),
        )
        .with_box_mismatch_warnings(self.lineage.warn_on_box_mismatch)
    }

    pub fn resolve_pallets_handler(&self) -> ResolvePalletsHandler {
        ResolvePalletsHandler::new(
            self.event_store.clone(),
            self.directory.clone(),
            self.links.clone(),
        )
        .with_box_mismatch_warnings(self.lineage.warn_on_box_mismatch)
    }

    pub fn pallet_lots_handler(&self) -> GetPalletLotsHandler {
        GetPalletLotsHandler::new(self.directory.clone(), self.links.clone())
    }

    pub fn resolve_scan_handler(&self) -> ResolveScanHandler {
        ResolveScanHandler::new(self.codec.clone(), self.directory.clone())
    }
}
