//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `TraceEventStore` - Append-only event log per lot/pallet
//! - `LotPalletLinkRepository` - Lot↔pallet associations
//! - `SubjectDirectory` - Lot and pallet rows (read side)
//! - `SubjectStateWriter` - Denormalized state labels (best effort)

mod link_repository;
mod subject_directory;
mod subject_state_writer;
mod trace_event_store;

pub use link_repository::LotPalletLinkRepository;
pub use subject_directory::SubjectDirectory;
pub use subject_state_writer::SubjectStateWriter;
pub use trace_event_store::TraceEventStore;
