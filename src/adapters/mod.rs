//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-memory store backing every store port

pub mod memory;

pub use memory::InMemoryTraceStore;
