//! Traza - Harvest-to-dispatch traceability for fruit lots and pallets
//!
//! This crate validates the fixed stage sequence a lot follows from harvest
//! to palletizing, hands the lot's traceability over to its pallets at the
//! split, validates the pallet sequence from cooling to dispatch, and decodes
//! the identifiers scanned on the packing floor.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
