//! Identity handlers - resolving scanned identifiers.

mod resolve_scan;

pub use resolve_scan::{
    ResolveScanError, ResolveScanHandler, ResolveScanQuery, ResolvedScan, SubjectRecord,
};
