//! ResolveScanHandler - Query handler for a scanned or typed identifier.
//!
//! Decodes the raw string (bare identifier or envelope) and confirms that
//! the subject is registered.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::identity::{DecodedIdentity, IdentityCodec, IdentityError, SubjectRef};
use crate::domain::lineage::{LotRecord, PalletRecord};
use crate::ports::SubjectDirectory;

/// Query carrying the raw scanner output.
#[derive(Debug, Clone)]
pub struct ResolveScanQuery {
    pub raw: String,
}

/// The registered row behind a scanned identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "subjectType", content = "record", rename_all = "lowercase")]
pub enum SubjectRecord {
    Lot(LotRecord),
    Pallet(PalletRecord),
}

/// A decoded identity together with its registered row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedScan {
    pub identity: DecodedIdentity,
    pub record: SubjectRecord,
}

/// Error type for scan resolution.
#[derive(Debug, Clone)]
pub enum ResolveScanError {
    /// The string does not decode to an identity.
    Identity(IdentityError),
    /// The identity is well formed but not registered.
    SubjectNotFound(SubjectRef),
    Store(DomainError),
}

impl ResolveScanError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveScanError::Identity(err) => err.code(),
            ResolveScanError::SubjectNotFound(SubjectRef::Lot(_)) => ErrorCode::LotNotFound,
            ResolveScanError::SubjectNotFound(SubjectRef::Pallet(_)) => ErrorCode::PalletNotFound,
            ResolveScanError::Store(err) => err.code,
        }
    }
}

impl std::fmt::Display for ResolveScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveScanError::Identity(err) => write!(f, "{}", err),
            ResolveScanError::SubjectNotFound(subject) => {
                write!(f, "Subject not found: {}", subject)
            }
            ResolveScanError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ResolveScanError {}

impl From<DomainError> for ResolveScanError {
    fn from(err: DomainError) -> Self {
        ResolveScanError::Store(err)
    }
}

impl From<IdentityError> for ResolveScanError {
    fn from(err: IdentityError) -> Self {
        ResolveScanError::Identity(err)
    }
}

/// Handler for scan resolution.
pub struct ResolveScanHandler {
    codec: IdentityCodec,
    directory: Arc<dyn SubjectDirectory>,
}

impl ResolveScanHandler {
    pub fn new(codec: IdentityCodec, directory: Arc<dyn SubjectDirectory>) -> Self {
        Self { codec, directory }
    }

    pub async fn handle(&self, query: ResolveScanQuery) -> Result<ResolvedScan, ResolveScanError> {
        let identity = self.codec.decode(&query.raw)?;
        debug!(
            subject = %identity.subject,
            source = ?identity.source,
            "Decoded scanned identity"
        );

        let record = match &identity.subject {
            SubjectRef::Lot(id) => self.directory.find_lot(id).await?.map(SubjectRecord::Lot),
            SubjectRef::Pallet(id) => self
                .directory
                .find_pallet(id)
                .await?
                .map(SubjectRecord::Pallet),
        };

        match record {
            Some(record) => Ok(ResolvedScan { identity, record }),
            None => Err(ResolveScanError::SubjectNotFound(identity.subject)),
        }
    }
}
