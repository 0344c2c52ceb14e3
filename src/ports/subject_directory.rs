//! Subject directory port (read side).
//!
//! Looks up the lot and pallet rows that the store keeps next to the event
//! log.

use crate::domain::foundation::DomainError;
use crate::domain::identity::{LotId, PalletId};
use crate::domain::lineage::{LotRecord, PalletRecord};
use async_trait::async_trait;

#[async_trait]
pub trait SubjectDirectory: Send + Sync {
    /// Find a lot by id. Returns `None` if unknown.
    async fn find_lot(&self, id: &LotId) -> Result<Option<LotRecord>, DomainError>;

    /// Find a pallet by id. Returns `None` if unknown.
    async fn find_pallet(&self, id: &PalletId) -> Result<Option<PalletRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_directory_is_object_safe() {
        fn _accepts_dyn(_directory: &dyn SubjectDirectory) {}
    }
}
