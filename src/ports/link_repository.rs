//! Lot↔pallet link repository port.

use crate::domain::foundation::DomainError;
use crate::domain::identity::{LotId, PalletId};
use crate::domain::lineage::LotPalletLink;
use async_trait::async_trait;

/// Repository port for lot↔pallet associations.
///
/// Implementations must make an inserted link visible to the next
/// `find_by_lot`/`find_by_pallet` call.
#[async_trait]
pub trait LotPalletLinkRepository: Send + Sync {
    /// Links for a lot, ordered by position then creation.
    async fn find_by_lot(&self, lot_id: &LotId) -> Result<Vec<LotPalletLink>, DomainError>;

    /// Links for a pallet, ordered by creation.
    async fn find_by_pallet(&self, pallet_id: &PalletId)
        -> Result<Vec<LotPalletLink>, DomainError>;

    /// Store a new link.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the pair is already linked
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, link: &LotPalletLink) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn LotPalletLinkRepository) {}
    }
}
