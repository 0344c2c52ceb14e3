//! Subject state writer port.
//!
//! Writes the denormalized state label and location of a lot or pallet.
//! Callers treat failures as non-fatal: the event log stays authoritative.

use crate::domain::foundation::DomainError;
use crate::domain::identity::SubjectRef;
use crate::domain::lineage::SubjectStatePatch;
use async_trait::async_trait;

#[async_trait]
pub trait SubjectStateWriter: Send + Sync {
    /// Apply a patch to the subject's row, creating it if missing.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upsert_subject_state(
        &self,
        subject: &SubjectRef,
        patch: &SubjectStatePatch,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_state_writer_is_object_safe() {
        fn _accepts_dyn(_writer: &dyn SubjectStateWriter) {}
    }
}
