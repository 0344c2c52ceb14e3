//! Identity module - lot and pallet identifiers and the scan codec.
//!
//! - `format` - Identifier shapes and entity type detection
//! - `identifier` - Validated `LotId`/`PalletId` newtypes and `SubjectRef`
//! - `codec` - Envelope encoding and backward-compatible decoding

mod codec;
mod format;
mod identifier;

pub use codec::{
    DecodedIdentity, IdentityCodec, IdentityEnvelope, IdentityError, IdentitySource,
    CURRENT_FORMAT_VERSION, DEFAULT_APP_TAG,
};
pub use format::{detect_entity_type, EntityType};
pub use identifier::{LotId, PalletId, SubjectRef};
