//! Identity codec - scanned strings to typed subjects and back.
//!
//! Two input forms are first-class:
//!
//! - **Envelope**: a JSON object stamped with the issuing application's tag,
//!   a format version, a creation time, and free-form metadata. This is what
//!   newer QR labels carry.
//! - **Bare identifier**: the plain `LP-...`/`PAL-...` string printed on older
//!   labels. It decodes to a synthesized minimal envelope.
//!
//! Decoding never panics; every input produces either a [`DecodedIdentity`]
//! or an [`IdentityError`] with a stable kind.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use super::format::EntityType;
use super::identifier::SubjectRef;
use crate::domain::foundation::{ErrorCode, Timestamp};

/// Application tag stamped on envelopes issued by this system.
pub const DEFAULT_APP_TAG: &str = "TrazaPack";

/// Envelope format version written by [`IdentityCodec::encode`].
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

/// Why a scanned string could not be resolved to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("'{raw}' is neither a lot nor a pallet identifier")]
    InvalidFormat { raw: String },

    #[error("Malformed identity envelope: {reason}")]
    MalformedEnvelope { reason: String },

    #[error("Unknown entity type '{entity_type}'")]
    UnknownEntityType { entity_type: String },

    #[error("Identifier '{id}' does not have the shape of a {entity_type}")]
    IdentityFormatMismatch { id: String, entity_type: EntityType },

    #[error("Envelope was issued by foreign application '{app_tag}'")]
    ForeignApplication { app_tag: String },
}

impl IdentityError {
    /// Stable error kind for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            IdentityError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            IdentityError::MalformedEnvelope { .. } => ErrorCode::MalformedEnvelope,
            IdentityError::UnknownEntityType { .. } => ErrorCode::UnknownEntityType,
            IdentityError::IdentityFormatMismatch { .. } => ErrorCode::IdentityFormatMismatch,
            IdentityError::ForeignApplication { .. } => ErrorCode::ForeignApplication,
        }
    }

    fn malformed(reason: impl Into<String>) -> Self {
        IdentityError::MalformedEnvelope {
            reason: reason.into(),
        }
    }
}

/// Versioned, app-tagged wrapper around a bare identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityEnvelope {
    pub id: String,
    pub entity_type: EntityType,
    pub created_at: Timestamp,
    pub app_tag: String,
    pub format_version: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl IdentityEnvelope {
    /// Serializes to the wire JSON form.
    pub fn to_json(&self) -> String {
        json!({
            "id": self.id,
            "entityType": self.entity_type.as_str(),
            "createdAt": self.created_at.to_rfc3339(),
            "appTag": self.app_tag,
            "formatVersion": self.format_version,
            "metadata": Value::Object(self.metadata.clone()),
        })
        .to_string()
    }
}

/// Which input form a decoded identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    Envelope,
    BareIdentifier,
}

/// A successfully decoded identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedIdentity {
    pub subject: SubjectRef,
    pub envelope: IdentityEnvelope,
    pub source: IdentitySource,
}

impl DecodedIdentity {
    pub fn entity_type(&self) -> EntityType {
        self.subject.entity_type()
    }

    pub fn id(&self) -> &str {
        self.subject.id_str()
    }
}

/// Encodes and decodes identities for one issuing application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCodec {
    app_tag: String,
    format_version: String,
}

impl IdentityCodec {
    /// Creates a codec stamping the given application tag.
    pub fn new(app_tag: impl Into<String>) -> Self {
        Self {
            app_tag: app_tag.into(),
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }

    /// Overrides the format version written by `encode`.
    pub fn with_format_version(mut self, format_version: impl Into<String>) -> Self {
        self.format_version = format_version.into();
        self
    }

    pub fn app_tag(&self) -> &str {
        &self.app_tag
    }

    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    /// Builds an envelope for a subject, stamped now.
    pub fn envelope_for(
        &self,
        subject: &SubjectRef,
        metadata: Option<Map<String, Value>>,
    ) -> IdentityEnvelope {
        IdentityEnvelope {
            id: subject.id_str().to_string(),
            entity_type: subject.entity_type(),
            created_at: Timestamp::now(),
            app_tag: self.app_tag.clone(),
            format_version: self.format_version.clone(),
            metadata: metadata.unwrap_or_default(),
        }
    }

    /// Produces the JSON envelope string for an identifier.
    ///
    /// Refuses to mint an envelope whose `id` does not have the shape of
    /// `entity_type`, since such an envelope could never be decoded.
    pub fn encode(
        &self,
        id: &str,
        entity_type: EntityType,
        metadata: Option<Map<String, Value>>,
    ) -> Result<String, IdentityError> {
        let subject = SubjectRef::for_entity(entity_type, id).ok_or_else(|| {
            IdentityError::IdentityFormatMismatch {
                id: id.to_string(),
                entity_type,
            }
        })?;
        Ok(self.envelope_for(&subject, metadata).to_json())
    }

    /// Decodes a scanned or typed string.
    ///
    /// JSON objects are validated as envelopes. Anything that is not a JSON
    /// object falls back to bare identifier detection.
    pub fn decode(&self, raw: &str) -> Result<DecodedIdentity, IdentityError> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => self.decode_envelope(fields),
            _ => self.decode_bare(raw),
        }
    }

    fn decode_envelope(&self, mut fields: Map<String, Value>) -> Result<DecodedIdentity, IdentityError> {
        let id = required_str(&fields, "id")?;
        let entity_type = required_str(&fields, "entityType")?;
        let app_tag = required_str(&fields, "appTag")?;
        let created_at = required_str(&fields, "createdAt")?;

        let created_at = Timestamp::parse_iso8601(&created_at)
            .map_err(|_| IdentityError::malformed(format!("createdAt '{}' is not ISO-8601", created_at)))?;

        let format_version = match fields.remove("formatVersion") {
            None | Some(Value::Null) => CURRENT_FORMAT_VERSION.to_string(),
            Some(Value::String(v)) => v,
            Some(_) => return Err(IdentityError::malformed("formatVersion must be a string")),
        };

        let metadata = match fields.remove("metadata") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(m)) => m,
            Some(_) => return Err(IdentityError::malformed("metadata must be an object")),
        };

        let entity_type = EntityType::from_name(&entity_type)
            .ok_or(IdentityError::UnknownEntityType { entity_type })?;

        let subject = SubjectRef::for_entity(entity_type, &id).ok_or_else(|| {
            IdentityError::IdentityFormatMismatch {
                id: id.clone(),
                entity_type,
            }
        })?;

        if app_tag != self.app_tag {
            return Err(IdentityError::ForeignApplication { app_tag });
        }

        Ok(DecodedIdentity {
            subject,
            envelope: IdentityEnvelope {
                id,
                entity_type,
                created_at,
                app_tag,
                format_version,
                metadata,
            },
            source: IdentitySource::Envelope,
        })
    }

    fn decode_bare(&self, raw: &str) -> Result<DecodedIdentity, IdentityError> {
        let subject = SubjectRef::detect(raw).ok_or_else(|| IdentityError::InvalidFormat {
            raw: raw.to_string(),
        })?;
        let envelope = self.envelope_for(&subject, None);

        Ok(DecodedIdentity {
            subject,
            envelope,
            source: IdentitySource::BareIdentifier,
        })
    }
}

impl Default for IdentityCodec {
    fn default() -> Self {
        Self::new(DEFAULT_APP_TAG)
    }
}

fn required_str(fields: &Map<String, Value>, key: &str) -> Result<String, IdentityError> {
    match fields.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(IdentityError::malformed(format!("'{}' must be a string", key))),
        None => Err(IdentityError::malformed(format!("missing required field '{}'", key))),
    }
}
