//! Error types for cachegrid marshalling.

use thiserror::Error;

/// The main error type for marshalling operations.
///
/// Configuration errors are only raised while the marshaller starts and leave
/// it stopped. Every other variant is scoped to a single call; the marshaller
/// stays usable afterwards.
#[derive(Debug, Error)]
pub enum CacheGridError {
    /// Invalid externalizer registrations or settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The marshaller was used before `start()` or after `stop()`.
    #[error("marshaller is not started")]
    NotStarted,

    /// Errors raised while writing a value.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No externalizer matched and no fallback marshaller accepted the value.
    #[error("serialization error: no externalizer or fallback marshaller for type {type_name}")]
    NotSerializable {
        /// Name of the rejected runtime type.
        type_name: &'static str,
    },

    /// Errors raised while reading a value.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The leading tag byte is not one the marshaller writes.
    #[error("deserialization error: unknown tag {0:#04x}")]
    UnknownTag(u8),

    /// An internal externalizer id that this node does not know.
    #[error("deserialization error: unknown internal externalizer id {0}")]
    UnknownInternalId(u8),

    /// A foreign externalizer id that is not registered on this node.
    #[error("deserialization error: missing foreign externalizer with id {0}, either because it was not configured or the peer registered it under another id")]
    UnknownForeignId(u32),

    /// An annotated externalizer name that is not registered on this node.
    #[error("deserialization error: no annotated type registered for externalizer {0}")]
    UnknownAnnotatedExternalizer(String),

    /// The input ended before the value was complete.
    #[error("deserialization error: insufficient data: need {needed} bytes, have {remaining}")]
    Truncated {
        /// Bytes required by the read.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },
}

impl CacheGridError {
    /// Returns `true` for errors that abort `start()`.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, CacheGridError::Configuration(_))
    }

    /// Returns `true` for errors raised while decoding input.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            CacheGridError::Deserialization(_)
                | CacheGridError::UnknownTag(_)
                | CacheGridError::UnknownInternalId(_)
                | CacheGridError::UnknownForeignId(_)
                | CacheGridError::UnknownAnnotatedExternalizer(_)
                | CacheGridError::Truncated { .. }
        )
    }
}

/// A specialized `Result` type for marshalling operations.
pub type Result<T> = std::result::Result<T, CacheGridError>;
