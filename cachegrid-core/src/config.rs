//! Marshaller configuration types and builders.

use std::fmt;
use std::sync::Arc;

use crate::error::CacheGridError;
use crate::serialization::{
    AnnotatedRegistration, Externalizer, FallbackMarshaller, ForeignRegistration, SerializeWith,
    DEFAULT_INITIAL_SIZE, DEFAULT_MAX_DOUBLING_SIZE,
};

/// Configuration error returned when validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for CacheGridError {
    fn from(err: ConfigError) -> Self {
        CacheGridError::Configuration(err.message)
    }
}

/// Settings the global marshaller is started with.
///
/// Foreign externalizers are kept in registration order; ids are resolved
/// and validated when the marshaller starts.
#[derive(Clone)]
pub struct SerializationConfig {
    foreign: Vec<ForeignRegistration>,
    annotated: Vec<AnnotatedRegistration>,
    fallback: Option<Arc<dyn FallbackMarshaller>>,
    initial_buffer_size: usize,
    max_doubling_size: usize,
}

impl SerializationConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> SerializationConfigBuilder {
        SerializationConfigBuilder::new()
    }

    /// Returns the configured foreign externalizers.
    pub fn foreign_externalizers(&self) -> &[ForeignRegistration] {
        &self.foreign
    }

    /// Returns the registered annotated types.
    pub fn annotated_types(&self) -> &[AnnotatedRegistration] {
        &self.annotated
    }

    /// Returns the fallback marshaller, if any.
    pub fn fallback_marshaller(&self) -> Option<&Arc<dyn FallbackMarshaller>> {
        self.fallback.as_ref()
    }

    /// Returns the initial size of output buffers.
    pub fn initial_buffer_size(&self) -> usize {
        self.initial_buffer_size
    }

    /// Returns the buffer size up to which output buffers double.
    pub fn max_doubling_size(&self) -> usize {
        self.max_doubling_size
    }
}

impl Default for SerializationConfig {
    fn default() -> Self {
        Self {
            foreign: Vec::new(),
            annotated: Vec::new(),
            fallback: None,
            initial_buffer_size: DEFAULT_INITIAL_SIZE,
            max_doubling_size: DEFAULT_MAX_DOUBLING_SIZE,
        }
    }
}

impl fmt::Debug for SerializationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationConfig")
            .field("foreign", &self.foreign)
            .field("annotated", &self.annotated)
            .field("fallback", &self.fallback.is_some())
            .field("initial_buffer_size", &self.initial_buffer_size)
            .field("max_doubling_size", &self.max_doubling_size)
            .finish()
    }
}

impl From<SerializationConfig> for SerializationConfigBuilder {
    fn from(config: SerializationConfig) -> Self {
        Self {
            foreign: config.foreign,
            annotated: config.annotated,
            fallback: config.fallback,
            initial_buffer_size: Some(config.initial_buffer_size),
            max_doubling_size: Some(config.max_doubling_size),
        }
    }
}

/// Builder for `SerializationConfig`.
#[derive(Clone, Default)]
pub struct SerializationConfigBuilder {
    foreign: Vec<ForeignRegistration>,
    annotated: Vec<AnnotatedRegistration>,
    fallback: Option<Arc<dyn FallbackMarshaller>>,
    initial_buffer_size: Option<usize>,
    max_doubling_size: Option<usize>,
}

impl SerializationConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a foreign externalizer that declares its own id.
    pub fn add_advanced_externalizer(mut self, externalizer: Arc<dyn Externalizer>) -> Self {
        self.foreign.push(ForeignRegistration {
            id: None,
            externalizer,
        });
        self
    }

    /// Adds a foreign externalizer under `id`, overriding any declared id.
    pub fn add_advanced_externalizer_with_id(
        mut self,
        id: i32,
        externalizer: Arc<dyn Externalizer>,
    ) -> Self {
        self.foreign.push(ForeignRegistration {
            id: Some(id),
            externalizer,
        });
        self
    }

    /// Registers `T` as an annotated type.
    pub fn serialize_with<T: SerializeWith>(mut self) -> Self {
        self.annotated.push(AnnotatedRegistration::of::<T>());
        self
    }

    /// Sets the marshaller used for values no externalizer handles.
    pub fn fallback_marshaller(mut self, fallback: Arc<dyn FallbackMarshaller>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Sets the initial size of output buffers.
    pub fn initial_buffer_size(mut self, size: usize) -> Self {
        self.initial_buffer_size = Some(size);
        self
    }

    /// Sets the buffer size up to which output buffers double.
    pub fn max_doubling_size(mut self, size: usize) -> Self {
        self.max_doubling_size = Some(size);
        self
    }

    /// Builds the configuration, returning an error if validation fails.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `initial_buffer_size` or `max_doubling_size` is zero
    /// - `max_doubling_size` is smaller than `initial_buffer_size`
    pub fn build(self) -> Result<SerializationConfig, ConfigError> {
        let initial_buffer_size = self.initial_buffer_size.unwrap_or(DEFAULT_INITIAL_SIZE);
        let max_doubling_size = self.max_doubling_size.unwrap_or(DEFAULT_MAX_DOUBLING_SIZE);

        if initial_buffer_size == 0 {
            return Err(ConfigError::new("initial_buffer_size must be greater than 0"));
        }

        if max_doubling_size == 0 {
            return Err(ConfigError::new("max_doubling_size must be greater than 0"));
        }

        if max_doubling_size < initial_buffer_size {
            return Err(ConfigError::new(
                "max_doubling_size must not be smaller than initial_buffer_size",
            ));
        }

        Ok(SerializationConfig {
            foreign: self.foreign,
            annotated: self.annotated,
            fallback: self.fallback,
            initial_buffer_size,
            max_doubling_size,
        })
    }
}

impl fmt::Debug for SerializationConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationConfigBuilder")
            .field("foreign", &self.foreign)
            .field("annotated", &self.annotated)
            .field("fallback", &self.fallback.is_some())
            .field("initial_buffer_size", &self.initial_buffer_size)
            .field("max_doubling_size", &self.max_doubling_size)
            .finish()
    }
}
