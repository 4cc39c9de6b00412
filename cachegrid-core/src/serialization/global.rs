//! The global marshaller: type dispatch, wire tags and lifecycle.

use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use tracing::{debug, trace};

use super::annotated::AnnotatedExternalizers;
use super::class_map::{ClassToExternalizerMap, IdentityTypeMap};
use super::external::ExternalExternalizers;
use super::externalizer::{ObjectInput, ObjectOutput};
use super::fallback::FallbackMarshaller;
use super::id_map::{ArrayIdToExternalizerMap, HashIdToExternalizerMap, IdToExternalizerMap};
use super::ids::{TAG_ANNOTATED, TAG_FOREIGN, TAG_INTERNAL, TAG_NULL, TAG_PRIMITIVE, TAG_UNKNOWN};
use super::internal::InternalExternalizers;
use super::marshall_util::{read_byte_array, write_byte_array};
use super::object::{concrete_type_id, downcast, unwrap_boxed, Marshallable, Object};
use super::primitives;
use super::{BytesObjectInput, BytesObjectOutput, DataInput, DataOutput};
use crate::config::SerializationConfig;
use crate::error::{CacheGridError, Result};

/// Nested objects deeper than this are rejected while decoding.
pub const MAX_NESTING_DEPTH: usize = 256;

/// How a value would be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshallableType {
    /// A primitive, with its sub-id.
    Primitive(u8),
    /// A built-in type, with its internal id.
    Internal(u8),
    /// A type handled by a foreign externalizer, with its foreign id.
    Foreign(u32),
    /// An annotated type, with its externalizer name.
    Annotated(&'static str),
    /// A value handed to the fallback marshaller.
    Fallback,
    /// A value nothing can encode.
    NotMarshallable,
}

/// Lookup tables built at start and dropped at stop.
struct MarshallerTables {
    primitives: IdentityTypeMap<u8>,
    internal_classes: ClassToExternalizerMap,
    internal_ids: ArrayIdToExternalizerMap,
    foreign_classes: ClassToExternalizerMap,
    foreign_ids: HashIdToExternalizerMap,
    annotated: AnnotatedExternalizers,
    fallback: Option<Arc<dyn FallbackMarshaller>>,
}

impl MarshallerTables {
    fn build(config: &SerializationConfig) -> Result<Self> {
        let (internal_classes, internal_ids) = InternalExternalizers::load()?.into_parts();
        let (foreign_classes, foreign_ids) =
            ExternalExternalizers::load(config.foreign_externalizers())?.into_parts();
        let annotated = AnnotatedExternalizers::load(config.annotated_types())?;
        Ok(Self {
            primitives: primitives::primitive_table(),
            internal_classes,
            internal_ids,
            foreign_classes,
            foreign_ids,
            annotated,
            fallback: config.fallback_marshaller().cloned(),
        })
    }

    fn classify(&self, obj: &dyn Marshallable) -> MarshallableType {
        let obj = unwrap_boxed(obj);
        let type_id = concrete_type_id(obj);
        if let Some(sub_id) = self.primitives.get(type_id) {
            return MarshallableType::Primitive(*sub_id);
        }
        if let Some(adapter) = self.internal_classes.get(type_id) {
            return MarshallableType::Internal(adapter.id());
        }
        if let Some(foreign_id) = self
            .foreign_classes
            .get(type_id)
            .and_then(|adapter| adapter.foreign_id())
        {
            return MarshallableType::Foreign(foreign_id);
        }
        if let Some(registration) = self.annotated.for_type(type_id) {
            return MarshallableType::Annotated(registration.name());
        }
        match &self.fallback {
            Some(fallback) if fallback.is_marshallable(obj) => MarshallableType::Fallback,
            _ => MarshallableType::NotMarshallable,
        }
    }

    fn write_tagged(
        &self,
        out: &mut MarshallingOutput<'_>,
        obj: Option<&dyn Marshallable>,
    ) -> Result<()> {
        let Some(obj) = obj else {
            return out.write_unsigned_byte(TAG_NULL);
        };
        let obj = unwrap_boxed(obj);
        let type_id = concrete_type_id(obj);

        if let Some(&sub_id) = self.primitives.get(type_id) {
            out.write_unsigned_byte(TAG_PRIMITIVE)?;
            out.write_unsigned_byte(sub_id)?;
            return primitives::write_raw(out, sub_id, obj);
        }

        if let Some(adapter) = self.internal_classes.get(type_id) {
            out.write_unsigned_byte(TAG_INTERNAL)?;
            out.write_unsigned_byte(adapter.id())?;
            return adapter.write_object(out, obj);
        }

        if let Some(adapter) = self.foreign_classes.get(type_id) {
            let foreign_id = adapter.foreign_id().ok_or_else(|| {
                CacheGridError::Serialization(format!(
                    "externalizer {} has no foreign id",
                    adapter.externalizer().name()
                ))
            })?;
            out.write_unsigned_byte(TAG_FOREIGN)?;
            out.write_unsigned_int(foreign_id)?;
            return adapter.write_object(out, obj);
        }

        if let Some(registration) = self.annotated.for_type(type_id) {
            out.write_unsigned_byte(TAG_ANNOTATED)?;
            out.write_string(registration.name())?;
            return registration.instantiate().write_object(out, obj);
        }

        match &self.fallback {
            Some(fallback) if fallback.is_marshallable(obj) => {
                trace!(type_name = obj.type_name(), "writing value with fallback marshaller");
                out.write_unsigned_byte(TAG_UNKNOWN)?;
                if fallback.supports_streaming() {
                    fallback.write_to_stream(out, obj)
                } else {
                    let bytes = fallback.object_to_bytes(obj)?;
                    write_byte_array(out, &bytes)
                }
            }
            _ => Err(CacheGridError::NotSerializable {
                type_name: obj.type_name(),
            }),
        }
    }

    fn read_tagged(&self, input: &mut MarshallingInput<'_, '_>) -> Result<Option<Object>> {
        let tag = input.read_unsigned_byte()?;
        match tag {
            TAG_NULL => Ok(None),
            TAG_PRIMITIVE => {
                let sub_id = input.read_unsigned_byte()?;
                primitives::read_raw(input, sub_id).map(Some)
            }
            TAG_INTERNAL => {
                let id = input.read_unsigned_byte()?;
                let Some(adapter) = self.internal_ids.get(u32::from(id)) else {
                    debug!(id, "no internal externalizer registered for id");
                    return Err(CacheGridError::UnknownInternalId(id));
                };
                adapter.read_object(input).map(Some)
            }
            TAG_FOREIGN => {
                let id = input.read_unsigned_int()?;
                let Some(adapter) = self.foreign_ids.get(id) else {
                    debug!(id, "no foreign externalizer registered for id");
                    return Err(CacheGridError::UnknownForeignId(id));
                };
                adapter.read_object(input).map(Some)
            }
            TAG_ANNOTATED => {
                let name = input.read_string()?;
                let Some(registration) = self.annotated.for_name(&name) else {
                    debug!(name = %name, "no annotated type registered for externalizer");
                    return Err(CacheGridError::UnknownAnnotatedExternalizer(name));
                };
                registration.instantiate().read_object(input).map(Some)
            }
            TAG_UNKNOWN => {
                let fallback = self.fallback.as_ref().ok_or_else(|| {
                    CacheGridError::Deserialization(
                        "value was written by a fallback marshaller but none is configured"
                            .to_string(),
                    )
                })?;
                if fallback.supports_streaming() {
                    fallback.read_from_stream(input).map(Some)
                } else {
                    let bytes = read_byte_array(input)?;
                    fallback.object_from_bytes(&bytes).map(Some)
                }
            }
            other => Err(CacheGridError::UnknownTag(other)),
        }
    }
}

/// Output stream handed to externalizers during encoding.
struct MarshallingOutput<'a> {
    tables: &'a MarshallerTables,
    out: &'a mut BytesObjectOutput,
    depth: usize,
}

impl DataOutput for MarshallingOutput<'_> {
    fn write_byte(&mut self, v: i8) -> Result<()> {
        self.out.write_byte(v)
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.out.write_bool(v)
    }

    fn write_short(&mut self, v: i16) -> Result<()> {
        self.out.write_short(v)
    }

    fn write_int(&mut self, v: i32) -> Result<()> {
        self.out.write_int(v)
    }

    fn write_long(&mut self, v: i64) -> Result<()> {
        self.out.write_long(v)
    }

    fn write_float(&mut self, v: f32) -> Result<()> {
        self.out.write_float(v)
    }

    fn write_double(&mut self, v: f64) -> Result<()> {
        self.out.write_double(v)
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.out.write_bytes(v)
    }

    fn write_string(&mut self, v: &str) -> Result<()> {
        self.out.write_string(v)
    }
}

impl ObjectOutput for MarshallingOutput<'_> {
    fn write_object(&mut self, obj: Option<&dyn Marshallable>) -> Result<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CacheGridError::Serialization(format!(
                "objects nested deeper than {MAX_NESTING_DEPTH} levels"
            )));
        }
        self.depth += 1;
        let tables = self.tables;
        let result = tables.write_tagged(self, obj);
        self.depth -= 1;
        result
    }
}

/// Input stream handed to externalizers during decoding.
struct MarshallingInput<'a, 'b> {
    tables: &'a MarshallerTables,
    input: &'a mut BytesObjectInput<'b>,
    depth: usize,
}

impl DataInput for MarshallingInput<'_, '_> {
    fn read_byte(&mut self) -> Result<i8> {
        self.input.read_byte()
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.input.read_bool()
    }

    fn read_short(&mut self) -> Result<i16> {
        self.input.read_short()
    }

    fn read_int(&mut self) -> Result<i32> {
        self.input.read_int()
    }

    fn read_long(&mut self) -> Result<i64> {
        self.input.read_long()
    }

    fn read_float(&mut self) -> Result<f32> {
        self.input.read_float()
    }

    fn read_double(&mut self) -> Result<f64> {
        self.input.read_double()
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.input.read_bytes(len)
    }

    fn read_fully(&mut self, buf: &mut [u8]) -> Result<()> {
        self.input.read_fully(buf)
    }

    fn read_string(&mut self) -> Result<String> {
        self.input.read_string()
    }

    fn remaining(&self) -> usize {
        self.input.remaining()
    }
}

impl ObjectInput for MarshallingInput<'_, '_> {
    fn read_object(&mut self) -> Result<Option<Object>> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CacheGridError::Deserialization(format!(
                "objects nested deeper than {MAX_NESTING_DEPTH} levels"
            )));
        }
        self.depth += 1;
        let tables = self.tables;
        let result = tables.read_tagged(self);
        self.depth -= 1;
        result
    }
}

/// Encodes and decodes values of any registered type.
///
/// Lookup tables are built by [`start`](Self::start) and dropped by
/// [`stop`](Self::stop); every other call fails with
/// [`CacheGridError::NotStarted`] while the marshaller is stopped. Calls
/// clone a handle to the current tables and then run without locking, so
/// `stop` must not be called while calls are still in flight.
///
/// # Example
///
/// ```rust,ignore
/// use cachegrid_core::{GlobalMarshaller, SerializationConfig};
///
/// let marshaller = GlobalMarshaller::new(SerializationConfig::default());
/// marshaller.start()?;
/// let bytes = marshaller.object_to_bytes(Some(&42i32))?;
/// assert_eq!(bytes, vec![1, 0x15, 0, 0, 0, 42]);
/// let value: i32 = marshaller.from_bytes(&bytes)?;
/// ```
pub struct GlobalMarshaller {
    config: SerializationConfig,
    tables: RwLock<Option<Arc<MarshallerTables>>>,
}

impl GlobalMarshaller {
    /// Creates a stopped marshaller.
    pub fn new(config: SerializationConfig) -> Self {
        Self {
            config,
            tables: RwLock::new(None),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SerializationConfig {
        &self.config
    }

    /// Builds the lookup tables.
    ///
    /// Starting a started marshaller does nothing. On error the marshaller
    /// stays stopped.
    pub fn start(&self) -> Result<()> {
        let mut guard = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some() {
            return Ok(());
        }
        let tables = MarshallerTables::build(&self.config)?;
        debug!(
            internal = tables.internal_ids.len(),
            foreign = tables.foreign_ids.len(),
            annotated = tables.annotated.len(),
            fallback = tables.fallback.is_some(),
            "global marshaller started"
        );
        *guard = Some(Arc::new(tables));
        Ok(())
    }

    /// Drops the lookup tables.
    pub fn stop(&self) {
        let mut guard = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            debug!("global marshaller stopped");
        }
    }

    /// Returns `true` between `start` and `stop`.
    pub fn is_started(&self) -> bool {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn tables(&self) -> Result<Arc<MarshallerTables>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CacheGridError::NotStarted)
    }

    fn new_output(&self) -> BytesObjectOutput {
        BytesObjectOutput::with_growth(
            self.config.initial_buffer_size(),
            self.config.max_doubling_size(),
        )
    }

    /// Encodes `obj` into a new byte vector.
    pub fn object_to_bytes(&self, obj: Option<&dyn Marshallable>) -> Result<Vec<u8>> {
        let mut out = self.new_output();
        self.object_to_stream(&mut out, obj)?;
        Ok(out.into_bytes())
    }

    /// Encodes `obj` into a new immutable buffer.
    pub fn object_to_buffer(&self, obj: Option<&dyn Marshallable>) -> Result<Bytes> {
        let mut out = self.new_output();
        self.object_to_stream(&mut out, obj)?;
        Ok(out.freeze())
    }

    /// Appends the encoding of `obj` to `out`.
    pub fn object_to_stream(
        &self,
        out: &mut BytesObjectOutput,
        obj: Option<&dyn Marshallable>,
    ) -> Result<()> {
        let tables = self.tables()?;
        let mut output = MarshallingOutput {
            tables: &tables,
            out,
            depth: 0,
        };
        output.write_object(obj)
    }

    /// Decodes one value from `bytes`.
    pub fn object_from_bytes(&self, bytes: &[u8]) -> Result<Option<Object>> {
        self.object_from_stream(&mut BytesObjectInput::new(bytes))
    }

    /// Decodes one value from `len` bytes of `bytes` starting at `offset`.
    pub fn object_from_slice(&self, bytes: &[u8], offset: usize, len: usize) -> Result<Option<Object>> {
        self.object_from_stream(&mut BytesObjectInput::with_offset(bytes, offset, len)?)
    }

    /// Decodes the next value from `input`.
    pub fn object_from_stream(&self, input: &mut BytesObjectInput<'_>) -> Result<Option<Object>> {
        let tables = self.tables()?;
        let mut marshalling = MarshallingInput {
            tables: &tables,
            input,
            depth: 0,
        };
        marshalling.read_object()
    }

    /// Encodes a typed value.
    pub fn to_bytes<T: Marshallable>(&self, value: &T) -> Result<Vec<u8>> {
        self.object_to_bytes(Some(value))
    }

    /// Decodes a non-null value of type `T`.
    pub fn from_bytes<T: Marshallable>(&self, bytes: &[u8]) -> Result<T> {
        let obj = self.object_from_bytes(bytes)?.ok_or_else(|| {
            CacheGridError::Deserialization(format!(
                "expected {}, got null",
                std::any::type_name::<T>()
            ))
        })?;
        downcast(obj)
    }

    /// Returns `true` if `obj` can be encoded.
    pub fn is_marshallable(&self, obj: &dyn Marshallable) -> Result<bool> {
        Ok(self.marshallable_type(obj)? != MarshallableType::NotMarshallable)
    }

    /// Reports how `obj` would be encoded.
    pub fn marshallable_type(&self, obj: &dyn Marshallable) -> Result<MarshallableType> {
        Ok(self.tables()?.classify(obj))
    }
}

impl std::fmt::Debug for GlobalMarshaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalMarshaller")
            .field("config", &self.config)
            .field("started", &self.is_started())
            .finish()
    }
}
