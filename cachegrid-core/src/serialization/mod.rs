//! Binary marshalling of cache keys, values and cluster messages.
//!
//! Every value is written as a one-byte tag followed by a payload chosen by
//! the handler for its runtime type:
//!
//! | Tag | Handler | Payload |
//! |-----|---------|---------|
//! | 0 | null | none |
//! | 1 | primitive | sub-id and raw value |
//! | 2 | internal externalizer | 1-byte id and fields |
//! | 3 | foreign externalizer | varint id and fields |
//! | 4 | annotated type | externalizer name and fields |
//! | 5 | fallback marshaller | marshaller-defined |

mod annotated;
mod class_map;
mod data_input;
mod data_output;
mod external;
mod externalizable;
mod externalizer;
mod exts;
mod fallback;
mod global;
pub mod ids;
mod id_map;
mod internal;
pub mod marshall_util;
mod object;
pub mod primitives;
pub mod unsigned_numeric;

#[cfg(feature = "serde-fallback")]
mod serde;

pub use annotated::{AnnotatedExternalizers, AnnotatedRegistration, SerializeWith};
pub use class_map::{ClassToExternalizerMap, IdentityTypeMap, DEFAULT_LOAD_FACTOR, SPARSE_LOAD_FACTOR};
pub use data_input::{BytesObjectInput, DataInput};
pub use data_output::{
    BytesObjectOutput, DataOutput, DEFAULT_INITIAL_SIZE, DEFAULT_MAX_DOUBLING_SIZE,
};
pub use external::{ExternalExternalizers, ForeignRegistration};
pub use externalizable::{Externalizable, FieldsExternalizer};
pub use externalizer::{
    read_optional_typed, read_required, read_typed, Externalizer, ExternalizerAdapter,
    ObjectInput, ObjectOutput,
};
pub use exts::{
    KeyValuePair, KeyValuePairExternalizer, ListExternalizer, MapExternalizer,
    OptionalExternalizer, SetExternalizer, UuidExternalizer, WrappedBytes,
    WrappedBytesExternalizer,
};
pub use fallback::FallbackMarshaller;
pub use global::{GlobalMarshaller, MarshallableType, MAX_NESTING_DEPTH};
pub use id_map::{ArrayIdToExternalizerMap, HashIdToExternalizerMap, IdToExternalizerMap};
pub use internal::{internal_catalog, InternalExternalizers};
pub use object::{concrete_type_id, downcast, expect_ref, object, unwrap_boxed, Marshallable, Object};

#[cfg(feature = "serde-fallback")]
pub use self::serde::SerdeMarshaller;
