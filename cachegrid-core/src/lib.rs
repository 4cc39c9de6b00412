//! Binary marshalling engine for the cachegrid data grid.
//!
//! [`GlobalMarshaller`] turns cache keys, values and cluster messages into
//! bytes and back. Built-in types are handled out of the box; applications
//! add their own types through foreign externalizers, annotated types or a
//! fallback marshaller configured on [`SerializationConfig`].

#![warn(missing_docs)]

pub mod config;
pub mod config_file;
pub mod container;
pub mod context;
pub mod distribution;
pub mod error;
pub mod remoting;
pub mod serialization;
pub mod statetransfer;
pub mod transaction;

pub use config::{ConfigError, SerializationConfig, SerializationConfigBuilder};
pub use config_file::FileSerializationConfig;
pub use error::{CacheGridError, Result};
pub use serialization::{
    DataInput, DataOutput, Externalizable, Externalizer, GlobalMarshaller, Marshallable,
    MarshallableType, Object, ObjectInput, ObjectOutput, SerializeWith,
};
