//! Wire tags and the ids of the built-in externalizers.
//!
//! Ids are part of the wire format: changing one breaks compatibility with
//! peers running an earlier build.

#![allow(missing_docs)]

/// Tag of an absent value.
pub const TAG_NULL: u8 = 0;
/// Tag of a primitive value, followed by a primitive sub-id.
pub const TAG_PRIMITIVE: u8 = 1;
/// Tag of a value written by an internal externalizer, followed by a 1-byte id.
pub const TAG_INTERNAL: u8 = 2;
/// Tag of a value written by a foreign externalizer, followed by a varint id.
pub const TAG_FOREIGN: u8 = 3;
/// Tag of a value written by an annotated externalizer, followed by its name.
pub const TAG_ANNOTATED: u8 = 4;
/// Tag of a value written by the fallback marshaller.
pub const TAG_UNKNOWN: u8 = 5;

/// Reserved slot meaning "a foreign id follows". Internal ids are below it.
pub const MAX_ID: u8 = 255;

// Collections.
pub const LIST: u8 = 0;
pub const MAP: u8 = 1;
pub const SET: u8 = 2;
pub const OPTIONAL: u8 = 3;

// Utilities.
pub const KEY_VALUE_PAIR: u8 = 10;
pub const UUID: u8 = 11;
pub const WRAPPED_BYTES: u8 = 12;

// Container entries and values.
pub const IMMORTAL_ENTRY: u8 = 20;
pub const MORTAL_ENTRY: u8 = 21;
pub const TRANSIENT_ENTRY: u8 = 22;
pub const TRANSIENT_MORTAL_ENTRY: u8 = 23;
pub const IMMORTAL_VALUE: u8 = 24;
pub const MORTAL_VALUE: u8 = 25;
pub const TRANSIENT_VALUE: u8 = 26;
pub const TRANSIENT_MORTAL_VALUE: u8 = 27;
pub const METADATA_IMMORTAL_ENTRY: u8 = 28;
pub const EMBEDDED_METADATA: u8 = 29;
pub const NUMERIC_VERSION: u8 = 30;
pub const SIMPLE_CLUSTERED_VERSION: u8 = 31;

// Remoting.
pub const NODE_ADDRESS: u8 = 40;
pub const TOPOLOGY_AWARE_ADDRESS: u8 = 41;
pub const SUCCESSFUL_RESPONSE: u8 = 42;
pub const UNSUCCESSFUL_RESPONSE: u8 = 43;
pub const UNSURE_RESPONSE: u8 = 44;
pub const CACHE_NOT_FOUND_RESPONSE: u8 = 45;
pub const EXCEPTION_RESPONSE: u8 = 46;

// Distribution and topology.
pub const DEFAULT_CONSISTENT_HASH: u8 = 50;
pub const REPLICATED_CONSISTENT_HASH: u8 = 51;
pub const CACHE_TOPOLOGY: u8 = 52;
pub const AVAILABILITY_MODE: u8 = 53;

// Commands and transactions.
pub const FLAG: u8 = 60;
pub const GLOBAL_TRANSACTION: u8 = 61;
pub const STATE_CHUNK: u8 = 62;
