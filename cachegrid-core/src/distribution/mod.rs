//! Data distribution: consistent hashes and cache topologies.

mod consistent_hash;
mod topology;

pub use consistent_hash::{
    DefaultConsistentHash, DefaultConsistentHashExternalizer, ReplicatedConsistentHash,
    ReplicatedConsistentHashExternalizer,
};
pub use topology::{
    AvailabilityMode, AvailabilityModeExternalizer, CacheTopology, CacheTopologyExternalizer,
};
