//! Invocation flags that alter how a cache command is executed.

use std::any::TypeId;

use crate::error::{CacheGridError, Result};
use crate::serialization::ids;
use crate::serialization::{
    expect_ref, Externalizer, Marshallable, Object, ObjectInput, ObjectOutput,
};

/// A flag attached to a cache invocation.
///
/// Flags travel as their ordinal, so new variants must only be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    /// Fail immediately if a lock cannot be acquired.
    ZeroLockAcquisitionTimeout,
    /// Apply the command to the local node only.
    CacheModeLocal,
    /// Do not acquire locks.
    SkipLocking,
    /// Acquire a write lock even for reads.
    ForceWriteLock,
    /// Run replication asynchronously.
    ForceAsynchronous,
    /// Run replication synchronously.
    ForceSynchronous,
    /// Do not write to the cache store.
    SkipCacheStore,
    /// Do not load from the cache store.
    SkipCacheLoad,
    /// Swallow failures instead of reporting them.
    FailSilently,
    /// Do not look up the key on remote owners.
    SkipRemoteLookup,
    /// Do not update indexes.
    SkipIndexing,
    /// Put only if absent, without waiting for locks.
    PutForExternalRead,
    /// The caller ignores the previous value.
    IgnoreReturnValues,
    /// Do not update statistics.
    SkipStatistics,
}

impl Flag {
    /// All flags in ordinal order.
    pub const ALL: [Flag; 14] = [
        Flag::ZeroLockAcquisitionTimeout,
        Flag::CacheModeLocal,
        Flag::SkipLocking,
        Flag::ForceWriteLock,
        Flag::ForceAsynchronous,
        Flag::ForceSynchronous,
        Flag::SkipCacheStore,
        Flag::SkipCacheLoad,
        Flag::FailSilently,
        Flag::SkipRemoteLookup,
        Flag::SkipIndexing,
        Flag::PutForExternalRead,
        Flag::IgnoreReturnValues,
        Flag::SkipStatistics,
    ];

    /// Returns the wire ordinal of this flag.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Looks up a flag by ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Flag> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }
}

/// Writes [`Flag`] as its ordinal.
pub struct FlagExternalizer;

impl Externalizer for FlagExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<Flag>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::FLAG.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        output.write_unsigned_byte(expect_ref::<Flag>(obj)?.ordinal())
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let ordinal = input.read_unsigned_byte()?;
        let flag = Flag::from_ordinal(ordinal)
            .ok_or_else(|| CacheGridError::Deserialization(format!("unknown flag {ordinal}")))?;
        Ok(Box::new(flag))
    }
}
