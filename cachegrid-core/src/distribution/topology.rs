//! Cache topology and availability.

use std::any::TypeId;

use crate::error::{CacheGridError, Result};
use crate::serialization::ids;
use crate::serialization::{
    expect_ref, Externalizer, Marshallable, Object, ObjectInput, ObjectOutput,
};

/// The consistent hashes in effect for a cache at a given topology id.
///
/// `pending_ch` is only present while a rebalance is in progress.
#[derive(Debug, PartialEq)]
pub struct CacheTopology {
    /// Topology identifier, increasing with every change.
    pub topology_id: i32,
    /// Rebalance identifier.
    pub rebalance_id: i32,
    /// Hash used for reads.
    pub current_ch: Option<Object>,
    /// Hash being rebalanced towards.
    pub pending_ch: Option<Object>,
}

impl CacheTopology {
    /// Returns `true` while a rebalance is in progress.
    pub fn is_rebalancing(&self) -> bool {
        self.pending_ch.is_some()
    }
}

/// Whether a cache accepts all operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AvailabilityMode {
    /// All operations are allowed.
    #[default]
    Available,
    /// The cache is in a minority partition and refuses some operations.
    DegradedMode,
}

impl AvailabilityMode {
    fn ordinal(self) -> u8 {
        match self {
            AvailabilityMode::Available => 0,
            AvailabilityMode::DegradedMode => 1,
        }
    }

    fn from_ordinal(ordinal: u8) -> Result<Self> {
        match ordinal {
            0 => Ok(AvailabilityMode::Available),
            1 => Ok(AvailabilityMode::DegradedMode),
            other => Err(CacheGridError::Deserialization(format!(
                "unknown availability mode {other}"
            ))),
        }
    }
}

/// Writes [`CacheTopology`].
pub struct CacheTopologyExternalizer;

impl Externalizer for CacheTopologyExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<CacheTopology>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::CACHE_TOPOLOGY.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let topology = expect_ref::<CacheTopology>(obj)?;
        output.write_int(topology.topology_id)?;
        output.write_int(topology.rebalance_id)?;
        output.write_object(topology.current_ch.as_deref())?;
        output.write_object(topology.pending_ch.as_deref())
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let topology_id = input.read_int()?;
        let rebalance_id = input.read_int()?;
        let current_ch = input.read_object()?;
        let pending_ch = input.read_object()?;
        Ok(Box::new(CacheTopology {
            topology_id,
            rebalance_id,
            current_ch,
            pending_ch,
        }))
    }
}

/// Writes [`AvailabilityMode`] as its ordinal.
pub struct AvailabilityModeExternalizer;

impl Externalizer for AvailabilityModeExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<AvailabilityMode>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::AVAILABILITY_MODE.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        output.write_unsigned_byte(expect_ref::<AvailabilityMode>(obj)?.ordinal())
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(AvailabilityMode::from_ordinal(
            input.read_unsigned_byte()?,
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_ordinals() {
        for mode in [AvailabilityMode::Available, AvailabilityMode::DegradedMode] {
            assert_eq!(AvailabilityMode::from_ordinal(mode.ordinal()).unwrap(), mode);
        }
        assert!(AvailabilityMode::from_ordinal(2).is_err());
    }
}
