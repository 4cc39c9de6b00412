//! Cluster member addresses.

use std::any::TypeId;
use std::fmt;

use uuid::Uuid;

use crate::error::Result;
use crate::serialization::ids;
use crate::serialization::marshall_util::{read_nullable_string, write_nullable_string};
use crate::serialization::{
    expect_ref, Externalizer, Marshallable, Object, ObjectInput, ObjectOutput,
};

/// Identifies a cluster member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeAddress {
    /// Member identifier.
    pub uuid: Uuid,
}

impl NodeAddress {
    /// Creates an address for `uuid`.
    pub fn new(uuid: Uuid) -> Self {
        Self { uuid }
    }

    /// Creates an address with a random identifier.
    pub fn random() -> Self {
        Self::new(Uuid::new_v4())
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid)
    }
}

/// A member address that also records where the member runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopologyAwareAddress {
    /// Member identifier.
    pub uuid: Uuid,
    /// Site the member belongs to.
    pub site_id: Option<String>,
    /// Rack the member runs on.
    pub rack_id: Option<String>,
    /// Machine the member runs on.
    pub machine_id: Option<String>,
}

impl TopologyAwareAddress {
    /// Returns `true` if both members run on the same site.
    pub fn is_same_site(&self, other: &TopologyAwareAddress) -> bool {
        self.site_id == other.site_id
    }

    /// Returns `true` if both members run on the same rack of the same site.
    pub fn is_same_rack(&self, other: &TopologyAwareAddress) -> bool {
        self.is_same_site(other) && self.rack_id == other.rack_id
    }

    /// Returns `true` if both members run on the same machine.
    pub fn is_same_machine(&self, other: &TopologyAwareAddress) -> bool {
        self.is_same_rack(other) && self.machine_id == other.machine_id
    }
}

fn write_uuid(output: &mut dyn ObjectOutput, uuid: &Uuid) -> Result<()> {
    let (most, least) = uuid.as_u64_pair();
    output.write_long(most as i64)?;
    output.write_long(least as i64)
}

fn read_uuid(input: &mut dyn ObjectInput) -> Result<Uuid> {
    let most = input.read_long()? as u64;
    let least = input.read_long()? as u64;
    Ok(Uuid::from_u64_pair(most, least))
}

/// Writes [`NodeAddress`].
pub struct NodeAddressExternalizer;

impl NodeAddressExternalizer {
    pub(crate) fn write_address(output: &mut dyn ObjectOutput, address: &NodeAddress) -> Result<()> {
        write_uuid(output, &address.uuid)
    }

    pub(crate) fn read_address(input: &mut dyn ObjectInput) -> Result<NodeAddress> {
        read_uuid(input).map(NodeAddress::new)
    }
}

impl Externalizer for NodeAddressExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<NodeAddress>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::NODE_ADDRESS.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        Self::write_address(output, expect_ref::<NodeAddress>(obj)?)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(Self::read_address(input)?))
    }
}

/// Writes [`TopologyAwareAddress`].
pub struct TopologyAwareAddressExternalizer;

impl Externalizer for TopologyAwareAddressExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<TopologyAwareAddress>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::TOPOLOGY_AWARE_ADDRESS.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let address = expect_ref::<TopologyAwareAddress>(obj)?;
        write_uuid(output, &address.uuid)?;
        write_nullable_string(output, address.site_id.as_deref())?;
        write_nullable_string(output, address.rack_id.as_deref())?;
        write_nullable_string(output, address.machine_id.as_deref())
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let uuid = read_uuid(input)?;
        let site_id = read_nullable_string(input)?;
        let rack_id = read_nullable_string(input)?;
        let machine_id = read_nullable_string(input)?;
        Ok(Box::new(TopologyAwareAddress {
            uuid,
            site_id,
            rack_id,
            machine_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(site: &str, rack: &str, machine: &str) -> TopologyAwareAddress {
        TopologyAwareAddress {
            uuid: Uuid::new_v4(),
            site_id: Some(site.to_string()),
            rack_id: Some(rack.to_string()),
            machine_id: Some(machine.to_string()),
        }
    }

    #[test]
    fn test_topology_comparisons() {
        let a = address("s1", "r1", "m1");
        let b = address("s1", "r1", "m2");
        let c = address("s1", "r2", "m1");
        let d = address("s2", "r1", "m1");

        assert!(a.is_same_rack(&b));
        assert!(!a.is_same_machine(&b));
        assert!(a.is_same_site(&c));
        assert!(!a.is_same_rack(&c));
        assert!(!a.is_same_site(&d));
        assert!(!a.is_same_machine(&d));
    }

    #[test]
    fn test_node_address_display() {
        let uuid = Uuid::nil();
        assert_eq!(
            NodeAddress::new(uuid).to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }
}
