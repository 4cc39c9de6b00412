//! Segment ownership tables.

use std::any::TypeId;

use crate::error::{CacheGridError, Result};
use crate::remoting::{NodeAddress, NodeAddressExternalizer};
use crate::serialization::ids;
use crate::serialization::marshall_util::{read_int_array, read_size, write_int_array, write_size};
use crate::serialization::{
    expect_ref, Externalizer, Marshallable, Object, ObjectInput, ObjectOutput,
};

/// Maps each segment to an ordered list of owners.
///
/// Owners are stored as indexes into `members`; the first owner of a segment
/// is its primary owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultConsistentHash {
    /// Configured number of owners per segment.
    pub num_owners: i32,
    /// Members taking part in the hash.
    pub members: Vec<NodeAddress>,
    /// Owner indexes, one list per segment.
    pub segment_owners: Vec<Vec<i32>>,
}

impl DefaultConsistentHash {
    /// Returns the number of segments.
    pub fn num_segments(&self) -> usize {
        self.segment_owners.len()
    }

    /// Returns the owners of `segment`, primary first.
    pub fn locate_owners(&self, segment: usize) -> Vec<&NodeAddress> {
        self.segment_owners
            .get(segment)
            .map(|owners| {
                owners
                    .iter()
                    .filter_map(|i| usize::try_from(*i).ok())
                    .filter_map(|i| self.members.get(i))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the primary owner of `segment`.
    pub fn primary_owner(&self, segment: usize) -> Option<&NodeAddress> {
        self.locate_owners(segment).into_iter().next()
    }
}

/// Every member owns every segment; only the primary owner varies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicatedConsistentHash {
    /// Members taking part in the hash.
    pub members: Vec<NodeAddress>,
    /// Primary owner index per segment.
    pub primary_owners: Vec<i32>,
}

impl ReplicatedConsistentHash {
    /// Returns the number of segments.
    pub fn num_segments(&self) -> usize {
        self.primary_owners.len()
    }

    /// Returns the primary owner of `segment`.
    pub fn primary_owner(&self, segment: usize) -> Option<&NodeAddress> {
        let index = usize::try_from(*self.primary_owners.get(segment)?).ok()?;
        self.members.get(index)
    }
}

fn write_members(output: &mut dyn ObjectOutput, members: &[NodeAddress]) -> Result<()> {
    write_size(output, members.len())?;
    for member in members {
        NodeAddressExternalizer::write_address(output, member)?;
    }
    Ok(())
}

fn read_members(input: &mut dyn ObjectInput) -> Result<Vec<NodeAddress>> {
    let len = read_size(input, 16)?;
    (0..len)
        .map(|_| NodeAddressExternalizer::read_address(&mut *input))
        .collect()
}

fn check_owner_indexes(owners: &[i32], members: usize) -> Result<()> {
    match owners
        .iter()
        .find(|i| usize::try_from(**i).map_or(true, |i| i >= members))
    {
        Some(bad) => Err(CacheGridError::Deserialization(format!(
            "owner index {bad} out of range for {members} members"
        ))),
        None => Ok(()),
    }
}

/// Writes [`DefaultConsistentHash`].
pub struct DefaultConsistentHashExternalizer;

impl Externalizer for DefaultConsistentHashExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<DefaultConsistentHash>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::DEFAULT_CONSISTENT_HASH.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let ch = expect_ref::<DefaultConsistentHash>(obj)?;
        output.write_int(ch.num_owners)?;
        write_members(output, &ch.members)?;
        write_size(output, ch.segment_owners.len())?;
        for owners in &ch.segment_owners {
            write_int_array(output, owners)?;
        }
        Ok(())
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let num_owners = input.read_int()?;
        let members = read_members(input)?;
        let num_segments = read_size(input, 1)?;
        let mut segment_owners = Vec::with_capacity(num_segments);
        for _ in 0..num_segments {
            let owners = read_int_array(input)?;
            check_owner_indexes(&owners, members.len())?;
            segment_owners.push(owners);
        }
        Ok(Box::new(DefaultConsistentHash {
            num_owners,
            members,
            segment_owners,
        }))
    }
}

/// Writes [`ReplicatedConsistentHash`].
pub struct ReplicatedConsistentHashExternalizer;

impl Externalizer for ReplicatedConsistentHashExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<ReplicatedConsistentHash>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::REPLICATED_CONSISTENT_HASH.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let ch = expect_ref::<ReplicatedConsistentHash>(obj)?;
        write_members(output, &ch.members)?;
        write_int_array(output, &ch.primary_owners)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let members = read_members(input)?;
        let primary_owners = read_int_array(input)?;
        check_owner_indexes(&primary_owners, members.len())?;
        Ok(Box::new(ReplicatedConsistentHash {
            members,
            primary_owners,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn members(n: u128) -> Vec<NodeAddress> {
        (1..=n).map(|i| NodeAddress::new(Uuid::from_u128(i))).collect()
    }

    #[test]
    fn test_locate_owners() {
        let ch = DefaultConsistentHash {
            num_owners: 2,
            members: members(3),
            segment_owners: vec![vec![0, 1], vec![2, 0], vec![1]],
        };
        assert_eq!(ch.num_segments(), 3);
        assert_eq!(
            ch.locate_owners(1),
            vec![&ch.members[2], &ch.members[0]]
        );
        assert_eq!(ch.primary_owner(2), Some(&ch.members[1]));
        assert!(ch.locate_owners(7).is_empty());
    }

    #[test]
    fn test_replicated_primary_owner() {
        let ch = ReplicatedConsistentHash {
            members: members(2),
            primary_owners: vec![1, 0, -1],
        };
        assert_eq!(ch.primary_owner(0), Some(&ch.members[1]));
        assert_eq!(ch.primary_owner(2), None);
        assert_eq!(ch.primary_owner(3), None);
    }

    #[test]
    fn test_owner_index_validation() {
        assert!(check_owner_indexes(&[0, 1], 2).is_ok());
        assert!(check_owner_indexes(&[2], 2).is_err());
        assert!(check_owner_indexes(&[-1], 2).is_err());
    }
}
