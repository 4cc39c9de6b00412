//! Cluster-wide transaction identifiers.

use std::any::TypeId;
use std::fmt;

use crate::error::Result;
use crate::remoting::NodeAddress;
use crate::serialization::ids;
use crate::serialization::{
    expect_ref, read_optional_typed, Externalizer, Marshallable, Object, ObjectInput,
    ObjectOutput,
};

/// Identifies a transaction across the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalTransaction {
    /// Member that started the transaction, if known.
    pub address: Option<NodeAddress>,
    /// Identifier, unique per originating member.
    pub id: i64,
    /// Whether this is the remote view of the transaction.
    pub remote: bool,
}

impl GlobalTransaction {
    /// Creates a local transaction started by `address`.
    pub fn new(address: NodeAddress, id: i64) -> Self {
        Self {
            address: Some(address),
            id,
            remote: false,
        }
    }
}

impl fmt::Display for GlobalTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Some(address) => write!(f, "GlobalTx:{}:{}", address, self.id),
            None => write!(f, "GlobalTx:local:{}", self.id),
        }
    }
}

/// Writes [`GlobalTransaction`].
///
/// The remote flag is a property of the receiving side and is not written;
/// decoded transactions are always remote.
pub struct GlobalTransactionExternalizer;

impl Externalizer for GlobalTransactionExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<GlobalTransaction>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::GLOBAL_TRANSACTION.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let tx = expect_ref::<GlobalTransaction>(obj)?;
        output.write_long(tx.id)?;
        output.write_object(tx.address.as_ref().map(|a| a as &dyn Marshallable))
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let id = input.read_long()?;
        let address = read_optional_typed::<NodeAddress>(input)?;
        Ok(Box::new(GlobalTransaction {
            address,
            id,
            remote: true,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_display() {
        let tx = GlobalTransaction::new(NodeAddress::new(Uuid::nil()), 7);
        assert_eq!(
            tx.to_string(),
            "GlobalTx:00000000-0000-0000-0000-000000000000:7"
        );
        let local = GlobalTransaction {
            address: None,
            id: 3,
            remote: false,
        };
        assert_eq!(local.to_string(), "GlobalTx:local:3");
    }
}
