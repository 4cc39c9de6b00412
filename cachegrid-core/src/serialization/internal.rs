//! The built-in externalizer catalog.

use std::sync::Arc;

use tracing::trace;

use super::class_map::{ClassToExternalizerMap, DEFAULT_LOAD_FACTOR};
use super::exts::{
    KeyValuePairExternalizer, ListExternalizer, MapExternalizer, OptionalExternalizer,
    SetExternalizer, UuidExternalizer, WrappedBytesExternalizer,
};
use super::externalizer::{Externalizer, ExternalizerAdapter};
use super::id_map::{ArrayIdToExternalizerMap, IdToExternalizerMap};
use super::ids::MAX_ID;
use crate::container::{
    EmbeddedMetadataExternalizer, ImmortalCacheEntryExternalizer, ImmortalCacheValueExternalizer,
    MetadataImmortalCacheEntryExternalizer, MortalCacheEntryExternalizer,
    MortalCacheValueExternalizer, NumericVersionExternalizer, SimpleClusteredVersionExternalizer,
    TransientCacheEntryExternalizer, TransientCacheValueExternalizer,
    TransientMortalCacheEntryExternalizer, TransientMortalCacheValueExternalizer,
};
use crate::context::FlagExternalizer;
use crate::distribution::{
    AvailabilityModeExternalizer, CacheTopologyExternalizer, DefaultConsistentHashExternalizer,
    ReplicatedConsistentHashExternalizer,
};
use crate::error::{CacheGridError, Result};
use crate::remoting::{
    ExceptionResponseExternalizer, NodeAddressExternalizer, StatelessResponseExternalizer,
    SuccessfulResponseExternalizer, TopologyAwareAddressExternalizer,
};
use crate::statetransfer::StateChunkExternalizer;
use crate::transaction::GlobalTransactionExternalizer;

const INITIAL_CAPACITY: usize = 128;

/// Returns every built-in externalizer.
pub fn internal_catalog() -> Vec<Arc<dyn Externalizer>> {
    vec![
        Arc::new(ListExternalizer),
        Arc::new(MapExternalizer),
        Arc::new(SetExternalizer),
        Arc::new(OptionalExternalizer),
        Arc::new(KeyValuePairExternalizer),
        Arc::new(UuidExternalizer),
        Arc::new(WrappedBytesExternalizer),
        Arc::new(ImmortalCacheEntryExternalizer),
        Arc::new(MortalCacheEntryExternalizer),
        Arc::new(TransientCacheEntryExternalizer),
        Arc::new(TransientMortalCacheEntryExternalizer),
        Arc::new(ImmortalCacheValueExternalizer),
        Arc::new(MortalCacheValueExternalizer),
        Arc::new(TransientCacheValueExternalizer),
        Arc::new(TransientMortalCacheValueExternalizer),
        Arc::new(MetadataImmortalCacheEntryExternalizer),
        Arc::new(EmbeddedMetadataExternalizer),
        Arc::new(NumericVersionExternalizer),
        Arc::new(SimpleClusteredVersionExternalizer),
        Arc::new(NodeAddressExternalizer),
        Arc::new(TopologyAwareAddressExternalizer),
        Arc::new(SuccessfulResponseExternalizer),
        Arc::new(StatelessResponseExternalizer::unsuccessful()),
        Arc::new(StatelessResponseExternalizer::unsure()),
        Arc::new(StatelessResponseExternalizer::cache_not_found()),
        Arc::new(ExceptionResponseExternalizer),
        Arc::new(DefaultConsistentHashExternalizer),
        Arc::new(ReplicatedConsistentHashExternalizer),
        Arc::new(CacheTopologyExternalizer),
        Arc::new(AvailabilityModeExternalizer),
        Arc::new(FlagExternalizer),
        Arc::new(GlobalTransactionExternalizer),
        Arc::new(StateChunkExternalizer),
    ]
}

/// Type and id registries for the built-in externalizers.
#[derive(Debug)]
pub struct InternalExternalizers {
    class_map: ClassToExternalizerMap,
    id_map: ArrayIdToExternalizerMap,
}

impl InternalExternalizers {
    /// Loads the built-in catalog.
    pub fn load() -> Result<Self> {
        Self::load_from(internal_catalog())
    }

    /// Loads the given externalizers as internal ones.
    ///
    /// Every externalizer must declare an id below [`MAX_ID`] and at least
    /// one type. Two different externalizers claiming the same id or the
    /// same type is a configuration error.
    pub fn load_from(catalog: Vec<Arc<dyn Externalizer>>) -> Result<Self> {
        let mut class_map =
            ClassToExternalizerMap::with_capacity_and_load_factor(INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR);
        let mut id_map = ArrayIdToExternalizerMap::new();

        for externalizer in catalog {
            let name = externalizer.name();
            let id = match externalizer.id() {
                Some(id) if (0..i32::from(MAX_ID)).contains(&id) => id as u8,
                Some(id) => {
                    return Err(CacheGridError::Configuration(format!(
                        "internal externalizer {name} declares id {id}, must be in 0..{MAX_ID}"
                    )))
                }
                None => {
                    return Err(CacheGridError::Configuration(format!(
                        "internal externalizer {name} does not declare an id"
                    )))
                }
            };
            let type_ids = externalizer.type_ids();
            if type_ids.is_empty() {
                return Err(CacheGridError::Configuration(format!(
                    "internal externalizer {name} does not declare any types"
                )));
            }

            let adapter = Arc::new(ExternalizerAdapter::internal(id, externalizer));
            id_map.register(u32::from(id), Arc::clone(&adapter))?;
            register_types(&mut class_map, &type_ids, &adapter)?;
            trace!(id, name, types = type_ids.len(), "loaded internal externalizer");
        }

        Ok(Self { class_map, id_map })
    }

    /// The type registry.
    pub fn class_map(&self) -> &ClassToExternalizerMap {
        &self.class_map
    }

    /// The id registry.
    pub fn id_map(&self) -> &ArrayIdToExternalizerMap {
        &self.id_map
    }

    pub(crate) fn into_parts(self) -> (ClassToExternalizerMap, ArrayIdToExternalizerMap) {
        (self.class_map, self.id_map)
    }
}

/// Maps each of `type_ids` to `adapter`, rejecting types another
/// externalizer already claimed.
pub(crate) fn register_types(
    class_map: &mut ClassToExternalizerMap,
    type_ids: &[std::any::TypeId],
    adapter: &Arc<ExternalizerAdapter>,
) -> Result<()> {
    for type_id in type_ids {
        if let Some(existing) = class_map.get(*type_id) {
            if !existing.same_registration(adapter) {
                return Err(CacheGridError::Configuration(format!(
                    "type {type_id:?} is claimed by both {} and {}",
                    existing.externalizer().name(),
                    adapter.externalizer().name()
                )));
            }
        }
        class_map.put(*type_id, Arc::clone(adapter));
    }
    Ok(())
}
