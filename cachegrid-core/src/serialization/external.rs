//! Externalizers supplied by the embedding application.

use std::sync::Arc;

use tracing::trace;

use super::class_map::{ClassToExternalizerMap, SPARSE_LOAD_FACTOR};
use super::externalizer::{Externalizer, ExternalizerAdapter};
use super::id_map::{HashIdToExternalizerMap, IdToExternalizerMap};
use super::internal::register_types;
use crate::error::{CacheGridError, Result};

const INITIAL_CAPACITY: usize = 16;

/// A foreign externalizer as configured, with an optional explicit id.
#[derive(Clone)]
pub struct ForeignRegistration {
    /// Id chosen in configuration. Takes precedence over the declared id.
    pub id: Option<i32>,
    /// The externalizer.
    pub externalizer: Arc<dyn Externalizer>,
}

impl ForeignRegistration {
    /// Resolves the wire id: the configured id, else the declared one.
    pub fn resolve_id(&self) -> Result<u32> {
        let name = self.externalizer.name();
        let id = self.id.or_else(|| self.externalizer.id()).ok_or_else(|| {
            CacheGridError::Configuration(format!(
                "foreign externalizer {name} has no id: declare one or configure it explicitly"
            ))
        })?;
        u32::try_from(id).map_err(|_| {
            CacheGridError::Configuration(format!(
                "foreign externalizer {name} has negative id {id}"
            ))
        })
    }
}

impl std::fmt::Debug for ForeignRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForeignRegistration")
            .field("id", &self.id)
            .field("externalizer", &self.externalizer.name())
            .finish()
    }
}

/// Type and id registries for foreign externalizers.
#[derive(Debug)]
pub struct ExternalExternalizers {
    class_map: ClassToExternalizerMap,
    id_map: HashIdToExternalizerMap,
}

impl ExternalExternalizers {
    /// Loads `registrations` in order.
    ///
    /// Every registration must resolve to a non-negative id, and two
    /// different externalizers must not share an id or a type.
    pub fn load(registrations: &[ForeignRegistration]) -> Result<Self> {
        let mut class_map =
            ClassToExternalizerMap::with_capacity_and_load_factor(INITIAL_CAPACITY, SPARSE_LOAD_FACTOR);
        let mut id_map = HashIdToExternalizerMap::new();

        for registration in registrations {
            let foreign_id = registration.resolve_id()?;
            let name = registration.externalizer.name();
            let type_ids = registration.externalizer.type_ids();
            let adapter = Arc::new(ExternalizerAdapter::foreign(
                foreign_id,
                Arc::clone(&registration.externalizer),
            ));
            id_map.register(foreign_id, Arc::clone(&adapter))?;
            register_types(&mut class_map, &type_ids, &adapter)?;
            trace!(foreign_id, name, types = type_ids.len(), "loaded foreign externalizer");
        }

        Ok(Self { class_map, id_map })
    }

    /// The type registry.
    pub fn class_map(&self) -> &ClassToExternalizerMap {
        &self.class_map
    }

    /// The id registry, keyed by foreign id.
    pub fn id_map(&self) -> &HashIdToExternalizerMap {
        &self.id_map
    }

    pub(crate) fn into_parts(self) -> (ClassToExternalizerMap, HashIdToExternalizerMap) {
        (self.class_map, self.id_map)
    }
}
