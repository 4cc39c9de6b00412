//! Reverse registries from wire ids to externalizers.

use std::sync::Arc;

use super::externalizer::ExternalizerAdapter;
use super::ids::MAX_ID;
use crate::error::{CacheGridError, Result};

/// Registry from a wire id to the adapter that reads it.
pub trait IdToExternalizerMap: Send + Sync {
    /// Registers `adapter` under `id` and returns the adapter it replaced.
    fn put(
        &mut self,
        id: u32,
        adapter: Arc<ExternalizerAdapter>,
    ) -> Result<Option<Arc<ExternalizerAdapter>>>;

    /// Looks up the adapter registered under `id`.
    fn get(&self, id: u32) -> Option<&Arc<ExternalizerAdapter>>;

    /// Removes every registration.
    fn clear(&mut self);

    /// Returns the number of registrations.
    fn len(&self) -> usize;

    /// Returns true if nothing is registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers `adapter` under `id`, rejecting a different implementation
    /// already registered under the same id.
    fn register(&mut self, id: u32, adapter: Arc<ExternalizerAdapter>) -> Result<()> {
        let name = adapter.externalizer().name();
        let replacement = Arc::clone(&adapter);
        match self.put(id, adapter)? {
            Some(previous) if !previous.same_registration(&replacement) => {
                // Restore the first registration before failing.
                self.put(id, Arc::clone(&previous))?;
                Err(CacheGridError::Configuration(format!(
                    "duplicate externalizer id {id}: {} and {name}",
                    previous.externalizer().name()
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Dense registry with one slot per internal id.
#[derive(Debug, Clone)]
pub struct ArrayIdToExternalizerMap {
    slots: Vec<Option<Arc<ExternalizerAdapter>>>,
    len: usize,
}

impl ArrayIdToExternalizerMap {
    /// Creates an empty registry with `MAX_ID + 1` slots.
    pub fn new() -> Self {
        Self {
            slots: vec![None; usize::from(MAX_ID) + 1],
            len: 0,
        }
    }
}

impl Default for ArrayIdToExternalizerMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IdToExternalizerMap for ArrayIdToExternalizerMap {
    fn put(
        &mut self,
        id: u32,
        adapter: Arc<ExternalizerAdapter>,
    ) -> Result<Option<Arc<ExternalizerAdapter>>> {
        let slot = self.slots.get_mut(id as usize).ok_or_else(|| {
            CacheGridError::Configuration(format!(
                "externalizer id {id} is outside the dense range 0..={MAX_ID}"
            ))
        })?;
        let previous = slot.replace(adapter);
        if previous.is_none() {
            self.len += 1;
        }
        Ok(previous)
    }

    fn get(&self, id: u32) -> Option<&Arc<ExternalizerAdapter>> {
        self.slots.get(id as usize)?.as_ref()
    }

    fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }
}

const HASH_INITIAL_CAPACITY: usize = 16;
const HASH_LOAD_FACTOR: f32 = 0.5;

/// Sparse registry for arbitrary non-negative ids, using open addressing.
#[derive(Debug, Clone)]
pub struct HashIdToExternalizerMap {
    slots: Vec<Option<(u32, Arc<ExternalizerAdapter>)>>,
    len: usize,
}

impl HashIdToExternalizerMap {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            slots: vec![None; HASH_INITIAL_CAPACITY],
            len: 0,
        }
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn index_of(&self, id: u32) -> usize {
        // Fibonacci hashing spreads sequential ids across the table.
        (id.wrapping_mul(0x9E37_79B9) as usize) & (self.slots.len() - 1)
    }

    fn probe(&self, id: u32) -> (usize, bool) {
        let mask = self.slots.len() - 1;
        let mut idx = self.index_of(id);
        loop {
            match &self.slots[idx] {
                None => return (idx, false),
                Some((k, _)) if *k == id => return (idx, true),
                Some(_) => idx = (idx + 1) & mask,
            }
        }
    }

    fn grow(&mut self) {
        let capacity = self.slots.len() << 1;
        let old = std::mem::replace(&mut self.slots, vec![None; capacity]);
        for (id, adapter) in old.into_iter().flatten() {
            let (idx, _) = self.probe(id);
            self.slots[idx] = Some((id, adapter));
        }
    }
}

impl Default for HashIdToExternalizerMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IdToExternalizerMap for HashIdToExternalizerMap {
    fn put(
        &mut self,
        id: u32,
        adapter: Arc<ExternalizerAdapter>,
    ) -> Result<Option<Arc<ExternalizerAdapter>>> {
        if let (idx, true) = self.probe(id) {
            let previous = self.slots[idx].replace((id, adapter));
            return Ok(previous.map(|(_, a)| a));
        }
        if (self.len + 1) as f32 > self.slots.len() as f32 * HASH_LOAD_FACTOR {
            self.grow();
        }
        let (idx, _) = self.probe(id);
        self.slots[idx] = Some((id, adapter));
        self.len += 1;
        Ok(None)
    }

    fn get(&self, id: u32) -> Option<&Arc<ExternalizerAdapter>> {
        match self.probe(id) {
            (idx, true) => self.slots[idx].as_ref().map(|(_, a)| a),
            _ => None,
        }
    }

    fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }
}
