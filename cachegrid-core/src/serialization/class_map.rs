//! Identity-keyed registry from runtime types to externalizers.

use std::any::TypeId;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::externalizer::ExternalizerAdapter;

/// Default load factor of the internal type table.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.5;

/// Load factor of the smaller foreign and primitive type tables.
pub const SPARSE_LOAD_FACTOR: f32 = 0.375;

const DEFAULT_INITIAL_CAPACITY: usize = 8;

/// Registry from runtime types to externalizer adapters.
pub type ClassToExternalizerMap = IdentityTypeMap<Arc<ExternalizerAdapter>>;

/// Open-addressing map keyed by `TypeId`.
///
/// Capacity is always a power of two and doubles once the number of entries
/// would exceed `capacity * load_factor`. Collisions are resolved with linear
/// probing. Entries are never removed individually; the map is filled while
/// the marshaller starts and read concurrently afterwards.
#[derive(Debug, Clone)]
pub struct IdentityTypeMap<V> {
    slots: Vec<Option<(TypeId, V)>>,
    len: usize,
    resize_threshold: usize,
    load_factor: f32,
}

impl<V> IdentityTypeMap<V> {
    /// Creates an empty map with the default capacity and load factor.
    pub fn new() -> Self {
        Self::with_capacity_and_load_factor(DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty map.
    ///
    /// `initial_capacity` is rounded up to a power of two. `load_factor` is
    /// clamped to `(0, 1)`.
    pub fn with_capacity_and_load_factor(initial_capacity: usize, load_factor: f32) -> Self {
        let load_factor = load_factor.clamp(0.1, 0.95);
        let capacity = initial_capacity.max(2).next_power_of_two();
        Self {
            slots: Self::empty_slots(capacity),
            len: 0,
            resize_threshold: threshold(capacity, load_factor),
            load_factor,
        }
    }

    fn empty_slots(capacity: usize) -> Vec<Option<(TypeId, V)>> {
        std::iter::repeat_with(|| None).take(capacity).collect()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Looks up the value registered for `key`.
    pub fn get(&self, key: TypeId) -> Option<&V> {
        let mask = self.slots.len() - 1;
        let mut idx = hash_type_id(key) & mask;
        loop {
            match &self.slots[idx] {
                None => return None,
                Some((k, v)) if *k == key => return Some(v),
                Some(_) => idx = (idx + 1) & mask,
            }
        }
    }

    /// Returns true if `key` is registered.
    pub fn contains_key(&self, key: TypeId) -> bool {
        self.get(key).is_some()
    }

    /// Registers `value` for `key`, replacing any previous value.
    pub fn put(&mut self, key: TypeId, value: V) -> Option<V> {
        if let Some(slot) = self.find_slot(key) {
            if let Some((_, existing)) = &mut self.slots[slot] {
                return Some(std::mem::replace(existing, value));
            }
        }
        if self.len + 1 > self.resize_threshold {
            self.resize(self.slots.len() << 1);
        }
        self.insert_new(key, value);
        self.len += 1;
        None
    }

    /// Removes every entry, keeping the capacity.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.len = 0;
    }

    /// Iterates over all entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &V)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(k, v)| (*k, v)))
    }

    fn find_slot(&self, key: TypeId) -> Option<usize> {
        let mask = self.slots.len() - 1;
        let mut idx = hash_type_id(key) & mask;
        loop {
            match &self.slots[idx] {
                None => return None,
                Some((k, _)) if *k == key => return Some(idx),
                Some(_) => idx = (idx + 1) & mask,
            }
        }
    }

    fn insert_new(&mut self, key: TypeId, value: V) {
        let mask = self.slots.len() - 1;
        let mut idx = hash_type_id(key) & mask;
        while self.slots[idx].is_some() {
            idx = (idx + 1) & mask;
        }
        self.slots[idx] = Some((key, value));
    }

    fn resize(&mut self, new_capacity: usize) {
        let old = std::mem::replace(&mut self.slots, Self::empty_slots(new_capacity));
        self.resize_threshold = threshold(new_capacity, self.load_factor);
        for (key, value) in old.into_iter().flatten() {
            self.insert_new(key, value);
        }
    }
}

impl<V> Default for IdentityTypeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn threshold(capacity: usize, load_factor: f32) -> usize {
    ((capacity as f32 * load_factor) as usize).max(1)
}

/// Collects the hash bits `TypeId` exposes through `Hash`.
#[derive(Default)]
struct TypeIdHasher {
    state: u64,
}

impl Hasher for TypeIdHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state = (self.state ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.state ^= n;
    }

    fn finish(&self) -> u64 {
        self.state
    }
}

fn hash_type_id(key: TypeId) -> usize {
    let mut hasher = TypeIdHasher::default();
    key.hash(&mut hasher);
    fmix64(hasher.finish()) as usize
}

// MurmurHash3 64-bit finalizer.
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}
