//! Externalizers for standard collections of objects.

use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::error::{CacheGridError, Result};
use crate::serialization::externalizer::{read_required, Externalizer, ObjectInput, ObjectOutput};
use crate::serialization::ids;
use crate::serialization::marshall_util::{read_objects, read_size, write_objects, write_size};
use crate::serialization::object::{expect_ref, unwrap_boxed, Marshallable, Object};

const VEC: u8 = 0;
const VEC_DEQUE: u8 = 1;

const HASH_MAP: u8 = 0;
const BTREE_MAP: u8 = 1;

const HASH_SET: u8 = 0;
const BTREE_SET: u8 = 1;

fn unknown_kind(collection: &str, kind: u8) -> CacheGridError {
    CacheGridError::Deserialization(format!("unknown {collection} kind {kind}"))
}

/// Writes `Vec<Object>` and `VecDeque<Object>`.
pub struct ListExternalizer;

impl Externalizer for ListExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<Vec<Object>>(), TypeId::of::<VecDeque<Object>>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::LIST.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let obj = unwrap_boxed(obj);
        if let Some(deque) = obj.as_any().downcast_ref::<VecDeque<Object>>() {
            output.write_unsigned_byte(VEC_DEQUE)?;
            return write_objects(output, deque);
        }
        let list = expect_ref::<Vec<Object>>(obj)?;
        output.write_unsigned_byte(VEC)?;
        write_objects(output, list)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        match input.read_unsigned_byte()? {
            VEC => Ok(Box::new(read_objects(input)?)),
            VEC_DEQUE => Ok(Box::new(VecDeque::from(read_objects(input)?))),
            other => Err(unknown_kind("list", other)),
        }
    }
}

/// Writes string-keyed maps of objects.
pub struct MapExternalizer;

impl MapExternalizer {
    fn write_entries<'a>(
        output: &mut dyn ObjectOutput,
        len: usize,
        entries: impl Iterator<Item = (&'a String, &'a Object)>,
    ) -> Result<()> {
        write_size(output, len)?;
        for (key, value) in entries {
            output.write_string(key)?;
            output.write_object(Some(value.as_ref()))?;
        }
        Ok(())
    }

    fn read_entries(input: &mut dyn ObjectInput) -> Result<Vec<(String, Object)>> {
        let len = read_size(input, 2)?;
        let mut entries = Vec::with_capacity(len);
        for _ in 0..len {
            let key = input.read_string()?;
            let value = read_required(input)?;
            entries.push((key, value));
        }
        Ok(entries)
    }
}

impl Externalizer for MapExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![
            TypeId::of::<HashMap<String, Object>>(),
            TypeId::of::<BTreeMap<String, Object>>(),
        ]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::MAP.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let obj = unwrap_boxed(obj);
        if let Some(map) = obj.as_any().downcast_ref::<BTreeMap<String, Object>>() {
            output.write_unsigned_byte(BTREE_MAP)?;
            return Self::write_entries(output, map.len(), map.iter());
        }
        let map = expect_ref::<HashMap<String, Object>>(obj)?;
        output.write_unsigned_byte(HASH_MAP)?;
        Self::write_entries(output, map.len(), map.iter())
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        match input.read_unsigned_byte()? {
            HASH_MAP => Ok(Box::new(
                Self::read_entries(input)?
                    .into_iter()
                    .collect::<HashMap<_, _>>(),
            )),
            BTREE_MAP => Ok(Box::new(
                Self::read_entries(input)?
                    .into_iter()
                    .collect::<BTreeMap<_, _>>(),
            )),
            other => Err(unknown_kind("map", other)),
        }
    }
}

/// Writes sets of strings.
pub struct SetExternalizer;

impl SetExternalizer {
    fn write_members<'a>(
        output: &mut dyn ObjectOutput,
        len: usize,
        members: impl Iterator<Item = &'a String>,
    ) -> Result<()> {
        write_size(output, len)?;
        members.into_iter().try_for_each(|m| output.write_string(m))
    }

    fn read_members(input: &mut dyn ObjectInput) -> Result<Vec<String>> {
        let len = read_size(input, 1)?;
        (0..len).map(|_| input.read_string()).collect()
    }
}

impl Externalizer for SetExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![
            TypeId::of::<HashSet<String>>(),
            TypeId::of::<BTreeSet<String>>(),
        ]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::SET.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let obj = unwrap_boxed(obj);
        if let Some(set) = obj.as_any().downcast_ref::<BTreeSet<String>>() {
            output.write_unsigned_byte(BTREE_SET)?;
            return Self::write_members(output, set.len(), set.iter());
        }
        let set = expect_ref::<HashSet<String>>(obj)?;
        output.write_unsigned_byte(HASH_SET)?;
        Self::write_members(output, set.len(), set.iter())
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        match input.read_unsigned_byte()? {
            HASH_SET => Ok(Box::new(
                Self::read_members(input)?.into_iter().collect::<HashSet<_>>(),
            )),
            BTREE_SET => Ok(Box::new(
                Self::read_members(input)?
                    .into_iter()
                    .collect::<BTreeSet<_>>(),
            )),
            other => Err(unknown_kind("set", other)),
        }
    }
}

/// Writes `Option<Object>`.
pub struct OptionalExternalizer;

impl Externalizer for OptionalExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<Option<Object>>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::OPTIONAL.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let value = expect_ref::<Option<Object>>(obj)?;
        output.write_object(value.as_deref())
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(input.read_object()?))
    }
}
