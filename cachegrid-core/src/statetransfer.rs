//! Batches of entries pushed between members during rebalancing.

use std::any::TypeId;

use crate::error::Result;
use crate::serialization::ids;
use crate::serialization::marshall_util::{read_objects, write_objects};
use crate::serialization::{
    expect_ref, Externalizer, Marshallable, Object, ObjectInput, ObjectOutput,
};

/// A batch of entries belonging to one segment.
#[derive(Debug, PartialEq)]
pub struct StateChunk {
    /// Segment the entries belong to.
    pub segment_id: i32,
    /// The transferred cache entries.
    pub cache_entries: Vec<Object>,
    /// Set on the final chunk of the segment.
    pub is_last_chunk: bool,
}

/// Writes [`StateChunk`].
pub struct StateChunkExternalizer;

impl Externalizer for StateChunkExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<StateChunk>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::STATE_CHUNK.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let chunk = expect_ref::<StateChunk>(obj)?;
        output.write_int(chunk.segment_id)?;
        write_objects(output, &chunk.cache_entries)?;
        output.write_bool(chunk.is_last_chunk)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let segment_id = input.read_int()?;
        let cache_entries = read_objects(input)?;
        let is_last_chunk = input.read_bool()?;
        Ok(Box::new(StateChunk {
            segment_id,
            cache_entries,
            is_last_chunk,
        }))
    }
}
