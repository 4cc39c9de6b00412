//! Data container types: cache entries, values, metadata and versions.

mod entries;
mod metadata;

pub use entries::{
    ImmortalCacheEntry, ImmortalCacheEntryExternalizer, ImmortalCacheValue,
    ImmortalCacheValueExternalizer, MetadataImmortalCacheEntry,
    MetadataImmortalCacheEntryExternalizer, MortalCacheEntry, MortalCacheEntryExternalizer,
    MortalCacheValue, MortalCacheValueExternalizer, TransientCacheEntry,
    TransientCacheEntryExternalizer, TransientCacheValue, TransientCacheValueExternalizer,
    TransientMortalCacheEntry, TransientMortalCacheEntryExternalizer, TransientMortalCacheValue,
    TransientMortalCacheValueExternalizer,
};
pub use metadata::{
    EmbeddedMetadata, EmbeddedMetadataExternalizer, NumericVersion, NumericVersionExternalizer,
    SimpleClusteredVersion, SimpleClusteredVersionExternalizer,
};
