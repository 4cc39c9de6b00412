//! Basic usage example: marshalling built-in, foreign and serde values.
//!
//! Run with: `cargo run --example basic_usage`

use std::any::TypeId;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cachegrid_core::container::{EmbeddedMetadata, MetadataImmortalCacheEntry, NumericVersion};
use cachegrid_core::serialization::{expect_ref, Object, SerdeMarshaller};
use cachegrid_core::{
    Externalizer, GlobalMarshaller, Marshallable, ObjectInput, ObjectOutput, Result,
    SerializationConfig, SerializationConfigBuilder,
};

#[derive(Debug, Clone, PartialEq)]
struct GeoPoint {
    lat: f64,
    lon: f64,
}

struct GeoPointExternalizer;

impl Externalizer for GeoPointExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<GeoPoint>()]
    }

    fn id(&self) -> Option<i32> {
        Some(1001)
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let point = expect_ref::<GeoPoint>(obj)?;
        output.write_double(point.lat)?;
        output.write_double(point.lon)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let lat = input.read_double()?;
        let lon = input.read_double()?;
        Ok(Box::new(GeoPoint { lat, lon }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Session {
    user: String,
    roles: Vec<String>,
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== cachegrid Marshalling Example ===\n");

    let config = SerializationConfigBuilder::from_env()?
        .add_advanced_externalizer(Arc::new(GeoPointExternalizer))
        .fallback_marshaller(Arc::new(
            SerdeMarshaller::new().with_type_named::<Session>("example.Session"),
        ))
        .build()?;
    let marshaller = GlobalMarshaller::new(config);
    marshaller.start()?;

    // ========== Primitives ==========
    let bytes = marshaller.to_bytes(&42i32)?;
    println!("42i32        -> {bytes:02x?}");
    let bytes = marshaller.to_bytes(&"hello".to_string())?;
    println!("\"hello\"      -> {bytes:02x?}");

    // ========== Built-in types ==========
    let entry = MetadataImmortalCacheEntry {
        key: Box::new("user:1".to_string()),
        value: Box::new(1234i64),
        metadata: EmbeddedMetadata::new(60_000, -1).with_version(NumericVersion::new(1)),
    };
    let bytes = marshaller.to_bytes(&entry)?;
    let decoded: MetadataImmortalCacheEntry = marshaller.from_bytes(&bytes)?;
    println!("cache entry  -> {} bytes, round trip ok: {}", bytes.len(), decoded == entry);

    // ========== Foreign externalizer ==========
    let point = GeoPoint {
        lat: 52.52,
        lon: 13.405,
    };
    let bytes = marshaller.to_bytes(&point)?;
    println!("GeoPoint     -> {bytes:02x?}");
    println!("               how: {:?}", marshaller.marshallable_type(&point)?);

    // ========== Fallback marshaller ==========
    let session = Session {
        user: "ada".to_string(),
        roles: vec!["admin".to_string()],
    };
    let bytes = marshaller.to_bytes(&session)?;
    let decoded: Session = marshaller.from_bytes(&bytes)?;
    println!("Session      -> {} bytes, decoded {decoded:?}", bytes.len());

    marshaller.stop();
    println!("\nMarshaller stopped.");
    Ok(())
}
