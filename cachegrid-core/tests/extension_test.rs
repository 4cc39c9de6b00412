//! Foreign externalizers, annotated types and the marshaller lifecycle.

mod common;

use std::sync::Arc;

use cachegrid_core::remoting::NodeAddress;
use cachegrid_core::serialization::ids::{TAG_ANNOTATED, TAG_FOREIGN};
use cachegrid_core::serialization::{FieldsExternalizer, Object};
use cachegrid_core::{
    CacheGridError, GlobalMarshaller, MarshallableType, SerializationConfig,
};
use cachegrid_derive::{Externalizable, SerializeWith};
use uuid::Uuid;

use common::{started, ClashingExternalizer, Point, PointExternalizer};

#[derive(Debug, Clone, PartialEq, Externalizable, SerializeWith)]
#[marshall(name = "test.Person")]
struct Person {
    name: String,
    age: i32,
    score: f64,
    initial: char,
    active: bool,
    email: Option<String>,
    home: NodeAddress,
    #[marshall(skip)]
    cached_hash: u64,
}

#[derive(Debug, Clone, PartialEq, Externalizable, SerializeWith)]
#[marshall(externalizer = FieldsExternalizer<Badge>)]
struct Badge {
    level: i16,
    tiny: i8,
    weight: f32,
    serial: i64,
}

fn person() -> Person {
    Person {
        name: "Ada".to_string(),
        age: 36,
        score: 99.5,
        initial: 'A',
        active: true,
        email: Some("ada@example.com".to_string()),
        home: NodeAddress::new(Uuid::from_u128(3)),
        cached_hash: 0xDEAD_BEEF,
    }
}

// ========== Foreign externalizers ==========

#[test]
fn test_foreign_declared_id() {
    let config = SerializationConfig::builder()
        .add_advanced_externalizer(Arc::new(PointExternalizer))
        .build()
        .unwrap();
    let marshaller = started(config);

    let point = Point { x: 3, y: -4 };
    let bytes = marshaller.to_bytes(&point).unwrap();
    assert_eq!(&bytes[..3], &[TAG_FOREIGN, 0xE8, 0x07]);
    assert_eq!(marshaller.from_bytes::<Point>(&bytes).unwrap(), point);
    assert_eq!(
        marshaller.marshallable_type(&point).unwrap(),
        MarshallableType::Foreign(1000)
    );
}

#[test]
fn test_foreign_configured_id_wins() {
    let config = SerializationConfig::builder()
        .add_advanced_externalizer_with_id(5, Arc::new(PointExternalizer))
        .build()
        .unwrap();
    let marshaller = started(config);
    let bytes = marshaller.to_bytes(&Point { x: 1, y: 1 }).unwrap();
    assert_eq!(&bytes[..2], &[TAG_FOREIGN, 5]);
}

#[test]
fn test_foreign_ids_do_not_collide_with_internal_ids() {
    let marshaller = started(
        SerializationConfig::builder()
            .add_advanced_externalizer_with_id(
                i32::from(cachegrid_core::serialization::ids::KEY_VALUE_PAIR),
                Arc::new(PointExternalizer),
            )
            .build()
            .unwrap(),
    );
    let point = Point { x: 8, y: 9 };
    let pair = cachegrid_core::serialization::KeyValuePair::new(1i32, 2i32);
    assert_eq!(marshaller.from_bytes::<Point>(&marshaller.to_bytes(&point).unwrap()).unwrap(), point);
    let decoded: cachegrid_core::serialization::KeyValuePair =
        marshaller.from_bytes(&marshaller.to_bytes(&pair).unwrap()).unwrap();
    assert_eq!(decoded, pair);
}

#[test]
fn test_foreign_id_unknown_to_reader() {
    let writer = started(
        SerializationConfig::builder()
            .add_advanced_externalizer(Arc::new(PointExternalizer))
            .build()
            .unwrap(),
    );
    let reader = started(SerializationConfig::default());
    let bytes = writer.to_bytes(&Point { x: 0, y: 0 }).unwrap();
    assert!(matches!(
        reader.object_from_bytes(&bytes),
        Err(CacheGridError::UnknownForeignId(1000))
    ));
}

#[test]
fn test_duplicate_foreign_id_fails_start() {
    let config = SerializationConfig::builder()
        .add_advanced_externalizer(Arc::new(PointExternalizer))
        .add_advanced_externalizer(Arc::new(ClashingExternalizer))
        .build()
        .unwrap();
    let marshaller = GlobalMarshaller::new(config);
    let err = marshaller.start().unwrap_err();
    assert!(err.is_configuration_error());
    assert!(!marshaller.is_started());
}

#[test]
fn test_negative_foreign_id_fails_start() {
    let config = SerializationConfig::builder()
        .add_advanced_externalizer_with_id(-3, Arc::new(PointExternalizer))
        .build()
        .unwrap();
    assert!(GlobalMarshaller::new(config)
        .start()
        .unwrap_err()
        .is_configuration_error());
}

#[test]
fn test_foreign_without_id_fails_start() {
    let config = SerializationConfig::builder()
        .add_advanced_externalizer(Arc::new(FieldsExternalizer::<Badge>::new()))
        .build()
        .unwrap();
    assert!(GlobalMarshaller::new(config)
        .start()
        .unwrap_err()
        .is_configuration_error());
}

// ========== Annotated types and derives ==========

#[test]
fn test_annotated_round_trip() {
    let config = SerializationConfig::builder()
        .serialize_with::<Person>()
        .build()
        .unwrap();
    let marshaller = started(config);

    let original = person();
    let bytes = marshaller.to_bytes(&original).unwrap();
    assert_eq!(&bytes[..3], &[TAG_ANNOTATED, 1, 11]);
    assert_eq!(&bytes[3..14], b"test.Person");

    let decoded: Person = marshaller.from_bytes(&bytes).unwrap();
    assert_eq!(
        decoded,
        Person {
            cached_hash: 0,
            ..original
        }
    );
    assert_eq!(
        marshaller.marshallable_type(&decoded).unwrap(),
        MarshallableType::Annotated("test.Person")
    );
}

#[test]
fn test_annotated_absent_option() {
    let marshaller = started(
        SerializationConfig::builder()
            .serialize_with::<Person>()
            .build()
            .unwrap(),
    );
    let original = Person {
        email: None,
        cached_hash: 0,
        ..person()
    };
    let decoded: Person = marshaller.from_bytes(&marshaller.to_bytes(&original).unwrap()).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_annotated_explicit_externalizer() {
    let marshaller = started(
        SerializationConfig::builder()
            .serialize_with::<Badge>()
            .build()
            .unwrap(),
    );
    let badge = Badge {
        level: -2,
        tiny: 7,
        weight: 0.5,
        serial: 1 << 40,
    };
    let decoded: Badge = marshaller.from_bytes(&marshaller.to_bytes(&badge).unwrap()).unwrap();
    assert_eq!(decoded, badge);
}

#[test]
fn test_unknown_annotated_name() {
    let writer = started(
        SerializationConfig::builder()
            .serialize_with::<Person>()
            .build()
            .unwrap(),
    );
    let reader = started(SerializationConfig::default());
    let bytes = writer.to_bytes(&person()).unwrap();
    match reader.object_from_bytes(&bytes) {
        Err(CacheGridError::UnknownAnnotatedExternalizer(name)) => assert_eq!(name, "test.Person"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_foreign_takes_precedence_over_annotated() {
    let marshaller = started(
        SerializationConfig::builder()
            .serialize_with::<Person>()
            .add_advanced_externalizer_with_id(77, Arc::new(FieldsExternalizer::<Person>::new()))
            .build()
            .unwrap(),
    );
    let bytes = marshaller.to_bytes(&person()).unwrap();
    assert_eq!(&bytes[..2], &[TAG_FOREIGN, 77]);
    assert_eq!(marshaller.from_bytes::<Person>(&bytes).unwrap().name, "Ada");
}

#[test]
fn test_nested_user_types() {
    let marshaller = started(
        SerializationConfig::builder()
            .serialize_with::<Person>()
            .add_advanced_externalizer(Arc::new(PointExternalizer))
            .build()
            .unwrap(),
    );
    let list: Vec<Object> = vec![
        Box::new(Point { x: 1, y: 2 }),
        Box::new(Person {
            cached_hash: 0,
            ..person()
        }),
        Box::new(42i32),
    ];
    let decoded: Vec<Object> = marshaller.from_bytes(&marshaller.to_bytes(&list).unwrap()).unwrap();
    assert_eq!(decoded, list);
}

// ========== Lifecycle ==========

#[test]
fn test_start_is_idempotent_and_restartable() {
    let marshaller = GlobalMarshaller::new(SerializationConfig::default());
    assert!(!marshaller.is_started());
    marshaller.start().unwrap();
    marshaller.start().unwrap();
    assert!(marshaller.is_started());

    marshaller.stop();
    assert!(!marshaller.is_started());
    assert!(matches!(
        marshaller.to_bytes(&1i32),
        Err(CacheGridError::NotStarted)
    ));
    assert!(matches!(
        marshaller.is_marshallable(&1i32),
        Err(CacheGridError::NotStarted)
    ));

    marshaller.start().unwrap();
    assert_eq!(marshaller.from_bytes::<i32>(&marshaller.to_bytes(&1i32).unwrap()).unwrap(), 1);
}

#[test]
fn test_marshaller_shared_across_threads() {
    let marshaller = Arc::new(started(SerializationConfig::default()));
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let marshaller = Arc::clone(&marshaller);
            std::thread::spawn(move || {
                for i in 0..100i64 {
                    let value = t * 1000 + i;
                    let bytes = marshaller.to_bytes(&value).unwrap();
                    assert_eq!(marshaller.from_bytes::<i64>(&bytes).unwrap(), value);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
