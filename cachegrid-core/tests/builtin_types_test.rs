//! Round trips of primitives and built-in types through the global marshaller.

mod common;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use cachegrid_core::container::{
    EmbeddedMetadata, ImmortalCacheEntry, ImmortalCacheValue, MetadataImmortalCacheEntry,
    MortalCacheEntry, MortalCacheValue, NumericVersion, SimpleClusteredVersion,
    TransientCacheEntry, TransientCacheValue, TransientMortalCacheEntry,
    TransientMortalCacheValue,
};
use cachegrid_core::context::Flag;
use cachegrid_core::distribution::{
    AvailabilityMode, CacheTopology, DefaultConsistentHash, ReplicatedConsistentHash,
};
use cachegrid_core::remoting::{
    CacheNotFoundResponse, ExceptionResponse, NodeAddress, SuccessfulResponse,
    TopologyAwareAddress, UnsuccessfulResponse, UnsureResponse,
};
use cachegrid_core::serialization::ids::{self, TAG_INTERNAL, TAG_NULL, TAG_PRIMITIVE};
use cachegrid_core::serialization::primitives::{
    ID_ARRAY_EMPTY, ID_ARRAY_LARGE, ID_ARRAY_MEDIUM, ID_ARRAY_SMALL, ID_BOOLEAN_ARRAY,
    ID_BYTE_ARRAY, ID_INT_OBJ, ID_STRING,
};
use cachegrid_core::serialization::{
    BytesObjectInput, BytesObjectOutput, KeyValuePair, Object, WrappedBytes,
};
use cachegrid_core::statetransfer::StateChunk;
use cachegrid_core::transaction::GlobalTransaction;
use cachegrid_core::MarshallableType;
use uuid::Uuid;

use common::{default_marshaller, round_trip, round_trip_object};

fn address(n: u128) -> NodeAddress {
    NodeAddress::new(Uuid::from_u128(n))
}

// ========== Primitives ==========

#[test]
fn test_int_wire_format() {
    let marshaller = default_marshaller();
    let bytes = marshaller.to_bytes(&42i32).unwrap();
    assert_eq!(bytes, vec![TAG_PRIMITIVE, ID_INT_OBJ, 0, 0, 0, 42]);
}

#[test]
fn test_string_wire_format() {
    let marshaller = default_marshaller();
    let bytes = marshaller.to_bytes(&"ok".to_string()).unwrap();
    assert_eq!(bytes, vec![TAG_PRIMITIVE, ID_STRING, 1, 2, b'o', b'k']);
}

#[test]
fn test_scalar_round_trips() {
    let marshaller = default_marshaller();
    assert!(round_trip(&marshaller, &true));
    assert_eq!(round_trip(&marshaller, &-7i8), -7);
    assert_eq!(round_trip(&marshaller, &-1234i16), -1234);
    assert_eq!(round_trip(&marshaller, &i32::MIN), i32::MIN);
    assert_eq!(round_trip(&marshaller, &i64::MAX), i64::MAX);
    assert_eq!(round_trip(&marshaller, &1.5f32), 1.5);
    assert_eq!(round_trip(&marshaller, &-2.25f64), -2.25);
    assert_eq!(round_trip(&marshaller, &'é'), 'é');
    assert_eq!(
        round_trip(&marshaller, &"grüße, 世界".to_string()),
        "grüße, 世界"
    );
}

#[test]
fn test_static_str_decodes_as_string() {
    let marshaller = default_marshaller();
    let bytes = marshaller.object_to_bytes(Some(&"hello")).unwrap();
    let decoded: String = marshaller.from_bytes(&bytes).unwrap();
    assert_eq!(decoded, "hello");
}

#[test]
fn test_char_outside_bmp_is_rejected() {
    let marshaller = default_marshaller();
    assert!(marshaller.to_bytes(&'\u{1F600}').is_err());
}

#[test]
fn test_array_size_classes() {
    let marshaller = default_marshaller();
    let cases = [
        (0usize, ID_ARRAY_EMPTY),
        (1, ID_ARRAY_SMALL),
        (256, ID_ARRAY_SMALL),
        (257, ID_ARRAY_MEDIUM),
        (0x10100, ID_ARRAY_MEDIUM),
        (0x10101, ID_ARRAY_LARGE),
    ];
    for (len, size_class) in cases {
        let value = vec![0xABu8; len];
        let bytes = marshaller.to_bytes(&value).unwrap();
        assert_eq!(&bytes[..3], &[TAG_PRIMITIVE, ID_BYTE_ARRAY, size_class], "len {len}");
        assert_eq!(round_trip(&marshaller, &value), value);
    }
}

#[test]
fn test_boolean_array_is_bit_packed() {
    let marshaller = default_marshaller();
    let value = vec![true, false, true, true, false, false, false, false, true];
    let bytes = marshaller.to_bytes(&value).unwrap();
    assert_eq!(
        bytes,
        vec![TAG_PRIMITIVE, ID_BOOLEAN_ARRAY, ID_ARRAY_SMALL, 8, 0b0000_1101, 0b0000_0001]
    );
    assert_eq!(round_trip(&marshaller, &value), value);
}

#[test]
fn test_primitive_array_round_trips() {
    let marshaller = default_marshaller();
    assert_eq!(round_trip(&marshaller, &vec!['a', 'ß', '中']), vec!['a', 'ß', '中']);
    assert_eq!(round_trip(&marshaller, &vec![1.0f64, -0.5]), vec![1.0, -0.5]);
    assert_eq!(round_trip(&marshaller, &vec![0.25f32; 300]), vec![0.25f32; 300]);
    assert_eq!(round_trip(&marshaller, &vec![i32::MAX, 0, -1]), vec![i32::MAX, 0, -1]);
    assert_eq!(round_trip(&marshaller, &vec![i64::MIN]), vec![i64::MIN]);
    assert_eq!(round_trip(&marshaller, &Vec::<i16>::new()), Vec::<i16>::new());
}

#[test]
fn test_null() {
    let marshaller = default_marshaller();
    let bytes = marshaller.object_to_bytes(None).unwrap();
    assert_eq!(bytes, vec![TAG_NULL]);
    assert!(marshaller.object_from_bytes(&bytes).unwrap().is_none());
}

// ========== Collections and utilities ==========

#[test]
fn test_list_round_trip() {
    let marshaller = default_marshaller();
    let list: Vec<Object> = vec![Box::new(1i32), Box::new("two".to_string()), Box::new(3.0f64)];
    let decoded: Vec<Object> = marshaller.from_bytes(&marshaller.to_bytes(&list).unwrap()).unwrap();
    assert_eq!(decoded, list);

    let deque: VecDeque<Object> = VecDeque::from(vec![Box::new(true) as Object]);
    let decoded: VecDeque<Object> =
        marshaller.from_bytes(&marshaller.to_bytes(&deque).unwrap()).unwrap();
    assert_eq!(decoded, deque);
}

#[test]
fn test_map_round_trip() {
    let marshaller = default_marshaller();
    let mut map: HashMap<String, Object> = HashMap::new();
    map.insert("a".to_string(), Box::new(1i64));
    map.insert("b".to_string(), Box::new(vec![1u8, 2, 3]));
    let decoded: HashMap<String, Object> =
        marshaller.from_bytes(&marshaller.to_bytes(&map).unwrap()).unwrap();
    assert_eq!(decoded, map);

    let mut sorted: BTreeMap<String, Object> = BTreeMap::new();
    sorted.insert("z".to_string(), Box::new(NumericVersion::new(3)));
    let decoded: BTreeMap<String, Object> =
        marshaller.from_bytes(&marshaller.to_bytes(&sorted).unwrap()).unwrap();
    assert_eq!(decoded, sorted);
}

#[test]
fn test_set_round_trip() {
    let marshaller = default_marshaller();
    let set: HashSet<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
    assert_eq!(round_trip(&marshaller, &set), set);
    let sorted: BTreeSet<String> = set.iter().cloned().collect();
    assert_eq!(round_trip(&marshaller, &sorted), sorted);
}

#[test]
fn test_optional_round_trip() {
    let marshaller = default_marshaller();
    let present: Option<Object> = Some(Box::new(5i32));
    let decoded: Option<Object> =
        marshaller.from_bytes(&marshaller.to_bytes(&present).unwrap()).unwrap();
    assert_eq!(decoded, present);

    let absent: Option<Object> = None;
    let decoded: Option<Object> =
        marshaller.from_bytes(&marshaller.to_bytes(&absent).unwrap()).unwrap();
    assert!(decoded.is_none());
}

#[test]
fn test_utility_round_trips() {
    let marshaller = default_marshaller();
    let pair = KeyValuePair::new("k".to_string(), 9i32);
    let decoded: KeyValuePair = marshaller.from_bytes(&marshaller.to_bytes(&pair).unwrap()).unwrap();
    assert_eq!(decoded, pair);

    let uuid = Uuid::from_u128(0x1234_5678_9abc_def0_1122_3344_5566_7788);
    assert_eq!(round_trip(&marshaller, &uuid), uuid);

    let wrapped = WrappedBytes::new(vec![9u8, 8, 7]);
    assert_eq!(round_trip(&marshaller, &wrapped), wrapped);
}

#[test]
fn test_internal_ids_on_the_wire() {
    let marshaller = default_marshaller();
    let cases: Vec<(Box<dyn cachegrid_core::Marshallable>, u8)> = vec![
        (Box::new(Uuid::nil()), ids::UUID),
        (Box::new(NumericVersion::new(1)), ids::NUMERIC_VERSION),
        (Box::new(address(1)), ids::NODE_ADDRESS),
        (Box::new(Flag::SkipLocking), ids::FLAG),
        (Box::new(AvailabilityMode::DegradedMode), ids::AVAILABILITY_MODE),
    ];
    for (value, id) in cases {
        let bytes = marshaller.object_to_bytes(Some(value.as_ref())).unwrap();
        assert_eq!(&bytes[..2], &[TAG_INTERNAL, id]);
        assert_eq!(
            marshaller.marshallable_type(value.as_ref()).unwrap(),
            MarshallableType::Internal(id)
        );
    }
}

// ========== Container ==========

#[test]
fn test_cache_entries_round_trip() {
    let marshaller = default_marshaller();

    let immortal = ImmortalCacheEntry::new("key".to_string(), 1i32);
    assert_eq!(round_trip_object(&marshaller, &immortal), Box::new(immortal) as Object);

    let mortal = MortalCacheEntry {
        key: Box::new("key".to_string()),
        value: Box::new(2i64),
        lifespan: 60_000,
        created: 1_700_000_000_000,
    };
    assert_eq!(round_trip(&marshaller, &mortal), mortal);

    let transient = TransientCacheEntry {
        key: Box::new(3i32),
        value: Box::new(vec![1u8]),
        max_idle: 5_000,
        last_used: 42,
    };
    assert_eq!(round_trip(&marshaller, &transient), transient);

    let transient_mortal = TransientMortalCacheEntry {
        key: Box::new(3i32),
        value: Box::new("v".to_string()),
        lifespan: -1,
        max_idle: 1,
        created: 0,
        last_used: u64::MAX,
    };
    assert_eq!(round_trip(&marshaller, &transient_mortal), transient_mortal);

    let with_metadata = MetadataImmortalCacheEntry {
        key: Box::new("k".to_string()),
        value: Box::new(true),
        metadata: EmbeddedMetadata::new(-1, -1).with_version(NumericVersion::new(7)),
    };
    assert_eq!(round_trip(&marshaller, &with_metadata), with_metadata);
}

#[test]
fn test_cache_values_round_trip() {
    let marshaller = default_marshaller();

    let immortal = ImmortalCacheValue {
        value: Box::new(1i32),
    };
    assert_eq!(round_trip(&marshaller, &immortal), immortal);

    let mortal = MortalCacheValue {
        value: Box::new(1i32),
        lifespan: 10,
        created: 20,
    };
    assert_eq!(round_trip(&marshaller, &mortal), mortal);

    let transient = TransientCacheValue {
        value: Box::new(1i32),
        max_idle: 30,
        last_used: 40,
    };
    assert_eq!(round_trip(&marshaller, &transient), transient);

    let transient_mortal = TransientMortalCacheValue {
        value: Box::new(1i32),
        lifespan: 1,
        max_idle: 2,
        created: 3,
        last_used: 4,
    };
    assert_eq!(round_trip(&marshaller, &transient_mortal), transient_mortal);
}

#[test]
fn test_versions_round_trip() {
    let marshaller = default_marshaller();
    let clustered = SimpleClusteredVersion {
        topology_id: 4,
        version: 99,
    };
    assert_eq!(round_trip(&marshaller, &clustered), clustered);

    let metadata = EmbeddedMetadata::new(1000, 500).with_version(clustered);
    assert_eq!(round_trip(&marshaller, &metadata), metadata);
    assert!(round_trip(&marshaller, &EmbeddedMetadata::new(0, 0)).version.is_none());
}

// ========== Remoting ==========

#[test]
fn test_addresses_round_trip() {
    let marshaller = default_marshaller();
    let node = address(77);
    assert_eq!(round_trip(&marshaller, &node), node);

    let topology_aware = TopologyAwareAddress {
        uuid: Uuid::from_u128(5),
        site_id: Some("eu".to_string()),
        rack_id: None,
        machine_id: Some("m1".to_string()),
    };
    assert_eq!(round_trip(&marshaller, &topology_aware), topology_aware);
}

#[test]
fn test_responses_round_trip() {
    let marshaller = default_marshaller();

    let success = SuccessfulResponse::with_value(KeyValuePair::new(1i32, 2i32));
    assert_eq!(round_trip(&marshaller, &success), success);
    assert_eq!(
        round_trip(&marshaller, &SuccessfulResponse::empty()),
        SuccessfulResponse::empty()
    );

    assert_eq!(round_trip(&marshaller, &UnsuccessfulResponse), UnsuccessfulResponse);
    assert_eq!(round_trip(&marshaller, &UnsureResponse), UnsureResponse);
    assert_eq!(round_trip(&marshaller, &CacheNotFoundResponse), CacheNotFoundResponse);

    let bytes = marshaller.to_bytes(&UnsureResponse).unwrap();
    assert_eq!(bytes, vec![TAG_INTERNAL, ids::UNSURE_RESPONSE]);

    let exception = ExceptionResponse {
        message: "lock timeout".to_string(),
    };
    assert_eq!(round_trip(&marshaller, &exception), exception);
}

// ========== Distribution ==========

#[test]
fn test_consistent_hashes_round_trip() {
    let marshaller = default_marshaller();
    let members = vec![address(1), address(2), address(3)];

    let default_ch = DefaultConsistentHash {
        num_owners: 2,
        members: members.clone(),
        segment_owners: vec![vec![0, 1], vec![1, 2], vec![2, 0]],
    };
    let decoded = round_trip(&marshaller, &default_ch);
    assert_eq!(decoded, default_ch);
    assert_eq!(decoded.primary_owner(1), Some(&members[1]));

    let replicated = ReplicatedConsistentHash {
        members,
        primary_owners: vec![0, 1, 2, 0],
    };
    assert_eq!(round_trip(&marshaller, &replicated), replicated);
}

#[test]
fn test_cache_topology_round_trip() {
    let marshaller = default_marshaller();
    let ch = ReplicatedConsistentHash {
        members: vec![address(1)],
        primary_owners: vec![0],
    };
    let topology = CacheTopology {
        topology_id: 12,
        rebalance_id: 3,
        current_ch: Some(Box::new(ch.clone())),
        pending_ch: None,
    };
    let decoded = round_trip(&marshaller, &topology);
    assert_eq!(decoded, topology);
    assert!(!decoded.is_rebalancing());
}

#[test]
fn test_availability_modes_round_trip() {
    let marshaller = default_marshaller();
    for mode in [AvailabilityMode::Available, AvailabilityMode::DegradedMode] {
        assert_eq!(round_trip(&marshaller, &mode), mode);
    }
}

// ========== Commands, transactions, state transfer ==========

#[test]
fn test_every_flag_round_trips() {
    let marshaller = default_marshaller();
    for flag in Flag::ALL {
        assert_eq!(round_trip(&marshaller, &flag), flag);
    }
}

#[test]
fn test_global_transaction_decodes_as_remote() {
    let marshaller = default_marshaller();
    let tx = GlobalTransaction::new(address(9), 1234);
    assert!(!tx.remote);
    let decoded = round_trip(&marshaller, &tx);
    assert!(decoded.remote);
    assert_eq!(decoded.id, 1234);
    assert_eq!(decoded.address, Some(address(9)));
}

#[test]
fn test_state_chunk_round_trip() {
    let marshaller = default_marshaller();
    let chunk = StateChunk {
        segment_id: 17,
        cache_entries: vec![
            Box::new(ImmortalCacheEntry::new(1i32, "a".to_string())),
            Box::new(ImmortalCacheEntry::new(2i32, "b".to_string())),
        ],
        is_last_chunk: true,
    };
    assert_eq!(round_trip(&marshaller, &chunk), chunk);
}

// ========== Streams ==========

#[test]
fn test_several_values_in_one_stream() {
    let marshaller = default_marshaller();
    let mut out = BytesObjectOutput::default();
    marshaller.object_to_stream(&mut out, Some(&1i32)).unwrap();
    marshaller.object_to_stream(&mut out, None).unwrap();
    marshaller
        .object_to_stream(&mut out, Some(&"three".to_string()))
        .unwrap();
    let bytes = out.into_bytes();

    let mut input = BytesObjectInput::new(&bytes);
    let first = marshaller.object_from_stream(&mut input).unwrap();
    let second = marshaller.object_from_stream(&mut input).unwrap();
    let third = marshaller.object_from_stream(&mut input).unwrap();
    assert_eq!(first, Some(Box::new(1i32) as Object));
    assert!(second.is_none());
    assert_eq!(third, Some(Box::new("three".to_string()) as Object));
    assert_eq!(input.position(), bytes.len());
}

#[test]
fn test_object_from_slice() {
    let marshaller = default_marshaller();
    let encoded = marshaller.to_bytes(&7i64).unwrap();
    let mut framed = vec![0xFF, 0xFF];
    framed.extend_from_slice(&encoded);
    framed.push(0xFF);
    let decoded = marshaller
        .object_from_slice(&framed, 2, encoded.len())
        .unwrap();
    assert_eq!(decoded, Some(Box::new(7i64) as Object));
}

#[test]
fn test_object_to_buffer_matches_bytes() {
    let marshaller = default_marshaller();
    let buffer = marshaller.object_to_buffer(Some(&3i16)).unwrap();
    assert_eq!(&buffer[..], &marshaller.to_bytes(&3i16).unwrap()[..]);
}
