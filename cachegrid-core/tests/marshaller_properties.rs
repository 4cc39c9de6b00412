//! Property tests for the global marshaller.

mod common;

use cachegrid_core::serialization::Object;
use cachegrid_core::GlobalMarshaller;
use proptest::prelude::*;

use common::default_marshaller;

fn check_round_trip<T>(marshaller: &GlobalMarshaller, value: T) -> Result<(), TestCaseError>
where
    T: cachegrid_core::Marshallable + PartialEq,
{
    let bytes = marshaller
        .to_bytes(&value)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let decoded: T = marshaller
        .from_bytes(&bytes)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(decoded, value);
    Ok(())
}

fn bmp_char() -> impl Strategy<Value = char> {
    any::<char>().prop_filter("outside the basic multilingual plane", |c| (*c as u32) <= 0xFFFF)
}

proptest! {
    #[test]
    fn prop_strings_round_trip(s in ".*") {
        check_round_trip(&default_marshaller(), s)?;
    }

    #[test]
    fn prop_longs_round_trip(v in any::<i64>()) {
        check_round_trip(&default_marshaller(), v)?;
    }

    #[test]
    fn prop_doubles_keep_their_bits(v in any::<f64>()) {
        let marshaller = default_marshaller();
        let decoded: f64 = marshaller.from_bytes(&marshaller.to_bytes(&v).unwrap()).unwrap();
        prop_assert_eq!(decoded.to_bits(), v.to_bits());
    }

    #[test]
    fn prop_chars_round_trip(c in bmp_char()) {
        check_round_trip(&default_marshaller(), c)?;
    }

    #[test]
    fn prop_byte_arrays_round_trip(v in prop::collection::vec(any::<u8>(), 0..70_000)) {
        check_round_trip(&default_marshaller(), v)?;
    }

    #[test]
    fn prop_boolean_arrays_round_trip(v in prop::collection::vec(any::<bool>(), 0..600)) {
        check_round_trip(&default_marshaller(), v)?;
    }

    #[test]
    fn prop_int_arrays_round_trip(v in prop::collection::vec(any::<i32>(), 0..1_000)) {
        check_round_trip(&default_marshaller(), v)?;
    }

    #[test]
    fn prop_object_lists_round_trip(items in prop::collection::vec(any::<i32>(), 0..50)) {
        let marshaller = default_marshaller();
        let list: Vec<Object> = items.into_iter().map(|i| Box::new(i) as Object).collect();
        let decoded: Vec<Object> = marshaller.from_bytes(&marshaller.to_bytes(&list).unwrap()).unwrap();
        prop_assert_eq!(decoded, list);
    }

    #[test]
    fn prop_arbitrary_input_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = default_marshaller().object_from_bytes(&bytes);
    }

    #[test]
    fn prop_truncated_input_is_an_error(s in "[a-z]{1,100}", cut in 1usize..100) {
        let marshaller = default_marshaller();
        let bytes = marshaller.to_bytes(&s).unwrap();
        let cut = cut.min(bytes.len() - 1);
        let result = marshaller.object_from_bytes(&bytes[..cut]);
        prop_assert!(result.is_err());
    }
}
