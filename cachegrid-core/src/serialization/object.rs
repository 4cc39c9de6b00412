//! Dynamically typed values passed through the marshaller.

use std::any::{Any, TypeId};
use std::fmt::Debug;

use crate::error::{CacheGridError, Result};

/// A value the marshaller can be asked to encode.
///
/// Implemented for every `'static` type that is `Debug + PartialEq + Send +
/// Sync`. Whether a given type can actually be encoded depends on the
/// registered externalizers and the fallback marshaller.
pub trait Marshallable: Any + Debug + Send + Sync {
    /// Returns `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Converts a boxed value into a boxed `Any` for owned downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;

    /// Compares with another dynamically typed value.
    fn dyn_eq(&self, other: &dyn Marshallable) -> bool;

    /// Returns the name of the concrete type.
    fn type_name(&self) -> &'static str;
}

impl<T> Marshallable for T
where
    T: Any + Debug + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    fn dyn_eq(&self, other: &dyn Marshallable) -> bool {
        unwrap_boxed(other)
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl PartialEq for dyn Marshallable {
    fn eq(&self, other: &Self) -> bool {
        unwrap_boxed(self).dyn_eq(other)
    }
}

// Derived `PartialEq` on structs holding `Object` fields compares through
// `&Box<dyn Marshallable>`, which needs this impl (rust-lang/rust#31740).
impl PartialEq<&Self> for Box<dyn Marshallable> {
    fn eq(&self, other: &&Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

/// A decoded value of any marshallable type.
pub type Object = Box<dyn Marshallable>;

/// Strips any number of [`Object`] boxes wrapped around a value.
///
/// `Object` itself satisfies [`Marshallable`], so a boxed value can reach the
/// marshaller behind an extra layer of indirection.
pub fn unwrap_boxed(mut obj: &dyn Marshallable) -> &dyn Marshallable {
    while let Some(inner) = obj.as_any().downcast_ref::<Object>() {
        obj = inner.as_ref();
    }
    obj
}

/// Returns the `TypeId` of the concrete value behind `obj`.
pub fn concrete_type_id(obj: &dyn Marshallable) -> TypeId {
    unwrap_boxed(obj).as_any().type_id()
}

/// Boxes a value as an [`Object`].
pub fn object<T: Marshallable>(value: T) -> Object {
    Box::new(value)
}

/// Borrows `obj` as a `T`, failing with a serialization error otherwise.
pub fn expect_ref<T: Marshallable>(obj: &dyn Marshallable) -> Result<&T> {
    let obj = unwrap_boxed(obj);
    obj.as_any().downcast_ref::<T>().ok_or_else(|| {
        CacheGridError::Serialization(format!(
            "expected {}, got {}",
            std::any::type_name::<T>(),
            obj.type_name()
        ))
    })
}

/// Takes ownership of a decoded object as a `T`.
pub fn downcast<T: Marshallable>(obj: Object) -> Result<T> {
    let found = unwrap_boxed(obj.as_ref()).type_name();
    let mut any = obj.into_any();
    loop {
        match any.downcast::<T>() {
            Ok(value) => return Ok(*value),
            Err(other) => match other.downcast::<Object>() {
                Ok(inner) => any = (*inner).into_any(),
                Err(_) => {
                    return Err(CacheGridError::Deserialization(format!(
                        "expected {}, got {found}",
                        std::any::type_name::<T>()
                    )))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_dyn_eq_same_type() {
        let a: Object = object(Point { x: 1, y: 2 });
        let b: Object = object(Point { x: 1, y: 2 });
        let c: Object = object(Point { x: 1, y: 3 });
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_dyn_eq_different_types() {
        let a: Object = object(1i32);
        let b: Object = object(1i64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_structs_with_object_fields_compare() {
        use crate::serialization::KeyValuePair;

        let a = KeyValuePair::new(String::from("k"), 1i32);
        let b = KeyValuePair::new(String::from("k"), 1i32);
        let c = KeyValuePair::new(String::from("k"), 2i32);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, KeyValuePair::new(String::from("k"), 1i64));
    }

    #[test]
    fn test_unwrap_boxed() {
        let nested: Object = object(object(7i32));
        let inner = unwrap_boxed(nested.as_ref());
        assert_eq!(inner.as_any().downcast_ref::<i32>(), Some(&7));
        assert_eq!(concrete_type_id(nested.as_ref()), TypeId::of::<i32>());
    }

    #[test]
    fn test_nested_box_equals_plain() {
        let nested: Object = object(object(String::from("a")));
        let plain: Object = object(String::from("a"));
        assert_eq!(nested, plain);
        assert_eq!(plain, nested);
    }

    #[test]
    fn test_expect_ref() {
        let value: Object = object(Point { x: 3, y: 4 });
        let point = expect_ref::<Point>(value.as_ref()).unwrap();
        assert_eq!(point.x, 3);
        assert!(expect_ref::<String>(value.as_ref()).is_err());
    }

    #[test]
    fn test_downcast() {
        let value: Object = object(Point { x: 5, y: 6 });
        assert_eq!(downcast::<Point>(value).unwrap(), Point { x: 5, y: 6 });

        let wrong: Object = object(5u8);
        let err = downcast::<Point>(wrong).unwrap_err();
        assert!(err.to_string().contains("u8"));
    }

    #[test]
    fn test_downcast_through_box() {
        let nested: Object = object(object(9i64));
        assert_eq!(downcast::<i64>(nested).unwrap(), 9);
    }

    #[test]
    fn test_type_name() {
        let value: Object = object(String::new());
        assert_eq!(value.as_ref().type_name(), "alloc::string::String");
    }
}
