//! Types that name their own externalizer.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use super::class_map::IdentityTypeMap;
use super::externalizer::Externalizer;
use super::object::Marshallable;
use crate::error::{CacheGridError, Result};

/// A type that declares which externalizer writes it.
///
/// The externalizer is created from [`Default`] for every call and is
/// referenced on the wire by [`externalizer_name`](Self::externalizer_name),
/// so the name must be the same on every member.
pub trait SerializeWith: Marshallable {
    /// The externalizer for this type.
    type Externalizer: Externalizer + Default;

    /// Name written on the wire to identify the externalizer.
    fn externalizer_name() -> &'static str {
        std::any::type_name::<Self::Externalizer>()
    }
}

/// An annotated type as registered in configuration.
#[derive(Clone, Copy)]
pub struct AnnotatedRegistration {
    type_id: TypeId,
    type_name: &'static str,
    name: &'static str,
    factory: fn() -> Box<dyn Externalizer>,
}

impl AnnotatedRegistration {
    /// Creates the registration for `T`.
    pub fn of<T: SerializeWith>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: T::externalizer_name(),
            factory: instantiate_default::<T::Externalizer>,
        }
    }

    /// The annotated type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The externalizer name written on the wire.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Creates a fresh externalizer.
    pub fn instantiate(&self) -> Box<dyn Externalizer> {
        (self.factory)()
    }
}

fn instantiate_default<E: Externalizer + Default>() -> Box<dyn Externalizer> {
    Box::new(E::default())
}

impl fmt::Debug for AnnotatedRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotatedRegistration")
            .field("type", &self.type_name)
            .field("name", &self.name)
            .finish()
    }
}

/// Lookup tables for annotated types, by type for writing and by
/// externalizer name for reading.
#[derive(Debug)]
pub struct AnnotatedExternalizers {
    by_type: IdentityTypeMap<AnnotatedRegistration>,
    by_name: HashMap<&'static str, AnnotatedRegistration>,
}

impl AnnotatedExternalizers {
    /// Builds the tables. Two registrations sharing a name must use the
    /// same externalizer implementation.
    pub fn load(registrations: &[AnnotatedRegistration]) -> Result<Self> {
        let mut by_type = IdentityTypeMap::new();
        let mut by_name: HashMap<&'static str, AnnotatedRegistration> = HashMap::new();

        for registration in registrations {
            if let Some(existing) = by_name.get(registration.name) {
                let same = existing.instantiate().implementation_id()
                    == registration.instantiate().implementation_id();
                if !same {
                    return Err(CacheGridError::Configuration(format!(
                        "externalizer name {} is used by both {} and {}",
                        registration.name, existing.type_name, registration.type_name
                    )));
                }
            } else {
                by_name.insert(registration.name, *registration);
            }
            by_type.put(registration.type_id, *registration);
        }

        Ok(Self { by_type, by_name })
    }

    /// Looks up the registration for a type.
    pub fn for_type(&self, type_id: TypeId) -> Option<&AnnotatedRegistration> {
        self.by_type.get(type_id)
    }

    /// Looks up a registration by externalizer name.
    pub fn for_name(&self, name: &str) -> Option<&AnnotatedRegistration> {
        self.by_name.get(name)
    }

    /// Number of annotated types.
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Returns true if no type is annotated.
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{FieldsExternalizer, Object, ObjectInput, ObjectOutput};
    use crate::serialization::Externalizable;

    #[derive(Debug, PartialEq)]
    struct Celsius(f64);

    impl Externalizable for Celsius {
        fn write_external(&self, output: &mut dyn ObjectOutput) -> Result<()> {
            output.write_double(self.0)
        }

        fn read_external(input: &mut dyn ObjectInput) -> Result<Self> {
            Ok(Celsius(input.read_double()?))
        }
    }

    impl SerializeWith for Celsius {
        type Externalizer = FieldsExternalizer<Celsius>;

        fn externalizer_name() -> &'static str {
            "temperature.celsius"
        }
    }

    #[derive(Debug, PartialEq)]
    struct Kelvin(f64);

    #[derive(Default)]
    struct KelvinExternalizer;

    impl Externalizer for KelvinExternalizer {
        fn type_ids(&self) -> Vec<TypeId> {
            vec![TypeId::of::<Kelvin>()]
        }

        fn write_object(&self, _: &mut dyn ObjectOutput, _: &dyn Marshallable) -> Result<()> {
            Ok(())
        }

        fn read_object(&self, _: &mut dyn ObjectInput) -> Result<Object> {
            Ok(Box::new(Kelvin(0.0)))
        }
    }

    impl SerializeWith for Kelvin {
        type Externalizer = KelvinExternalizer;

        fn externalizer_name() -> &'static str {
            "temperature.celsius"
        }
    }

    #[test]
    fn test_lookup_by_type_and_name() {
        let tables = AnnotatedExternalizers::load(&[AnnotatedRegistration::of::<Celsius>()]).unwrap();
        assert_eq!(tables.len(), 1);
        let by_type = tables.for_type(TypeId::of::<Celsius>()).unwrap();
        assert_eq!(by_type.name(), "temperature.celsius");
        let by_name = tables.for_name("temperature.celsius").unwrap();
        assert_eq!(by_name.type_id(), TypeId::of::<Celsius>());
        assert!(tables.for_name("missing").is_none());
    }

    #[test]
    fn test_instantiate_creates_the_declared_externalizer() {
        let registration = AnnotatedRegistration::of::<Celsius>();
        let externalizer = registration.instantiate();
        assert_eq!(externalizer.type_ids(), vec![TypeId::of::<Celsius>()]);
    }

    #[test]
    fn test_name_clash_rejected() {
        let result = AnnotatedExternalizers::load(&[
            AnnotatedRegistration::of::<Celsius>(),
            AnnotatedRegistration::of::<Kelvin>(),
        ]);
        assert!(result.unwrap_err().is_configuration_error());
    }
}
