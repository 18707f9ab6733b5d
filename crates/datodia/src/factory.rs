//! Builder capability and the type-erased factories stored in a container.

use std::any::Any;

use crate::error::{Error, Result};

/// Number of elements `create_many` produces unless configured otherwise.
pub const DEFAULT_REPEAT_COUNT: usize = 3;

/// Something that can create instances of arbitrary registered types.
///
/// Implemented by the generated `Container`. Builders receive it so they can
/// create the values their own type is made of.
pub trait Create {
    /// Create an instance of `T`.
    fn create<T: 'static>(&self) -> Result<T>;

    /// Create several instances of `T`.
    fn create_many<T: 'static>(&self) -> Result<Vec<T>>;
}

/// A value capable of producing instances of `T` on demand.
///
/// Implementations discovered by the generator must also be marked with
/// [`type_builder`](crate::type_builder) and implement `Default`, since the
/// container constructs one instance of every builder lazily.
pub trait TypeBuilder<T> {
    /// Create a new `T`, using `container` for any values it depends on.
    fn create<C: Create>(&self, container: &C) -> Result<T>;
}

/// Type-erased factory stored in a container's dispatch table.
pub type Factory<C> = Box<dyn Fn(&C) -> Result<Box<dyn Any>> + Send + Sync>;

/// Erase a typed builder function into a [`Factory`].
pub fn factory<C, T, F>(builder: F) -> Factory<C>
where
    C: 'static,
    T: Any,
    F: Fn(&C) -> Result<T> + Send + Sync + 'static,
{
    Box::new(move |container: &C| builder(container).map(|value| Box::new(value) as Box<dyn Any>))
}

/// Recover the typed value produced by a [`Factory`].
pub fn downcast<T: Any>(value: Box<dyn Any>) -> Result<T> {
    value
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| Error::TypeMismatch {
            type_name: std::any::type_name::<T>(),
        })
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;
    use std::collections::HashMap;

    use super::*;

    struct Registry {
        factories: HashMap<TypeId, Factory<Registry>>,
    }

    impl Create for Registry {
        fn create<T: 'static>(&self) -> Result<T> {
            match self.factories.get(&TypeId::of::<T>()) {
                Some(builder) => downcast(builder(self)?),
                None => Err(Error::not_registered::<T>()),
            }
        }

        fn create_many<T: 'static>(&self) -> Result<Vec<T>> {
            (0..DEFAULT_REPEAT_COUNT).map(|_| self.create()).collect()
        }
    }

    struct Pair(u8, u8);

    #[derive(Default)]
    struct PairBuilder;

    impl TypeBuilder<Pair> for PairBuilder {
        fn create<C: Create>(&self, container: &C) -> Result<Pair> {
            Ok(Pair(container.create()?, container.create()?))
        }
    }

    fn registry() -> Registry {
        let mut factories: HashMap<TypeId, Factory<Registry>> = HashMap::new();
        factories.insert(TypeId::of::<u8>(), factory(|_: &Registry| Ok(7u8)));
        factories.insert(
            TypeId::of::<Pair>(),
            factory(|registry: &Registry| PairBuilder.create(registry)),
        );
        Registry { factories }
    }

    #[test]
    fn test_builder_recurses_into_container() {
        let pair: Pair = registry().create().unwrap();
        assert_eq!((pair.0, pair.1), (7, 7));
    }

    #[test]
    fn test_create_many_uses_default_repeat_count() {
        let values: Vec<u8> = registry().create_many().unwrap();
        assert_eq!(values, vec![7, 7, 7]);
    }

    #[test]
    fn test_missing_factory_is_not_registered() {
        let result = registry().create::<String>();
        assert!(matches!(result, Err(Error::NotRegistered { .. })));
    }

    #[test]
    fn test_downcast_reports_type_mismatch() {
        let value: Box<dyn Any> = Box::new(1u32);
        let result = downcast::<u8>(value);

        assert!(matches!(
            result,
            Err(Error::TypeMismatch { type_name: "u8" })
        ));
    }
}
