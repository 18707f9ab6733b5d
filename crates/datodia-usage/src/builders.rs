//! Hand-written builders for types without a built-in one.

use std::sync::atomic::{AtomicI32, Ordering};

use datodia::{Create, Result, TypeBuilder, type_builder};

/// Builds increasing integers, starting at 1.
#[type_builder]
#[derive(Debug, Default)]
pub struct I32TypeBuilder {
    last: AtomicI32,
}

impl TypeBuilder<i32> for I32TypeBuilder {
    fn create<C: Create>(&self, _container: &C) -> Result<i32> {
        Ok(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

pub mod pairs {
    use datodia::prelude::*;

    /// Builds pairs out of two integers from the container.
    #[type_builder]
    #[derive(Debug, Default)]
    pub struct PairTypeBuilder;

    impl TypeBuilder<(i32, i32)> for PairTypeBuilder {
        fn create<C: Create>(&self, container: &C) -> Result<(i32, i32)> {
            Ok((container.create()?, container.create()?))
        }
    }
}
