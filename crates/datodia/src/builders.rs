//! Built-in builders registered in every generated container.

use uuid::Uuid;

use crate::error::Result;
use crate::factory::{Create, TypeBuilder};

/// Builds random strings (a hyphenated v4 UUID).
#[derive(Debug, Default, Clone, Copy)]
pub struct StringTypeBuilder;

impl TypeBuilder<String> for StringTypeBuilder {
    fn create<C: Create>(&self, _container: &C) -> Result<String> {
        Ok(Uuid::new_v4().to_string())
    }
}

/// Builds random v4 [`Uuid`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTypeBuilder;

impl TypeBuilder<Uuid> for UuidTypeBuilder {
    fn create<C: Create>(&self, _container: &C) -> Result<Uuid> {
        Ok(Uuid::new_v4())
    }
}

/// Builds random booleans.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolTypeBuilder;

impl TypeBuilder<bool> for BoolTypeBuilder {
    fn create<C: Create>(&self, _container: &C) -> Result<bool> {
        Ok(rand::random())
    }
}
