//! Datodia: test fixtures for Rust, built at compile time.
//!
//! This crate is the runtime half of Datodia. The generator
//! (`datodia-codegen`) scans a crate's sources from a build script and emits a
//! `Container` that knows how to build:
//! - **Primitives**: `String`, `bool` and [`Uuid`] out of the box
//! - **Records**: every plain data struct (all fields visible to the crate)
//! - **Custom types**: any struct marked with [`type_builder`] that implements
//!   [`TypeBuilder`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! // build.rs
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     datodia_codegen::configure().compile("src")?;
//!     Ok(())
//! }
//!
//! // src/lib.rs
//! include!(concat!(env!("OUT_DIR"), "/datodia.rs"));
//!
//! pub struct City {
//!     pub zip_code: i32,
//!     pub name: String,
//! }
//!
//! // tests
//! let container = Container::new();
//! let city: City = container.create()?;
//! ```
//!
//! # Custom Builders
//!
//! ```rust,ignore
//! use datodia::prelude::*;
//!
//! #[type_builder]
//! #[derive(Default)]
//! pub struct PortTypeBuilder;
//!
//! impl TypeBuilder<u16> for PortTypeBuilder {
//!     fn create<C: Create>(&self, _container: &C) -> Result<u16> {
//!         Ok(8080)
//!     }
//! }
//! ```

pub use datodia_macros::type_builder;
pub use uuid::Uuid;

pub mod builders;
mod error;
mod factory;

pub use error::{Error, Result};
pub use factory::{Create, DEFAULT_REPEAT_COUNT, Factory, TypeBuilder, downcast, factory};

pub mod prelude {
    //! Common imports for custom type builders.
    //!
    //! ```rust,ignore
    //! use datodia::prelude::*;
    //! ```

    pub use crate::type_builder;
    pub use crate::{Create, Error, Result, TypeBuilder};
}
