//! Procedural macros for the datodia fixture container.
//!
//! This crate provides the `#[datodia::type_builder]` marker attribute. The
//! attribute has no effect on compilation; `datodia-codegen` reads it from the
//! source files with `syn` to discover user-authored builders.

use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

/// Marks a struct as a type builder the generated container must register.
///
/// The struct must implement `datodia::TypeBuilder<T>` for exactly one `T`
/// and `Default`.
///
/// # Example
///
/// ```rust,ignore
/// use datodia::prelude::*;
///
/// #[type_builder]
/// #[derive(Default)]
/// pub struct PortTypeBuilder;
///
/// impl TypeBuilder<u16> for PortTypeBuilder {
///     fn create<C: Create>(&self, _container: &C) -> Result<u16> {
///         Ok(8080)
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn type_builder(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = proc_macro2::TokenStream::from(attr);
    if !attr.is_empty() {
        return syn::Error::new_spanned(attr, "`type_builder` takes no arguments")
            .to_compile_error()
            .into();
    }

    // Only structs can be registered; anything else is rejected here rather
    // than silently ignored by the generator.
    let input = parse_macro_input!(item as ItemStruct);

    TokenStream::from(quote! { #input })
}
