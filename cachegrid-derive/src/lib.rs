//! Derive macros for cachegrid marshalling.
//!
//! This crate provides two derive macros:
//!
//! - [`Externalizable`] generates field-by-field `write_external` and
//!   `read_external` for a struct with named fields.
//! - [`SerializeWith`] marks a struct as an annotated type and names the
//!   externalizer that writes it.
//!
//! # Example
//!
//! ```ignore
//! use cachegrid_derive::{Externalizable, SerializeWith};
//!
//! #[derive(Debug, PartialEq, Externalizable, SerializeWith)]
//! #[marshall(name = "com.example.Person")]
//! struct Person {
//!     name: String,
//!     age: i32,
//!     email: Option<String>,
//!     #[marshall(skip)]
//!     cached_hash: u64,
//! }
//! ```

extern crate proc_macro;

mod attrs;
mod externalizable;
mod serialize_with;

use proc_macro::TokenStream;

/// Derives the `Externalizable` trait for a struct.
///
/// # Attributes
///
/// ## Field-level
/// - `#[marshall(skip)]` skips the field. It is restored with `Default`.
///
/// # Field Types
///
/// `bool`, `i8`, `i16`, `i32`, `i64`, `f32`, `f64`, `char` and `String` are
/// written with the primitive writers. `Option<T>` is written as a nullable
/// object. Any other type is written as an object and must be marshallable
/// on its own.
#[proc_macro_derive(Externalizable, attributes(marshall))]
pub fn derive_externalizable(input: TokenStream) -> TokenStream {
    externalizable::derive_externalizable_impl(input)
}

/// Derives the `SerializeWith` trait for a struct.
///
/// # Attributes
///
/// ## Struct-level
/// - `#[marshall(externalizer = Type)]` sets the externalizer. The default
///   is `FieldsExternalizer<Self>`, which needs `Externalizable`.
/// - `#[marshall(name = "...")]` sets the name written on the wire
///   (defaults to the type name of the externalizer).
#[proc_macro_derive(SerializeWith, attributes(marshall))]
pub fn derive_serialize_with(input: TokenStream) -> TokenStream {
    serialize_with::derive_serialize_with_impl(input)
}
