//! Derive macro implementation for `SerializeWith`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use crate::attrs::parse_struct_attrs;

pub fn derive_serialize_with_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let attrs = match parse_struct_attrs(&input.attrs) {
        Ok(attrs) => attrs,
        Err(err) => return err.into_compile_error().into(),
    };

    let externalizer = match attrs.externalizer {
        Some(ty) => quote! { #ty },
        None => quote! { ::cachegrid_core::serialization::FieldsExternalizer<Self> },
    };

    let name_fn = attrs.name.map(|wire_name| {
        quote! {
            fn externalizer_name() -> &'static str {
                #wire_name
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::cachegrid_core::serialization::SerializeWith
            for #name #ty_generics #where_clause
        {
            type Externalizer = #externalizer;

            #name_fn
        }
    };

    TokenStream::from(expanded)
}
