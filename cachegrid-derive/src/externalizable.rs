//! Derive macro implementation for `Externalizable`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, Type};

use crate::attrs::has_skip_attr;

pub fn derive_externalizable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Externalizable only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Externalizable can only be derived for structs",
            ))
        }
    };

    let mut write_stmts = Vec::new();
    let mut field_inits = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };

        if has_skip_attr(&field.attrs)? {
            field_inits.push(quote! { #field_ident: ::core::default::Default::default() });
            continue;
        }

        write_stmts.push(write_stmt(field_ident, &field.ty));
        let read = read_expr(&field.ty);
        field_inits.push(quote! { #field_ident: #read });
    }

    Ok(quote! {
        impl #impl_generics ::cachegrid_core::serialization::Externalizable
            for #name #ty_generics #where_clause
        {
            fn write_external(
                &self,
                output: &mut dyn ::cachegrid_core::serialization::ObjectOutput,
            ) -> ::cachegrid_core::Result<()> {
                #[allow(unused_imports)]
                use ::cachegrid_core::serialization::DataOutput as _;
                #(#write_stmts)*
                Ok(())
            }

            fn read_external(
                input: &mut dyn ::cachegrid_core::serialization::ObjectInput,
            ) -> ::cachegrid_core::Result<Self> {
                #[allow(unused_imports)]
                use ::cachegrid_core::serialization::DataInput as _;
                Ok(Self {
                    #(#field_inits,)*
                })
            }
        }
    })
}

fn type_to_string(ty: &Type) -> String {
    quote!(#ty).to_string().replace(' ', "")
}

fn write_stmt(field_ident: &Ident, field_ty: &Type) -> TokenStream2 {
    match type_to_string(field_ty).as_str() {
        "bool" => quote! { output.write_bool(self.#field_ident)?; },
        "i8" => quote! { output.write_byte(self.#field_ident)?; },
        "i16" => quote! { output.write_short(self.#field_ident)?; },
        "i32" => quote! { output.write_int(self.#field_ident)?; },
        "i64" => quote! { output.write_long(self.#field_ident)?; },
        "f32" => quote! { output.write_float(self.#field_ident)?; },
        "f64" => quote! { output.write_double(self.#field_ident)?; },
        "char" => quote! { output.write_char(self.#field_ident)?; },
        "String" => quote! { output.write_string(&self.#field_ident)?; },
        s if s.starts_with("Option<") => quote! {
            output.write_object(
                self.#field_ident
                    .as_ref()
                    .map(|v| v as &dyn ::cachegrid_core::serialization::Marshallable),
            )?;
        },
        _ => quote! {
            output.write_object(Some(
                &self.#field_ident as &dyn ::cachegrid_core::serialization::Marshallable,
            ))?;
        },
    }
}

fn read_expr(field_ty: &Type) -> TokenStream2 {
    match type_to_string(field_ty).as_str() {
        "bool" => quote! { input.read_bool()? },
        "i8" => quote! { input.read_byte()? },
        "i16" => quote! { input.read_short()? },
        "i32" => quote! { input.read_int()? },
        "i64" => quote! { input.read_long()? },
        "f32" => quote! { input.read_float()? },
        "f64" => quote! { input.read_double()? },
        "char" => quote! { input.read_char()? },
        "String" => quote! { input.read_string()? },
        s if s.starts_with("Option<") => quote! {
            ::cachegrid_core::serialization::read_optional_typed(&mut *input)?
        },
        _ => quote! {
            ::cachegrid_core::serialization::read_typed::<#field_ty>(&mut *input)?
        },
    }
}
