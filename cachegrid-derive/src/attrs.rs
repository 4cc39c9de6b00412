//! Parsing of `#[marshall(...)]` attributes.

use syn::{Attribute, LitStr, Type};

/// Struct-level settings.
#[derive(Default)]
pub struct StructAttrs {
    pub externalizer: Option<Type>,
    pub name: Option<String>,
}

pub fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut parsed = StructAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("marshall") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("externalizer") {
                parsed.externalizer = Some(meta.value()?.parse::<Type>()?);
                Ok(())
            } else if meta.path.is_ident("name") {
                parsed.name = Some(meta.value()?.parse::<LitStr>()?.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                Err(meta.error("`skip` is only allowed on fields"))
            } else {
                Err(meta.error("unknown marshall attribute"))
            }
        })?;
    }
    Ok(parsed)
}

pub fn has_skip_attr(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut found = false;
    for attr in attrs {
        if !attr.path().is_ident("marshall") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                found = true;
                Ok(())
            } else {
                Err(meta.error("unknown marshall field attribute"))
            }
        })?;
    }
    Ok(found)
}
