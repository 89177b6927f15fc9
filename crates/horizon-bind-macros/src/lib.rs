//! Procedural macros for Horizon Bind models.
//!
//! This crate provides `#[derive(IntoModel)]`, which turns a plain struct into
//! a `horizon_bind_core::Model` so it can be handed to the binder.
//!
//! # Attributes
//!
//! ## `#[model]`
//!
//! Field-level configuration:
//!
//! ```ignore
//! #[derive(IntoModel)]
//! struct Profile {
//!     #[model(rename = "display-name")]
//!     name: String,
//!
//!     age: u32,
//!
//!     #[model(skip)]
//!     cache: Vec<u8>,
//! }
//! ```
//!
//! Model attributes:
//! - `rename = "property"`: Uses a different property name on the model
//! - `skip`: Leaves the field out of the model
//!
//! Every other field must implement `Into<horizon_bind_core::Value>`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Expr, ExprLit, Field, Fields, Ident, Lit};

/// Derive `IntoModel`, `From<T> for Model` and `From<T> for Value`.
///
/// Fields become properties in declaration order.
///
/// # Example
///
/// ```ignore
/// use horizon_bind_core::{IntoModel, Value};
/// use horizon_bind_macros::IntoModel;
///
/// #[derive(IntoModel)]
/// struct Todo {
///     title: String,
///     done: bool,
/// }
///
/// let model = Todo { title: "write".into(), done: false }.into_model();
/// assert_eq!(model.get("title"), Some(Value::from("write")));
/// ```
#[proc_macro_derive(IntoModel, attributes(model))]
pub fn derive_into_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive_into_model(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// A field that becomes a model property.
struct ModelField {
    field_name: Ident,
    property_name: String,
}

fn impl_derive_into_model(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "IntoModel derive only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "IntoModel derive only supports structs",
            ))
        }
    };

    let mut model_fields = Vec::new();
    for field in fields.iter() {
        if let Some(info) = parse_model_field(field)? {
            model_fields.push(info);
        }
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let assignments = model_fields.iter().map(|f| {
        let field_name = &f.field_name;
        let property_name = &f.property_name;
        quote! {
            (
                #property_name,
                ::horizon_bind_core::Value::from(self.#field_name),
            )
        }
    });

    let count = model_fields.len();

    Ok(quote! {
        impl #impl_generics ::horizon_bind_core::IntoModel for #struct_name #ty_generics #where_clause {
            fn into_model(self) -> ::horizon_bind_core::Model {
                let pairs: [(&'static str, ::horizon_bind_core::Value); #count] = [
                    #(#assignments),*
                ];
                ::horizon_bind_core::Model::from_pairs(pairs)
            }
        }

        impl #impl_generics ::core::convert::From<#struct_name #ty_generics> for ::horizon_bind_core::Model #where_clause {
            fn from(value: #struct_name #ty_generics) -> Self {
                ::horizon_bind_core::IntoModel::into_model(value)
            }
        }

        impl #impl_generics ::core::convert::From<#struct_name #ty_generics> for ::horizon_bind_core::Value #where_clause {
            fn from(value: #struct_name #ty_generics) -> Self {
                ::horizon_bind_core::Value::Model(::horizon_bind_core::IntoModel::into_model(value))
            }
        }
    })
}

/// Parse the `#[model(...)]` attributes of one field.
///
/// Returns `None` for skipped fields.
fn parse_model_field(field: &Field) -> syn::Result<Option<ModelField>> {
    let field_name = match &field.ident {
        Some(name) => name.clone(),
        None => return Ok(None),
    };

    let mut rename = None;
    let mut skip = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("model") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: Expr = meta.value()?.parse()?;
                match value {
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(lit_str),
                        ..
                    }) => rename = Some(lit_str.value()),
                    other => {
                        return Err(syn::Error::new_spanned(
                            other,
                            "expected a string literal, e.g. rename = \"name\"",
                        ))
                    }
                }
            } else if meta.path.is_ident("skip") {
                skip = true;
            } else {
                return Err(meta.error("unknown model attribute; expected `rename` or `skip`"));
            }
            Ok(())
        })?;
    }

    if skip {
        return Ok(None);
    }

    // Raw identifiers keep their `r#` prefix in to_string().
    let property_name = rename.unwrap_or_else(|| {
        let name = field_name.to_string();
        name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
    });

    Ok(Some(ModelField {
        field_name,
        property_name,
    }))
}
