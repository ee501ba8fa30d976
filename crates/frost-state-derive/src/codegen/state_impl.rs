//! `State` trait implementation.
//!
//! The record shape is built on first use and cached for the life of the
//! program, so every value of the type shares one `Arc<Shape>`.

use crate::parse::{FieldInput, RecordInput};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Generate `impl State` for the struct.
pub fn generate(input: &RecordInput, fields: &[&FieldInput]) -> TokenStream {
    let struct_name = &input.ident;
    let lens_name = format_ident!("{}Lens", struct_name);
    let shape_name = input.shape_name();
    let expected = format!("record {shape_name}");

    let shape_fields = fields.iter().map(|f| {
        let key = f.key();
        let ty = &f.ty;
        quote! { .field(#key, <#ty as ::frost_state::State>::kind()) }
    });

    let to_values = fields.iter().map(|f| {
        let ident = f.ident();
        quote! { ::frost_state::State::to_value(&self.#ident) }
    });

    let from_values = input.fields().into_iter().map(|f| {
        let ident = f.ident();
        if f.skip {
            return quote! { #ident: ::core::default::Default::default() };
        }
        let idx = fields
            .iter()
            .position(|g| g.ident() == ident)
            .unwrap_or_default();
        let key = f.key();
        let ty = &f.ty;
        quote! {
            #ident: <#ty as ::frost_state::State>::from_value(&values[#idx]).map_err(|e| {
                e.with_prefix(&::frost_state::Path::root().key(#key))
            })?
        }
    });

    let values_binding = if fields.is_empty() {
        quote! { let _ = record; }
    } else {
        quote! { let values = record.values(); }
    };

    quote! {
        const _: () = {
            fn shape() -> &'static ::std::sync::Arc<::frost_state::Shape> {
                static SHAPE: ::std::sync::OnceLock<::std::sync::Arc<::frost_state::Shape>> =
                    ::std::sync::OnceLock::new();
                SHAPE.get_or_init(|| {
                    ::frost_state::Shape::builder(#shape_name)
                        #(#shape_fields)*
                        .build_unchecked()
                })
            }

            impl ::frost_state::State for #struct_name {
                type Focused<__S> = #lens_name<__S>;

                fn kind() -> ::frost_state::Kind {
                    ::frost_state::Kind::Record(::std::sync::Arc::clone(shape()))
                }

                fn to_value(&self) -> ::frost_state::Value {
                    ::frost_state::Value::Record(::frost_state::Record::from_parts(
                        ::std::sync::Arc::clone(shape()),
                        ::std::vec![#(#to_values),*],
                    ))
                }

                fn from_value(value: &::frost_state::Value) -> ::frost_state::FrostResult<Self> {
                    let record = match value {
                        ::frost_state::Value::Record(record) if shape().accepts(record.shape()) => record,
                        other => {
                            return ::core::result::Result::Err(::frost_state::FrostError::type_mismatch(
                                ::frost_state::Path::root(),
                                #expected,
                                other.type_name(),
                            ));
                        }
                    };
                    #values_binding
                    ::core::result::Result::Ok(Self {
                        #(#from_values),*
                    })
                }

                fn focus<__S>(lens: ::frost_state::Lens<__S, Self>) -> #lens_name<__S> {
                    #lens_name { lens }
                }
            }
        };
    }
}
