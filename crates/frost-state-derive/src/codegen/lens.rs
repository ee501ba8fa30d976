//! Record lens generation.
//!
//! For `struct Game` this produces `GameLens<S>`, a typed path from a root
//! `S` to a `Game`, with one method per field. Each method returns the
//! field type's own lens, so record lenses nest.

use crate::parse::{FieldInput, RecordInput};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Generate the lens struct and its `Focus` implementation.
pub fn generate(input: &RecordInput, fields: &[&FieldInput]) -> TokenStream {
    let struct_name = &input.ident;
    let lens_name = format_ident!("{}Lens", struct_name);
    let vis = &input.vis;
    let struct_doc = format!("Typed lens into [`{struct_name}`].");

    let methods = fields.iter().map(|f| {
        let ident = f.ident();
        let ty = &f.ty;
        let key = f.key();
        let doc = format!("Lens to the `{key}` field.");
        quote! {
            #[doc = #doc]
            pub fn #ident(&self) -> <#ty as ::frost_state::State>::Focused<__S> {
                <#ty as ::frost_state::State>::focus(self.lens.field::<#ty>(#key))
            }
        }
    });

    quote! {
        #[doc = #struct_doc]
        #vis struct #lens_name<__S> {
            lens: ::frost_state::Lens<__S, #struct_name>,
        }

        impl<__S> #lens_name<__S> {
            #(#methods)*
        }

        impl<__S> ::frost_state::Focus<__S> for #lens_name<__S> {
            type Target = #struct_name;

            fn path(&self) -> &::frost_state::Path {
                self.lens.path()
            }
        }

        impl<__S> ::core::clone::Clone for #lens_name<__S> {
            fn clone(&self) -> Self {
                Self { lens: self.lens.clone() }
            }
        }

        impl<__S> ::core::fmt::Debug for #lens_name<__S> {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_tuple(::core::stringify!(#lens_name))
                    .field(self.lens.path())
                    .finish()
            }
        }

        impl<__S> ::core::convert::From<#lens_name<__S>> for ::frost_state::Lens<__S, #struct_name> {
            fn from(lens: #lens_name<__S>) -> Self {
                lens.lens
            }
        }
    }
}
