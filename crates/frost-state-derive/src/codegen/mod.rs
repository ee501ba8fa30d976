//! Code generation for the State derive macro.

mod lens;
mod state_impl;

use crate::parse::{FieldInput, RecordInput};
use darling::FromDeriveInput;
use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

/// Main entry point for code generation.
pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = RecordInput::from_derive_input(input)
        .map_err(|e| syn::Error::new_spanned(input, e.to_string()))?;

    if !parsed.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &parsed.generics,
            "#[derive(State)] does not support generic structs; \
             a record's shape must be known without type parameters.",
        ));
    }

    let fields: Vec<&FieldInput> = parsed.fields().into_iter().filter(|f| !f.skip).collect();
    validate_keys(&fields)?;

    let lens = lens::generate(&parsed, &fields);
    let state = state_impl::generate(&parsed, &fields);

    Ok(quote! {
        #lens
        #state
    })
}

/// Reject keys the path syntax cannot address, and duplicates.
fn validate_keys(fields: &[&FieldInput]) -> syn::Result<()> {
    for (i, field) in fields.iter().enumerate() {
        let key = field.key();
        let problem = if key.is_empty() {
            Some("field name must not be empty".to_string())
        } else if key == "$" {
            Some("`$` designates the state root and cannot name a field".to_string())
        } else if key.contains('.') {
            Some(format!("field name `{key}` must not contain `.`"))
        } else if fields[..i].iter().any(|f| f.key() == key) {
            Some(format!("field name `{key}` is used twice"))
        } else {
            None
        };
        if let Some(message) = problem {
            return Err(syn::Error::new_spanned(field.ident(), message));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand_err(input: DeriveInput) -> String {
        expand(&input).unwrap_err().to_string()
    }

    #[test]
    fn test_rejects_generics() {
        let err = expand_err(parse_quote! {
            struct Wrapper<T> {
                inner: T,
            }
        });
        assert!(err.contains("generic"));
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let err = expand_err(parse_quote! {
            struct Player {
                #[frost(rename = "name")]
                first: String,
                name: String,
            }
        });
        assert!(err.contains("used twice"));
    }

    #[test]
    fn test_rejects_unaddressable_keys() {
        let err = expand_err(parse_quote! {
            struct Player {
                #[frost(rename = "a.b")]
                first: String,
            }
        });
        assert!(err.contains("must not contain"));

        let err = expand_err(parse_quote! {
            struct Player {
                #[frost(rename = "$")]
                first: String,
            }
        });
        assert!(err.contains("state root"));
    }

    #[test]
    fn test_skipped_fields_may_share_keys() {
        let input: DeriveInput = parse_quote! {
            struct Player {
                name: String,
                #[frost(skip, rename = "name")]
                cache: String,
            }
        };
        assert!(expand(&input).is_ok());
    }

    #[test]
    fn test_generates_lens_and_impl() {
        let input: DeriveInput = parse_quote! {
            pub struct Game {
                score: i64,
            }
        };
        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("GameLens"));
        assert!(tokens.contains("impl :: frost_state :: State for Game"));
    }
}
