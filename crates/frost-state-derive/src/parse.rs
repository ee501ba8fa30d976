//! Parsing logic for the State derive macro.

use darling::{ast, FromDeriveInput, FromField};
use syn::{Generics, Ident, Type, Visibility};

/// Parsed struct-level options.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(frost), supports(struct_named))]
pub struct RecordInput {
    /// The struct identifier.
    pub ident: Ident,

    /// The struct visibility.
    pub vis: Visibility,

    /// Generic parameters. Records must not have any.
    pub generics: Generics,

    /// Struct data (fields).
    pub data: ast::Data<(), FieldInput>,

    /// Shape name, if it should differ from the struct name
    /// (e.g., `#[frost(name = "Player")]`).
    #[darling(default)]
    pub name: Option<String>,
}

impl RecordInput {
    /// Get the fields as a vector.
    pub fn fields(&self) -> Vec<&FieldInput> {
        self.data
            .as_ref()
            .take_struct()
            .map(|s| s.fields.to_vec())
            .unwrap_or_default()
    }

    /// Name of the generated shape.
    pub fn shape_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.ident.to_string())
    }
}

/// Parsed field-level options.
#[derive(Debug, FromField)]
#[darling(attributes(frost))]
pub struct FieldInput {
    /// Field identifier.
    pub ident: Option<Ident>,

    /// Field type.
    pub ty: Type,

    /// Name of the field in the state tree.
    #[darling(default)]
    pub rename: Option<String>,

    /// Leave the field out of the shape; restored from `Default`.
    #[darling(default)]
    pub skip: bool,
}

impl FieldInput {
    /// Get the field identifier.
    ///
    /// `supports(struct_named)` guarantees every field has one.
    pub fn ident(&self) -> &Ident {
        self.ident.as_ref().expect("named field required")
    }

    /// Get the key of this field in the state tree.
    pub fn key(&self) -> String {
        self.rename.clone().unwrap_or_else(|| {
            let ident = self.ident().to_string();
            ident.strip_prefix("r#").map(str::to_owned).unwrap_or(ident)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darling::FromDeriveInput;
    use syn::parse_quote;

    #[test]
    fn test_parse_basic_struct() {
        let input: syn::DeriveInput = parse_quote! {
            struct Player {
                first_name: String,
                age: u32,
            }
        };

        let parsed = RecordInput::from_derive_input(&input).unwrap();
        assert_eq!(parsed.shape_name(), "Player");

        let fields = parsed.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].key(), "first_name");
        assert_eq!(fields[1].ident().to_string(), "age");
    }

    #[test]
    fn test_parse_with_attributes() {
        let input: syn::DeriveInput = parse_quote! {
            #[frost(name = "Person")]
            struct Player {
                #[frost(rename = "firstName")]
                first_name: String,
                #[frost(skip)]
                cache: Vec<u8>,
            }
        };

        let parsed = RecordInput::from_derive_input(&input).unwrap();
        assert_eq!(parsed.shape_name(), "Person");
        let fields = parsed.fields();
        assert_eq!(fields[0].key(), "firstName");
        assert!(fields[1].skip);
    }

    #[test]
    fn test_raw_identifier_key() {
        let input: syn::DeriveInput = parse_quote! {
            struct Item {
                r#type: String,
            }
        };
        let parsed = RecordInput::from_derive_input(&input).unwrap();
        assert_eq!(parsed.fields()[0].key(), "type");
    }

    #[test]
    fn test_rejects_tuple_struct() {
        let input: syn::DeriveInput = parse_quote! {
            struct Pair(i64, i64);
        };
        assert!(RecordInput::from_derive_input(&input).is_err());
    }
}
