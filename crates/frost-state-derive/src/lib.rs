//! Derive macro for the frost-state `State` trait.
//!
//! This crate provides the `#[derive(State)]` macro that generates:
//! - `impl State for {Name}`: the record shape, built once and cached, plus
//!   conversions to and from state values
//! - `{Name}Lens<S>`: a typed lens with one method per field
//!
//! # Usage
//!
//! ```ignore
//! use frost_state::State;
//!
//! #[derive(State)]
//! struct Game {
//!     score: i64,
//!     player: Player,
//! }
//!
//! let lens = Game::lens().player().first_name();
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod codegen;
mod parse;

/// Derive the `State` trait for a struct with named fields.
///
/// This macro generates:
/// - `impl State for {StructName}` with a record shape listing every field
///   in declaration order
/// - A lens type `{StructName}Lens<S>` whose methods return the lens of
///   each field, so nested records chain: `Game::lens().player().first_name()`
///
/// Every field type must itself implement `State`.
///
/// # Attributes
///
/// ## Struct Attributes
///
/// - `#[frost(name = "Shape")]`: Name the shape differently from the struct
///
/// ## Field Attributes
///
/// - `#[frost(rename = "key")]`: Use a different name in paths and JSON
/// - `#[frost(skip)]`: Leave out of the shape (field must implement `Default`)
///
/// # Examples
///
/// ```ignore
/// use frost_state::{Asset, Dispatch, State};
///
/// #[derive(State)]
/// struct Player {
///     #[frost(rename = "firstName")]
///     first_name: String,
///     #[frost(rename = "lastName")]
///     last_name: String,
/// }
///
/// let player = Asset::new(Player { first_name: "Wall".into(), last_name: "Enberg".into() });
/// let player = player.set(Player::lens().first_name(), "Avery")?;
/// ```
#[proc_macro_derive(State, attributes(frost))]
pub fn derive_state(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match codegen::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
