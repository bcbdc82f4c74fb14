#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the strata crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! strata-derive = { path = "../../infra/derive" }
//! thiserror = "2"
//! ```
//!
//! The consuming crate must depend on `thiserror` directly: the generated
//! code derives `::thiserror::Error`.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining the error enums of the strata crates.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Kind Names**: Generates `kind()` returning the variant name, handy as a log field.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `source` field
///   (or a field marked `#[source]`/`#[from]`), enabling `?` on upstream errors.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>` if an
///   `Internal` variant is present.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. Variants with a source must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
/// use strata_derive::strata_error;
///
/// #[strata_error]
/// pub enum RegistryError {
///     #[error("Invalid argument{}: {message}", format_context(.context))]
///     InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn check(name: &str) -> Result<(), RegistryError> {
///     Err(RegistryError::InvalidArgument { message: name.to_owned().into(), context: None })
/// }
///
/// let err = check("x").context("validating region").unwrap_err();
/// assert_eq!(err.kind(), "InvalidArgument");
/// ```
#[proc_macro_attribute]
pub fn strata_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
