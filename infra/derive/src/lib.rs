#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Attribute macros shared by every crate of the toggles workspace.
//!
//! * [`macro@toggles_error`] turns a plain enum into the workspace error shape.
//! * [`macro@toggles_slice`] turns a struct into a shareable feature slice handle.
//!
//! Examples are `ignore`d here; the consuming crates exercise them in their own tests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Declares a crate error enum.
///
/// Every variant must use named fields. A variant may carry
/// `context: Option<Cow<'static, str>>`, and a variant wrapping an upstream error
/// names it `source` (or marks it with `#[source]` / `#[from]`).
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<Name>Ext` trait with `.context(...)` for `Result<T, Name>` and for
///   `Result<T, Source>` of each wrapped source type.
/// * `From<Source>` for every variant with a source field.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A private `format_context` helper for the `#[error(...)]` strings.
///
/// Variants with a source but without a context field are rejected at compile time.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[toggles_derive::toggles_error]
/// pub enum FetchError {
///     #[error("Transport error{}: {source}", format_context(.context))]
///     Http { source: reqwest::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fetch error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn fetch(client: &reqwest::blocking::Client) -> Result<String, FetchError> {
///     client.get("http://localhost").send().context("Polling flag server")?.text().context("Reading body")
/// }
/// ```
#[proc_macro_attribute]
pub fn toggles_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Declares a feature slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` wraps it in an `Arc`,
/// dereferences to it, and implements
/// `toggles_kernel::domain::registry::FeatureSlice` so it can be registered in the API state.
///
/// # Example
/// ```rust,ignore
/// #[toggles_derive::toggles_slice]
/// pub struct Flags {
///     pub client: ToggleClient,
/// }
///
/// let slice = Flags::new(FlagsInner { client });
/// ```
#[proc_macro_attribute]
pub fn toggles_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand(input).into()
}
