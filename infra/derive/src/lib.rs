#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by every DayQHI crate: the runtime entry point, API models and
//! handlers, slice handles and error enums.
//!
//! Examples below are `ignore`d because they need the consuming crates (`dayqhi-runtime`,
//! `dayqhi-kernel`, `utoipa`) in scope.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap a tuned Tokio runtime.
///
/// Turns an `async fn main` returning a `Result` into a plain `fn main` that builds the
/// runtime from a `dayqhi_runtime::RuntimeConfig` preset and blocks on the body.
///
/// # Arguments
///
/// * `high_performance` - Server profile (larger stacks, long keep-alive).
/// * `memory_efficient` - Half the workers, smaller stacks.
/// * `default` (or no argument) - Auto-detected worker count.
///
/// # Examples
///
/// ```rust,ignore
/// #[dayqhi_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Declares a JSON data transfer object.
///
/// * Adds `Debug`, `Serialize`, `Deserialize` and `utoipa::ToSchema` unless already derived.
/// * Applies `#[serde(rename_all = "snake_case")]` unless overridden with `rename_all = "..."`.
/// * Applies `#[serde(deny_unknown_fields)]` unless `deny_unknown_fields = false`.
///
/// # Example
///
/// ```rust,ignore
/// #[dayqhi_derive::api_model]
/// pub struct LocationUpdate {
///     pub latitude: f64,
///     pub longitude: f64,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Registers an Axum handler with the `OpenAPI` document.
///
/// Accepts the same arguments as `utoipa::path` (`get`, `path = "..."`, `responses(...)`,
/// `tag = ...`) and silences `clippy::unused_async` for handlers that never await.
///
/// # Example
///
/// ```rust,ignore
/// #[dayqhi_derive::api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = SYSTEM_TAG
/// )]
/// pub async fn health_handler() -> impl IntoResponse { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Turns an enum into the crate's error type.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant holding a `source` field.
/// * `From<Source>` for those variants.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant
///   exists.
/// * A private `format_context` helper for use in `#[error(...)]` strings.
///
/// # Requirements
///
/// Variants must use named fields. A variant with a `source` must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[dayqhi_derive::dayqhi_error]
/// pub enum DatabaseError {
///     #[error("SurrealDB error{}: {source}", format_context(.context))]
///     Surreal { source: surrealdb::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal database error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn dayqhi_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Turns a struct into a feature slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` is an `Arc` wrapper with `new`,
/// `Deref<Target = <Name>Inner>` and a `FeatureSlice` impl so the kernel can register it.
///
/// # Example
///
/// ```rust,ignore
/// #[dayqhi_derive::dayqhi_slice]
/// pub struct Alerts {
///     pub radius_km: f64,
/// }
///
/// let slice = Alerts::new(AlertsInner { radius_km: 25.0 });
/// ```
#[proc_macro_attribute]
pub fn dayqhi_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
