//! Procedural macros for hostbind
//!
//! This crate provides `#[derive(Native)]`, which makes a struct visible to
//! expressions through the reflection traits of `hostbind_core`.

extern crate proc_macro;

use proc_macro::TokenStream;

mod native;

/// Derive `Typed`, `Reflect` and `FromValue` for a struct with named fields.
///
/// The struct must be `Clone`. Every field not marked `skip` must implement
/// `Typed`, `Reflect` and `FromValue`.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Default, Native)]
/// #[native(default)]
/// pub struct Order {
///     #[native(json = "order_id")]
///     pub id: i64,
///     #[native(json = "-")]
///     pub internal: String,
///     #[native(skip)]
///     cache: std::sync::Arc<std::sync::Mutex<()>>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[native(default)]` on the struct: expressions may construct it;
///   unset fields keep their `Default` value.
/// - `#[native(skip)]` on a field: the field is invisible to reflection.
/// - `#[native(<convention> = "<tag>")]` on a field: the field's tag under a
///   naming convention, e.g. `json = "name,omitempty"`. The text before the
///   first comma is the external name and `-` hides the field.
///
/// Non-`pub` fields are reflected but never exposed to expressions.
#[proc_macro_derive(Native, attributes(native))]
pub fn derive_native(input: TokenStream) -> TokenStream {
    native::derive_native_impl(input)
}
