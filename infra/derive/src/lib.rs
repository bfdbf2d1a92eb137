#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the scene host crates.
//!
//! * [`plaza_error`] turns a named-field enum into a `thiserror` error with context support.
//! * [`wire_model`] stamps serde policy onto payloads that cross the sandbox boundary.
//! * [`main`] bootstraps an `async fn main` on a runtime profile from `plaza-runtime`.
//!
//! The examples are `ignore`d here because a proc-macro crate cannot use its own macros
//! in doctests; the consuming crates exercise them in their tests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Turns `async fn main() -> Result<..>` into a blocking `fn main` on a tokio runtime.
///
/// The argument names a `plaza_runtime::RuntimeConfig` profile: `client`,
/// `single_threaded`, or `default` (also used when the argument is omitted).
///
/// ```rust,ignore
/// #[plaza_runtime::main(client)]
/// async fn main() -> anyhow::Result<()> {
/// # Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Serde policy for payloads exchanged with scene sandboxes.
///
/// Adds whichever of `Debug`, `Clone`, `Serialize` and `Deserialize` the struct does not
/// derive itself and renames fields to `camelCase`. Both are adjustable:
/// `#[wire_model(rename_all = "snake_case", deny_unknown_fields = true)]`.
///
/// ```rust,ignore
/// #[plaza_derive::wire_model]
/// pub struct PlayerQuery {
///     pub user_id: String, // "userId" on the wire
/// }
/// ```
#[proc_macro_attribute]
pub fn wire_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::model::expand_wire_model(attr.into(), input).into()
}

/// Declares a crate error enum.
///
/// Every variant has named fields. A `context: Option<Cow<'static, str>>` field makes the
/// variant accept labels through the generated `<Enum>Ext::context`. A `source` field (or
/// one marked `#[source]`/`#[from]`) wraps a foreign error and gets a `From` impl; such
/// variants must carry a context field too. An `Internal { message, context }` variant
/// additionally converts from `&'static str` and `String`.
///
/// `Debug` and `thiserror::Error` are derived when missing, and `kind()` returns the variant
/// name in `snake_case` for log fields and sandbox error responses. Display strings can use
/// the generated `format_context(.context)` helper.
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[plaza_derive::plaza_error]
/// pub enum SceneError {
///     #[error("Scene load failure{}: {message}", format_context(.context))]
///     LoadFailure { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// let err = SceneError::LoadFailure { message: "boom".into(), context: None };
/// assert_eq!(err.kind(), "load_failure");
/// ```
#[proc_macro_attribute]
pub fn plaza_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
