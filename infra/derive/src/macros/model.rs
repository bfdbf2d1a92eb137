//! Expansion of `#[wire_model]`.

use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, ItemStruct, Lit, LitBool, LitStr, Meta, Token};

const DEFAULT_CASE: &str = "camelCase";
const DERIVES: [&str; 4] = ["Debug", "Clone", "Serialize", "Deserialize"];

/// Macro arguments: `rename_all = "..."`, `deny_unknown_fields = bool`.
#[derive(Default)]
struct WireArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<LitBool>,
}

impl WireArgs {
    fn parse(args: TokenStream) -> syn::Result<Self> {
        let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;
        let mut out = Self::default();

        for meta in metas {
            let Meta::NameValue(pair) = meta else {
                return Err(syn::Error::new_spanned(meta, "expected `name = value` arguments"));
            };
            let Expr::Lit(ExprLit { lit, .. }) = &pair.value else {
                return Err(syn::Error::new_spanned(&pair.value, "expected a literal"));
            };

            match (pair.path.get_ident().map(ToString::to_string).as_deref(), lit) {
                (Some("rename_all"), Lit::Str(value)) if out.rename_all.is_none() => {
                    out.rename_all = Some(value.clone());
                },
                (Some("deny_unknown_fields"), Lit::Bool(value))
                    if out.deny_unknown_fields.is_none() =>
                {
                    out.deny_unknown_fields = Some(value.clone());
                },
                (Some("rename_all" | "deny_unknown_fields"), _) => {
                    return Err(syn::Error::new_spanned(
                        &pair,
                        "duplicate argument or wrong literal type",
                    ));
                },
                _ => {
                    return Err(syn::Error::new_spanned(
                        &pair.path,
                        "unsupported argument, expected `rename_all` or `deny_unknown_fields`",
                    ));
                },
            }
        }
        Ok(out)
    }
}

/// What the struct already declares through `#[derive]` and `#[serde]`.
struct Declared {
    derives: FxHashSet<String>,
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

impl Declared {
    fn scan(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut declared =
            Self { derives: FxHashSet::default(), rename_all: None, deny_unknown_fields: false };

        for attr in attrs {
            if attr.path().is_ident("derive") {
                attr.parse_nested_meta(|meta| {
                    if let Some(last) = meta.path.segments.last() {
                        declared.derives.insert(last.ident.to_string());
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename_all") {
                        declared.rename_all = Some(meta.value()?.parse()?);
                    } else if meta.path.is_ident("deny_unknown_fields") {
                        declared.deny_unknown_fields = true;
                    } else if meta.input.peek(Token![=]) {
                        meta.value()?.parse::<Expr>()?;
                    }
                    Ok(())
                })?;
            }
        }
        Ok(declared)
    }
}

/// Expands the `#[wire_model]` attribute macro.
///
/// Adds the common derives and the camelCase serde policy used by sandbox payloads.
pub fn expand_wire_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    expand(args, input).unwrap_or_else(syn::Error::into_compile_error)
}

fn expand(args: TokenStream, input: ItemStruct) -> syn::Result<TokenStream> {
    let args = WireArgs::parse(args)?;
    let declared = Declared::scan(&input.attrs)?;

    let missing = DERIVES.iter().filter(|name| !declared.derives.contains(**name)).map(|name| {
        match *name {
            "Serialize" => quote!(::serde::Serialize),
            "Deserialize" => quote!(::serde::Deserialize),
            other => {
                let ident = syn::Ident::new(other, Span::call_site());
                quote!(#ident)
            },
        }
    });
    let missing: Vec<_> = missing.collect();
    let derive = (!missing.is_empty()).then(|| quote!(#[derive(#(#missing),*)]));

    let case = args.rename_all.unwrap_or_else(|| LitStr::new(DEFAULT_CASE, Span::call_site()));
    let rename = match &declared.rename_all {
        Some(existing) if existing.value() != case.value() => {
            return Err(syn::Error::new_spanned(
                existing,
                "serde rename_all conflicts with wire_model; pass it as wire_model(rename_all = ..)",
            ));
        },
        Some(_) => None,
        None => Some(quote!(#[serde(rename_all = #case)])),
    };

    let strict = args.deny_unknown_fields.is_some_and(|lit| lit.value);
    let deny = (strict && !declared.deny_unknown_fields).then(|| quote!(#[serde(deny_unknown_fields)]));

    Ok(quote! {
        #derive
        #rename
        #deny
        #input
    })
}
