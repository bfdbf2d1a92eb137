//! Expansion of `#[plaza_error]`.

use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Attribute, Data, DeriveInput, Field, Fields, GenericArgument, Ident, LitStr, PathArguments,
    Type,
};

/// One enum variant as the error macro sees it.
struct ErrorVariant<'a> {
    ident: &'a Ident,
    kind: String,
    /// The wrapped error, bound by field name.
    source: Option<(&'a Ident, &'a Type)>,
    has_context: bool,
    cfg: Vec<&'a Attribute>,
}

impl<'a> ErrorVariant<'a> {
    fn parse(variant: &'a syn::Variant) -> syn::Result<Self> {
        let Fields::Named(fields) = &variant.fields else {
            return Err(syn::Error::new_spanned(
                variant,
                "plaza_error variants need named fields (`message`/`source` and `context`)",
            ));
        };

        let mut source = None;
        let mut has_context = false;
        for field in &fields.named {
            let Some(name) = &field.ident else { continue };
            if name == "context" {
                if !is_context_type(&field.ty) {
                    return Err(syn::Error::new_spanned(
                        &field.ty,
                        "context field must be Option<Cow<'static, str>>",
                    ));
                }
                has_context = true;
            } else if source.is_none() && is_source(name, field) {
                source = Some((name, &field.ty));
            }
        }

        if source.is_some() && !has_context {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "plaza_error variants with a source need `context: Option<Cow<'static, str>>`",
            ));
        }

        Ok(Self {
            ident: &variant.ident,
            kind: snake_case(&variant.ident.to_string()),
            source,
            has_context,
            cfg: variant.attrs.iter().filter(|attr| attr.path().is_ident("cfg")).collect(),
        })
    }

    fn is_internal(&self) -> bool {
        self.ident == "Internal"
    }
}

fn is_source(name: &Ident, field: &Field) -> bool {
    name == "source"
        || field.attrs.iter().any(|attr| attr.path().is_ident("source") || attr.path().is_ident("from"))
}

/// The annotated enum plus everything generated for it.
struct ErrorEnum<'a> {
    input: &'a DeriveInput,
    ext: Ident,
    variants: Vec<ErrorVariant<'a>>,
}

impl<'a> ErrorEnum<'a> {
    fn parse(input: &'a DeriveInput) -> syn::Result<Self> {
        let Data::Enum(data) = &input.data else {
            return Err(syn::Error::new_spanned(input, "plaza_error can only be applied to enums"));
        };
        let variants = data.variants.iter().map(ErrorVariant::parse).collect::<syn::Result<_>>()?;
        Ok(Self { input, ext: format_ident!("{}Ext", input.ident), variants })
    }

    fn missing_derives(&self) -> TokenStream {
        let present = derived_traits(&self.input.attrs);
        let mut missing = Vec::new();
        if !present.contains("Debug") {
            missing.push(quote!(Debug));
        }
        if !present.contains("Error") {
            missing.push(quote!(::thiserror::Error));
        }
        if missing.is_empty() { quote!() } else { quote!(#[derive(#(#missing),*)]) }
    }

    /// `…Ext::context` for results of the enum itself.
    fn context_ext(&self) -> TokenStream {
        let name = &self.input.ident;
        let ext = &self.ext;
        let arms = self.variants.iter().filter(|v| v.has_context).map(|v| {
            let (ident, cfg) = (v.ident, &v.cfg);
            quote! { #(#cfg)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
        });

        quote! {
            /// Attaches a context label to an error on its way up.
            pub trait #ext<T> {
                fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> ::std::result::Result<T, #name>;
            }

            #[automatically_derived]
            impl<T> #ext<T> for ::std::result::Result<T, #name> {
                #[inline]
                fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                    self.map_err(|mut err| {
                        match &mut err {
                            #(#arms)*
                            _ => {}
                        }
                        err
                    })
                }
            }
        }
    }

    fn kind_fn(&self) -> TokenStream {
        let name = &self.input.ident;
        let arms = self.variants.iter().map(|v| {
            let (ident, cfg) = (v.ident, &v.cfg);
            let kind = LitStr::new(&v.kind, ident.span());
            quote! { #(#cfg)* Self::#ident { .. } => #kind, }
        });

        quote! {
            #[automatically_derived]
            impl #name {
                /// Stable `snake_case` name of the variant, used on the wire and in logs.
                #[must_use]
                pub const fn kind(&self) -> &'static str {
                    match self {
                        #(#arms)*
                    }
                }
            }
        }
    }

    /// `From<Source>` plus `…Ext::context` on results carrying the source error.
    fn source_impls(&self) -> impl Iterator<Item = TokenStream> + '_ {
        let name = &self.input.ident;
        let ext = &self.ext;
        self.variants.iter().filter(|v| !v.is_internal()).filter_map(move |v| {
            let (field, ty) = v.source?;
            let (ident, cfg) = (v.ident, &v.cfg);
            Some(quote! {
                #(#cfg)*
                #[automatically_derived]
                impl From<#ty> for #name {
                    #[inline]
                    fn from(#field: #ty) -> Self {
                        Self::#ident { #field, context: None }
                    }
                }

                #(#cfg)*
                #[automatically_derived]
                impl<T> #ext<T> for ::std::result::Result<T, #ty> {
                    #[inline]
                    fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> ::std::result::Result<T, #name> {
                        self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
                    }
                }
            })
        })
    }

    /// String conversions into an `Internal { message, context }` variant.
    fn internal_impls(&self) -> TokenStream {
        let name = &self.input.ident;
        let Some(internal) = self.variants.iter().find(|v| v.is_internal() && v.source.is_none())
        else {
            return quote!();
        };
        let cfg = &internal.cfg;

        quote! {
            #(#cfg)*
            #[automatically_derived]
            impl From<&'static str> for #name {
                #[inline]
                fn from(message: &'static str) -> Self {
                    Self::Internal { message: ::std::borrow::Cow::Borrowed(message), context: None }
                }
            }

            #(#cfg)*
            #[automatically_derived]
            impl From<String> for #name {
                #[inline]
                fn from(message: String) -> Self {
                    Self::Internal { message: ::std::borrow::Cow::Owned(message), context: None }
                }
            }
        }
    }

    fn expand(&self) -> TokenStream {
        let input = self.input;
        let derives = self.missing_derives();
        let context_ext = self.context_ext();
        let kind_fn = self.kind_fn();
        let source_impls = self.source_impls();
        let internal_impls = self.internal_impls();

        quote! {
            #[allow(non_shorthand_field_patterns)]
            #derives
            #input

            #context_ext
            #kind_fn
            #(#source_impls)*
            #internal_impls

            #[allow(dead_code)]
            fn format_context(context: &Option<::std::borrow::Cow<'static, str>>) -> ::std::borrow::Cow<'static, str> {
                match context {
                    Some(label) => ::std::borrow::Cow::Owned(format!(" ({label})")),
                    None => ::std::borrow::Cow::Borrowed(""),
                }
            }
        }
    }
}

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    match ErrorEnum::parse(&input) {
        Ok(error) => error.expand(),
        Err(err) => err.into_compile_error(),
    }
}

fn derived_traits(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(last) = meta.path.segments.last() {
                traits.insert(last.ident.to_string());
            }
            Ok(())
        });
    }
    traits
}

fn snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.char_indices() {
        if ch.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// Matches `Option<Cow<'static, str>>`, with or without path prefixes.
fn is_context_type(ty: &Type) -> bool {
    let Some(GenericArgument::Type(cow)) = generic_args(ty, "Option").and_then(|args| args.first().copied())
    else {
        return false;
    };
    let Some(args) = generic_args(cow, "Cow") else {
        return false;
    };

    matches!(
        (args.first().copied(), args.get(1).copied()),
        (Some(GenericArgument::Lifetime(lt)), Some(GenericArgument::Type(Type::Path(s))))
            if lt.ident == "static" && s.path.segments.last().is_some_and(|seg| seg.ident == "str")
    )
}

fn generic_args<'a>(ty: &'a Type, outer: &str) -> Option<Vec<&'a GenericArgument>> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last().filter(|segment| segment.ident == outer)?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    Some(args.args.iter().collect())
}
