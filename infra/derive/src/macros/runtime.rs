use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Ident, ItemFn, ReturnType, Type};

/// Runtime profiles known to `plaza_runtime::RuntimeConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Profile {
    Default,
    Client,
    SingleThreaded,
}

impl Profile {
    fn parse(args: TokenStream) -> syn::Result<Self> {
        if args.is_empty() {
            return Ok(Self::Default);
        }
        let ident: Ident = syn::parse2(args)?;
        match ident.to_string().as_str() {
            "default" => Ok(Self::Default),
            "client" => Ok(Self::Client),
            "single_threaded" => Ok(Self::SingleThreaded),
            _ => Err(Error::new_spanned(
                ident,
                "unknown runtime profile, expected `client`, `single_threaded` or `default`",
            )),
        }
    }

    fn config(self) -> TokenStream {
        match self {
            Self::Default => quote! { ::plaza_runtime::RuntimeConfig::default() },
            Self::Client => quote! { ::plaza_runtime::RuntimeConfig::client() },
            Self::SingleThreaded => quote! { ::plaza_runtime::RuntimeConfig::single_threaded() },
        }
    }
}

/// Expands `#[plaza_runtime::main]`: an `async fn main() -> Result<..>` becomes a plain `fn`
/// blocking on a runtime built from the chosen profile.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    match expand(args, input) {
        Ok(tokens) => tokens,
        Err(err) => err.into_compile_error(),
    }
}

fn expand(args: TokenStream, input: ItemFn) -> syn::Result<TokenStream> {
    if input.sig.asyncness.is_none() {
        return Err(Error::new_spanned(
            input.sig.fn_token,
            "#[plaza_runtime::main] requires an async fn",
        ));
    }
    if !returns_result(&input.sig.output) {
        return Err(Error::new_spanned(
            &input.sig.output,
            "#[plaza_runtime::main] requires a Result return type",
        ));
    }

    let config = Profile::parse(args)?.config();
    let ItemFn { attrs, vis, sig, block } = input;
    let (name, output) = (&sig.ident, &sig.output);

    Ok(quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let runtime = ::plaza_runtime::build_runtime_with_config(&#config)?;
            runtime.block_on(async #block)
        }
    })
}

fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(path) => path.path.segments.last().is_some_and(|seg| seg.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    }
}
