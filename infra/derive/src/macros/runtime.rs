use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, ItemFn, ReturnType, Type};

/// Expands `#[dayqhi_runtime::main]`.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    if input.sig.asyncness.is_none() {
        return Error::new_spanned(
            input.sig.fn_token,
            "#[dayqhi_runtime::main] can only be used on async functions",
        )
        .to_compile_error();
    }

    if !returns_result(&input.sig.output) {
        return Error::new_spanned(
            &input.sig.output,
            "#[dayqhi_runtime::main] requires a Result return type",
        )
        .to_compile_error();
    }

    let preset = match runtime_preset(args) {
        Ok(preset) => preset,
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let config = #preset;
            let runtime = ::dayqhi_runtime::build_runtime_with_config(&config)?;
            runtime.block_on(async #block)
        }
    }
}

fn runtime_preset(args: TokenStream) -> syn::Result<TokenStream> {
    if args.is_empty() {
        return Ok(quote! { ::dayqhi_runtime::RuntimeConfig::default() });
    }

    let ident: syn::Ident = syn::parse2(args)?;
    match ident.to_string().as_str() {
        "high_performance" => Ok(quote! { ::dayqhi_runtime::RuntimeConfig::high_performance() }),
        "memory_efficient" => Ok(quote! { ::dayqhi_runtime::RuntimeConfig::memory_efficient() }),
        "default" => Ok(quote! { ::dayqhi_runtime::RuntimeConfig::default() }),
        _ => Err(Error::new_spanned(
            ident,
            "unknown runtime profile; use high_performance, memory_efficient or default",
        )),
    }
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = &**ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|segment| segment.ident == "Result")
}
