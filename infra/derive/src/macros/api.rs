use crate::macros::attrs::derived_trait_names;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ItemFn, ItemStruct, Lit, LitBool, LitStr, Meta, MetaNameValue, Token};

const DEFAULT_RENAME_ALL: &str = "snake_case";

/// Expands `#[api_model]`.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    match api_model(args, &input) {
        Ok(attrs) => quote! {
            #attrs
            #input
        },
        Err(err) => err.to_compile_error(),
    }
}

/// Expands `#[api_handler]`.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig #block
    }
}

#[derive(Default)]
struct ModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<LitBool>,
}

#[derive(Default)]
struct SerdeAttrs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

fn api_model(args: TokenStream, input: &ItemStruct) -> syn::Result<TokenStream> {
    let args = parse_model_args(args)?;
    let existing = existing_serde_attrs(&input.attrs)?;

    let derives = derive_attr(&input.attrs);
    let rename = rename_attr(args.rename_all, existing.rename_all.as_ref())?;
    let deny = deny_attr(args.deny_unknown_fields.as_ref(), existing.deny_unknown_fields)?;

    Ok(quote! {
        #derives
        #rename
        #deny
    })
}

fn parse_model_args(args: TokenStream) -> syn::Result<ModelArgs> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;
    let mut parsed = ModelArgs::default();

    for meta in metas {
        let Meta::NameValue(nv) = meta else {
            return Err(syn::Error::new_spanned(
                meta,
                "expected name-value arguments like `rename_all = \"...\"`",
            ));
        };

        if nv.path.is_ident("rename_all") {
            let lit = string_literal(&nv)?;
            store_once(&mut parsed.rename_all, &nv, lit)?;
        } else if nv.path.is_ident("deny_unknown_fields") {
            let lit = bool_literal(&nv)?;
            store_once(&mut parsed.deny_unknown_fields, &nv, lit)?;
        } else {
            return Err(syn::Error::new_spanned(
                nv.path,
                "unsupported argument; expected rename_all or deny_unknown_fields",
            ));
        }
    }

    Ok(parsed)
}

fn store_once<T>(slot: &mut Option<T>, at: &MetaNameValue, value: T) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new_spanned(at, "duplicate argument"));
    }
    *slot = Some(value);
    Ok(())
}

fn string_literal(nv: &MetaNameValue) -> syn::Result<LitStr> {
    match &nv.value {
        Expr::Lit(expr) => match &expr.lit {
            Lit::Str(lit) => Ok(lit.clone()),
            _ => Err(syn::Error::new_spanned(&nv.value, "expected a string literal")),
        },
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a string literal")),
    }
}

fn bool_literal(nv: &MetaNameValue) -> syn::Result<LitBool> {
    match &nv.value {
        Expr::Lit(expr) => match &expr.lit {
            Lit::Bool(lit) => Ok(lit.clone()),
            _ => Err(syn::Error::new_spanned(&nv.value, "expected a boolean literal")),
        },
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a boolean literal")),
    }
}

fn existing_serde_attrs(attrs: &[Attribute]) -> syn::Result<SerdeAttrs> {
    let mut found = SerdeAttrs::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                found.rename_all = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("deny_unknown_fields") {
                found.deny_unknown_fields = true;
            } else if meta.input.peek(Token![=]) {
                // Other serde options pass through untouched.
                let _: Expr = meta.value()?.parse()?;
            }
            Ok(())
        })?;
    }

    Ok(found)
}

fn derive_attr(attrs: &[Attribute]) -> TokenStream {
    let present = derived_trait_names(attrs);
    let wanted = [
        ("Debug", quote! { Debug }),
        ("Serialize", quote! { ::serde::Serialize }),
        ("Deserialize", quote! { ::serde::Deserialize }),
        ("ToSchema", quote! { ::utoipa::ToSchema }),
    ];

    let missing: Vec<_> = wanted
        .into_iter()
        .filter(|(name, _)| !present.contains(*name))
        .map(|(_, tokens)| tokens)
        .collect();

    if missing.is_empty() { quote! {} } else { quote! { #[derive(#(#missing),*)] } }
}

fn rename_attr(requested: Option<LitStr>, existing: Option<&LitStr>) -> syn::Result<TokenStream> {
    let requested =
        requested.unwrap_or_else(|| LitStr::new(DEFAULT_RENAME_ALL, Span::call_site()));

    match existing {
        Some(lit) if lit.value() != requested.value() => Err(syn::Error::new_spanned(
            lit,
            "conflicting serde rename_all; drop it or pass the same value to api_model",
        )),
        Some(_) => Ok(quote! {}),
        None => Ok(quote! { #[serde(rename_all = #requested)] }),
    }
}

fn deny_attr(requested: Option<&LitBool>, already_denied: bool) -> syn::Result<TokenStream> {
    let deny = requested.is_none_or(LitBool::value);

    match (already_denied, deny) {
        (true, false) => Err(syn::Error::new_spanned(
            requested,
            "deny_unknown_fields is already set via serde; remove it before disabling",
        )),
        (true, true) | (false, false) => Ok(quote! {}),
        (false, true) => Ok(quote! { #[serde(deny_unknown_fields)] }),
    }
}
