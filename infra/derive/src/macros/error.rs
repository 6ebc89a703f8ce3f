use crate::macros::attrs::derived_trait_names;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Field, Fields, FieldsNamed, Ident, Type, Variant};

/// What the expansion needs to know about a single variant.
struct ErrorVariant<'a> {
    ident: &'a Ident,
    source: Option<&'a Field>,
    has_context: bool,
    cfg_attrs: Vec<&'a Attribute>,
}

impl ErrorVariant<'_> {
    fn is_internal(&self) -> bool {
        self.ident == "Internal"
    }
}

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    let Data::Enum(data) = &input.data else {
        return syn::Error::new_spanned(&input.ident, "dayqhi_error can only be applied to enums")
            .to_compile_error();
    };

    let variants = match data.variants.iter().map(inspect_variant).collect::<Result<Vec<_>, _>>()
    {
        Ok(variants) => variants,
        Err(err) => return err.to_compile_error(),
    };

    let name = &input.ident;
    let ext = format_ident!("{name}Ext");

    let derives = derive_attr(&input.attrs);
    let context_trait = context_trait(name, &ext, &variants);
    let source_impls = variants.iter().filter_map(|v| source_impls(name, &ext, v));
    let internal_impls = internal_impls(name, &variants);

    quote! {
        #[allow(non_shorthand_field_patterns)]
        #derives
        #input

        #context_trait
        #(#source_impls)*
        #internal_impls

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> std::borrow::Cow<'static, str> {
            match context {
                Some(c) => std::borrow::Cow::Owned(format!(" ({c})")),
                None => std::borrow::Cow::Borrowed(""),
            }
        }
    }
}

fn inspect_variant(variant: &Variant) -> syn::Result<ErrorVariant<'_>> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(syn::Error::new_spanned(
            variant,
            "dayqhi_error requires named fields so source/context can be wired",
        ));
    };

    let has_context = context_field(fields)?.is_some();
    let source = source_field(fields);

    if source.is_some() && !has_context {
        return Err(syn::Error::new_spanned(
            &variant.ident,
            "variants with a source need `context: Option<Cow<'static, str>>`",
        ));
    }

    Ok(ErrorVariant {
        ident: &variant.ident,
        source,
        has_context,
        cfg_attrs: variant.attrs.iter().filter(|a| a.path().is_ident("cfg")).collect(),
    })
}

fn context_field(fields: &FieldsNamed) -> syn::Result<Option<&Field>> {
    let Some(field) = fields.named.iter().find(|f| f.ident.as_ref().is_some_and(|i| i == "context"))
    else {
        return Ok(None);
    };

    if is_optional_static_cow(&field.ty) {
        Ok(Some(field))
    } else {
        Err(syn::Error::new_spanned(&field.ty, "context field must be Option<Cow<'static, str>>"))
    }
}

fn source_field(fields: &FieldsNamed) -> Option<&Field> {
    fields.named.iter().find(|field| {
        field.ident.as_ref().is_some_and(|ident| ident == "source")
            || field.attrs.iter().any(|a| a.path().is_ident("source") || a.path().is_ident("from"))
    })
}

fn derive_attr(attrs: &[Attribute]) -> TokenStream {
    let present = derived_trait_names(attrs);
    let mut missing = Vec::new();
    if !present.contains("Debug") {
        missing.push(quote! { Debug });
    }
    if !present.contains("Error") {
        missing.push(quote! { ::thiserror::Error });
    }

    if missing.is_empty() { quote! {} } else { quote! { #[derive(#(#missing),*)] } }
}

fn context_trait(name: &Ident, ext: &Ident, variants: &[ErrorVariant<'_>]) -> TokenStream {
    let arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let ident = v.ident;
        let cfg_attrs = &v.cfg_attrs;
        quote! { #(#cfg_attrs)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });

    quote! {
        pub trait #ext<T> {
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
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

fn source_impls(name: &Ident, ext: &Ident, variant: &ErrorVariant<'_>) -> Option<TokenStream> {
    if variant.is_internal() {
        return None;
    }
    let field = variant.source?;
    let field_ident = field.ident.as_ref()?;
    let source_ty = &field.ty;
    let ident = variant.ident;
    let cfg_attrs = &variant.cfg_attrs;

    Some(quote! {
        #(#cfg_attrs)*
        #[automatically_derived]
        impl From<#source_ty> for #name {
            #[inline]
            fn from(#field_ident: #source_ty) -> Self {
                Self::#ident { #field_ident, context: None }
            }
        }

        #(#cfg_attrs)*
        #[automatically_derived]
        impl<T> #ext<T> for std::result::Result<T, #source_ty> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name> {
                self.map_err(|#field_ident| #name::#ident { #field_ident, context: Some(context.into()) })
            }
        }
    })
}

fn internal_impls(name: &Ident, variants: &[ErrorVariant<'_>]) -> TokenStream {
    let Some(internal) = variants.iter().find(|v| v.is_internal()) else {
        return quote! {};
    };
    let cfg_attrs = &internal.cfg_attrs;

    quote! {
        #(#cfg_attrs)*
        #[automatically_derived]
        impl From<&'static str> for #name {
            #[inline]
            fn from(message: &'static str) -> Self {
                Self::Internal { message: std::borrow::Cow::Borrowed(message), context: None }
            }
        }

        #(#cfg_attrs)*
        #[automatically_derived]
        impl From<String> for #name {
            #[inline]
            fn from(message: String) -> Self {
                Self::Internal { message: std::borrow::Cow::Owned(message), context: None }
            }
        }
    }
}

/// Matches `Option<Cow<'static, str>>` by its last path segments.
fn is_optional_static_cow(ty: &Type) -> bool {
    let Some(cow) = single_generic_type(ty, "Option") else {
        return false;
    };
    let Type::Path(path) = cow else {
        return false;
    };
    let Some(segment) = path.path.segments.last() else {
        return false;
    };
    if segment.ident != "Cow" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };

    let mut args = args.args.iter();
    let lifetime_ok = matches!(args.next(), Some(syn::GenericArgument::Lifetime(lt)) if lt.ident == "static");
    let str_ok = matches!(
        args.next(),
        Some(syn::GenericArgument::Type(Type::Path(p)))
            if p.path.segments.last().is_some_and(|s| s.ident == "str")
    );

    lifetime_ok && str_ok
}

fn single_generic_type<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
