use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ItemStruct;

pub fn expand_slice(input: ItemStruct) -> TokenStream {
    let ItemStruct { attrs, vis, ident, generics, fields, semi_token, .. } = input;

    if !generics.params.is_empty() {
        return syn::Error::new_spanned(generics, "dayqhi_slice does not support generic slices")
            .to_compile_error();
    }

    let inner = format_ident!("{ident}Inner");

    quote! {
        #(#attrs)*
        #[derive(Debug)]
        #vis struct #inner #fields #semi_token

        #[derive(Debug, Clone)]
        #vis struct #ident {
            inner: std::sync::Arc<#inner>,
        }

        impl #ident {
            #[must_use]
            pub fn new(inner: #inner) -> Self {
                Self { inner: std::sync::Arc::new(inner) }
            }
        }

        impl std::ops::Deref for #ident {
            type Target = #inner;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl ::dayqhi_kernel::domain::registry::FeatureSlice for #ident {
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    }
}
