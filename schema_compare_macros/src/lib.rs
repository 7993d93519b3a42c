//! Procedural macros for schema_compare
//!
//! This crate provides the `OptionFlags` derive macro, which exposes the boolean
//! fields of an options struct through their camelCase keys.

use inflector::Inflector;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Type};

/// Derive key-based accessors for every `bool` field of a struct.
///
/// Generates `FLAG_KEYS`, `flag(key)` and `set_flag(key, value)`. Keys are
/// accepted in camelCase (`compareTables`) or as the field name itself
/// (`compare_tables`). Unknown keys yield `None` / `false`.
#[proc_macro_derive(OptionFlags)]
pub fn derive_option_flags(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_option_flags(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand_option_flags(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "OptionFlags only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "OptionFlags only supports structs",
            ))
        }
    };

    let flags: Vec<_> = fields
        .iter()
        .filter(|field| is_bool(&field.ty))
        .filter_map(|field| field.ident.as_ref())
        .map(|ident| {
            let field_name = ident.to_string();
            (ident, field_name.to_camel_case(), field_name)
        })
        .collect();

    let keys = flags.iter().map(|(_, key, _)| key);

    let getters = flags.iter().map(|(ident, key, field_name)| {
        quote! { #key | #field_name => Some(self.#ident), }
    });

    let setters = flags.iter().map(|(ident, key, field_name)| {
        quote! {
            #key | #field_name => {
                self.#ident = value;
                true
            }
        }
    });

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #name #ty_generics #where_clause {
            /// Keys of every boolean flag, in declaration order
            pub const FLAG_KEYS: &'static [&'static str] = &[#(#keys),*];

            /// Read a flag by key
            pub fn flag(&self, key: &str) -> Option<bool> {
                match key {
                    #(#getters)*
                    _ => None,
                }
            }

            /// Set a flag by key, returning `false` when the key is unknown
            pub fn set_flag(&mut self, key: &str, value: bool) -> bool {
                match key {
                    #(#setters)*
                    _ => false,
                }
            }
        }
    })
}

/// Check whether a field type is the plain `bool` primitive
fn is_bool(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path.qself.is_none() && path.path.is_ident("bool"),
        _ => false,
    }
}
