//! Implementation of `#[derive(Native)]`

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Expr, Fields, Lit, Meta, Visibility, parse_macro_input};

pub fn derive_native_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match generate(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Struct-level options.
#[derive(Default)]
struct StructOptions {
    /// Build a `construct` fn from `Default`.
    default: bool,
}

/// Field-level options.
#[derive(Default)]
struct FieldOptions {
    skip: bool,
    /// `(convention, tag)` pairs.
    tags: Vec<(String, String)>,
}

fn parse_struct_options(input: &DeriveInput) -> syn::Result<StructOptions> {
    let mut options = StructOptions::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("native")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                options.default = true;
                Ok(())
            } else {
                Err(meta.error("expected `default`"))
            }
        })?;
    }
    Ok(options)
}

fn parse_field_options(field: &syn::Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("native")) {
        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new_spanned(
                attr,
                "expected attribute format: #[native(skip)] or #[native(json = \"name\")]",
            ));
        };
        list.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                return Ok(());
            }
            let Some(convention) = meta.path.get_ident() else {
                return Err(meta.error("expected a naming convention"));
            };
            let value: Expr = meta.value()?.parse()?;
            let Expr::Lit(lit) = &value else {
                return Err(syn::Error::new_spanned(value, "tag must be a string literal"));
            };
            let Lit::Str(tag) = &lit.lit else {
                return Err(syn::Error::new_spanned(lit, "tag must be a string literal"));
            };
            options.tags.push((convention.to_string(), tag.value()));
            Ok(())
        })?;
    }
    Ok(options)
}

fn generate(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Native cannot be derived for generic structs",
        ));
    }
    let fields: Vec<&syn::Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &data.fields,
                    "Native requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Native can only be derived for structs",
            ));
        }
    };
    let options = parse_struct_options(input)?;

    let mut accessors = Vec::new();
    let mut infos = Vec::new();
    for field in fields {
        let field_options = parse_field_options(field)?;
        if field_options.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let ty = &field.ty;
        let field_name = ident.to_string();
        let exported = matches!(field.vis, Visibility::Public(_));
        let get = format_ident!("__get_{}", ident);
        let set = format_ident!("__set_{}", ident);
        let tags = field_options.tags.iter().map(|(c, t)| quote! { (#c, #t) });

        accessors.push(quote! {
            fn #get(value: &dyn ::hostbind_core::reflect::Reflect)
                -> ::core::option::Option<&dyn ::hostbind_core::reflect::Reflect>
            {
                value
                    .as_any()
                    .downcast_ref::<#name>()
                    .map(|s| &s.#ident as &dyn ::hostbind_core::reflect::Reflect)
            }

            fn #set(
                target: &mut dyn ::hostbind_core::reflect::Reflect,
                value: &::hostbind_core::values::Value,
            ) -> ::core::result::Result<(), ::hostbind_core::evaluator::EvalError> {
                let found = target.reflect_type();
                let ::core::option::Option::Some(s) = target.as_any_mut().downcast_mut::<#name>() else {
                    return ::core::result::Result::Err(
                        ::hostbind_core::evaluator::EvalError::conversion(found, stringify!(#name)),
                    );
                };
                s.#ident = <#ty as ::hostbind_core::reflect::FromValue>::from_value(value)?;
                ::core::result::Result::Ok(())
            }
        });
        infos.push(quote! {
            ::hostbind_core::reflect::FieldInfo {
                name: #field_name,
                exported: #exported,
                tags: &[#(#tags),*],
                ty: <#ty as ::hostbind_core::reflect::Typed>::host_type,
                get: #get,
                set: #set,
            }
        });
    }

    let field_count = infos.len();
    let construct = if options.default {
        quote! {
            {
                fn __construct() -> ::std::boxed::Box<dyn ::hostbind_core::reflect::Reflect> {
                    ::std::boxed::Box::new(<#name as ::core::default::Default>::default())
                }
                ::core::option::Option::Some(__construct)
            }
        }
    } else {
        quote! { ::core::option::Option::None }
    };

    Ok(quote! {
        impl ::hostbind_core::reflect::Typed for #name {
            fn host_type() -> ::hostbind_core::reflect::HostType {
                #(#accessors)*

                static FIELDS: [::hostbind_core::reflect::FieldInfo; #field_count] = [#(#infos),*];

                ::hostbind_core::reflect::HostType::cached::<#name>(|| {
                    ::hostbind_core::reflect::HostKind::Struct(::hostbind_core::reflect::StructInfo {
                        fields: &FIELDS,
                        construct: #construct,
                    })
                })
            }
        }

        impl ::hostbind_core::reflect::Reflect for #name {
            fn reflect_type(&self) -> ::hostbind_core::reflect::HostType {
                <#name as ::hostbind_core::reflect::Typed>::host_type()
            }

            fn reflect_ref(&self) -> ::hostbind_core::reflect::ReflectRef<'_> {
                ::hostbind_core::reflect::ReflectRef::Struct
            }

            fn clone_reflect(&self) -> ::std::boxed::Box<dyn ::hostbind_core::reflect::Reflect> {
                ::std::boxed::Box::new(::core::clone::Clone::clone(self))
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
                self
            }
        }

        impl ::hostbind_core::reflect::FromValue for #name {
            fn from_value(
                value: &::hostbind_core::values::Value,
            ) -> ::core::result::Result<Self, ::hostbind_core::evaluator::EvalError> {
                ::hostbind_core::reflect::struct_from_value::<#name>(value)
            }
        }
    })
}
