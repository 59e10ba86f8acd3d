// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    Data, DeriveInput, Error, Field, Fields, GenericArgument, Ident, PathArguments, Result, Type,
    TypePath,
};

/// Helper function to derive the trait that designates an empty enum as a list.
///
/// Example parameters for the tailed doubly linked list:
/// * list_type_name: "SlList"
/// * list_type_path: quote! {::selfloc_list::list::SlList}
pub(crate) fn derive_list_enum_trait(
    input: DeriveInput,
    list_type_name: &str,
    list_type_path: TokenStream,
) -> Result<TokenStream> {
    if let Data::Enum(e) = &input.data {
        if e.variants.is_empty() {
            let ident = &input.ident;

            return Ok(quote! {
                impl ::selfloc_list::SlTypedList for #ident {
                    type T = #list_type_path;
                }
            });
        }
    }

    Err(Error::new_spanned(
        input,
        format!("{} can only be derived for an empty enum", list_type_name),
    ))
}

/// Helper function to derive SlListElement.
pub(crate) fn derive_list_struct_trait(input: DeriveInput) -> Result<TokenStream> {
    let s = match &input.data {
        Data::Struct(s) => s,
        _ => {
            return Err(Error::new_spanned(
                input,
                "SlListElement can only be derived for structs",
            ))
        }
    };

    let f = match &s.fields {
        Fields::Named(f) => f,
        _ => {
            return Err(Error::new_spanned(
                input,
                "SlListElement can only be derived for structs with named fields",
            ))
        }
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let infos = f
        .named
        .iter()
        .filter_map(parse_element_field)
        .collect::<Vec<_>>();

    if infos.is_empty() {
        return Err(Error::new_spanned(input, "Found no Link fields"));
    }

    // Two `Link` fields of the same list type would make the element ambiguous.
    let mut seen = Vec::<String>::with_capacity(infos.len());
    for info in &infos {
        let key = info.list_ty.to_token_stream().to_string();
        if seen.contains(&key) {
            return Err(Error::new_spanned(
                info.list_ty,
                "Only a single Link field may exist per list type",
            ));
        }
        seen.push(key);
    }

    let tokens = infos.iter().map(|info| {
        let field_ident = info.ident;
        let list_ty = info.list_ty;

        quote! {
            impl #impl_generics ::selfloc_list::SlListElement<#list_ty> for #ident #ty_generics #where_clause {
                fn link(&self) -> &::selfloc_list::Link<Self, #list_ty> {
                    &self.#field_ident
                }

                fn link_mut(&mut self) -> &mut ::selfloc_list::Link<Self, #list_ty> {
                    &mut self.#field_ident
                }
            }
        }
    });

    Ok(quote! {
        #(#tokens)*
    })
}

pub(crate) struct ElementFieldInfo<'a> {
    /// The "entry" in `entry: selfloc_list::Link<Self, mytraits::MyList>`
    pub(crate) ident: &'a Ident,
    /// The "mytraits::MyList" in `entry: selfloc_list::Link<Self, mytraits::MyList>`
    pub(crate) list_ty: &'a TypePath,
}

/// Checks if the given field is a link field of an element structure and returns some
/// information about it.
///
/// `field` can be the syntax tree of e.g.
/// * `entry: Link<Self, MyList>`
/// * `entry: selfloc_list::Link<Self, mytraits::MyList>`
pub(crate) fn parse_element_field(field: &Field) -> Option<ElementFieldInfo<'_>> {
    let ident = field.ident.as_ref()?;

    // Get the last segment of the type path and check it against the type name.
    // This isn't 100% accurate, we may catch similarly named types that are not ours.
    let ty_path = match &field.ty {
        Type::Path(ty_path) => ty_path,
        _ => return None,
    };

    let segment = ty_path.path.segments.last()?;
    if segment.ident != "Link" {
        return None;
    }

    // A `Link` of ours always has exactly two type parameters.
    let ab_args = match &segment.arguments {
        PathArguments::AngleBracketed(ab_args) => ab_args,
        _ => return None,
    };
    if ab_args.args.len() != 2 {
        return None;
    }

    let list_ty = match ab_args.args.last()? {
        GenericArgument::Type(Type::Path(list_ty)) => list_ty,
        _ => return None,
    };

    Some(ElementFieldInfo { ident, list_ty })
}
