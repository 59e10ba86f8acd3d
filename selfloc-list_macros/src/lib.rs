// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

mod helpers;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(SlList)]
pub fn derive_sl_list(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    helpers::derive_list_enum_trait(input, "SlList", quote! {::selfloc_list::list::SlList})
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

#[proc_macro_derive(SlHeadList)]
pub fn derive_sl_head_list(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    helpers::derive_list_enum_trait(
        input,
        "SlHeadList",
        quote! {::selfloc_list::head_list::SlHeadList},
    )
    .unwrap_or_else(|e| e.to_compile_error())
    .into()
}

#[proc_macro_derive(SlListElement)]
pub fn derive_sl_list_element(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    helpers::derive_list_struct_trait(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
