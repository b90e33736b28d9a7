// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Model builder
//!
//! Derive macros shared by the model components. Every component is expected
//! to hold its [`Entity`] in a field called `entity`.
//!
//! [`Entity`]: ../aloha_track/entity/struct.Entity.html

extern crate proc_macro;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{self, DeriveInput, parse_macro_input};

/// Create a std::fmt::Display implementation for a struct with an Entity.
#[proc_macro_derive(EntityDisplay)]
pub fn entity_display(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input: DeriveInput = parse_macro_input!(input);
    entity_display_impl(&input).into()
}

/// Create an `entity()` accessor for a struct with an Entity.
#[proc_macro_derive(EntityGet)]
pub fn entity_get(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input: DeriveInput = parse_macro_input!(input);
    entity_get_impl(&input).into()
}

fn entity_display_impl(input: &DeriveInput) -> TokenStream {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        impl #impl_generics std::fmt::Display for #ident #ty_generics #where_clause {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.entity.fmt(f)
            }
        }
    }
}

fn entity_get_impl(input: &DeriveInput) -> TokenStream {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            #[must_use]
            pub fn entity(&self) -> &std::rc::Rc<aloha_track::entity::Entity> {
                &self.entity
            }
        }
    }
}
