use super::{util, Expand};

use proc_macro2::TokenStream;
use quote::quote;

impl Expand<'_> {
    /// Dispatches on the first path segment and hands the rest of the path
    /// to the field.
    pub(super) fn expand_get_body(&self) -> TokenStream {
        let quarry = &self.quarry;
        let name = self.record.ident.to_string();

        let arms = self.record.fields.iter().map(|field| {
            let index = util::int(field.index);
            let ident = &field.ident;
            quote!(Some((&#index, rest)) => #quarry::Field::get(&self.#ident, rest),)
        });

        quote! {
            match path.split_first() {
                #( #arms )*
                _ => Err(#quarry::invalid_field_path(#name, path)),
            }
        }
    }

    pub(super) fn expand_set_body(&self) -> TokenStream {
        let quarry = &self.quarry;
        let name = self.record.ident.to_string();

        let arms = self.record.fields.iter().map(|field| {
            let index = util::int(field.index);
            let ident = &field.ident;
            quote!(Some((&#index, rest)) => #quarry::Field::set(&mut self.#ident, rest, value),)
        });

        quote! {
            match path.split_first() {
                #( #arms )*
                _ => Err(#quarry::invalid_field_path(#name, path)),
            }
        }
    }
}
