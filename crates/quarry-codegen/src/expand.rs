mod access;
mod shape;
mod util;

use crate::schema::Record;

use proc_macro2::TokenStream;
use quote::quote;

struct Expand<'a> {
    /// The record being expanded
    record: &'a Record,

    /// Path prefix for quarry types
    quarry: TokenStream,
}

impl Expand<'_> {
    fn expand_field_impl(&self) -> TokenStream {
        let quarry = &self.quarry;
        let ident = &self.record.ident;
        let shape = self.expand_shape();
        let get_body = self.expand_get_body();
        let set_body = self.expand_set_body();

        quote! {
            impl #quarry::Field for #ident {
                fn shape() -> #quarry::Shape {
                    #shape
                }

                fn get(&self, path: &[usize]) -> #quarry::Result<#quarry::Value> {
                    #get_body
                }

                #[allow(unused_variables)]
                fn set(&mut self, path: &[usize], value: #quarry::Value) -> #quarry::Result<()> {
                    #set_body
                }
            }
        }
    }
}

pub(super) fn root_record(record: &Record) -> TokenStream {
    let expand = Expand {
        record,
        quarry: quote!(_quarry::codegen_support),
    };

    let quarry = &expand.quarry;
    let ident = &record.ident;
    let name = ident.to_string();
    let field_impl = expand.expand_field_impl();

    wrap_in_const(quote! {
        #field_impl

        impl #quarry::Record for #ident {
            const NAME: &'static str = #name;
        }
    })
}

pub(super) fn embedded_record(record: &Record) -> TokenStream {
    let expand = Expand {
        record,
        quarry: quote!(_quarry::codegen_support),
    };

    wrap_in_const(expand.expand_field_impl())
}

fn wrap_in_const(code: TokenStream) -> TokenStream {
    quote! {
        const _: () = {
            use quarry as _quarry;
            #code
        };
    }
}
