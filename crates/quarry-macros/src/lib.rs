extern crate proc_macro;

use proc_macro::TokenStream;

#[proc_macro_derive(Record, attributes(column, skip))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    match quarry_codegen::generate_record(input.into()) {
        Ok(output) => output.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

#[proc_macro_derive(Embed, attributes(column, skip))]
pub fn derive_embed(input: TokenStream) -> TokenStream {
    match quarry_codegen::generate_embed(input.into()) {
        Ok(output) => output.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
