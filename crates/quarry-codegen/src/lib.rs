mod expand;
mod schema;

use proc_macro2::TokenStream;

/// Expands `#[derive(Record)]`: field access plus the `Record` marker.
pub fn generate_record(input: TokenStream) -> syn::Result<TokenStream> {
    let item: syn::ItemStruct = syn::parse2(input)?;
    let record = schema::Record::from_ast(&item)?;

    Ok(expand::root_record(&record))
}

/// Expands `#[derive(Embed)]`: field access only, for records nested inside
/// other records.
pub fn generate_embed(input: TokenStream) -> syn::Result<TokenStream> {
    let item: syn::ItemStruct = syn::parse2(input)?;
    let record = schema::Record::from_ast(&item)?;

    Ok(expand::embedded_record(&record))
}
