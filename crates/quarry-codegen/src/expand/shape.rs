use super::Expand;

use proc_macro2::TokenStream;
use quote::quote;

impl Expand<'_> {
    /// `Shape::Struct` listing every mapped field with its column tag and
    /// the field type's own shape.
    pub(super) fn expand_shape(&self) -> TokenStream {
        let quarry = &self.quarry;
        let name = self.record.ident.to_string();

        let fields = self.record.fields.iter().map(|field| {
            let field_name = field.ident.to_string();
            let ty = &field.ty;
            let column = match &field.column {
                Some(column) => {
                    let lit = &column.name;
                    quote!(Some(#lit))
                }
                None => quote!(None),
            };

            quote! {
                #quarry::FieldShape {
                    name: #field_name,
                    column: #column,
                    shape: <#ty as #quarry::Field>::shape(),
                }
            }
        });

        quote! {
            #quarry::Shape::Struct(#quarry::StructShape {
                name: #name,
                fields: vec![ #( #fields ),* ],
            })
        }
    }
}
