use super::{field::FieldAttr, ErrorSet, Field};

#[derive(Debug)]
pub(crate) struct Record {
    /// Type identifier
    pub(crate) ident: syn::Ident,

    /// Mapped fields, in declaration order. `#[skip]` fields are left out.
    pub(crate) fields: Vec<Field>,
}

impl Record {
    pub(crate) fn from_ast(ast: &syn::ItemStruct) -> syn::Result<Self> {
        let syn::Fields::Named(node) = &ast.fields else {
            return Err(syn::Error::new_spanned(
                &ast.fields,
                "record fields must be named",
            ));
        };

        // Generics are not supported yet
        if !ast.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &ast.generics,
                "record generics are not supported",
            ));
        }

        let mut fields = vec![];
        let mut errs = ErrorSet::new();

        for node in &node.named {
            let Some(ident) = &node.ident else {
                errs.push(syn::Error::new_spanned(node, "record fields must be named"));
                continue;
            };

            match FieldAttr::from_ast(node) {
                Ok(attrs) if attrs.skip => {}
                Ok(attrs) => fields.push(Field {
                    index: fields.len(),
                    ident: ident.clone(),
                    ty: node.ty.clone(),
                    column: attrs.column,
                }),
                Err(err) => errs.push(err),
            }
        }

        if let Some(err) = errs.collect() {
            return Err(err);
        }

        Ok(Self {
            ident: ast.ident.clone(),
            fields,
        })
    }
}
