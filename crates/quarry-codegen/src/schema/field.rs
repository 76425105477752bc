use super::{Column, ErrorSet};

#[derive(Debug)]
pub(crate) struct Field {
    /// Position among the record's mapped fields. Field paths index by this.
    pub(crate) index: usize,

    /// Rust identifier of the field
    pub(crate) ident: syn::Ident,

    /// Field type
    pub(crate) ty: syn::Type,

    /// Column name from `#[column("...")]`
    pub(crate) column: Option<Column>,
}

#[derive(Debug, Default)]
pub(crate) struct FieldAttr {
    pub(crate) column: Option<Column>,

    /// True if the field is annotated with `#[skip]`
    pub(crate) skip: bool,
}

impl FieldAttr {
    pub(super) fn from_ast(field: &syn::Field) -> syn::Result<FieldAttr> {
        let mut errs = ErrorSet::new();
        let mut attrs = FieldAttr::default();

        for attr in &field.attrs {
            if attr.path().is_ident("column") {
                if attrs.column.is_some() {
                    errs.push(syn::Error::new_spanned(attr, "duplicate #[column] attribute"));
                    continue;
                }
                match Column::from_ast(attr) {
                    Ok(column) => attrs.column = Some(column),
                    Err(err) => errs.push(err),
                }
            } else if attr.path().is_ident("skip") {
                if attrs.skip {
                    errs.push(syn::Error::new_spanned(attr, "duplicate #[skip] attribute"));
                } else if let Err(err) = attr.meta.require_path_only() {
                    errs.push(err);
                } else {
                    attrs.skip = true;
                }
            }
        }

        if attrs.skip && attrs.column.is_some() {
            errs.push(syn::Error::new_spanned(
                field,
                "#[skip] fields cannot carry a #[column] attribute",
            ));
        }

        match errs.collect() {
            Some(err) => Err(err),
            None => Ok(attrs),
        }
    }
}
