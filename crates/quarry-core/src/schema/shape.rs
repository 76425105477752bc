use crate::stmt::Type;

/// Static description of a record type, produced by `#[derive(Record)]` and
/// `#[derive(Embed)]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A record with named fields. Field paths index into `fields`.
    Struct(StructShape),

    /// A leaf value stored in a single column.
    Scalar { ty: Type, nullable: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructShape {
    pub name: &'static str,
    pub fields: Vec<FieldShape>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    pub name: &'static str,

    /// Column name from `#[column("...")]`.
    pub column: Option<&'static str>,

    pub shape: Shape,
}

impl Shape {
    pub fn scalar(ty: Type) -> Shape {
        Shape::Scalar {
            ty,
            nullable: false,
        }
    }

    /// Marks a scalar shape nullable. Struct shapes are returned unchanged.
    pub fn nullable(self) -> Shape {
        match self {
            Shape::Scalar { ty, .. } => Shape::Scalar { ty, nullable: true },
            shape => shape,
        }
    }

    pub fn as_struct(&self) -> Option<&StructShape> {
        match self {
            Shape::Struct(shape) => Some(shape),
            Shape::Scalar { .. } => None,
        }
    }
}
