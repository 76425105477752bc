use quarry_core::{
    schema::Shape,
    stmt::{Type, Value},
    Error, Result,
};

/// Typed access to a record's fields by field path.
///
/// Implemented by `#[derive(Record)]` and `#[derive(Embed)]` for structs,
/// and below for the supported scalar types. A path indexes the mapped
/// fields of each nested struct in turn; scalars require an empty path.
pub trait Field: Sized {
    /// Static description of the type.
    fn shape() -> Shape;

    /// Reads the value at `path`.
    fn get(&self, path: &[usize]) -> Result<Value>;

    /// Writes `value` at `path`, coercing it to the field's type.
    fn set(&mut self, path: &[usize], value: Value) -> Result<()>;
}

/// Error for a field path that does not lead to a field of `record`.
pub fn invalid_field_path(record: &str, path: &[usize]) -> Error {
    Error::invalid_statement(format!("record `{record}` has no field at path {path:?}"))
}

fn leaf(path: &[usize], ty: Type) -> Result<()> {
    if path.is_empty() {
        Ok(())
    } else {
        Err(Error::invalid_statement(format!(
            "field path {path:?} continues past a {ty:?} field"
        )))
    }
}

macro_rules! impl_integer_field {
    ( $( $ty:ty => $kind:ident ),* ) => {
        $(
            impl Field for $ty {
                fn shape() -> Shape {
                    Shape::scalar(Type::$kind)
                }

                fn get(&self, path: &[usize]) -> Result<Value> {
                    leaf(path, Type::$kind)?;
                    Ok(Value::from(*self))
                }

                fn set(&mut self, path: &[usize], value: Value) -> Result<()> {
                    leaf(path, Type::$kind)?;
                    // coercion has already range-checked the value
                    *self = match value.coerce(Type::$kind)? {
                        Value::I64(v) => v as $ty,
                        Value::U64(v) => v as $ty,
                        other => return Err(Error::type_conversion(other, Type::$kind)),
                    };
                    Ok(())
                }
            }
        )*
    };
}

impl_integer_field!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64
);

macro_rules! impl_field {
    ( $ty:ty => $kind:ident, |$value:ident| $get:expr, $pat:pat => $set:expr ) => {
        impl Field for $ty {
            fn shape() -> Shape {
                Shape::scalar(Type::$kind)
            }

            fn get(&self, path: &[usize]) -> Result<Value> {
                leaf(path, Type::$kind)?;
                let $value = self;
                Ok($get)
            }

            fn set(&mut self, path: &[usize], value: Value) -> Result<()> {
                leaf(path, Type::$kind)?;
                *self = match value.coerce(Type::$kind)? {
                    $pat => $set,
                    other => return Err(Error::type_conversion(other, Type::$kind)),
                };
                Ok(())
            }
        }
    };
}

impl_field!(bool => Bool, |v| Value::Bool(*v), Value::Bool(v) => v);
impl_field!(f32 => F32, |v| Value::F64(*v as f64), Value::F64(v) => v as f32);
impl_field!(f64 => F64, |v| Value::F64(*v), Value::F64(v) => v);
impl_field!(String => String, |v| Value::String(v.clone()), Value::String(v) => v);
impl_field!(Vec<u8> => Bytes, |v| Value::Bytes(v.clone()), Value::Bytes(v) => v);
impl_field!(jiff::civil::DateTime => DateTime, |v| Value::DateTime(*v), Value::DateTime(v) => v);

/// NULL maps to `None`. An absent embedded record reads as NULL in every
/// column and is allocated the first time a non-null value is written into
/// it.
impl<T: Field + Default> Field for Option<T> {
    fn shape() -> Shape {
        T::shape().nullable()
    }

    fn get(&self, path: &[usize]) -> Result<Value> {
        match self {
            Some(inner) => inner.get(path),
            None => Ok(Value::Null),
        }
    }

    fn set(&mut self, path: &[usize], value: Value) -> Result<()> {
        if value.is_null() {
            if path.is_empty() {
                *self = None;
            } else if let Some(inner) = self {
                inner.set(path, value)?;
            }
            return Ok(());
        }

        self.get_or_insert_with(T::default).set(path, value)
    }
}
