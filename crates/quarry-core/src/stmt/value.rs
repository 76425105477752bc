use super::Type;

use jiff::civil::DateTime;

/// Canonical text form of temporal values, used for cache keys and for
/// backends that cannot bind temporal values natively.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A backend value.
///
/// Every value read from or written to a backend passes through this type.
/// Field types narrower than the variants here (`i8`, `u16`, `f32`, ...) are
/// widened on the way out and range-checked on the way in by
/// [`Value::coerce`].
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 64-bit integer
    I64(i64),

    /// Unsigned 64-bit integer
    U64(u64),

    /// 64-bit float
    F64(f64),

    /// String value
    String(String),

    /// Byte string
    Bytes(Vec<u8>),

    /// Civil date-time
    DateTime(DateTime),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the type of the variant.
    pub fn infer_ty(&self) -> Type {
        match self {
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Bool,
            Value::I64(_) => Type::I64,
            Value::U64(_) => Type::U64,
            Value::F64(_) => Type::F64,
            Value::String(_) => Type::String,
            Value::Bytes(_) => Type::Bytes,
            Value::DateTime(_) => Type::DateTime,
        }
    }

    /// Returns the canonical text form of the value, or `None` for null.
    ///
    /// Byte strings that are not valid UTF-8 are rendered lossily.
    pub fn to_text(&self) -> Option<String> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(v) => v.to_string(),
            Value::I64(v) => v.to_string(),
            Value::U64(v) => v.to_string(),
            Value::F64(v) => v.to_string(),
            Value::String(v) => v.clone(),
            Value::Bytes(v) => String::from_utf8_lossy(v).into_owned(),
            Value::DateTime(v) => format_datetime(*v),
        })
    }

    /// Returns the value as an `i64` when it holds an integral number.
    pub fn to_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(v) => Some(v),
            Value::U64(v) => i64::try_from(v).ok(),
            Value::F64(v) if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 => {
                Some(v as i64)
            }
            Value::Bool(v) => Some(v as i64),
            _ => None,
        }
    }

    /// Returns the value as an `f64` when it holds a number.
    pub fn to_f64(&self) -> Option<f64> {
        match *self {
            Value::I64(v) => Some(v as f64),
            Value::U64(v) => Some(v as f64),
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Renders the value as a SQL literal. Only used for logging.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::String(v) => format!("'{}'", v.replace('\'', "''")),
            Value::DateTime(v) => format!("'{}'", format_datetime(*v)),
            Value::Bytes(v) => {
                let mut out = String::with_capacity(v.len() * 2 + 3);
                out.push_str("x'");
                for byte in v {
                    out.push_str(&format!("{byte:02x}"));
                }
                out.push('\'');
                out
            }
            other => other.to_text().unwrap_or_default(),
        }
    }
}

pub(crate) fn format_datetime(value: DateTime) -> String {
    value.strftime(DATETIME_FORMAT).to_string()
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! impl_from_signed {
    ( $( $ty:ty ),* ) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::I64(value as i64)
                }
            }
        )*
    };
}

macro_rules! impl_from_unsigned {
    ( $( $ty:ty ),* ) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::U64(value as u64)
                }
            }
        )*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::F64(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<DateTime> for Value {
    fn from(value: DateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Value::from(value),
            None => Value::Null,
        }
    }
}
