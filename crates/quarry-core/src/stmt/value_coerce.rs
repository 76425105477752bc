use super::{value::DATETIME_FORMAT, Type, Value};
use crate::{Error, Result};

use jiff::civil::DateTime;

impl Value {
    /// Converts the value into the canonical variant for `ty`.
    ///
    /// Signed integer types coerce to `Value::I64`, unsigned ones to
    /// `Value::U64`, floats to `Value::F64`, each after checking the
    /// destination range. Byte strings are decoded as UTF-8 before being
    /// interpreted as text, numbers or date-times. Any non-null value has a
    /// text form. Null never coerces; optional fields handle it before
    /// calling this.
    pub fn coerce(self, ty: Type) -> Result<Value> {
        if self.is_null() {
            return Err(Error::type_conversion(self, ty));
        }

        if let Value::Bytes(bytes) = self {
            return match ty {
                Type::Bytes => Ok(Value::Bytes(bytes)),
                _ => match String::from_utf8(bytes) {
                    Ok(text) => coerce_text(text, ty),
                    Err(err) => Err(Error::type_conversion(Value::Bytes(err.into_bytes()), ty)),
                },
            };
        }

        match ty {
            Type::String => match self.to_text() {
                Some(text) => Ok(Value::String(text)),
                None => Err(Error::type_conversion(self, ty)),
            },
            Type::Bytes => match self {
                Value::String(text) => Ok(Value::Bytes(text.into_bytes())),
                other => Err(Error::type_conversion(other, ty)),
            },
            Type::Bool => match self {
                Value::Bool(v) => Ok(Value::Bool(v)),
                Value::I64(v) => Ok(Value::Bool(v != 0)),
                Value::U64(v) => Ok(Value::Bool(v != 0)),
                Value::String(text) => coerce_text(text, ty),
                other => Err(Error::type_conversion(other, ty)),
            },
            Type::F32 | Type::F64 => match self {
                Value::F64(v) => coerce_float(v, ty),
                Value::I64(v) => coerce_float(v as f64, ty),
                Value::U64(v) => coerce_float(v as f64, ty),
                Value::String(text) => coerce_text(text, ty),
                other => Err(Error::type_conversion(other, ty)),
            },
            Type::DateTime => match self {
                Value::DateTime(v) => Ok(Value::DateTime(v)),
                Value::String(text) => coerce_text(text, ty),
                other => Err(Error::type_conversion(other, ty)),
            },
            Type::Null => Err(Error::type_conversion(self, ty)),
            _ => {
                if let Value::String(text) = self {
                    return coerce_text(text, ty);
                }

                let integer = match self {
                    Value::I64(v) => v as i128,
                    Value::U64(v) => v as i128,
                    Value::Bool(v) => v as i128,
                    Value::F64(v) if v.fract() == 0.0 && v.is_finite() => v as i128,
                    _ => return Err(Error::type_conversion(self, ty)),
                };

                coerce_integer(integer, ty).ok_or_else(|| Error::type_conversion(self, ty))
            }
        }
    }
}

fn coerce_integer(value: i128, ty: Type) -> Option<Value> {
    let (min, max) = ty.integer_bounds()?;
    if value < min || value > max {
        return None;
    }

    Some(if ty.is_signed_integer() {
        Value::I64(value as i64)
    } else {
        Value::U64(value as u64)
    })
}

fn coerce_float(value: f64, ty: Type) -> Result<Value> {
    if ty == Type::F32 && value.is_finite() && value.abs() > f32::MAX as f64 {
        return Err(Error::type_conversion(Value::F64(value), ty));
    }
    Ok(Value::F64(value))
}

fn coerce_text(text: String, ty: Type) -> Result<Value> {
    let trimmed = text.trim();

    let coerced = match ty {
        Type::String => return Ok(Value::String(text)),
        Type::Bytes => return Ok(Value::Bytes(text.into_bytes())),
        Type::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        Type::F32 | Type::F64 => trimmed
            .parse::<f64>()
            .ok()
            .and_then(|v| coerce_float(v, ty).ok()),
        Type::DateTime => parse_datetime(trimmed).map(Value::DateTime),
        Type::Null => None,
        _ => match trimmed.parse::<i128>() {
            Ok(v) => coerce_integer(v, ty),
            Err(_) => match trimmed.parse::<f64>() {
                Ok(v) if v.fract() == 0.0 && v.is_finite() => coerce_integer(v as i128, ty),
                _ => None,
            },
        },
    };

    coerced.ok_or_else(|| Error::type_conversion(Value::String(text), ty))
}

fn parse_datetime(text: &str) -> Option<DateTime> {
    DateTime::strptime(DATETIME_FORMAT, text)
        .ok()
        .or_else(|| text.parse::<DateTime>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bytes_to_text_decodes_utf8() {
        let value = Value::Bytes(b"hello".to_vec()).coerce(Type::String).unwrap();
        assert_eq!(value, Value::String("hello".into()));
    }

    #[test]
    fn bytes_to_float_parses_text() {
        let value = Value::Bytes(b"2.5".to_vec()).coerce(Type::F64).unwrap();
        assert_eq!(value, Value::F64(2.5));
    }

    #[test]
    fn invalid_utf8_fails() {
        let err = Value::Bytes(vec![0xff, 0xfe]).coerce(Type::String).unwrap_err();
        assert!(err.is_type_conversion());
    }

    #[test]
    fn anything_to_text() {
        assert_eq!(Value::I64(42).coerce(Type::String).unwrap(), Value::String("42".into()));
        assert_eq!(Value::Bool(true).coerce(Type::String).unwrap(), Value::String("true".into()));
        assert_eq!(Value::F64(1.5).coerce(Type::String).unwrap(), Value::String("1.5".into()));

        let dt = jiff::civil::date(2020, 1, 2).at(3, 4, 5, 0);
        assert_eq!(
            Value::DateTime(dt).coerce(Type::String).unwrap(),
            Value::String("2020-01-02 03:04:05".into())
        );
    }

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(Value::I64(127).coerce(Type::I8).unwrap(), Value::I64(127));
        assert!(Value::I64(128).coerce(Type::I8).unwrap_err().is_type_conversion());
        assert!(Value::I64(-1).coerce(Type::U32).unwrap_err().is_type_conversion());
        assert_eq!(Value::U64(5).coerce(Type::I16).unwrap(), Value::I64(5));
        assert_eq!(Value::I64(5).coerce(Type::U64).unwrap(), Value::U64(5));
    }

    #[test]
    fn float_to_integer_requires_integral_value() {
        assert_eq!(Value::F64(3.0).coerce(Type::I64).unwrap(), Value::I64(3));
        assert!(Value::F64(3.5).coerce(Type::I64).is_err());
    }

    #[test]
    fn integer_to_float() {
        assert_eq!(Value::I64(3).coerce(Type::F32).unwrap(), Value::F64(3.0));
    }

    #[test]
    fn text_to_numbers() {
        assert_eq!(Value::from("17").coerce(Type::I32).unwrap(), Value::I64(17));
        assert_eq!(Value::from(" 1e2 ").coerce(Type::U8).unwrap(), Value::U64(100));
        assert!(Value::from("abc").coerce(Type::I64).is_err());
    }

    #[test]
    fn text_to_datetime() {
        let expect = jiff::civil::date(2019, 12, 31).at(23, 59, 58, 0);
        assert_eq!(
            Value::from("2019-12-31 23:59:58").coerce(Type::DateTime).unwrap(),
            Value::DateTime(expect)
        );
        assert_eq!(
            Value::Bytes(b"2019-12-31T23:59:58".to_vec()).coerce(Type::DateTime).unwrap(),
            Value::DateTime(expect)
        );
    }

    #[test]
    fn null_never_coerces() {
        let err = Value::Null.coerce(Type::I64).unwrap_err();
        assert_eq!(err.to_string(), "cannot convert Null to I64");
    }

    #[test]
    fn error_names_both_types() {
        let err = Value::Bool(true).coerce(Type::DateTime).unwrap_err();
        assert_eq!(err.to_string(), "cannot convert Bool to DateTime");
    }
}
