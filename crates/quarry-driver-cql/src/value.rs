use quarry_core::{
    stmt::{Type, Value as CoreValue},
    Error, Result,
};
use scylla::{
    cluster::metadata::{ColumnType, NativeType},
    value::{Counter, CqlTimestamp, CqlValue},
};

/// Days between 1970-01-01 and the zero point of the `date` encoding.
const DATE_EPOCH_OFFSET: i64 = 1 << 31;

/// Converts a core value into the CQL value the bound column expects.
///
/// Prepared statements are strictly typed, so the target type comes from
/// the statement's variable metadata rather than the value.
pub(crate) fn to_cql(value: &CoreValue, ty: &ColumnType<'_>) -> Result<Option<CqlValue>> {
    if value.is_null() {
        return Ok(None);
    }

    let ColumnType::Native(native) = ty else {
        return Err(Error::unsupported_feature(format!(
            "binding to CQL column type {ty:?} is not supported"
        )));
    };

    let value = value.clone();
    let cql = match native {
        NativeType::Boolean => match value.coerce(Type::Bool)? {
            CoreValue::Bool(v) => CqlValue::Boolean(v),
            other => return Err(Error::type_conversion(other, Type::Bool)),
        },
        NativeType::TinyInt => CqlValue::TinyInt(integer(value, Type::I8)? as i8),
        NativeType::SmallInt => CqlValue::SmallInt(integer(value, Type::I16)? as i16),
        NativeType::Int => CqlValue::Int(integer(value, Type::I32)? as i32),
        NativeType::BigInt => CqlValue::BigInt(integer(value, Type::I64)?),
        NativeType::Counter => CqlValue::Counter(Counter(integer(value, Type::I64)?)),
        NativeType::Float => CqlValue::Float(float(value, Type::F32)? as f32),
        NativeType::Double => CqlValue::Double(float(value, Type::F64)?),
        NativeType::Text => CqlValue::Text(text(value)?),
        NativeType::Ascii => CqlValue::Ascii(text(value)?),
        NativeType::Blob => match value.coerce(Type::Bytes)? {
            CoreValue::Bytes(v) => CqlValue::Blob(v),
            other => return Err(Error::type_conversion(other, Type::Bytes)),
        },
        NativeType::Timestamp => match value.coerce(Type::DateTime)? {
            CoreValue::DateTime(v) => CqlValue::Timestamp(CqlTimestamp(timestamp_millis(v)?)),
            other => return Err(Error::type_conversion(other, Type::DateTime)),
        },
        other => {
            return Err(Error::unsupported_feature(format!(
                "binding to CQL column type {other:?} is not supported"
            )))
        }
    };

    Ok(Some(cql))
}

/// Converts a value returned by the cluster into a core value.
pub(crate) fn from_cql(value: Option<CqlValue>) -> Result<CoreValue> {
    let Some(value) = value else {
        return Ok(CoreValue::Null);
    };

    Ok(match value {
        CqlValue::Empty => CoreValue::Null,
        CqlValue::Boolean(v) => CoreValue::Bool(v),
        CqlValue::TinyInt(v) => CoreValue::I64(v as i64),
        CqlValue::SmallInt(v) => CoreValue::I64(v as i64),
        CqlValue::Int(v) => CoreValue::I64(v as i64),
        CqlValue::BigInt(v) => CoreValue::I64(v),
        CqlValue::Counter(Counter(v)) => CoreValue::I64(v),
        CqlValue::Float(v) => CoreValue::F64(v as f64),
        CqlValue::Double(v) => CoreValue::F64(v),
        CqlValue::Text(v) | CqlValue::Ascii(v) => CoreValue::String(v),
        CqlValue::Blob(v) => CoreValue::Bytes(v),
        CqlValue::Timestamp(CqlTimestamp(millis)) => {
            let timestamp = jiff::Timestamp::from_millisecond(millis)?;
            CoreValue::DateTime(timestamp.to_zoned(jiff::tz::TimeZone::UTC).datetime())
        }
        CqlValue::Date(date) => {
            let days = date.0 as i64 - DATE_EPOCH_OFFSET;
            let date = jiff::civil::date(1970, 1, 1).checked_add(jiff::Span::new().try_days(days)?)?;
            CoreValue::DateTime(date.at(0, 0, 0, 0))
        }
        CqlValue::Uuid(v) => CoreValue::String(v.to_string()),
        CqlValue::Inet(v) => CoreValue::String(v.to_string()),
        other => {
            return Err(Error::unsupported_feature(format!(
                "reading CQL value {other:?} is not supported"
            )))
        }
    })
}

fn integer(value: CoreValue, ty: Type) -> Result<i64> {
    match value.coerce(ty)? {
        CoreValue::I64(v) => Ok(v),
        other => Err(Error::type_conversion(other, ty)),
    }
}

fn float(value: CoreValue, ty: Type) -> Result<f64> {
    match value.coerce(ty)? {
        CoreValue::F64(v) => Ok(v),
        other => Err(Error::type_conversion(other, ty)),
    }
}

fn text(value: CoreValue) -> Result<String> {
    match value.coerce(Type::String)? {
        CoreValue::String(v) => Ok(v),
        other => Err(Error::type_conversion(other, Type::String)),
    }
}

/// Civil date-times are stored as UTC instants.
fn timestamp_millis(value: jiff::civil::DateTime) -> Result<i64> {
    Ok(value
        .to_zoned(jiff::tz::TimeZone::UTC)?
        .timestamp()
        .as_millisecond())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn binds_by_column_type() {
        let int = ColumnType::Native(NativeType::Int);
        assert_eq!(to_cql(&CoreValue::I64(7), &int).unwrap(), Some(CqlValue::Int(7)));
        assert_eq!(to_cql(&CoreValue::from("7"), &int).unwrap(), Some(CqlValue::Int(7)));
        assert!(to_cql(&CoreValue::I64(i64::MAX), &int).unwrap_err().is_type_conversion());

        let text_ty = ColumnType::Native(NativeType::Text);
        assert_eq!(
            to_cql(&CoreValue::I64(7), &text_ty).unwrap(),
            Some(CqlValue::Text("7".into()))
        );
        assert_eq!(to_cql(&CoreValue::Null, &text_ty).unwrap(), None);
    }

    #[test]
    fn timestamps_are_utc_millis() {
        let dt = jiff::civil::date(1970, 1, 1).at(0, 0, 1, 0);
        let bound = to_cql(&CoreValue::DateTime(dt), &ColumnType::Native(NativeType::Timestamp)).unwrap();
        assert_eq!(bound, Some(CqlValue::Timestamp(CqlTimestamp(1000))));

        assert_eq!(
            from_cql(Some(CqlValue::Timestamp(CqlTimestamp(1000)))).unwrap(),
            CoreValue::DateTime(dt)
        );
    }

    #[test]
    fn reads_scalars() {
        assert_eq!(from_cql(None).unwrap(), CoreValue::Null);
        assert_eq!(from_cql(Some(CqlValue::Int(3))).unwrap(), CoreValue::I64(3));
        assert_eq!(
            from_cql(Some(CqlValue::Text("jet".into()))).unwrap(),
            CoreValue::from("jet")
        );
    }
}
