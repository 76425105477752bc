use mysql_async::prelude::ToValue;
use quarry_core::stmt::Value as CoreValue;

#[derive(Debug)]
pub struct Value<'a>(&'a CoreValue);

impl<'a> From<&'a CoreValue> for Value<'a> {
    fn from(value: &'a CoreValue) -> Self {
        Self(value)
    }
}

impl Value<'_> {
    /// Converts a value returned by the server into a core value.
    ///
    /// Text columns arrive as bytes over the binary protocol; valid UTF-8
    /// becomes a string and the materializer coerces it back when the field
    /// wants bytes.
    pub fn from_sql(value: mysql_async::Value) -> CoreValue {
        use mysql_async::Value as SqlValue;

        match value {
            SqlValue::NULL => CoreValue::Null,
            SqlValue::Int(v) => CoreValue::I64(v),
            SqlValue::UInt(v) => CoreValue::U64(v),
            SqlValue::Float(v) => CoreValue::F64(v as f64),
            SqlValue::Double(v) => CoreValue::F64(v),
            SqlValue::Bytes(v) => match String::from_utf8(v) {
                Ok(text) => CoreValue::String(text),
                Err(err) => CoreValue::Bytes(err.into_bytes()),
            },
            SqlValue::Date(year, month, day, hour, minute, second, micros) => {
                // zero dates have no civil representation
                jiff::civil::DateTime::new(
                    year as i16,
                    month as i8,
                    day as i8,
                    hour as i8,
                    minute as i8,
                    second as i8,
                    micros as i32 * 1000,
                )
                .map(CoreValue::DateTime)
                .unwrap_or(CoreValue::Null)
            }
            SqlValue::Time(negative, days, hours, minutes, seconds, _) => {
                let hours = days * 24 + hours as u32;
                let sign = if negative { "-" } else { "" };
                CoreValue::String(format!("{sign}{hours:02}:{minutes:02}:{seconds:02}"))
            }
        }
    }
}

impl ToValue for Value<'_> {
    fn to_value(&self) -> mysql_async::Value {
        match self.0 {
            CoreValue::Null => mysql_async::Value::NULL,
            CoreValue::Bool(value) => value.to_value(),
            CoreValue::I64(value) => value.to_value(),
            CoreValue::U64(value) => value.to_value(),
            CoreValue::F64(value) => value.to_value(),
            CoreValue::String(value) => value.to_value(),
            CoreValue::Bytes(value) => mysql_async::Value::Bytes(value.clone()),
            CoreValue::DateTime(value) => mysql_async::Value::Date(
                value.year() as u16,
                value.month() as u8,
                value.day() as u8,
                value.hour() as u8,
                value.minute() as u8,
                value.second() as u8,
                (value.subsec_nanosecond() / 1000) as u32,
            ),
        }
    }
}
