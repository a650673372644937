//! Polars `AnyValue` conversion.

use fuzzjoin_model::Value;
use polars::prelude::AnyValue;

/// Converts a Polars cell into a dataset [`Value`].
///
/// Nulls become [`Value::Missing`]. Unsigned integers that do not fit in
/// `i64` become floats; types without a scalar counterpart are rendered as
/// text.
pub fn any_to_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Missing,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(v) => Value::Integer(i64::from(v)),
        AnyValue::Int16(v) => Value::Integer(i64::from(v)),
        AnyValue::Int32(v) => Value::Integer(i64::from(v)),
        AnyValue::Int64(v) => Value::Integer(v),
        AnyValue::UInt8(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt16(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt32(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer),
        AnyValue::Float32(v) => Value::Float(f64::from(v)),
        AnyValue::Float64(v) => Value::Float(v),
        AnyValue::String(s) => Value::Text(s.to_string()),
        AnyValue::StringOwned(s) => Value::Text(s.to_string()),
        other => {
            let s = other.to_string();
            // Strip surrounding quotes that might come from formatting
            if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
                Value::Text(s[1..s.len() - 1].to_string())
            } else {
                Value::Text(s)
            }
        }
    }
}
