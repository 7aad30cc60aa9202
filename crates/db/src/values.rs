//! Convert sea-query values to rusqlite bind params.

use rusqlite::types::Value as SqlValue;
use sea_query::{Value, Values};

/// Convert `sea_query::Values` into owned rusqlite values, in placeholder order.
pub fn bind_values(values: &Values) -> Vec<SqlValue> {
    values.0.iter().map(to_sql_value).collect()
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Bool(Some(b)) => SqlValue::Integer(i64::from(*b)),
        Value::Int(Some(i)) => SqlValue::Integer(i64::from(*i)),
        Value::BigInt(Some(i)) => SqlValue::Integer(*i),
        Value::Unsigned(Some(u)) => SqlValue::Integer(i64::from(*u)),
        Value::Double(Some(f)) => SqlValue::Real(*f),
        Value::String(Some(s)) => SqlValue::Text(s.as_str().to_owned()),
        Value::Bytes(Some(b)) => SqlValue::Blob(b.as_slice().to_vec()),
        _ => SqlValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_and_scalars_map_to_sqlite_types() {
        let values = Values(vec![
            7u32.into(),
            Option::<u32>::None.into(),
            true.into(),
            Option::<bool>::None.into(),
            "team-1".into(),
        ]);
        assert_eq!(
            bind_values(&values),
            vec![
                SqlValue::Integer(7),
                SqlValue::Null,
                SqlValue::Integer(1),
                SqlValue::Null,
                SqlValue::Text("team-1".to_string()),
            ]
        );
    }
}
