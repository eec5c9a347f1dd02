//! Per-cell serialization of query results into tabular fields.

use base64::Engine;
use base64::engine::general_purpose;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

use crate::error::Result;

/// Render one result cell as a CSV field.
///
/// Serialization rules, in order: SQL NULL becomes an empty field; binary
/// payloads are base64-encoded; everything else takes its natural text form.
/// A value whose text form is unavailable is written as an empty field with
/// a warning — a degenerate cell never aborts the row.
pub(crate) fn field_text(row: &SqliteRow, index: usize) -> Result<String> {
    let value = row.try_get_raw(index)?;
    if value.is_null() {
        return Ok(String::new());
    }
    let type_name = value.type_info().name().to_string();
    drop(value);

    let decoded = match type_name.as_str() {
        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(|bytes| general_purpose::STANDARD.encode(bytes)),
        "INTEGER" => row.try_get::<i64, _>(index).map(|v| v.to_string()),
        "REAL" => row.try_get::<f64, _>(index).map(|v| v.to_string()),
        _ => row.try_get::<String, _>(index),
    };

    match decoded {
        Ok(text) => Ok(text),
        Err(error) => {
            tracing::warn!(
                column_index = index,
                column_type = %type_name,
                error = %error,
                "Value has no usable text form; writing empty field"
            );
            Ok(String::new())
        }
    }
}
