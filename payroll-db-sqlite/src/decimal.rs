use payroll_core::RepositoryError;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

/// Read a NUMERIC column as a [`Decimal`].
///
/// SQLite stores NUMERIC values as INTEGER or REAL depending on the value,
/// and keeps text that does not look like a number as TEXT; all three are
/// accepted. NULL is an error: every money column is `NOT NULL`.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Err(RepositoryError::Database(format!(
            "Column '{}' is NULL",
            column
        )));
    }

    let type_name = value_ref.type_info().name().to_string();

    match type_name.as_str() {
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        "TEXT" | "NUMERIC" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            val.trim().parse::<Decimal>().map_err(|e| {
                RepositoryError::Database(format!("Failed to parse decimal '{}': {}", val, e))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Text form bound into NUMERIC columns; SQLite converts it to the
/// narrowest exact storage class.
pub fn decimal_to_sql(d: Decimal) -> String {
    d.normalize().to_string()
}
