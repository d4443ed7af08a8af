use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use payroll_core::{
    ContributionType, LoggedOperation, NewLogEntry, OperationType, PayrollRepository, Position,
    RepositoryError,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, warn};

use crate::decimal::{decimal_to_sql, get_decimal};

/// Map a sqlx failure onto the port's error type. Failures to reach the
/// database at all become `Connection`; everything else is `Database`.
pub(crate) fn db_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Configuration(_) => RepositoryError::Connection(e.to_string()),
        other => RepositoryError::Database(other.to_string()),
    }
}

fn get<'r, T>(
    row: &'r SqliteRow,
    column: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get '{}': {}", column, e)))
}

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open `connection_string`, which may be a bare file path (created if
    /// missing), `:memory:`, or a `sqlite:` URL.
    ///
    /// In-memory databases get a single long-lived connection so that every
    /// unit of work sees the same data.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let in_memory = connection_string == ":memory:"
            || connection_string.starts_with("sqlite::memory:");

        let options = if connection_string == ":memory:" {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else if connection_string.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(connection_string)
                .with_context(|| format!("Invalid SQLite URL: {}", connection_string))?
        } else {
            SqliteConnectOptions::new()
                .filename(connection_string)
                .create_if_missing(true)
        };

        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", connection_string))?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Execute every `.sql` file in `seeds_dir`, in filename order.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "seed applied");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Body of the emulated `ProcessCalculation` procedure.
    ///
    /// Checks that both keys exist, bumps the per-(position, operation)
    /// counter in `calc_summary`, and reports the new count.
    async fn run_process_calculation(
        conn: &mut SqliteConnection,
        position_id: i32,
        operation_id: i32,
    ) -> Result<String, RepositoryError> {
        let names = sqlx::query(
            "SELECT p.p_name, ot.op_name
             FROM positions p, operation_type ot
             WHERE p.id_position = ? AND ot.id_operation = ?",
        )
        .bind(position_id)
        .bind(operation_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            RepositoryError::Database(format!(
                "ProcessCalculation: unknown position {} or operation {}",
                position_id, operation_id
            ))
        })?;
        let position_name: String = get(&names, "p_name")?;
        let operation_name: String = get(&names, "op_name")?;

        sqlx::query(
            "INSERT INTO calc_summary (id_position, id_operation, calc_count, last_processed)
             VALUES (?, ?, 1, ?)
             ON CONFLICT (id_position, id_operation)
             DO UPDATE SET calc_count = calc_count + 1, last_processed = excluded.last_processed",
        )
        .bind(position_id)
        .bind(operation_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;

        let count: i64 = sqlx::query_scalar(
            "SELECT calc_count FROM calc_summary WHERE id_position = ? AND id_operation = ?",
        )
        .bind(position_id)
        .bind(operation_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error)?;

        Ok(format!(
            "Расчёт обработан: {} — {} (всего: {})",
            position_name, operation_name, count
        ))
    }
}

fn row_to_logged_operation(row: &SqliteRow) -> Result<LoggedOperation, RepositoryError> {
    Ok(LoggedOperation {
        logged_at: get::<DateTime<Utc>>(row, "log_datetime")?,
        position_name: get(row, "p_name")?,
        operation_name: get(row, "op_name")?,
        amount: get_decimal(row, "calculated_amount")?,
        message: get(row, "log_message")?,
    })
}

const LOGGED_OPERATIONS: &str = "SELECT cl.log_datetime, p.p_name, ot.op_name,
            cl.calculated_amount, cl.log_message
     FROM calc_log cl
     JOIN positions p ON cl.id_position = p.id_position
     JOIN operation_type ot ON cl.id_operation = ot.id_operation
     ORDER BY cl.log_datetime DESC, cl.id_log DESC
     LIMIT ?";

#[async_trait]
impl PayrollRepository for SqliteRepository {
    async fn list_positions(&self) -> Result<Vec<Position>, RepositoryError> {
        let rows = sqlx::query("SELECT id_position, p_name, p_salary FROM positions")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                Ok(Position {
                    id: get(row, "id_position")?,
                    name: get(row, "p_name")?,
                    base_salary: get_decimal(row, "p_salary")?,
                })
            })
            .collect()
    }

    async fn list_contribution_types(&self) -> Result<Vec<ContributionType>, RepositoryError> {
        let rows = sqlx::query("SELECT id_donat, d_name, size FROM donations_type")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                Ok(ContributionType {
                    id: get(row, "id_donat")?,
                    name: get(row, "d_name")?,
                    rate: get_decimal(row, "size")?,
                })
            })
            .collect()
    }

    async fn list_operation_types(&self) -> Result<Vec<OperationType>, RepositoryError> {
        let rows = sqlx::query("SELECT id_operation, op_name FROM operation_type ORDER BY id_operation")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                Ok(OperationType {
                    id: get(row, "id_operation")?,
                    name: get(row, "op_name")?,
                })
            })
            .collect()
    }

    async fn append_log_entry(
        &self,
        entry: &NewLogEntry,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let inserted = sqlx::query(
            "INSERT INTO calc_log (log_datetime, log_message, id_position, id_operation, calculated_amount)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.logged_at)
        .bind(&entry.message)
        .bind(entry.position_id)
        .bind(entry.operation_id)
        .bind(decimal_to_sql(entry.amount))
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => tx.commit().await.map_err(db_error),
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "rollback after failed log insert failed");
                }
                Err(db_error(e))
            }
        }
    }

    async fn process_calculation(
        &self,
        position_id: i32,
        operation_id: i32,
    ) -> Result<Option<String>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        match Self::run_process_calculation(&mut tx, position_id, operation_id).await {
            Ok(message) => {
                tx.commit().await.map_err(db_error)?;
                Ok(Some(message))
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "rollback after failed procedure failed");
                }
                Err(e)
            }
        }
    }

    async fn last_operation(&self) -> Result<Option<LoggedOperation>, RepositoryError> {
        let row = sqlx::query(LOGGED_OPERATIONS)
            .bind(1_i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(row_to_logged_operation).transpose()
    }

    async fn recent_operations(
        &self,
        limit: u32,
    ) -> Result<Vec<LoggedOperation>, RepositoryError> {
        let rows = sqlx::query(LOGGED_OPERATIONS)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(row_to_logged_operation).collect()
    }
}
