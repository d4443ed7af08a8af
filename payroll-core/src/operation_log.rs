//! Persisting a calculation: log row, stored procedure, read-back.
//!
//! | Step | Action | On failure |
//! |------|--------|------------|
//! | 1 | append the `calc_log` row | rolled back, save aborted |
//! | 2 | `ProcessCalculation(position, operation)` | rolled back, save aborted, step 1 stays committed |
//! | 3 | read the newest log entry back | [`DisplayWarning`], save still succeeds |

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::db::repository::{PROCESS_CALCULATION, PayrollRepository, RepositoryError};
use crate::error::{PayrollError, SaveStep};
use crate::models::{CalculationResult, LoggedOperation, NewLogEntry};

/// Non-fatal failure to show the last operation after a successful save.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("could not load the last operation: {source}")]
pub struct DisplayWarning {
    #[source]
    pub source: RepositoryError,
}

/// What a successful save produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// The row that was appended to the log.
    pub entry: NewLogEntry,
    /// Informational message returned by the stored procedure, if any.
    pub procedure_message: Option<String>,
    /// Newest log entry as read back after the save.
    pub last_operation: Option<LoggedOperation>,
    pub warning: Option<DisplayWarning>,
}

/// Writes calculations to the log through a borrowed repository handle.
pub struct OperationLogger<'a> {
    repo: &'a dyn PayrollRepository,
}

impl<'a> OperationLogger<'a> {
    pub fn new(repo: &'a dyn PayrollRepository) -> Self {
        Self { repo }
    }

    /// Save `result`, stamped with the current time.
    pub async fn save(
        &self,
        result: &CalculationResult,
    ) -> Result<SaveOutcome, PayrollError> {
        self.save_at(result, Utc::now()).await
    }

    /// Save `result` with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// [`PayrollError::Persistence`] when step 1 or step 2 fails. A failed
    /// read-back is reported through [`SaveOutcome::warning`] instead.
    #[instrument(skip_all, fields(position = result.position_id, operation = result.mode.id()))]
    pub async fn save_at(
        &self,
        result: &CalculationResult,
        logged_at: DateTime<Utc>,
    ) -> Result<SaveOutcome, PayrollError> {
        let entry = NewLogEntry::from_result(result, logged_at);

        self.repo
            .append_log_entry(&entry)
            .await
            .map_err(|source| PayrollError::Persistence {
                step: SaveStep::WriteLog,
                source,
            })?;
        info!(amount = %entry.amount, "calculation logged");

        let procedure_message = self
            .repo
            .process_calculation(entry.position_id, entry.operation_id)
            .await
            .map_err(|source| PayrollError::Persistence {
                step: SaveStep::InvokeProcedure,
                source,
            })?;
        info!(procedure = PROCESS_CALCULATION, message = ?procedure_message, "procedure completed");

        let (last_operation, warning) = match self.repo.last_operation().await {
            Ok(last) => (last, None),
            Err(source) => {
                warn!(error = %source, "last operation unavailable");
                (None, Some(DisplayWarning { source }))
            }
        };

        Ok(SaveOutcome {
            entry,
            procedure_message,
            last_operation,
            warning,
        })
    }

    /// Newest log entry joined with its position and operation names.
    pub async fn last_operation(&self) -> Result<Option<LoggedOperation>, PayrollError> {
        self.repo
            .last_operation()
            .await
            .map_err(PayrollError::ReadFailed)
    }

    /// Up to `limit` log entries, newest first.
    pub async fn history(
        &self,
        limit: u32,
    ) -> Result<Vec<LoggedOperation>, PayrollError> {
        self.repo
            .recent_operations(limit)
            .await
            .map_err(PayrollError::ReadFailed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::OperationMode;
    use crate::test_support::FakeRepository;

    fn net_pay_result() -> CalculationResult {
        CalculationResult {
            position_id: 1,
            position_name: "Инженер".to_string(),
            mode: OperationMode::NetPay,
            amount: dec!(35000.004),
            gross_salary: dec!(50000.00),
            total_percent: dec!(30),
            total_contribution: dec!(14999.996),
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn save_runs_all_three_steps() {
        let repo = FakeRepository::seeded();
        let logger = OperationLogger::new(&repo);

        let outcome = logger.save_at(&net_pay_result(), noon()).await.unwrap();

        assert_eq!(outcome.entry.message, "Расчет Заработная плата к выплате для Инженер");
        assert_eq!(outcome.entry.amount, dec!(35000.00));
        assert_eq!(outcome.entry.operation_id, 1);
        assert_eq!(outcome.procedure_message.as_deref(), Some("processed"));
        assert_eq!(outcome.warning, None);

        let last = outcome.last_operation.expect("read-back should find the row");
        assert_eq!(last.logged_at, noon());
        assert_eq!(last.position_name, "Инженер");
        assert_eq!(last.operation_name, "Заработная плата к выплате");
        assert_eq!(repo.state.lock().unwrap().procedure_calls, vec![(1, 1)]);
    }

    #[tokio::test]
    async fn failed_log_write_skips_the_procedure() {
        let repo = FakeRepository::seeded().with(|s| s.fail_append = true);
        let logger = OperationLogger::new(&repo);

        let result = logger.save_at(&net_pay_result(), noon()).await;

        assert!(matches!(
            result,
            Err(PayrollError::Persistence {
                step: SaveStep::WriteLog,
                ..
            })
        ));
        assert_eq!(repo.log_len(), 0);
        assert!(repo.state.lock().unwrap().procedure_calls.is_empty());
    }

    #[tokio::test]
    async fn failed_procedure_leaves_log_row_committed() {
        let repo = FakeRepository::seeded().with(|s| s.fail_procedure = true);
        let logger = OperationLogger::new(&repo);

        let result = logger.save_at(&net_pay_result(), noon()).await;

        assert!(matches!(
            result,
            Err(PayrollError::Persistence {
                step: SaveStep::InvokeProcedure,
                ..
            })
        ));
        let last = logger.last_operation().await.unwrap().unwrap();
        assert_eq!(last.logged_at, noon());
        assert_eq!(last.amount, dec!(35000.00));
    }

    #[tokio::test]
    async fn failed_read_back_is_only_a_warning() {
        let repo = FakeRepository::seeded().with(|s| s.fail_read_back = true);
        let logger = OperationLogger::new(&repo);

        let outcome = logger.save_at(&net_pay_result(), noon()).await.unwrap();

        assert_eq!(outcome.last_operation, None);
        assert_eq!(
            outcome.warning,
            Some(DisplayWarning {
                source: RepositoryError::Database("join failed".to_string())
            })
        );
        assert_eq!(repo.log_len(), 1);
    }

    #[tokio::test]
    async fn procedure_without_message_is_fine() {
        let repo = FakeRepository::seeded().with(|s| s.procedure_message = None);
        let logger = OperationLogger::new(&repo);

        let outcome = logger.save_at(&net_pay_result(), noon()).await.unwrap();

        assert_eq!(outcome.procedure_message, None);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let repo = FakeRepository::seeded();
        let logger = OperationLogger::new(&repo);
        let mut second = net_pay_result();
        second.mode = OperationMode::TotalContributions;
        second.amount = dec!(15000);

        logger.save_at(&net_pay_result(), noon()).await.unwrap();
        logger
            .save_at(&second, noon() + chrono::Duration::minutes(1))
            .await
            .unwrap();

        let history = logger.history(10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].operation_name, "Сумма страховых взносов");
        assert_eq!(history[1].operation_name, "Заработная плата к выплате");
    }

    #[tokio::test]
    async fn read_failures_are_reported_as_read_errors() {
        let repo = FakeRepository::seeded().with(|s| s.fail_read_back = true);
        let logger = OperationLogger::new(&repo);
        let read_failed =
            || PayrollError::ReadFailed(RepositoryError::Database("join failed".to_string()));

        assert_eq!(logger.last_operation().await, Err(read_failed()));
        assert_eq!(logger.history(5).await, Err(read_failed()));
        assert!(read_failed().is_recoverable());
    }
}
