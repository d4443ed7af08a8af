use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ContributionType, LoggedOperation, NewLogEntry, OperationType, Position};

/// Name of the server-side routine invoked after each logged calculation.
pub const PROCESS_CALCULATION: &str = "ProcessCalculation";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Port to the payroll reference store and calculation log.
///
/// Every method is one unit of work: implementations acquire a connection
/// (or a transaction) for the duration of the call and release it before
/// returning.
#[async_trait]
pub trait PayrollRepository: Send + Sync {
    // Reference data, in store order
    async fn list_positions(&self) -> Result<Vec<Position>, RepositoryError>;
    async fn list_contribution_types(&self) -> Result<Vec<ContributionType>, RepositoryError>;
    async fn list_operation_types(&self) -> Result<Vec<OperationType>, RepositoryError>;

    /// Append one `calc_log` row in its own transaction.
    /// Nothing is written when this returns an error.
    async fn append_log_entry(
        &self,
        entry: &NewLogEntry,
    ) -> Result<(), RepositoryError>;

    /// Run `ProcessCalculation(position_id, operation_id)` in its own
    /// transaction and return the informational message it produced, if any.
    async fn process_calculation(
        &self,
        position_id: i32,
        operation_id: i32,
    ) -> Result<Option<String>, RepositoryError>;

    /// Most recent log entry joined with position and operation names.
    async fn last_operation(&self) -> Result<Option<LoggedOperation>, RepositoryError>;

    /// Up to `limit` log entries, newest first.
    async fn recent_operations(
        &self,
        limit: u32,
    ) -> Result<Vec<LoggedOperation>, RepositoryError>;
}
