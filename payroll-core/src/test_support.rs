//! In-memory [`PayrollRepository`] used by the unit tests of this crate.

use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use crate::db::repository::{PayrollRepository, RepositoryError};
use crate::models::{
    ContributionType, LoggedOperation, NewLogEntry, OperationMode, OperationType, Position,
};

#[derive(Debug, Default)]
pub struct FakeState {
    pub positions: Vec<Position>,
    pub contributions: Vec<ContributionType>,
    pub log: Vec<NewLogEntry>,
    pub procedure_calls: Vec<(i32, i32)>,
    pub procedure_message: Option<String>,
    pub fail_reference: bool,
    pub fail_append: bool,
    pub fail_procedure: bool,
    pub fail_read_back: bool,
}

#[derive(Debug, Default)]
pub struct FakeRepository {
    pub state: Mutex<FakeState>,
}

impl FakeRepository {
    /// Store holding one engineer position and the three standard rates.
    pub fn seeded() -> Self {
        let repo = Self::default();
        {
            let mut state = repo.state.lock().unwrap();
            state.positions = vec![
                Position {
                    id: 1,
                    name: "Инженер".to_string(),
                    base_salary: dec!(50000.00),
                },
                Position {
                    id: 2,
                    name: "Бухгалтер".to_string(),
                    base_salary: dec!(42000.00),
                },
            ];
            state.contributions = vec![
                ContributionType {
                    id: 1,
                    name: "Пенсионное страхование".to_string(),
                    rate: dec!(22),
                },
                ContributionType {
                    id: 2,
                    name: "Социальное страхование".to_string(),
                    rate: dec!(2.9),
                },
                ContributionType {
                    id: 3,
                    name: "Медицинское страхование".to_string(),
                    rate: dec!(5.1),
                },
            ];
            state.procedure_message = Some("processed".to_string());
        }
        repo
    }

    pub fn with<F: FnOnce(&mut FakeState)>(self, f: F) -> Self {
        f(&mut *self.state.lock().unwrap());
        self
    }

    pub fn log_len(&self) -> usize {
        self.state.lock().unwrap().log.len()
    }

    fn joined(state: &FakeState, entry: &NewLogEntry) -> LoggedOperation {
        let position_name = state
            .positions
            .iter()
            .find(|p| p.id == entry.position_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let operation_name = OperationMode::from_id(entry.operation_id)
            .map(|m| m.label().to_string())
            .unwrap_or_default();
        LoggedOperation {
            logged_at: entry.logged_at,
            position_name,
            operation_name,
            amount: entry.amount,
            message: entry.message.clone(),
        }
    }
}

fn unavailable() -> RepositoryError {
    RepositoryError::Connection("store offline".to_string())
}

#[async_trait]
impl PayrollRepository for FakeRepository {
    async fn list_positions(&self) -> Result<Vec<Position>, RepositoryError> {
        let state = self.state.lock().unwrap();
        if state.fail_reference {
            return Err(unavailable());
        }
        Ok(state.positions.clone())
    }

    async fn list_contribution_types(&self) -> Result<Vec<ContributionType>, RepositoryError> {
        let state = self.state.lock().unwrap();
        if state.fail_reference {
            return Err(unavailable());
        }
        Ok(state.contributions.clone())
    }

    async fn list_operation_types(&self) -> Result<Vec<OperationType>, RepositoryError> {
        Ok([OperationMode::NetPay, OperationMode::TotalContributions]
            .iter()
            .map(|m| OperationType {
                id: m.id(),
                name: m.label().to_string(),
            })
            .collect())
    }

    async fn append_log_entry(
        &self,
        entry: &NewLogEntry,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_append {
            return Err(RepositoryError::Database("calc_log is read-only".to_string()));
        }
        state.log.push(entry.clone());
        Ok(())
    }

    async fn process_calculation(
        &self,
        position_id: i32,
        operation_id: i32,
    ) -> Result<Option<String>, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_procedure {
            return Err(RepositoryError::Database(
                "PROCEDURE ProcessCalculation does not exist".to_string(),
            ));
        }
        state.procedure_calls.push((position_id, operation_id));
        Ok(state.procedure_message.clone())
    }

    async fn last_operation(&self) -> Result<Option<LoggedOperation>, RepositoryError> {
        Ok(self.recent_operations(1).await?.into_iter().next())
    }

    async fn recent_operations(
        &self,
        limit: u32,
    ) -> Result<Vec<LoggedOperation>, RepositoryError> {
        let state = self.state.lock().unwrap();
        if state.fail_read_back {
            return Err(RepositoryError::Database("join failed".to_string()));
        }
        Ok(state
            .log
            .iter()
            .rev()
            .take(limit as usize)
            .map(|entry| Self::joined(&state, entry))
            .collect())
    }
}
