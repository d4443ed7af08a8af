//! State behind one calculator window or shell.
//!
//! The session owns the repository handle and the reference snapshot, keeps
//! the user's current selection, and holds the last calculation until it is
//! saved. Front ends only translate user actions into these calls.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calculations::compute;
use crate::db::repository::{PayrollRepository, RepositoryError};
use crate::error::PayrollError;
use crate::models::{CalculationResult, LoggedOperation, OperationMode, OperationType, Position};
use crate::operation_log::{OperationLogger, SaveOutcome};
use crate::reference::ReferenceCache;

pub struct CalculatorSession {
    repo: Option<Box<dyn PayrollRepository>>,
    cache: ReferenceCache,
    selected: Option<usize>,
    mode: OperationMode,
    pending: Option<CalculationResult>,
    save_enabled: bool,
}

impl CalculatorSession {
    /// Session over `repo`. Nothing is loaded until [`reload`](Self::reload).
    pub fn new(repo: Box<dyn PayrollRepository>) -> Self {
        Self {
            repo: Some(repo),
            cache: ReferenceCache::new(),
            selected: None,
            mode: OperationMode::default(),
            pending: None,
            save_enabled: false,
        }
    }

    /// Session for when the store could not be opened at all.
    pub fn disconnected() -> Self {
        Self {
            repo: None,
            cache: ReferenceCache::new(),
            selected: None,
            mode: OperationMode::default(),
            pending: None,
            save_enabled: false,
        }
    }

    /// Open a session over `repo` and load the reference data.
    ///
    /// The session is returned even when loading fails; saving stays
    /// disabled in that case and the error is handed back for display.
    pub async fn connect(repo: Box<dyn PayrollRepository>) -> (Self, Result<(), PayrollError>) {
        let mut session = Self::new(repo);
        let loaded = session.reload().await;
        (session, loaded)
    }

    /// Reload reference data. The first position is selected afterwards.
    ///
    /// A failure disables saving for the rest of the session.
    pub async fn reload(&mut self) -> Result<(), PayrollError> {
        let repo = self.repo.as_deref().ok_or_else(not_connected)?;

        match self.cache.load(repo).await {
            Ok(()) => {
                self.selected = if self.cache.is_empty() { None } else { Some(0) };
                self.save_enabled = true;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "reference data unavailable; saving disabled");
                self.save_enabled = false;
                Err(err)
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.repo.is_some()
    }

    pub fn can_save(&self) -> bool {
        self.save_enabled && self.repo.is_some()
    }

    pub fn reference(&self) -> &ReferenceCache {
        &self.cache
    }

    pub fn select_position(&mut self, index: usize) -> Result<&Position, PayrollError> {
        let position = self.cache.position_at(index)?;
        self.selected = Some(index);
        Ok(position)
    }

    pub fn selected_position(&self) -> Option<&Position> {
        self.selected.and_then(|i| self.cache.positions().get(i))
    }

    /// Base salary of the selected position, shown next to the selector.
    pub fn selected_salary(&self) -> Option<Decimal> {
        self.selected_position().map(|p| p.base_salary)
    }

    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OperationMode) {
        self.mode = mode;
    }

    /// Compute for the selected position and mode, replacing the last result.
    pub fn calculate(&mut self) -> Result<&CalculationResult, PayrollError> {
        let result = compute(
            self.selected_position(),
            self.cache.contributions(),
            self.mode,
        )?;
        Ok(&*self.pending.insert(result))
    }

    /// Result waiting to be saved, if any.
    pub fn last_result(&self) -> Option<&CalculationResult> {
        self.pending.as_ref()
    }

    /// Persist the last result.
    ///
    /// The result is consumed on success, so a second save without a new
    /// calculation fails with [`PayrollError::NotYetCalculated`]. It is kept
    /// after a [`PayrollError::Persistence`] failure so the save can be retried.
    pub async fn save(&mut self) -> Result<SaveOutcome, PayrollError> {
        let repo = match self.repo.as_deref() {
            Some(repo) if self.save_enabled => repo,
            _ => return Err(PayrollError::SaveUnavailable),
        };
        let result = self.pending.as_ref().ok_or(PayrollError::NotYetCalculated)?;

        let outcome = OperationLogger::new(repo).save(result).await?;
        info!(message = %outcome.entry.message, "calculation saved");
        self.pending = None;
        Ok(outcome)
    }

    pub async fn last_operation(&self) -> Result<Option<LoggedOperation>, PayrollError> {
        let repo = self.repo.as_deref().ok_or_else(not_connected)?;
        OperationLogger::new(repo).last_operation().await
    }

    pub async fn history(
        &self,
        limit: u32,
    ) -> Result<Vec<LoggedOperation>, PayrollError> {
        let repo = self.repo.as_deref().ok_or_else(not_connected)?;
        OperationLogger::new(repo).history(limit).await
    }

    pub async fn operation_types(&self) -> Result<Vec<OperationType>, PayrollError> {
        let repo = self.repo.as_deref().ok_or_else(not_connected)?;
        repo.list_operation_types()
            .await
            .map_err(PayrollError::ReadFailed)
    }
}

fn not_connected() -> PayrollError {
    PayrollError::DataSource(RepositoryError::Connection(
        "no database connection".to_string(),
    ))
}
