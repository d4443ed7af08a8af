use std::fmt;

use thiserror::Error;

use crate::calculations::CalculationError;
use crate::db::repository::RepositoryError;

/// The save step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    WriteLog,
    InvokeProcedure,
}

impl fmt::Display for SaveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteLog => f.write_str("writing the calculation log"),
            Self::InvokeProcedure => f.write_str("calling ProcessCalculation"),
        }
    }
}

/// Failures surfaced to whoever triggered a user action.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayrollError {
    /// The store could not be reached or its reference tables could not be read.
    #[error("data source unavailable: {0}")]
    DataSource(#[source] RepositoryError),

    #[error("no position at index {index} ({len} loaded)")]
    Index { index: usize, len: usize },

    #[error("select a position first")]
    NoPositionSelected,

    #[error("run a calculation before saving")]
    NotYetCalculated,

    /// The selected salary is too large for the contribution to be computed.
    #[error("amount is too large to calculate")]
    Overflow,

    /// Reading the calculation log failed; reference data and saving are unaffected.
    #[error("could not read the calculation log: {0}")]
    ReadFailed(#[source] RepositoryError),

    /// Saving is disabled because the data source failed for this session.
    #[error("saving is disabled: the data source is unavailable")]
    SaveUnavailable,

    /// A write failed and was rolled back.
    #[error("failed while {step}: {source}")]
    Persistence {
        step: SaveStep,
        #[source]
        source: RepositoryError,
    },
}

impl PayrollError {
    /// `true` when the user can fix the problem and try again in the same
    /// session; `false` when the data source is gone for the session.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::DataSource(_) | Self::SaveUnavailable)
    }
}

impl From<CalculationError> for PayrollError {
    fn from(err: CalculationError) -> Self {
        match err {
            CalculationError::NoPositionSelected => Self::NoPositionSelected,
            CalculationError::Overflow => Self::Overflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_source_failures_are_not_recoverable() {
        let err = PayrollError::DataSource(RepositoryError::Connection("refused".into()));
        assert!(!err.is_recoverable());
        assert!(!PayrollError::SaveUnavailable.is_recoverable());
    }

    #[test]
    fn precondition_and_persistence_failures_are_recoverable() {
        assert!(PayrollError::NoPositionSelected.is_recoverable());
        assert!(PayrollError::NotYetCalculated.is_recoverable());
        assert!(PayrollError::Overflow.is_recoverable());
        assert!(
            PayrollError::ReadFailed(RepositoryError::Database("join failed".into()))
                .is_recoverable()
        );
        assert!(
            PayrollError::Persistence {
                step: SaveStep::InvokeProcedure,
                source: RepositoryError::Database("deadlock".into()),
            }
            .is_recoverable()
        );
    }

    #[test]
    fn calculation_overflow_maps_to_payroll_overflow() {
        assert_eq!(
            PayrollError::from(CalculationError::Overflow),
            PayrollError::Overflow
        );
    }

    #[test]
    fn persistence_message_names_the_step() {
        let err = PayrollError::Persistence {
            step: SaveStep::WriteLog,
            source: RepositoryError::Database("disk full".into()),
        };
        assert_eq!(
            err.to_string(),
            "failed while writing the calculation log: Database error: disk full"
        );
    }
}
