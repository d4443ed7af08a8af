//! Insurance contribution calculation.
//!
//! Every loaded contribution type is applied: the rates are summed into one
//! percentage, that percentage of the base salary is the total contribution,
//! and the result is either the contribution itself or the salary left after
//! paying it.
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Total percent = Σ contribution rates |
//! | 2    | Total contribution = base salary × total percent / 100 |
//! | 3a   | Net pay = base salary − total contribution |
//! | 3b   | Total contributions = total contribution |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::calculations::ContributionCalculator;
//! use payroll_core::{ContributionType, OperationMode, Position};
//!
//! let contributions = vec![
//!     ContributionType { id: 1, name: "Пенсионное".into(), rate: dec!(22) },
//!     ContributionType { id: 2, name: "Социальное".into(), rate: dec!(2.9) },
//!     ContributionType { id: 3, name: "Медицинское".into(), rate: dec!(5.1) },
//! ];
//! let engineer = Position { id: 1, name: "Инженер".into(), base_salary: dec!(50000.00) };
//!
//! let calculator = ContributionCalculator::new(&contributions);
//! let result = calculator.calculate(Some(&engineer), OperationMode::NetPay).unwrap();
//!
//! assert_eq!(result.total_percent, dec!(30));
//! assert_eq!(result.amount, dec!(35000.00));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::percent_of;
use crate::models::{CalculationResult, ContributionType, OperationMode, Position};

/// Errors that can occur during a contribution calculation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationError {
    #[error("no position selected")]
    NoPositionSelected,

    #[error("amount is too large to calculate")]
    Overflow,
}

/// Calculator over a fixed set of contribution types.
#[derive(Debug, Clone)]
pub struct ContributionCalculator<'a> {
    contributions: &'a [ContributionType],
}

impl<'a> ContributionCalculator<'a> {
    pub fn new(contributions: &'a [ContributionType]) -> Self {
        Self { contributions }
    }

    /// Sum of every contribution rate. An empty set sums to zero.
    ///
    /// # Errors
    ///
    /// [`CalculationError::Overflow`] when the rates do not fit in a [`Decimal`].
    pub fn total_percent(&self) -> Result<Decimal, CalculationError> {
        self.contributions
            .iter()
            .try_fold(Decimal::ZERO, |sum, c| sum.checked_add(c.rate))
            .ok_or(CalculationError::Overflow)
    }

    /// Computes the result for `position` in `mode`.
    ///
    /// # Errors
    ///
    /// [`CalculationError::NoPositionSelected`] when `position` is `None`;
    /// [`CalculationError::Overflow`] when the salary is too large for the
    /// contribution to be computed.
    pub fn calculate(
        &self,
        position: Option<&Position>,
        mode: OperationMode,
    ) -> Result<CalculationResult, CalculationError> {
        let position = position.ok_or(CalculationError::NoPositionSelected)?;

        let total_percent = self.total_percent()?;
        let total_contribution = percent_of(position.base_salary, total_percent)
            .ok_or(CalculationError::Overflow)?;
        let amount = self.result_amount(position.base_salary, total_contribution, mode)?;

        Ok(CalculationResult {
            position_id: position.id,
            position_name: position.name.clone(),
            mode,
            amount,
            gross_salary: position.base_salary,
            total_percent,
            total_contribution,
        })
    }

    fn result_amount(
        &self,
        base_salary: Decimal,
        total_contribution: Decimal,
        mode: OperationMode,
    ) -> Result<Decimal, CalculationError> {
        match mode {
            OperationMode::NetPay => base_salary
                .checked_sub(total_contribution)
                .ok_or(CalculationError::Overflow),
            OperationMode::TotalContributions => Ok(total_contribution),
        }
    }
}

/// Shorthand for `ContributionCalculator::new(contributions).calculate(position, mode)`.
pub fn compute(
    position: Option<&Position>,
    contributions: &[ContributionType],
    mode: OperationMode,
) -> Result<CalculationResult, CalculationError> {
    ContributionCalculator::new(contributions).calculate(position, mode)
}
