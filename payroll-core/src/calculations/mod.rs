//! Payroll contribution calculations.
//!
//! The engine is a pure function of a position, the loaded contribution
//! rates and the requested operation mode. Nothing here touches the store.

pub mod common;
pub mod contributions;

pub use contributions::{CalculationError, ContributionCalculator, compute};
