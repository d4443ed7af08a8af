//! SQLite backend for the payroll calculator.
//!
//! `ProcessCalculation` has no SQLite counterpart, so the repository runs an
//! equivalent statement sequence inside one transaction.

mod decimal;
mod factory;
mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
