pub mod calculations;
pub mod db;
pub mod error;
pub mod models;
pub mod operation_log;
pub mod reference;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use db::repository::{PayrollRepository, RepositoryError};
pub use error::{PayrollError, SaveStep};
pub use models::*;
pub use operation_log::{DisplayWarning, OperationLogger, SaveOutcome};
pub use reference::ReferenceCache;
pub use session::CalculatorSession;
