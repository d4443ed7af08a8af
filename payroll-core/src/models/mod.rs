mod calculation_result;
mod contribution_type;
mod log_entry;
mod operation_mode;
mod position;

pub use calculation_result::CalculationResult;
pub use contribution_type::ContributionType;
pub use log_entry::{LoggedOperation, NewLogEntry};
pub use operation_mode::{OperationMode, OperationType};
pub use position::Position;
