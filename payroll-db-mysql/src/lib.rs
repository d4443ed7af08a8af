//! MySQL backend: the production store that owns the `ProcessCalculation`
//! stored procedure. The schema is managed outside this crate.

mod factory;
mod repository;

pub use factory::MySqlRepositoryFactory;
pub use repository::MySqlRepository;
