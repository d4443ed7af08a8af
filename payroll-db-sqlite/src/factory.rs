use std::path::PathBuf;

use async_trait::async_trait;
use payroll_core::db::{DbConfig, RepositoryFactory};
use payroll_core::{PayrollRepository, RepositoryError};
use tracing::debug;

use crate::repository::SqliteRepository;

const SEEDS_DIR_VAR: &str = "PAYROLL_SQLITE_SEEDS_DIR";

/// First existing seeds directory among `$PAYROLL_SQLITE_SEEDS_DIR`,
/// `./seeds` and the crate's own `seeds/`.
fn seeds_dir() -> Option<PathBuf> {
    let candidates = [
        std::env::var_os(SEEDS_DIR_VAR).map(PathBuf::from),
        Some(PathBuf::from("seeds")),
        Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")),
    ];
    candidates.into_iter().flatten().find(|dir| dir.is_dir())
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use payroll_core::db::RepositoryRegistry;
/// use payroll_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open `config.connection_string`, apply migrations, then load seed data.
    ///
    /// Seeds use `INSERT OR IGNORE`, so reopening an existing file leaves
    /// edited reference rows alone.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PayrollRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        match seeds_dir() {
            Some(dir) => repo
                .run_seeds(&dir)
                .await
                .map_err(|e| RepositoryError::Database(format!("{e:#}")))?,
            None => debug!("no seeds directory found; reference tables left as they are"),
        }
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use payroll_core::db::{DbConfig, RepositoryFactory};

    use super::SqliteRepositoryFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn creates_seeded_in_memory_repository() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        };

        let repo = SqliteRepositoryFactory
            .create(&config)
            .await
            .expect("in-memory repository should open");

        let positions = repo.list_positions().await.unwrap();
        assert_eq!(positions.len(), 4);
        assert_eq!(positions[0].name, "Инженер");
        assert_eq!(repo.list_contribution_types().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unreachable_path_is_a_connection_error() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: "/nonexistent-dir/sub/payroll.db".to_string(),
        };

        let result = SqliteRepositoryFactory.create(&config).await;

        assert!(matches!(
            result,
            Err(payroll_core::RepositoryError::Connection(_))
        ));
    }
}
