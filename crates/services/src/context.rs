//! Collaborators shared by every service.

use std::sync::Arc;

use tally_db::Database;
use tally_shared::{AppConfig, AppError, AppResult, Clock, SystemClock};
use tracing::{error, warn};

/// Database, clock and configuration handed to each service.
#[derive(Clone)]
pub struct ServiceContext {
    /// The database.
    pub db: Database,
    /// Source of "now" and "today".
    pub clock: Arc<dyn Clock>,
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
}

impl ServiceContext {
    /// Creates a context.
    #[must_use]
    pub fn new(db: Database, clock: Arc<dyn Clock>, config: AppConfig) -> Self {
        Self {
            db,
            clock,
            config: Arc::new(config),
        }
    }

    /// Context on the wall clock with default configuration.
    #[must_use]
    pub fn with_defaults(db: Database) -> Self {
        Self::new(db, Arc::new(SystemClock), AppConfig::default())
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("db", &self.db)
            .field("now", &self.clock.now())
            .finish_non_exhaustive()
    }
}

/// Maps the outcome of a unit of work to the service result.
///
/// Rule violations pass through with their kind and are logged at `warn`.
/// Database failures are logged at `error` and surfaced as a generic message.
pub(crate) fn finish<T>(operation: &'static str, result: AppResult<T>) -> AppResult<T> {
    result.map_err(|err| {
        if err.is_infrastructure() {
            error!(operation, error = %err, "Store failure");
            AppError::Infrastructure("An internal error occurred".to_string())
        } else {
            warn!(operation, code = err.error_code(), error = %err, "Operation rejected");
            err
        }
    })
}
