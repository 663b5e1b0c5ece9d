//! Error types for the migration runner

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for migration operations
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Migration runner errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The migrations directory (or a subdirectory) could not be read.
    #[error("failed to read migrations directory {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration script file could not be read.
    #[error("failed to read migration script {path}: {source}")]
    ReadScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An underlying database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Revert requested with an empty ledger.
    #[error("no migrations applied")]
    NothingToRevert,

    /// The ledger names a version that was not discovered on disk.
    #[error("current version {0} not found among discovered migrations")]
    VersionNotFound(i64),

    /// A version inside a descending walk has no migration record at all.
    #[error("migration {0} not found for down")]
    DownTargetNotFound(i64),

    /// A revert was requested for a migration without a reverse script.
    #[error("no down migration for version {0}")]
    MissingDownScript(i64),

    /// A forward script failed; the migration's transaction was rolled back.
    #[error("apply up {version} failed: {source}")]
    Apply {
        version: i64,
        #[source]
        source: Box<MigrateError>,
    },

    /// A reverse script failed; the migration's transaction was rolled back.
    #[error("apply down {version} failed: {source}")]
    Revert {
        version: i64,
        #[source]
        source: Box<MigrateError>,
    },
}

impl MigrateError {
    pub(crate) fn apply(version: i64, source: MigrateError) -> Self {
        MigrateError::Apply {
            version,
            source: Box::new(source),
        }
    }

    pub(crate) fn revert(version: i64, source: MigrateError) -> Self {
        MigrateError::Revert {
            version,
            source: Box::new(source),
        }
    }
}
