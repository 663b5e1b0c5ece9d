//! Schema migration runner
//!
//! Discovers versioned `<version>_<name>.up.sql` / `<version>_<name>.down.sql`
//! pairs on disk, tracks the applied set in a `schema_migrations` ledger
//! table, and moves the schema forward or backward one transactional script
//! at a time.
//!
//! The runner is a one-shot, single-writer tool: run it before the serving
//! process starts, never concurrently with itself. There is no locking and no
//! retry; two runners racing on the same database are outside the contract.
//!
//! The moving parts are deliberately separated so each can be faked in tests:
//! [`MigrationSource`] yields migration records and script contents,
//! [`MigrationStore`] owns the ledger and the transactional script execution,
//! and [`Migrator`] holds the ordering logic that ties them together.

pub mod definitions;
pub mod error;
pub mod runner;
pub mod source;
pub mod sql;
pub mod store;

pub use definitions::Migration;
pub use error::{MigrateError, MigrateResult};
pub use runner::Migrator;
pub use source::{DirectorySource, MigrationSource};
pub use store::{MigrationStore, SqliteStore};
