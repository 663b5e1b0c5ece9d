//! Migration runner
//!
//! Ties discovery and the ledger store together: apply everything pending,
//! revert the single most recent version, or walk to an arbitrary target
//! version. Every operation re-discovers migrations and re-reads the ledger;
//! partial progress is committed per migration, so a failure mid-walk leaves
//! the ledger consistent with whatever completed.

use std::collections::HashMap;
use std::path::Path;

use crate::definitions::Migration;
use crate::error::{MigrateError, MigrateResult};
use crate::source::MigrationSource;
use crate::store::MigrationStore;

/// Drives migrations from a [`MigrationSource`] against a [`MigrationStore`].
pub struct Migrator<S, T> {
    source: S,
    store: T,
}

impl<S, T> Migrator<S, T>
where
    S: MigrationSource,
    T: MigrationStore,
{
    pub fn new(source: S, store: T) -> Self {
        Self { source, store }
    }

    /// Apply every discovered migration above the current version, in
    /// ascending order. Returns the versions applied; an empty result means
    /// the schema was already at the latest discovered version.
    pub async fn apply_up_to_latest(&self) -> MigrateResult<Vec<i64>> {
        self.store.ensure_ledger().await?;
        let migrations = self.source.list()?;
        let curr = self.store.current_version().await?;

        let mut applied = Vec::new();
        for migration in migrations.iter().filter(|m| m.version > curr) {
            self.apply_one(migration).await?;
            applied.push(migration.version);
        }

        if applied.is_empty() {
            tracing::info!(current = curr, "schema already at latest version");
        }
        Ok(applied)
    }

    /// Revert only the most recently applied version. Does not cascade.
    pub async fn apply_down_one(&self) -> MigrateResult<i64> {
        self.store.ensure_ledger().await?;
        let migrations = self.source.list()?;
        let curr = self.store.current_version().await?;
        if curr == 0 {
            return Err(MigrateError::NothingToRevert);
        }

        let migration = migrations
            .iter()
            .find(|m| m.version == curr)
            .ok_or(MigrateError::VersionNotFound(curr))?;
        self.revert_one(migration).await?;
        Ok(curr)
    }

    /// Move the schema to exactly `target`: apply forward scripts for
    /// `(curr, target]` ascending, or walk the integer range `curr..target`
    /// descending and revert each version. Returns the versions processed, in
    /// execution order; empty when already at the target.
    ///
    /// The downward walk visits every integer in the range, so a version with
    /// no migration record at all is an error, distinct from a discovered
    /// migration that merely lacks a reverse script.
    pub async fn apply_to_version(&self, target: i64) -> MigrateResult<Vec<i64>> {
        self.store.ensure_ledger().await?;
        let migrations = self.source.list()?;
        let curr = self.store.current_version().await?;

        if target == curr {
            tracing::info!(version = curr, "schema already at target version");
            return Ok(Vec::new());
        }

        let mut processed = Vec::new();
        if target > curr {
            for migration in migrations
                .iter()
                .filter(|m| m.version > curr && m.version <= target)
            {
                self.apply_one(migration).await?;
                processed.push(migration.version);
            }
            return Ok(processed);
        }

        let by_version: HashMap<i64, &Migration> =
            migrations.iter().map(|m| (m.version, m)).collect();
        let mut version = curr;
        while version > target {
            let migration = by_version
                .get(&version)
                .ok_or(MigrateError::DownTargetNotFound(version))?;
            self.revert_one(migration).await?;
            processed.push(version);
            version -= 1;
        }
        Ok(processed)
    }

    /// Discovered migrations paired with whether each is currently applied.
    pub async fn status(&self) -> MigrateResult<Vec<(Migration, bool)>> {
        self.store.ensure_ledger().await?;
        let migrations = self.source.list()?;
        let applied: std::collections::HashSet<i64> =
            self.store.applied_versions().await?.into_iter().collect();

        Ok(migrations
            .into_iter()
            .map(|m| {
                let is_applied = applied.contains(&m.version);
                (m, is_applied)
            })
            .collect())
    }

    async fn apply_one(&self, migration: &Migration) -> MigrateResult<()> {
        tracing::info!(
            version = migration.version,
            script = %migration.up_path.display(),
            "applying migration"
        );
        self.exec_script(&migration.up_path)
            .await
            .map_err(|e| MigrateError::apply(migration.version, e))?;
        self.store.record_applied(migration.version).await
    }

    async fn revert_one(&self, migration: &Migration) -> MigrateResult<()> {
        let down = migration
            .down_path
            .as_deref()
            .ok_or(MigrateError::MissingDownScript(migration.version))?;
        tracing::info!(
            version = migration.version,
            script = %down.display(),
            "reverting migration"
        );
        self.exec_script(down)
            .await
            .map_err(|e| MigrateError::revert(migration.version, e))?;
        self.store.record_reverted(migration.version).await
    }

    async fn exec_script(&self, path: &Path) -> MigrateResult<()> {
        let sql = self.source.read_script(path)?;
        self.store.run_script(&sql).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{BTreeSet, HashMap};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Statement marker that makes the fake store fail the whole script.
    const FAIL_MARKER: &str = "FAIL HERE";

    struct FakeSource {
        migrations: Vec<Migration>,
        scripts: HashMap<PathBuf, String>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                migrations: Vec::new(),
                scripts: HashMap::new(),
            }
        }

        fn with_migration(mut self, version: i64, up_sql: &str, down_sql: Option<&str>) -> Self {
            let up_path = PathBuf::from(format!("{version}_fake.up.sql"));
            self.scripts.insert(up_path.clone(), up_sql.to_string());
            let down_path = down_sql.map(|sql| {
                let path = PathBuf::from(format!("{version}_fake.down.sql"));
                self.scripts.insert(path.clone(), sql.to_string());
                path
            });
            self.migrations.push(Migration {
                version,
                up_path,
                down_path,
            });
            self.migrations.sort_by_key(|m| m.version);
            self
        }
    }

    impl MigrationSource for FakeSource {
        fn list(&self) -> MigrateResult<Vec<Migration>> {
            Ok(self.migrations.clone())
        }

        fn read_script(&self, path: &Path) -> MigrateResult<String> {
            self.scripts
                .get(path)
                .cloned()
                .ok_or_else(|| MigrateError::ReadScript {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such script"),
                })
        }
    }

    #[derive(Default)]
    struct FakeStore {
        ledger: Mutex<BTreeSet<i64>>,
        executed: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn with_applied(versions: &[i64]) -> Self {
            let store = Self::default();
            store.ledger.lock().unwrap().extend(versions.iter().copied());
            store
        }

        fn ledger(&self) -> Vec<i64> {
            self.ledger.lock().unwrap().iter().copied().collect()
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MigrationStore for FakeStore {
        async fn ensure_ledger(&self) -> MigrateResult<()> {
            Ok(())
        }

        async fn current_version(&self) -> MigrateResult<i64> {
            Ok(self.ledger.lock().unwrap().iter().max().copied().unwrap_or(0))
        }

        async fn applied_versions(&self) -> MigrateResult<Vec<i64>> {
            Ok(self.ledger())
        }

        async fn record_applied(&self, version: i64) -> MigrateResult<()> {
            self.ledger.lock().unwrap().insert(version);
            Ok(())
        }

        async fn record_reverted(&self, version: i64) -> MigrateResult<()> {
            self.ledger.lock().unwrap().remove(&version);
            Ok(())
        }

        async fn run_script(&self, sql: &str) -> MigrateResult<()> {
            if sql.contains(FAIL_MARKER) {
                return Err(MigrateError::Database(sqlx::Error::Protocol(
                    "injected failure".into(),
                )));
            }
            self.executed.lock().unwrap().push(sql.to_string());
            Ok(())
        }
    }

    fn three_step_source() -> FakeSource {
        FakeSource::new()
            .with_migration(1, "CREATE TABLE users (id INTEGER);", Some("DROP TABLE users;"))
            .with_migration(2, "CREATE TABLE coffees (id INTEGER);", Some("DROP TABLE coffees;"))
            .with_migration(3, "CREATE TABLE brews (id INTEGER);", Some("DROP TABLE brews;"))
    }

    #[tokio::test]
    async fn apply_up_to_latest_applies_everything_in_order() {
        let migrator = Migrator::new(three_step_source(), FakeStore::default());

        let applied = migrator.apply_up_to_latest().await.unwrap();
        assert_eq!(applied, vec![1, 2, 3]);
        assert_eq!(migrator.store.ledger(), vec![1, 2, 3]);
        let executed = migrator.store.executed();
        assert!(executed[0].contains("users"));
        assert!(executed[1].contains("coffees"));
        assert!(executed[2].contains("brews"));
    }

    #[tokio::test]
    async fn apply_up_to_latest_is_idempotent() {
        let migrator = Migrator::new(three_step_source(), FakeStore::default());

        migrator.apply_up_to_latest().await.unwrap();
        let second = migrator.apply_up_to_latest().await.unwrap();
        assert!(second.is_empty());
        assert_eq!(migrator.store.ledger(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failing_migration_stops_the_walk_and_names_the_version() {
        let source = FakeSource::new()
            .with_migration(1, "CREATE TABLE users (id INTEGER);", Some("DROP TABLE users;"))
            .with_migration(2, FAIL_MARKER, Some("DROP TABLE coffees;"))
            .with_migration(3, "CREATE TABLE brews (id INTEGER);", Some("DROP TABLE brews;"));
        let migrator = Migrator::new(source, FakeStore::default());

        let err = migrator.apply_up_to_latest().await.unwrap_err();
        match err {
            MigrateError::Apply { version, .. } => assert_eq!(version, 2),
            other => panic!("expected Apply error, got {other}"),
        }
        // Version 1 stays committed; 3 was never attempted.
        assert_eq!(migrator.store.ledger(), vec![1]);
        assert_eq!(migrator.store.executed().len(), 1);
    }

    #[tokio::test]
    async fn apply_down_one_reverts_only_the_latest() {
        let migrator = Migrator::new(three_step_source(), FakeStore::default());

        migrator.apply_up_to_latest().await.unwrap();
        let reverted = migrator.apply_down_one().await.unwrap();
        assert_eq!(reverted, 3);
        assert_eq!(migrator.store.ledger(), vec![1, 2]);
        assert!(migrator.store.executed().last().unwrap().contains("DROP TABLE brews"));
    }

    #[tokio::test]
    async fn apply_down_one_on_empty_ledger_is_a_precondition_error() {
        let migrator = Migrator::new(three_step_source(), FakeStore::default());

        let err = migrator.apply_down_one().await.unwrap_err();
        assert!(matches!(err, MigrateError::NothingToRevert));
    }

    #[tokio::test]
    async fn apply_down_one_detects_ledger_drift() {
        // Ledger says 5, but nothing on disk knows about version 5.
        let migrator = Migrator::new(three_step_source(), FakeStore::with_applied(&[1, 2, 3, 5]));

        let err = migrator.apply_down_one().await.unwrap_err();
        assert!(matches!(err, MigrateError::VersionNotFound(5)));
        assert_eq!(migrator.store.ledger(), vec![1, 2, 3, 5]);
    }

    #[tokio::test]
    async fn apply_down_one_requires_a_reverse_script() {
        let source = FakeSource::new()
            .with_migration(1, "CREATE TABLE users (id INTEGER);", None);
        let migrator = Migrator::new(source, FakeStore::with_applied(&[1]));

        let err = migrator.apply_down_one().await.unwrap_err();
        assert!(matches!(err, MigrateError::MissingDownScript(1)));
        assert_eq!(migrator.store.ledger(), vec![1]);
    }

    #[tokio::test]
    async fn apply_to_version_upward_stops_at_the_target() {
        let migrator = Migrator::new(three_step_source(), FakeStore::default());

        let processed = migrator.apply_to_version(2).await.unwrap();
        assert_eq!(processed, vec![1, 2]);
        assert_eq!(migrator.store.ledger(), vec![1, 2]);
    }

    #[tokio::test]
    async fn apply_to_version_at_current_is_a_no_op() {
        let migrator = Migrator::new(three_step_source(), FakeStore::with_applied(&[1, 2]));

        let processed = migrator.apply_to_version(2).await.unwrap();
        assert!(processed.is_empty());
        assert_eq!(migrator.store.ledger(), vec![1, 2]);
        assert!(migrator.store.executed().is_empty());
    }

    #[tokio::test]
    async fn apply_to_version_downward_walks_one_version_at_a_time() {
        let migrator = Migrator::new(three_step_source(), FakeStore::default());

        migrator.apply_up_to_latest().await.unwrap();
        let processed = migrator.apply_to_version(1).await.unwrap();
        assert_eq!(processed, vec![3, 2]);
        assert_eq!(migrator.store.ledger(), vec![1]);
    }

    #[tokio::test]
    async fn downward_walk_fails_on_a_gap_version() {
        // Version 2 was applied once but its files are gone from disk.
        let source = FakeSource::new()
            .with_migration(1, "CREATE TABLE users (id INTEGER);", Some("DROP TABLE users;"))
            .with_migration(3, "CREATE TABLE brews (id INTEGER);", Some("DROP TABLE brews;"));
        let migrator = Migrator::new(source, FakeStore::with_applied(&[1, 2, 3]));

        let err = migrator.apply_to_version(0).await.unwrap_err();
        assert!(matches!(err, MigrateError::DownTargetNotFound(2)));
        // Version 3 was reverted before the walk hit the gap.
        assert_eq!(migrator.store.ledger(), vec![1, 2]);
    }

    #[tokio::test]
    async fn downward_walk_fails_on_a_missing_down_script() {
        let source = FakeSource::new()
            .with_migration(1, "CREATE TABLE users (id INTEGER);", Some("DROP TABLE users;"))
            .with_migration(2, "CREATE TABLE coffees (id INTEGER);", None)
            .with_migration(3, "CREATE TABLE brews (id INTEGER);", Some("DROP TABLE brews;"));
        let migrator = Migrator::new(source, FakeStore::with_applied(&[1, 2, 3]));

        let err = migrator.apply_to_version(0).await.unwrap_err();
        assert!(matches!(err, MigrateError::MissingDownScript(2)));
        assert_eq!(migrator.store.ledger(), vec![1, 2]);
    }

    #[tokio::test]
    async fn failing_reverse_script_stops_the_downward_walk() {
        let source = FakeSource::new()
            .with_migration(1, "CREATE TABLE users (id INTEGER);", Some("DROP TABLE users;"))
            .with_migration(2, "CREATE TABLE coffees (id INTEGER);", Some(FAIL_MARKER))
            .with_migration(3, "CREATE TABLE brews (id INTEGER);", Some("DROP TABLE brews;"));
        let migrator = Migrator::new(source, FakeStore::with_applied(&[1, 2, 3]));

        let err = migrator.apply_to_version(0).await.unwrap_err();
        match err {
            MigrateError::Revert { version, .. } => assert_eq!(version, 2),
            other => panic!("expected Revert error, got {other}"),
        }
        assert_eq!(migrator.store.ledger(), vec![1, 2]);
    }

    #[tokio::test]
    async fn round_trip_returns_to_the_same_ledger() {
        let migrator = Migrator::new(three_step_source(), FakeStore::default());

        migrator.apply_up_to_latest().await.unwrap();
        let after_first = migrator.store.ledger();

        migrator.apply_down_one().await.unwrap();
        migrator.apply_up_to_latest().await.unwrap();
        assert_eq!(migrator.store.ledger(), after_first);
    }

    #[tokio::test]
    async fn full_walk_scenario() {
        let migrator = Migrator::new(three_step_source(), FakeStore::default());

        assert_eq!(migrator.apply_up_to_latest().await.unwrap(), vec![1, 2, 3]);
        assert_eq!(migrator.store.ledger(), vec![1, 2, 3]);

        assert_eq!(migrator.apply_down_one().await.unwrap(), 3);
        assert_eq!(migrator.store.ledger(), vec![1, 2]);

        assert_eq!(migrator.apply_to_version(1).await.unwrap(), vec![2]);
        assert_eq!(migrator.store.ledger(), vec![1]);

        assert_eq!(migrator.apply_to_version(3).await.unwrap(), vec![2, 3]);
        assert_eq!(migrator.store.ledger(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn status_marks_applied_and_pending() {
        let migrator = Migrator::new(three_step_source(), FakeStore::with_applied(&[1]));

        let status = migrator.status().await.unwrap();
        let marks: Vec<(i64, bool)> = status.iter().map(|(m, a)| (m.version, *a)).collect();
        assert_eq!(marks, vec![(1, true), (2, false), (3, false)]);
    }
}
