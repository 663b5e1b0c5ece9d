//! `cortado migrate` — schema migration management.
//!
//! A one-shot operation run before the serving process starts. Errors are
//! propagated to main, which prints them and exits non-zero.

use clap::Subcommand;

use cortado_api::db;
use cortado_core::AppConfig;
use cortado_migrate::{DirectorySource, Migrator, SqliteStore};

#[derive(Subcommand)]
pub enum MigrateCommands {
    /// Apply all pending migrations
    Up,

    /// Revert the most recently applied migration
    Down,

    /// Migrate up or down to a specific version
    To {
        /// Target schema version (0 reverts everything)
        version: i64,
    },

    /// Show discovered migrations and whether each is applied
    Status,
}

pub async fn run(config: AppConfig, command: MigrateCommands) -> anyhow::Result<()> {
    let pool = db::connect(&config.database.url).await?;
    let migrator = Migrator::new(
        DirectorySource::new(config.database.migrations_path.clone()),
        SqliteStore::new(pool),
    );

    match command {
        MigrateCommands::Up => {
            let applied = migrator.apply_up_to_latest().await?;
            if applied.is_empty() {
                println!("Already at the latest version.");
            } else {
                println!("Applied {} migration(s): {}", applied.len(), join(&applied));
            }
        }
        MigrateCommands::Down => {
            let version = migrator.apply_down_one().await?;
            println!("Reverted migration {version}.");
        }
        MigrateCommands::To { version } => {
            let processed = migrator.apply_to_version(version).await?;
            if processed.is_empty() {
                println!("Already at version {version}.");
            } else {
                println!(
                    "Migrated to version {version} ({} step(s): {}).",
                    processed.len(),
                    join(&processed)
                );
            }
        }
        MigrateCommands::Status => {
            let status = migrator.status().await?;
            if status.is_empty() {
                println!("No migrations found.");
                return Ok(());
            }
            println!("Migration status:");
            for (migration, applied) in status {
                let mark = if applied { "applied" } else { "pending" };
                let revert = if migration.is_revertible() {
                    ""
                } else {
                    " (no down script)"
                };
                println!(
                    "  {:>4}  {}  {}{}",
                    migration.version,
                    mark,
                    migration.up_path.display(),
                    revert
                );
            }
        }
    }

    Ok(())
}

fn join(versions: &[i64]) -> String {
    versions
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
