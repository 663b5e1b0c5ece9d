//! Migration discovery
//!
//! Scans a directory tree for `<version>_<name>.up.sql` /
//! `<version>_<name>.down.sql` pairs and turns them into [`Migration`]
//! records. Discovery happens fresh on every runner invocation; nothing is
//! cached.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::definitions::Migration;
use crate::error::{MigrateError, MigrateResult};

static UP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)_.*\.up\.sql$").expect("up pattern is valid"));
static DOWN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)_.*\.down\.sql$").expect("down pattern is valid"));

/// Where migrations come from.
///
/// The production implementation walks a directory; tests substitute an
/// in-memory file set.
pub trait MigrationSource {
    /// List every discovered migration, ascending by version. Each record is
    /// guaranteed to carry a forward script path.
    fn list(&self) -> MigrateResult<Vec<Migration>>;

    /// Read the full contents of one migration script.
    fn read_script(&self, path: &Path) -> MigrateResult<String>;
}

/// Filesystem-backed migration source.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn walk(
        dir: &Path,
        entries: &mut BTreeMap<i64, (Option<PathBuf>, Option<PathBuf>)>,
    ) -> MigrateResult<()> {
        let listing = fs::read_dir(dir).map_err(|source| MigrateError::Discovery {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in listing {
            let entry = entry.map_err(|source| MigrateError::Discovery {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                Self::walk(&path, entries)?;
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(version) = capture_version(name, &UP_PATTERN) {
                // If two files claim the same forward slot, the last one the
                // walk encounters wins; the walk order is platform-defined.
                entries.entry(version).or_default().0 = Some(path);
            } else if let Some(version) = capture_version(name, &DOWN_PATTERN) {
                entries.entry(version).or_default().1 = Some(path);
            }
        }

        Ok(())
    }
}

fn capture_version(name: &str, pattern: &Regex) -> Option<i64> {
    pattern.captures(name)?.get(1)?.as_str().parse().ok()
}

impl MigrationSource for DirectorySource {
    fn list(&self) -> MigrateResult<Vec<Migration>> {
        let mut entries = BTreeMap::new();
        Self::walk(&self.dir, &mut entries)?;

        // A reverse script with no matching forward script is not a
        // migration; BTreeMap iteration gives ascending version order.
        Ok(entries
            .into_iter()
            .filter_map(|(version, (up, down))| {
                up.map(|up_path| Migration {
                    version,
                    up_path,
                    down_path: down,
                })
            })
            .collect())
    }

    fn read_script(&self, path: &Path) -> MigrateResult<String> {
        fs::read_to_string(path).map_err(|source| MigrateError::ReadScript {
            path: path.to_path_buf(),
            source,
        })
    }
}
