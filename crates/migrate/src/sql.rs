//! SQL statement splitting
//!
//! Migration scripts hold multiple statements per file, while the driver
//! executes one statement at a time, so scripts are split before execution.

/// Split a script into its individual statements.
///
/// The split is a naive textual one on `;` — it does not understand string
/// literals or dialect escaping, so a literal semicolon inside a statement
/// (e.g. a quoted value or a trigger body) splits it in two. Shipped
/// migrations must avoid such statements. The whole policy lives in this one
/// function so a SQL-aware splitter can replace it without touching the
/// runner or the store.
pub fn split_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}
