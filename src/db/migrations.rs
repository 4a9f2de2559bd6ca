use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// Schema steps in order; step `i` takes the store to `user_version = i + 1`.
const SCHEMA_STEPS: &[(&str, &str)] = &[
    ("schema_v1.sql", include_str!("schemas/schema_v1.sql")),
    ("schema_v2.sql", include_str!("schemas/schema_v2.sql")),
];

const CURRENT_SCHEMA_VERSION: i32 = SCHEMA_STEPS.len() as i32;

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    if version > CURRENT_SCHEMA_VERSION {
        bail!(
            "database version ({}) is newer than supported schema ({})",
            version,
            CURRENT_SCHEMA_VERSION
        );
    }

    let applied = usize::try_from(version).unwrap_or(0);
    if applied >= SCHEMA_STEPS.len() {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;
    for (name, sql) in &SCHEMA_STEPS[applied..] {
        tx.execute_batch(sql)
            .with_context(|| format!("failed to execute {name}"))?;
    }
    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to update user_version pragma")?;
    tx.commit().context("failed to commit migrations")?;

    Ok(())
}
