// src/cli/migrate.rs — Schema version inspection and rollback

use std::path::Path;

use crate::memory::schema;

pub fn run_migrate(db_path: &Path, status: bool, rollback: bool) -> anyhow::Result<()> {
    if !db_path.exists() {
        anyhow::bail!(
            "No database at {}. Run `aggregator serve` or `aggregator ask` first.",
            db_path.display()
        );
    }

    let conn = rusqlite::Connection::open(db_path)?;

    if rollback {
        match schema::rollback_last(&conn)? {
            Some(version) => println!("Rolled back migration {version}."),
            None => println!("Nothing to roll back."),
        }
        return Ok(());
    }

    if !status {
        schema::run_migrations(&conn)?;
    }
    println!(
        "Schema version: {} ({})",
        schema::current_version(&conn)?,
        db_path.display()
    );
    Ok(())
}
