//! Init command implementation - creates the ledger table

use anyhow::Result;
use mg_db::Ledger;

use crate::cli::GlobalArgs;
use crate::commands::common::{self, EXIT_LEDGER_SCHEMA};

/// Execute the init command
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let settings = common::resolve_settings(global)?;
    let db = common::open_database(&settings)?;
    let table = &settings.config.ledger_table;

    Ledger::new(&db, table)
        .bootstrap()
        .await
        .map_err(|e| common::fail(EXIT_LEDGER_SCHEMA, e))?;

    println!("Created ledger table \"{}\" in {}", table, settings.database);
    Ok(())
}
