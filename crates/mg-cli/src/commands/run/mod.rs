//! Run command implementation
//!
//! Split into submodules:
//! - `controller`: per-script state machine and run summary
//! - `prompt`: operator prompt protocol

mod controller;
mod prompt;

use anyhow::Result;
use mg_core::{load_scripts, MigrationScript, RunOptions, ScriptRange};
use mg_db::{AppliedSet, Database, DuckDbBackend, Ledger, ScriptExecutor};
use std::io;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{self, ExitCode, Settings, EXIT_LEDGER_SCHEMA, EXIT_LOAD};

pub(crate) use controller::{triage, RunReport, Triage};
pub(crate) use prompt::{Operator, Terminal};
use controller::RunController;

/// Execute the run command
pub(crate) async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let options = RunOptions {
        range: ScriptRange::new(args.start_at, args.stop_at),
        no_prompt: args.no_prompt,
        continue_on_error: args.continue_on_error,
        list_only: false,
        fake: args.fake,
        skip_ledger_write: args.no_record,
    };

    let session = Session::open(global, options.range, true).await?;

    let stdin = io::stdin();
    let mut operator = Terminal::new(stdin.lock(), io::stdout(), io::stderr());
    let report = session.drive(options, &mut operator).await;
    finish(report)
}

/// Everything a run needs, loaded and checked before the first script
pub(crate) struct Session {
    pub settings: Settings,
    pub db: DuckDbBackend,
    pub applied: AppliedSet,
    pub database_name: Option<String>,
    pub scripts: Vec<MigrationScript>,
}

impl Session {
    /// Resolve settings, open the database, check the ledger, read its
    /// state, then load the scripts in `range`.
    ///
    /// With `announce`, prints how many applied scripts the ledger holds.
    pub(crate) async fn open(
        global: &GlobalArgs,
        range: ScriptRange,
        announce: bool,
    ) -> Result<Self> {
        let settings = common::resolve_settings(global)?;
        let db = common::open_database(&settings)?;

        let ledger = Ledger::new(&db, &settings.config.ledger_table);
        ledger
            .verify_schema()
            .await
            .map_err(|e| common::fail(EXIT_LEDGER_SCHEMA, e))?;
        let applied = ledger
            .load_applied()
            .await
            .map_err(|e| common::fail(EXIT_LEDGER_SCHEMA, e))?;

        let database_name = match db.current_database().await {
            Ok(name) => Some(name),
            Err(e) => {
                log::warn!("Cannot determine the current database: {}", e);
                None
            }
        };
        if announce {
            println!(
                "found {} applied scripts in \"{}\"",
                applied.len(),
                database_name.as_deref().unwrap_or(&settings.database)
            );
        }

        let scripts = load_scripts(&settings.folder, &settings.config.extensions, range)
            .map_err(|e| common::fail(EXIT_LOAD, e))?;
        log::debug!(
            "{} scripts in range in {}",
            scripts.len(),
            settings.folder.display()
        );

        Ok(Self {
            settings,
            db,
            applied,
            database_name,
            scripts,
        })
    }

    /// Run the controller over the loaded scripts
    pub(crate) async fn drive(&self, options: RunOptions, operator: &mut dyn Operator) -> RunReport {
        let config = &self.settings.config;
        let mut controller = RunController::new(
            Ledger::new(&self.db, &config.ledger_table),
            ScriptExecutor::new(&self.db, &config.batch_separator),
            options,
            self.database_name.as_deref(),
            operator,
        );
        controller.run(&self.scripts, &self.applied).await
    }
}

/// Print the summary and turn the report into the command result
pub(crate) fn finish(report: RunReport) -> Result<()> {
    println!("\n{}", report.summary);
    match report.exit_code() {
        0 => Ok(()),
        code => Err(ExitCode(code).into()),
    }
}
