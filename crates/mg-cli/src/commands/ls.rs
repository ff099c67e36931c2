//! Ls command implementation - lists scripts without applying them

use anyhow::{Context, Result};
use mg_core::{RunOptions, ScriptIdentity, ScriptRange};
use serde::Serialize;
use std::io;

use crate::cli::{GlobalArgs, LsArgs, OutputFormat};
use crate::commands::run::{self, triage, Session, Terminal, Triage};

/// One script in `ls --output json`
#[derive(Debug, Serialize)]
struct ScriptEntry<'a> {
    identity: &'a ScriptIdentity,
    order_key: i64,
    path: String,
    state: Triage,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_database: Option<&'a str>,
}

/// Execute the ls command
pub(crate) async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let range = ScriptRange::new(args.start_at, args.stop_at);
    let json_mode = args.output == OutputFormat::Json;

    let session = Session::open(global, range, !json_mode).await?;

    if json_mode {
        let entries: Vec<ScriptEntry<'_>> = session
            .scripts
            .iter()
            .map(|script| ScriptEntry {
                identity: &script.identity,
                order_key: script.order_key,
                path: script.path.display().to_string(),
                state: triage(script, &session.applied),
                target_database: script.target_database.as_deref(),
            })
            .collect();
        let json = serde_json::to_string_pretty(&entries)
            .context("Failed to serialize script list")?;
        println!("{}", json);
        return Ok(());
    }

    let options = RunOptions {
        range,
        list_only: true,
        no_prompt: true,
        ..Default::default()
    };
    // Listing never prompts.
    let mut operator = Terminal::new(io::empty(), io::sink(), io::sink());
    let report = session.drive(options, &mut operator).await;
    run::finish(report)
}
