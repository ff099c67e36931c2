//! Per-script state machine for a migration run.
//!
//! Each script moves from pending to one of: skipped because the ledger
//! already has it, skipped because it targets another database, listed
//! only, or the decision gate. Scripts that pass the gate are applied
//! through [`ScriptExecutor`] and recorded in the [`Ledger`] once they
//! commit.

use mg_core::{MigrationScript, RunOptions};
use mg_db::{AppliedSet, Application, Disposition, Ledger, LedgerError, ScriptExecutor};
use serde::Serialize;
use std::fmt;
use std::io;

use super::prompt::{is_yes, Decision, Operator, CONTINUE_PROMPT, SCRIPT_PROMPT};

/// Where a script stands before any decision is made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Triage {
    /// Already recorded in the ledger
    Applied,
    /// Declares `USE <db>`; must be applied by hand
    CrossDatabase,
    /// Candidate for application
    Pending,
}

pub(crate) fn triage(script: &MigrationScript, applied: &AppliedSet) -> Triage {
    if applied.contains(script.identity.as_str()) {
        Triage::Applied
    } else if script.is_cross_database() {
        Triage::CrossDatabase
    } else {
        Triage::Pending
    }
}

/// Counters printed at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub applied: usize,
    pub dry_run: usize,
    pub skipped_applied: usize,
    pub skipped_cross_db: usize,
    pub listed: usize,
    pub declined: usize,
    pub failed: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.listed > 0 {
            write!(f, "to be applied: {}, ", self.listed)?;
        }
        write!(
            f,
            "applied: {}, dry-run: {}, skipped (already applied): {}, \
             skipped (cross-database): {}, declined: {}, failed: {}",
            self.applied,
            self.dry_run,
            self.skipped_applied,
            self.skipped_cross_db,
            self.declined,
            self.failed
        )
    }
}

/// Why the run stopped
#[derive(Debug)]
pub(crate) enum Stop {
    /// Every script was considered
    Finished,
    /// The operator answered Q
    Quit,
    /// A script failed and the run did not continue
    Aborted,
    /// Operator input ended or could not be read
    InputClosed,
    /// A script committed but could not be recorded
    Unrecorded(LedgerError),
}

/// Result of [`RunController::run`]
#[derive(Debug)]
pub(crate) struct RunReport {
    pub summary: RunSummary,
    pub stop: Stop,
    /// At least one script failed
    pub had_errors: bool,
}

impl RunReport {
    /// Process exit status for this report. Quitting is always clean,
    /// even after an earlier failure.
    pub(crate) fn exit_code(&self) -> i32 {
        match self.stop {
            Stop::Unrecorded(_) => crate::commands::common::EXIT_LEDGER_WRITE,
            Stop::Aborted | Stop::InputClosed => 1,
            Stop::Quit => 0,
            Stop::Finished if self.had_errors => 1,
            Stop::Finished => 0,
        }
    }
}

/// What the decision gate resolved to
enum Gate {
    Apply { commit: bool },
    Skip,
    Quit,
}

/// Drives scripts through triage, the decision gate, execution and recording
pub(crate) struct RunController<'a> {
    ledger: Ledger<'a>,
    executor: ScriptExecutor<'a>,
    options: RunOptions,
    database_name: Option<&'a str>,
    operator: &'a mut dyn Operator,
}

impl<'a> RunController<'a> {
    pub(crate) fn new(
        ledger: Ledger<'a>,
        executor: ScriptExecutor<'a>,
        options: RunOptions,
        database_name: Option<&'a str>,
        operator: &'a mut dyn Operator,
    ) -> Self {
        Self {
            ledger,
            executor,
            options,
            database_name,
            operator,
        }
    }

    /// Consider each script in order. `scripts` must already be sorted.
    pub(crate) async fn run(
        &mut self,
        scripts: &[MigrationScript],
        applied: &AppliedSet,
    ) -> RunReport {
        let mut summary = RunSummary::default();
        let mut had_errors = false;

        for script in scripts {
            let name = &script.identity;

            match triage(script, applied) {
                Triage::Applied => {
                    log::debug!("skipping \"{}\"", name);
                    summary.skipped_applied += 1;
                    continue;
                }
                Triage::CrossDatabase => {
                    println!(
                        "skipping script with clause \"USE {}\" \"{}\" - apply it manually",
                        script.target_database.as_deref().unwrap_or_default(),
                        name
                    );
                    summary.skipped_cross_db += 1;
                    continue;
                }
                Triage::Pending => {}
            }

            if self.options.list_only {
                println!("to be applied: \"{}\"", name);
                summary.listed += 1;
                continue;
            }

            println!("applying: \"{}\"", name);

            let commit = match self.decide(script) {
                Ok(Gate::Apply { commit }) => commit,
                Ok(Gate::Skip) => {
                    summary.declined += 1;
                    continue;
                }
                Ok(Gate::Quit) => return report(summary, Stop::Quit, had_errors),
                Err(e) => {
                    log::error!("Cannot read operator input: {}", e);
                    return report(summary, Stop::InputClosed, had_errors);
                }
            };

            let application = self.executor.apply(script, commit).await;
            match &application.result {
                Ok(Disposition::Committed) => {
                    if !self.options.skip_ledger_write {
                        if let Err(e) = self.ledger.record_applied(name, self.database_name).await
                        {
                            log::error!(
                                "\"{}\" was committed but not recorded in \"{}\": {}",
                                name,
                                self.ledger.table(),
                                e
                            );
                            if e.is_duplicate() {
                                log::error!("Already recorded? Re-run with --no-record");
                            }
                            summary.applied += 1;
                            return report(summary, Stop::Unrecorded(e), had_errors);
                        }
                    }
                    summary.applied += 1;
                    println!("OK");
                }
                Ok(Disposition::RolledBack) => {
                    summary.dry_run += 1;
                    println!("OK (rolled back)");
                }
                Err(e) => {
                    log_failure(&application, e);
                    summary.failed += 1;
                    had_errors = true;

                    if self.options.continue_on_error {
                        continue;
                    }
                    if self.options.no_prompt {
                        return report(summary, Stop::Aborted, had_errors);
                    }
                    match self.operator.ask(CONTINUE_PROMPT) {
                        Ok(reply) if is_yes(&reply) => continue,
                        Ok(_) => return report(summary, Stop::Aborted, had_errors),
                        Err(e) => {
                            log::error!("Cannot read operator input: {}", e);
                            return report(summary, Stop::InputClosed, had_errors);
                        }
                    }
                }
            }
        }

        report(summary, Stop::Finished, had_errors)
    }

    /// The decision gate. Display and unrecognised replies ask again.
    fn decide(&mut self, script: &MigrationScript) -> io::Result<Gate> {
        let commit = !self.options.fake;
        if self.options.no_prompt {
            return Ok(Gate::Apply { commit });
        }

        loop {
            let reply = self.operator.ask(SCRIPT_PROMPT)?;
            match Decision::parse(&reply) {
                Decision::Apply => return Ok(Gate::Apply { commit }),
                Decision::Fake => return Ok(Gate::Apply { commit: false }),
                Decision::Skip => return Ok(Gate::Skip),
                Decision::Quit => return Ok(Gate::Quit),
                Decision::Display => self.operator.show(&script.content)?,
                Decision::Unknown => {}
            }
        }
    }
}

fn report(summary: RunSummary, stop: Stop, had_errors: bool) -> RunReport {
    RunReport {
        summary,
        stop,
        had_errors,
    }
}

fn log_failure(application: &Application, err: &mg_db::ApplyError) {
    for outcome in &application.outcomes {
        log::debug!(
            "batch {} ({:?}): {}",
            outcome.index,
            outcome.elapsed,
            outcome.error.as_deref().unwrap_or("ok")
        );
    }
    log::error!("{}", err);
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
