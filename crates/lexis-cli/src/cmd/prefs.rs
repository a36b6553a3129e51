//! `lx prefs`: inspect or clear the local preference file.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;

use crate::output::{OutputMode, render, render_mode};
use crate::project::Project;

#[derive(Subcommand, Debug)]
pub enum PrefsCommand {
    /// Print every stored preference.
    Show,
    /// Remove every lexis preference: favorites, upvotes, session, history.
    Clear,
}

#[derive(Args, Debug)]
pub struct PrefsArgs {
    #[command(subcommand)]
    pub command: PrefsCommand,
}

/// Execute `lx prefs <subcommand>`.
///
/// # Errors
///
/// Returns an error if the preference file cannot be written.
pub fn run_prefs(args: &PrefsArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    match args.command {
        PrefsCommand::Show => {
            let snapshot = project.prefs().snapshot();
            render(output, &snapshot, |map, w| {
                for (key, value) in map {
                    writeln!(w, "{key}\t{value}")?;
                }
                Ok(())
            })
        }
        PrefsCommand::Clear => {
            let removed = project.prefs().clear()?;
            render_mode(
                output,
                &serde_json::json!({ "removed": removed }),
                |_, w| writeln!(w, "{removed}"),
                |_, w| writeln!(w, "✓ Cleared {removed} preferences"),
            )
        }
    }
}
