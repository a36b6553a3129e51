//! `lx upvote`: toggle an upvote with optimistic local state.

use anyhow::Result;
use clap::Args;
use lexis_core::model::WordId;
use lexis_core::reconcile::{Reconciler, ToggleOutcome, UpvoteDirection, WordCache};
use std::io::Write;
use std::path::Path;

use super::all_words;
use crate::output::{OutputMode, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct UpvoteArgs {
    /// Word id.
    pub id: WordId,
}

/// The outcome was rolled back; the reason was already printed.
#[derive(Debug)]
pub struct RolledBack {
    pub reason: String,
    pub code: &'static str,
}

impl std::fmt::Display for RolledBack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "upvote rolled back: {}", self.reason)
    }
}

impl std::error::Error for RolledBack {}

/// Execute `lx upvote`: add when not yet upvoted here, remove otherwise.
///
/// # Errors
///
/// Returns [`RolledBack`] when the store rejects the change; local state is
/// restored before returning.
pub fn run_upvote(args: &UpvoteArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let mut cache = WordCache::new(all_words(project.remote())?);
    let mut reconciler = Reconciler::load(project.prefs());

    let outcome = reconciler.toggle_upvote(&mut cache, project.remote(), args.id);

    render_mode(
        output,
        &outcome,
        |o, w| match o {
            ToggleOutcome::Committed {
                word_id,
                direction,
                remote_upvotes,
                ..
            } => writeln!(w, "committed\t{word_id}\t{}\t{remote_upvotes}", label(*direction)),
            ToggleOutcome::RolledBack {
                word_id,
                direction,
                error_code,
                ..
            } => writeln!(w, "rolled_back\t{word_id}\t{}\t{error_code}", label(*direction)),
        },
        |o, w| match o {
            ToggleOutcome::Committed {
                word_id,
                direction: UpvoteDirection::Add,
                remote_upvotes,
                ..
            } => writeln!(w, "▲ Upvoted #{word_id} ({remote_upvotes} upvotes)"),
            ToggleOutcome::Committed {
                word_id,
                remote_upvotes,
                ..
            } => writeln!(w, "△ Removed upvote from #{word_id} ({remote_upvotes} upvotes)"),
            ToggleOutcome::RolledBack {
                word_id,
                cached_upvotes,
                ..
            } => writeln!(
                w,
                "✗ Upvote on #{word_id} rolled back (still {} upvotes)",
                cached_upvotes.map_or_else(|| "?".to_string(), |n| n.to_string())
            ),
        },
    )?;

    if let ToggleOutcome::RolledBack {
        reason, error_code, ..
    } = outcome
    {
        return Err(RolledBack {
            reason,
            code: error_code,
        }
        .into());
    }
    Ok(())
}

const fn label(direction: UpvoteDirection) -> &'static str {
    match direction {
        UpvoteDirection::Add => "add",
        UpvoteDirection::Remove => "remove",
    }
}
