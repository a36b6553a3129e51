//! `lx stats`: vocabulary reporting dashboard.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use clap::Args;
use lexis_core::stats::{self, RECENT_WINDOW_DAYS, VocabularyStats};

use super::all_words;
use crate::output::{OutputMode, pretty_section, render};
use crate::project::Project;

/// Arguments for `lx stats`.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

/// Execute `lx stats`.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn run_stats(_args: &StatsArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::open(project_root)?;
    let words = all_words(project.remote())?;
    let categories = project.remote().list_categories()?;
    let payload = stats::compute(&words, &categories, Utc::now());

    render(output, &payload, |payload, w| render_stats_human(payload, w))
}

fn render_stats_human(stats: &VocabularyStats, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Vocabulary")?;
    writeln!(w, "  words:       {}", stats.total_words)?;
    writeln!(w, "  categories:  {}", stats.total_categories)?;
    writeln!(w, "  avg upvotes: {:.1}", stats.avg_upvotes)?;
    writeln!(w, "  added (last {RECENT_WINDOW_DAYS} days): {}", stats.recent_additions)?;

    writeln!(w, "\nBy category:")?;
    for c in &stats.by_category {
        writeln!(
            w,
            "  {}: {} words, avg ▲{:.1}, avg difficulty {:.1}, +{} recent",
            c.name, c.word_count, c.avg_upvotes, c.avg_difficulty, c.recent_additions
        )?;
    }

    writeln!(w, "\nBy difficulty:")?;
    for (label, count) in &stats.by_difficulty {
        writeln!(w, "  {label}: {count}")?;
    }

    writeln!(w, "\nBy language:")?;
    for (language, count) in &stats.by_language {
        writeln!(w, "  {language}: {count}")?;
    }

    if !stats.popular.is_empty() {
        writeln!(w, "\nMost upvoted:")?;
        for p in &stats.popular {
            writeln!(w, "  #{} {} (▲{})", p.id, p.word, p.upvotes)?;
        }
    }
    Ok(())
}
