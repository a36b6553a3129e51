//! `lx export`: write the filtered word list as PDF, CSV, JSON or Markdown.

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Args;
use lexis_core::export::{
    self, ALL_SCOPE, ExportContext, ExportFormat, FAVORITES_CONTENT, json as json_export,
};
use lexis_core::reconcile::Reconciler;
use lexis_core::view;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::all_words;
use super::list::QueryArgs;
use crate::output::{OutputMode, pretty_kv, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output format: pdf, csv, json, markdown.
    #[arg(short = 'F', long = "as", default_value = "csv")]
    pub kind: ExportFormat,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Directory to write into (defaults to the configured export dir).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Write the document to stdout instead of a file.
    #[arg(long, conflicts_with = "out")]
    pub stdout: bool,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    path: String,
    format: String,
    mime: &'static str,
    scope: String,
    words: usize,
    bytes: usize,
}

/// Execute `lx export`.
///
/// `--favorites` with JSON writes the favorites document
/// (`favorite-words_<scope>_<date>.json`); every other combination writes
/// `vocabulary_<scope>_<date>.<ext>`.
///
/// # Errors
///
/// Returns an error if the store cannot be read, the category is unknown,
/// or the file cannot be written.
pub fn run_export(args: &ExportArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let (query, scope) = args.query.resolve(&project)?;
    let reconciler = Reconciler::load(project.prefs());

    let words = view::apply(&all_words(project.remote())?, &query, reconciler.favorites());
    let ctx = ExportContext::new(scope.unwrap_or_else(|| ALL_SCOPE.to_string()), Utc::now());

    let favorites_doc = args.query.favorites && args.kind == ExportFormat::Json;
    let (bytes, name) = if favorites_doc {
        (
            json_export::render_favorites(&words, &ctx)?,
            export::file_name(FAVORITES_CONTENT, &ctx.scope, &ctx, "json"),
        )
    } else {
        (
            export::render(args.kind, &words, &ctx)?,
            export::export_file_name(args.kind, &ctx),
        )
    };

    if args.stdout {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(&bytes)?;
        out.flush()?;
        return Ok(());
    }

    let dir = args
        .out
        .clone()
        .unwrap_or_else(|| project.config.export_dir(project_root));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(&name);
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), format = %args.kind, words = words.len(), "export written");

    let report = ExportReport {
        path: path.display().to_string(),
        format: args.kind.to_string(),
        mime: args.kind.mime(),
        scope: ctx.scope.clone(),
        words: words.len(),
        bytes: bytes.len(),
    };
    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "{}", r.path),
        |r, w| {
            writeln!(w, "✓ Exported {} words", r.words)?;
            pretty_kv(w, "File", &r.path)?;
            pretty_kv(w, "Format", &r.format)?;
            pretty_kv(w, "Scope", &r.scope)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ExportArgs,
    }

    #[test]
    fn export_defaults_to_csv_file() {
        let w = Wrapper::parse_from(["test"]);
        assert_eq!(w.args.kind, ExportFormat::Csv);
        assert!(!w.args.stdout);
        assert!(w.args.out.is_none());
    }

    #[test]
    fn export_parses_format_and_rejects_out_with_stdout() {
        let w = Wrapper::parse_from(["test", "--as", "markdown", "--category", "Travel"]);
        assert_eq!(w.args.kind, ExportFormat::Markdown);
        assert_eq!(w.args.query.category.as_deref(), Some("Travel"));
        assert!(Wrapper::try_parse_from(["test", "--stdout", "--out", "x"]).is_err());
    }
}
