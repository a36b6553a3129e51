//! `lx import`, `lx backup`, `lx restore`: bulk data in and out. Admin only.

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Args;
use lexis_core::export::{ALL_SCOPE, BACKUP_CONTENT, ExportContext, file_name};
use lexis_core::import::{
    self, BackupRecord, ImportFormat, ImportReport, RestoreReport, RowCheck,
};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::output::{OutputMode, pretty_kv, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON array or CSV file with a header row.
    pub file: PathBuf,

    /// Validate only; write nothing.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Directory to write into (defaults to the configured export dir).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// List remembered backups instead of creating one.
    #[arg(long)]
    pub history: bool,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Backup file written by `lx backup`.
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct ImportPayload {
    rows: usize,
    valid: usize,
    invalid: Vec<RowCheck>,
    dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ImportReport>,
}

/// Execute `lx import`.
///
/// # Errors
///
/// Returns an error when not signed in as admin or the file cannot be
/// read or parsed. Invalid rows are reported, not fatal.
pub fn run_import(args: &ImportArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let admin = project.require_admin()?;

    let format = ImportFormat::from_path(&args.file)?;
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let rows = import::parse(format, &text)?;
    let categories = project.remote().list_categories()?;
    let checks = import::validate_rows(&rows, &categories, &admin.email);

    let result = (!args.dry_run).then(|| import::import_valid(project.remote(), &checks));
    let payload = ImportPayload {
        rows: checks.len(),
        valid: checks.iter().filter(|c| c.is_valid()).count(),
        invalid: checks.into_iter().filter(|c| !c.is_valid()).collect(),
        dry_run: args.dry_run,
        result,
    };

    render_mode(
        output,
        &payload,
        |p, w| {
            for check in &p.invalid {
                writeln!(w, "invalid\t{}\t{}", check.row, check.errors.join("; "))?;
            }
            if let Some(r) = &p.result {
                writeln!(w, "imported\t{}\tfailed\t{}", r.imported, r.failed)?;
            }
            Ok(())
        },
        |p, w| {
            writeln!(w, "{} rows, {} valid", p.rows, p.valid)?;
            for check in &p.invalid {
                writeln!(w, "  row {} ({}): {}", check.row, check.word, check.errors.join("; "))?;
            }
            match &p.result {
                Some(r) => {
                    writeln!(w, "✓ Imported {} words", r.imported)?;
                    for err in &r.errors {
                        writeln!(w, "  failed: {err}")?;
                    }
                    Ok(())
                }
                None => writeln!(w, "Dry run: nothing written."),
            }
        },
    )
}

#[derive(Debug, Serialize)]
struct BackupPayload {
    path: String,
    words: usize,
    categories: usize,
}

/// Execute `lx backup`.
///
/// # Errors
///
/// Returns an error when not signed in as admin or the file cannot be written.
pub fn run_backup(args: &BackupArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    project.require_admin()?;
    let mut prefs = project.prefs();

    if args.history {
        let history = import::backup_history(&prefs);
        return render_mode(
            output,
            &history,
            |items, w| {
                for r in items {
                    writeln!(w, "{}\t{}\t{}\t{}", r.timestamp.to_rfc3339(), r.word_count, r.category_count, r.file)?;
                }
                Ok(())
            },
            |items, w| {
                if items.is_empty() {
                    return writeln!(w, "No backups recorded.");
                }
                for r in items {
                    writeln!(
                        w,
                        "{}  {} words, {} categories  {}",
                        r.timestamp.format("%Y-%m-%d %H:%M"),
                        r.word_count,
                        r.category_count,
                        r.file
                    )?;
                }
                Ok(())
            },
        );
    }

    let now = Utc::now();
    let backup = import::create_backup(project.remote(), now)?;
    let ctx = ExportContext::new(ALL_SCOPE, now);
    let name = file_name(BACKUP_CONTENT, ALL_SCOPE, &ctx, "json");

    let dir = args
        .out
        .clone()
        .unwrap_or_else(|| project.config.export_dir(project_root));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(&name);
    let mut bytes = serde_json::to_vec_pretty(&backup)?;
    bytes.push(b'\n');
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    import::record_backup(
        &mut prefs,
        BackupRecord {
            timestamp: now,
            word_count: backup.metadata.total_words,
            category_count: backup.metadata.total_categories,
            file: name,
        },
    )?;
    info!(path = %path.display(), words = backup.metadata.total_words, "backup written");

    let payload = BackupPayload {
        path: path.display().to_string(),
        words: backup.metadata.total_words,
        categories: backup.metadata.total_categories,
    };
    render_mode(
        output,
        &payload,
        |p, w| writeln!(w, "{}", p.path),
        |p, w| {
            writeln!(w, "✓ Backed up {} words and {} categories", p.words, p.categories)?;
            pretty_kv(w, "File", &p.path)
        },
    )
}

/// Execute `lx restore`.
///
/// # Errors
///
/// Returns an error when not signed in as admin or the backup is unreadable
/// or of an unsupported version.
pub fn run_restore(args: &RestoreArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    project.require_admin()?;

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let backup = import::parse_backup(&text)?;
    let report: RestoreReport = import::restore_backup(project.remote(), &backup)?;

    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(w, "words\t{}\t{}", r.imported_words, r.total_words)?;
            writeln!(w, "categories\t{}\t{}", r.imported_categories, r.total_categories)
        },
        |r, w| {
            writeln!(
                w,
                "✓ Restored {}/{} words and {}/{} categories ({} reused)",
                r.imported_words,
                r.total_words,
                r.imported_categories,
                r.total_categories,
                r.reused_categories
            )?;
            for err in &r.errors {
                writeln!(w, "  failed: {err}")?;
            }
            Ok(())
        },
    )
}
