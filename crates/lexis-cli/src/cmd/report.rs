//! `lx report`, `lx reports`, `lx review`: user reports and admin review.

use anyhow::Result;
use clap::Args;
use lexis_core::model::{Report, ReportAction, ReportStatus, WordId};
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::output::{OutputMode, render, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Word id.
    pub id: WordId,

    /// What is wrong with the entry.
    #[arg(short, long)]
    pub reason: String,
}

#[derive(Args, Debug)]
pub struct ReportsArgs {
    /// Only reports in this status: pending, reviewed, resolved.
    #[arg(short, long)]
    pub status: Option<ReportStatus>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Decision {
    /// Accept the report (status becomes resolved).
    #[arg(long)]
    pub approve: bool,

    /// Dismiss the report (status becomes reviewed).
    #[arg(long)]
    pub dismiss: bool,
}

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Report id.
    pub id: i64,

    #[command(flatten)]
    pub decision: Decision,
}

impl ReviewArgs {
    const fn action(&self) -> ReportAction {
        if self.decision.approve {
            ReportAction::Approve
        } else {
            ReportAction::Dismiss
        }
    }
}

fn report_row(w: &mut dyn Write, report: &Report) -> std::io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}",
        report.id, report.word_id, report.status, report.reported_by, report.reason
    )
}

/// Execute `lx report`.
///
/// # Errors
///
/// Returns an error when the word is missing or the reason is blank.
pub fn run_report(args: &ReportArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let reporter = project.author()?;
    let report = project
        .remote()
        .insert_report(args.id, &args.reason, &reporter)?;
    info!(report = report.id, word = report.word_id, "report filed");

    render_mode(output, &report, |r, w| report_row(w, r), |r, w| {
        writeln!(w, "✓ Report #{} filed against word #{}", r.id, r.word_id)
    })
}

/// Execute `lx reports`. Admin only.
///
/// # Errors
///
/// Returns an error when not signed in as admin.
pub fn run_reports(args: &ReportsArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    project.require_admin()?;
    let reports = project.remote().list_reports(args.status)?;

    render(output, &reports, |items, w| {
        if items.is_empty() && output == OutputMode::Pretty {
            return writeln!(w, "No reports.");
        }
        for report in items {
            report_row(w, report)?;
        }
        Ok(())
    })
}

/// Execute `lx review`. Admin only; pending reports only.
///
/// # Errors
///
/// Returns an error when not signed in as admin, the report is missing, or
/// it was already reviewed.
pub fn run_review(args: &ReviewArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let admin = project.require_admin()?;
    let target = args.action().target_status();
    let report = project.remote().set_report_status(args.id, target)?;
    info!(report = report.id, status = %report.status, by = %admin.email, "report reviewed");

    render_mode(output, &report, |r, w| report_row(w, r), |r, w| {
        writeln!(w, "✓ Report #{} is now {}", r.id, r.status)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ReviewArgs,
    }

    #[test]
    fn review_requires_exactly_one_decision() {
        let w = Wrapper::parse_from(["test", "3", "--approve"]);
        assert_eq!(w.args.action(), ReportAction::Approve);
        let w = Wrapper::parse_from(["test", "3", "--dismiss"]);
        assert_eq!(w.args.action(), ReportAction::Dismiss);

        assert!(Wrapper::try_parse_from(["test", "3"]).is_err());
        assert!(Wrapper::try_parse_from(["test", "3", "--approve", "--dismiss"]).is_err());
    }
}
