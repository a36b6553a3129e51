#![forbid(unsafe_code)]

mod cmd;
mod output;
mod project;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "lexis: a shared vocabulary store",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Output format: pretty, text, json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// The output mode named on the command line, if any.
    const fn output_flag(&self) -> Option<OutputMode> {
        if self.json {
            Some(OutputMode::Json)
        } else {
            self.format
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a lexis project",
        long_about = "Create .lexis/ with a config template and an empty store, optionally seeding the admin account.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    lx init\n\n    # Seed the admin account\n    lx init --admin-email admin@example.com --admin-password s3cret"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Words",
        about = "Add a word",
        long_about = "Add a word to the shared vocabulary. Anonymous additions are attributed to 'anonymous'.",
        after_help = "EXAMPLES:\n    # Add a word with a category\n    lx add serendipity \"a happy accident\" -c Nouns -d 3\n\n    # Emit machine-readable output\n    lx add ephemeral \"lasting a short time\" --json"
    )]
    Add(cmd::word::AddArgs),

    #[command(
        next_help_heading = "Words",
        about = "Edit a word (admin)",
        long_about = "Change any field of an existing word. Requires an admin session.",
        after_help = "EXAMPLES:\n    # Fix a meaning\n    lx edit 12 -m \"a fortunate discovery\"\n\n    # Move out of every category\n    lx edit 12 --uncategorized"
    )]
    Edit(cmd::word::EditArgs),

    #[command(
        next_help_heading = "Words",
        about = "Show one word",
        long_about = "Show every field of a word together with your local favorite and upvote state.",
        after_help = "EXAMPLES:\n    # Show a word\n    lx show 12\n\n    # Emit machine-readable output\n    lx show 12 --json"
    )]
    Show(cmd::word::ShowArgs),

    #[command(
        next_help_heading = "Words",
        about = "Delete a word (admin)",
        long_about = "Soft-delete a word so it no longer appears in listings. Requires an admin session.",
        after_help = "EXAMPLES:\n    # Delete a word\n    lx delete 12"
    )]
    Delete(cmd::word::DeleteArgs),

    #[command(
        next_help_heading = "Browse",
        about = "List words",
        long_about = "List words filtered by category, search text or favorites, sorted and paginated.",
        after_help = "EXAMPLES:\n    # Most upvoted first\n    lx list --sort upvotes\n\n    # Search within a category\n    lx list -c Verbs -s run\n\n    # Only favorites, second page\n    lx list -f -p 2"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Browse",
        about = "Suggest words for a partial input",
        long_about = "Suggest a few word spellings containing the input (at least two characters).",
        after_help = "EXAMPLES:\n    # Complete a prefix\n    lx suggest ser"
    )]
    Suggest(cmd::list::SuggestArgs),

    #[command(
        next_help_heading = "Engage",
        about = "Toggle your upvote on a word",
        long_about = "Upvote a word, or withdraw your upvote if you already gave one. The local state is rolled back when the store rejects the change.",
        after_help = "EXAMPLES:\n    # Upvote a word\n    lx upvote 12"
    )]
    Upvote(cmd::vote::UpvoteArgs),

    #[command(
        next_help_heading = "Engage",
        about = "Toggle a word as favorite",
        long_about = "Mark or unmark a word as a local favorite.",
        after_help = "EXAMPLES:\n    # Favorite a word\n    lx favorite 12"
    )]
    Favorite(cmd::favorite::FavoriteArgs),

    #[command(
        next_help_heading = "Engage",
        about = "List favorite words",
        long_about = "List your favorite words and how many were added since you last looked.",
        after_help = "EXAMPLES:\n    # Show favorites and reset the unread count\n    lx favorites --mark-read"
    )]
    Favorites(cmd::favorite::FavoritesArgs),

    #[command(
        next_help_heading = "Moderation",
        about = "Report a word",
        long_about = "Flag a word for an admin to review.",
        after_help = "EXAMPLES:\n    # Report a wrong meaning\n    lx report 12 -r \"meaning is wrong\""
    )]
    Report(cmd::report::ReportArgs),

    #[command(
        next_help_heading = "Moderation",
        about = "List reports (admin)",
        long_about = "List submitted reports, optionally filtered by status. Requires an admin session.",
        after_help = "EXAMPLES:\n    # Pending reports only\n    lx reports -s pending"
    )]
    Reports(cmd::report::ReportsArgs),

    #[command(
        next_help_heading = "Moderation",
        about = "Approve or dismiss a report (admin)",
        long_about = "Resolve a pending report. Requires an admin session.",
        after_help = "EXAMPLES:\n    # Approve a report\n    lx review 3 --approve\n\n    # Dismiss a report\n    lx review 3 --dismiss"
    )]
    Review(cmd::report::ReviewArgs),

    #[command(
        next_help_heading = "Moderation",
        about = "Manage categories",
        long_about = "List categories, or add, rename and delete them (admin).",
        after_help = "EXAMPLES:\n    # List categories\n    lx category list\n\n    # Add a category\n    lx category add Verbs -d \"action words\""
    )]
    Category(cmd::category::CategoryArgs),

    #[command(
        next_help_heading = "Data",
        about = "Export words",
        long_about = "Export the filtered word list as PDF, CSV, JSON or Markdown.",
        after_help = "EXAMPLES:\n    # CSV of everything\n    lx export\n\n    # PDF of one category\n    lx export --as pdf -c Verbs\n\n    # Favorites as JSON to stdout\n    lx export --as json -f --stdout"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Data",
        about = "Import words (admin)",
        long_about = "Validate and import words from a JSON array or a CSV file with a header row.",
        after_help = "EXAMPLES:\n    # Check a file without writing\n    lx import words.csv --dry-run\n\n    # Import it\n    lx import words.csv"
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        next_help_heading = "Data",
        about = "Back up words and categories (admin)",
        long_about = "Write every word and category to a versioned JSON backup file.",
        after_help = "EXAMPLES:\n    # Write a backup\n    lx backup -o backups/\n\n    # List earlier backups\n    lx backup --history"
    )]
    Backup(cmd::import::BackupArgs),

    #[command(
        next_help_heading = "Data",
        about = "Restore a backup (admin)",
        long_about = "Load a backup file, reusing categories that already exist by name.",
        after_help = "EXAMPLES:\n    # Restore a backup\n    lx restore backups/vocabulary-backup_all_2024-01-01.json"
    )]
    Restore(cmd::import::RestoreArgs),

    #[command(
        next_help_heading = "Account",
        about = "Sign in",
        long_about = "Sign in and keep the session token in the local preference file.",
        after_help = "EXAMPLES:\n    # Sign in\n    lx login -e admin@example.com -p s3cret"
    )]
    Login(cmd::auth::LoginArgs),

    #[command(
        next_help_heading = "Account",
        about = "Sign out",
        after_help = "EXAMPLES:\n    lx logout"
    )]
    Logout,

    #[command(
        next_help_heading = "Account",
        about = "Show the current identity",
        after_help = "EXAMPLES:\n    lx whoami --json"
    )]
    Whoami,

    #[command(
        next_help_heading = "Reporting",
        about = "Show vocabulary statistics",
        long_about = "Totals and breakdowns by category, difficulty and language.",
        after_help = "EXAMPLES:\n    # Dashboard\n    lx stats\n\n    # Emit machine-readable output\n    lx stats --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Practice",
        about = "Study words with flashcards, quizzes or spelling",
        long_about = "Walk a shuffled deck, answering on stdin. Lifetime counters (studied, correct, streak) are kept in the local preference file.",
        after_help = "EXAMPLES:\n    # Flashcards over everything\n    lx study\n\n    # Ten quiz questions from one category\n    lx study -m quiz -n 10 -c Nouns\n\n    # Lifetime statistics\n    lx study --stats"
    )]
    Study(cmd::study::StudyArgs),

    #[command(
        next_help_heading = "Practice",
        about = "Spell up to twenty words from their meaning",
        after_help = "EXAMPLES:\n    # A random session\n    lx dictation\n\n    # One category, repeatable order\n    lx dictation -c Verbs --seed 7"
    )]
    Dictation(cmd::study::DictationArgs),

    #[command(
        next_help_heading = "Local",
        about = "Inspect or clear local preferences",
        after_help = "EXAMPLES:\n    # Show stored preferences\n    lx prefs show\n\n    # Forget favorites, upvotes and the session\n    lx prefs clear"
    )]
    Prefs(cmd::prefs::PrefsArgs),

    #[command(
        next_help_heading = "Local",
        about = "Show the offline cache plan",
        long_about = "Print the cache names for the configured app version and the strategy each request would get.",
        after_help = "EXAMPLES:\n    # Classify a few requests\n    lx offline /index.html /rest/v1/words\n\n    # A page navigation\n    lx offline --navigate /words/12"
    )]
    Offline(cmd::offline::OfflineArgs),

    #[command(
        next_help_heading = "Local",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    lx completions bash > ~/.local/share/bash-completion/completions/lx"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LEXIS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "lexis=debug,info"
        } else {
            "lexis=info,warn"
        })
    });

    let format = env::var("LEXIS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Resolve the output mode: flag, then `FORMAT`, then user config, then TTY.
fn output_mode(flag: Option<OutputMode>, project_root: &Path) -> OutputMode {
    match lexis_core::config::resolve_config(project_root, flag.map(OutputMode::as_str)) {
        Ok(effective) => OutputMode::from_resolved(&effective.resolved_output),
        Err(e) => {
            debug!(error = %e, "config unreadable; using flag or pretty output");
            flag.unwrap_or(OutputMode::Pretty)
        }
    }
}

fn run(command: Commands, output: OutputMode, root: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Init(args) => cmd::init::run_init(&args, output, root),
        Commands::Add(args) => cmd::word::run_add(&args, output, root),
        Commands::Edit(args) => cmd::word::run_edit(&args, output, root),
        Commands::Show(args) => cmd::word::run_show(&args, output, root),
        Commands::Delete(args) => cmd::word::run_delete(&args, output, root),
        Commands::List(args) => cmd::list::run_list(&args, output, root),
        Commands::Suggest(args) => cmd::list::run_suggest(&args, output, root),
        Commands::Upvote(args) => cmd::vote::run_upvote(&args, output, root),
        Commands::Favorite(args) => cmd::favorite::run_favorite(&args, output, root),
        Commands::Favorites(args) => cmd::favorite::run_favorites(&args, output, root),
        Commands::Report(args) => cmd::report::run_report(&args, output, root),
        Commands::Reports(args) => cmd::report::run_reports(&args, output, root),
        Commands::Review(args) => cmd::report::run_review(&args, output, root),
        Commands::Category(args) => cmd::category::run_category(&args, output, root),
        Commands::Export(args) => cmd::export::run_export(&args, output, root),
        Commands::Import(args) => cmd::import::run_import(&args, output, root),
        Commands::Backup(args) => cmd::import::run_backup(&args, output, root),
        Commands::Restore(args) => cmd::import::run_restore(&args, output, root),
        Commands::Login(args) => cmd::auth::run_login(&args, output, root),
        Commands::Logout => cmd::auth::run_logout(output, root),
        Commands::Whoami => cmd::auth::run_whoami(output, root),
        Commands::Stats(args) => cmd::stats::run_stats(&args, output, root),
        Commands::Study(args) => cmd::study::run_study(&args, output, root),
        Commands::Dictation(args) => cmd::study::run_dictation(&args, output, root),
        Commands::Prefs(args) => cmd::prefs::run_prefs(&args, output, root),
        Commands::Offline(args) => cmd::offline::run_offline(&args, output, root),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let output = output_mode(cli.output_flag(), &project_root);

    if let Err(e) = run(cli.command, output, &project_root) {
        debug!(error = ?e, "command failed");
        render_error(output, &CliError::from_anyhow(&e))?;
        std::process::exit(1);
    }
    Ok(())
}
