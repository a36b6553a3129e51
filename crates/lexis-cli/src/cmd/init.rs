use anyhow::{Context as _, Result};
use clap::Args;
use lexis_core::config::{CONFIG_FILE, LEXIS_DIR, ProjectConfig};
use lexis_core::store::SqliteStore;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::output::{OutputMode, pretty_kv, render_mode};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force re-initialization even if `.lexis/` already exists.
    #[arg(long)]
    pub force: bool,

    /// Email of the admin account (written to the project config).
    #[arg(long, requires = "admin_password")]
    pub admin_email: Option<String>,

    /// Password for the admin account.
    #[arg(long, requires = "admin_email")]
    pub admin_password: Option<String>,
}

const GITIGNORE: &str = "store.sqlite3*\nprefs.json*\n";

fn config_toml(admin_email: Option<&str>) -> String {
    let admin = admin_email.map_or_else(
        || "# admin_email = \"admin@example.com\"".to_string(),
        |email| format!("admin_email = \"{email}\""),
    );
    format!(
        "[auth]\n{admin}\n\n[export]\n# dir = \"exports\"\n\n[view]\npage_size = 20\n\n[offline]\napp = \"lexis\"\nversion = 1\n"
    )
}

#[derive(Debug, Serialize)]
struct InitReport {
    root: String,
    store: String,
    config: String,
    admin_email: Option<String>,
}

/// Execute `lx init`. Creates the project skeleton:
///
/// ```text
/// .lexis/
///   config.toml      (project config template)
///   store.sqlite3    (word store, migrated to the latest schema)
///   .gitignore
/// ```
///
/// # Errors
///
/// Returns an error if `.lexis/` already exists and `--force` is not set,
/// or if any filesystem or store operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let lexis_dir = project_root.join(LEXIS_DIR);

    if lexis_dir.exists() && !args.force {
        anyhow::bail!("{LEXIS_DIR}/ already exists. Use `lx init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&lexis_dir)
        .with_context(|| format!("Failed to create {}", lexis_dir.display()))?;

    let config_path = lexis_dir.join(CONFIG_FILE);
    std::fs::write(&config_path, config_toml(args.admin_email.as_deref()))
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = lexis_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let store_path = ProjectConfig::default().store_path(project_root);
    let store = SqliteStore::open(&store_path)?;

    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) {
        store.create_user(email, password)?;
    }

    let report = InitReport {
        root: project_root.display().to_string(),
        store: store_path.display().to_string(),
        config: config_path.display().to_string(),
        admin_email: args.admin_email.clone(),
    };

    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "initialized\t{}", r.store),
        |r, w| {
            writeln!(w, "✓ Initialized {LEXIS_DIR}/ vocabulary store.")?;
            writeln!(w)?;
            pretty_kv(w, "Store", &r.store)?;
            pretty_kv(w, "Config", &r.config)?;
            if let Some(email) = &r.admin_email {
                pretty_kv(w, "Admin", email)?;
            }
            writeln!(w)?;
            writeln!(w, "Next steps:")?;
            writeln!(w, "  lx add cat \"a small feline\"")?;
            writeln!(w, "  lx list")
        },
    )
}
