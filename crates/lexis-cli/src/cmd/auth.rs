//! `lx login`, `lx logout`, `lx whoami`.

use anyhow::Result;
use clap::Args;
use lexis_core::model::ANONYMOUS;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::output::{OutputMode, render_mode, render_success};
use crate::project::{Project, SESSION_KEY};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email.
    #[arg(short, long)]
    pub email: String,

    /// Account password.
    #[arg(short, long)]
    pub password: String,
}

#[derive(Debug, Serialize)]
struct Identity {
    email: String,
    signed_in: bool,
    admin: bool,
}

/// Execute `lx login`: exchange credentials for a session token kept in the
/// local preference file.
///
/// # Errors
///
/// Returns an `Unauthorized` error on bad credentials.
pub fn run_login(args: &LoginArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let session = project.remote().sign_in(&args.email, &args.password)?;
    project.prefs().set(SESSION_KEY, &session.token)?;
    info!(email = %session.email, "signed in");

    let identity = Identity {
        admin: session.is_admin(project.config.auth.admin_email.as_deref()),
        email: session.email,
        signed_in: true,
    };
    render_mode(
        output,
        &identity,
        |i, w| writeln!(w, "{}", i.email),
        |i, w| {
            let role = if i.admin { " (admin)" } else { "" };
            writeln!(w, "✓ Signed in as {}{role}", i.email)
        },
    )
}

/// Execute `lx logout`.
///
/// # Errors
///
/// Returns an error if the store or the preference file cannot be updated.
pub fn run_logout(output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let mut prefs = project.prefs();
    let token: Option<String> = prefs.get(SESSION_KEY, None);
    if let Some(token) = token {
        project.remote().sign_out(&token)?;
        prefs.remove(SESSION_KEY)?;
        info!("signed out");
    }
    render_success(output, "Signed out")
}

/// Execute `lx whoami`.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
pub fn run_whoami(output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let identity = match project.session()? {
        Some(session) => Identity {
            admin: session.is_admin(project.config.auth.admin_email.as_deref()),
            email: session.email,
            signed_in: true,
        },
        None => Identity {
            email: ANONYMOUS.to_string(),
            signed_in: false,
            admin: false,
        },
    };
    render_mode(
        output,
        &identity,
        |i, w| writeln!(w, "{}", i.email),
        |i, w| {
            if i.signed_in {
                let role = if i.admin { " (admin)" } else { "" };
                writeln!(w, "{}{role}", i.email)
            } else {
                writeln!(w, "Not signed in (posting as {ANONYMOUS})")
            }
        },
    )
}
