//! `lx category`: category management.

use anyhow::Result;
use clap::{Args, Subcommand};
use lexis_core::model::{Category, CategoryDraft};
use std::io::Write;
use std::path::Path;
use tracing::info;

use super::resolve_category;
use crate::output::{OutputMode, render, render_mode, render_success};
use crate::project::Project;

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// List categories.
    List,

    /// Create a category (admin).
    Add {
        /// Unique category name.
        name: String,

        /// Optional description.
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Rename or describe a category (admin).
    Edit {
        /// Category id or name.
        category: String,

        /// New name.
        #[arg(short, long)]
        name: Option<String>,

        /// New description.
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a category; its words become uncategorized (admin).
    Delete {
        /// Category id or name.
        category: String,
    },
}

#[derive(Args, Debug)]
pub struct CategoryArgs {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

fn category_row(w: &mut dyn Write, c: &Category) -> std::io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}",
        c.id,
        c.name,
        c.description.as_deref().unwrap_or("")
    )
}

/// Execute `lx category <subcommand>`.
///
/// # Errors
///
/// Returns an error when a mutating subcommand runs without the admin
/// session, the category is unknown, or the name is taken.
pub fn run_category(args: &CategoryArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let store = project.remote();

    match &args.command {
        CategoryCommand::List => {
            let categories = store.list_categories()?;
            render(output, &categories, |items, w| {
                if items.is_empty() && output == OutputMode::Pretty {
                    return writeln!(w, "No categories.");
                }
                for c in items {
                    category_row(w, c)?;
                }
                Ok(())
            })
        }
        CategoryCommand::Add { name, description } => {
            project.require_admin()?;
            let created = store.insert_category(&CategoryDraft::new(name, description.clone()))?;
            info!(id = created.id, name = %created.name, "category created");
            render_mode(output, &created, |c, w| category_row(w, c), |c, w| {
                writeln!(w, "✓ Created category #{} {}", c.id, c.name)
            })
        }
        CategoryCommand::Edit {
            category,
            name,
            description,
        } => {
            project.require_admin()?;
            let current = resolve_category(store, category)?;
            let draft = CategoryDraft::new(
                name.clone().unwrap_or(current.name),
                description.clone().or(current.description),
            );
            let updated = store.update_category(current.id, &draft)?;
            render_mode(output, &updated, |c, w| category_row(w, c), |c, w| {
                writeln!(w, "✓ Updated category #{} {}", c.id, c.name)
            })
        }
        CategoryCommand::Delete { category } => {
            project.require_admin()?;
            let current = resolve_category(store, category)?;
            store.delete_category(current.id)?;
            info!(id = current.id, "category deleted");
            if output.is_json() {
                return render(
                    output,
                    &serde_json::json!({ "id": current.id, "deleted": true }),
                    |_, _| Ok(()),
                );
            }
            render_success(output, &format!("Deleted category {}", current.name))
        }
    }
}
