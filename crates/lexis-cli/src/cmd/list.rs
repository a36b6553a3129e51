//! `lx list` and `lx suggest`: browse the vocabulary.

use anyhow::Result;
use clap::Args;
use lexis_core::model::Word;
use lexis_core::reconcile::Reconciler;
use lexis_core::view::{self, ListQuery, Page, SortDirection, SortKey};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use super::{all_words, resolve_category, word_line, word_row};
use crate::output::{OutputMode, render, render_mode};
use crate::project::Project;

/// Filter and sort options shared by `list` and `export`.
#[derive(Args, Debug, Default, Clone)]
pub struct QueryArgs {
    /// Category id or name.
    #[arg(short, long)]
    pub category: Option<String>,

    /// Case-insensitive search over word, meaning and example.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only favorite words.
    #[arg(short, long)]
    pub favorites: bool,

    /// Sort key: created_at, updated_at, word, upvotes.
    #[arg(long, default_value = "created_at")]
    pub sort: SortKey,

    /// Sort direction: asc or desc.
    #[arg(long, default_value = "desc")]
    pub order: SortDirection,
}

impl QueryArgs {
    /// Build the view query, resolving the category against the store.
    /// Returns the query and the scope label (category name or `all`).
    pub fn resolve(&self, project: &Project) -> Result<(ListQuery, Option<String>)> {
        let category = self
            .category
            .as_deref()
            .map(|key| resolve_category(project.remote(), key))
            .transpose()?;
        let query = ListQuery {
            category_id: category.as_ref().map(|c| c.id),
            search: self.search.clone(),
            favorites_only: self.favorites,
            sort: self.sort,
            direction: self.order,
        };
        Ok((query, category.map(|c| c.name)))
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Page number, starting at 1.
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Words per page (defaults to the configured page size).
    #[arg(short = 'n', long)]
    pub page_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Partial input to complete.
    pub input: String,
}

/// Execute `lx list`.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the category is unknown.
pub fn run_list(args: &ListArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let (query, _) = args.query.resolve(&project)?;
    let reconciler = Reconciler::load(project.prefs());

    let words = all_words(project.remote())?;
    let filtered = view::apply(&words, &query, reconciler.favorites());
    let page_size = args
        .page_size
        .unwrap_or_else(|| project.config.view.effective_page_size());
    let page = view::paginate(&filtered, args.page, page_size);

    let favorites = reconciler.favorites().clone();
    render_mode(
        output,
        &page,
        |p, w| {
            for word in &p.items {
                word_row(w, word)?;
            }
            Ok(())
        },
        |p, w| render_page_pretty(p, &favorites, w),
    )
}

fn render_page_pretty(
    page: &Page<Word>,
    favorites: &BTreeSet<i64>,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if page.items.is_empty() {
        return writeln!(w, "No words found.");
    }
    for word in &page.items {
        word_line(w, word, favorites.contains(&word.id))?;
    }
    writeln!(
        w,
        "\npage {}/{} · {} words",
        page.page, page.total_pages, page.total_items
    )
}

/// Execute `lx suggest`.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn run_suggest(args: &SuggestArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let words = all_words(project.remote())?;
    let suggestions = view::suggest(&words, &args.input);
    render(output, &suggestions, |items, w| {
        for item in items {
            writeln!(w, "{item}")?;
        }
        Ok(())
    })
}
