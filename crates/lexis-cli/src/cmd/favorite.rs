//! `lx favorite` and `lx favorites`: the local favorite set.

use anyhow::Result;
use clap::Args;
use lexis_core::model::{Word, WordId};
use lexis_core::reconcile::Reconciler;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use super::{all_words, word_line, word_row};
use crate::output::{OutputMode, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct FavoriteArgs {
    /// Word id.
    pub id: WordId,
}

#[derive(Args, Debug)]
pub struct FavoritesArgs {
    /// Reset the unread favorites counter.
    #[arg(long)]
    pub mark_read: bool,
}

#[derive(Debug, Serialize)]
struct FavoriteToggle {
    word_id: WordId,
    favorite: bool,
    unread_favorites: u32,
}

/// Execute `lx favorite`: flip membership. Never touches the store beyond
/// checking that the word exists.
///
/// # Errors
///
/// Returns an error if the word does not exist.
pub fn run_favorite(args: &FavoriteArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    project.remote().get_word(args.id)?;

    let mut reconciler = Reconciler::load(project.prefs());
    let favorite = reconciler.toggle_favorite(args.id);
    let payload = FavoriteToggle {
        word_id: args.id,
        favorite,
        unread_favorites: reconciler.unread_favorites(),
    };

    render_mode(
        output,
        &payload,
        |p, w| writeln!(w, "{}\t{}", p.word_id, p.favorite),
        |p, w| {
            if p.favorite {
                writeln!(w, "★ Added #{} to favorites", p.word_id)
            } else {
                writeln!(w, "☆ Removed #{} from favorites", p.word_id)
            }
        },
    )
}

#[derive(Debug, Serialize)]
struct FavoritesPayload {
    unread_favorites: u32,
    /// Favorite ids whose word no longer exists.
    missing: Vec<WordId>,
    words: Vec<Word>,
}

/// Execute `lx favorites`.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn run_favorites(args: &FavoritesArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let mut reconciler = Reconciler::load(project.prefs());
    let unread = reconciler.unread_favorites();
    if args.mark_read {
        reconciler.mark_favorites_read();
    }

    let live = all_words(project.remote())?;
    let words: Vec<Word> = live
        .into_iter()
        .filter(|w| reconciler.is_favorite(w.id))
        .collect();
    let missing = reconciler
        .favorites()
        .iter()
        .copied()
        .filter(|id| !words.iter().any(|w| w.id == *id))
        .collect();

    let payload = FavoritesPayload {
        unread_favorites: reconciler.unread_favorites(),
        missing,
        words,
    };

    render_mode(
        output,
        &payload,
        |p, w| {
            for word in &p.words {
                word_row(w, word)?;
            }
            Ok(())
        },
        |p, w| {
            if p.words.is_empty() {
                writeln!(w, "No favorites yet. Add one with `lx favorite <id>`.")?;
            }
            for word in &p.words {
                word_line(w, word, true)?;
            }
            if unread > 0 {
                let note = if args.mark_read { " (marked read)" } else { "" };
                writeln!(w, "\n{unread} new since last visit{note}")?;
            }
            Ok(())
        },
    )
}
