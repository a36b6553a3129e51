//! `lx add`, `lx edit`, `lx show`, `lx delete`: single-word commands.

use anyhow::Result;
use clap::Args;
use lexis_core::model::{Difficulty, Word, WordDraft, WordId};
use lexis_core::reconcile::Reconciler;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

use super::{resolve_category, word_detail, word_row};
use crate::output::{OutputMode, render, render_mode, render_success};
use crate::project::Project;

/// Optional fields shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct WordFields {
    /// Example sentence.
    #[arg(short, long)]
    pub example: Option<String>,

    /// Translation of the example sentence.
    #[arg(long)]
    pub translation: Option<String>,

    /// Phonetic spelling.
    #[arg(short, long)]
    pub phonetic: Option<String>,

    /// Category id or name.
    #[arg(short, long)]
    pub category: Option<String>,

    /// Difficulty: 1-4 or beginner|intermediate|advanced|professional.
    #[arg(short, long)]
    pub difficulty: Option<Difficulty>,

    /// Language tag.
    #[arg(short, long)]
    pub language: Option<String>,

    /// Part of speech (noun, verb, ...).
    #[arg(long = "type")]
    pub word_type: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// The word itself.
    pub word: String,

    /// Its meaning.
    pub meaning: String,

    #[command(flatten)]
    pub fields: WordFields,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Word id.
    pub id: WordId,

    /// Replace the word text.
    #[arg(long)]
    pub word: Option<String>,

    /// Replace the meaning.
    #[arg(short, long)]
    pub meaning: Option<String>,

    /// Remove the category.
    #[arg(long, conflicts_with = "category")]
    pub uncategorized: bool,

    #[command(flatten)]
    pub fields: WordFields,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Word id.
    pub id: WordId,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Word id.
    pub id: WordId,
}

fn apply_fields(project: &Project, draft: &mut WordDraft, fields: &WordFields) -> Result<()> {
    if let Some(example) = &fields.example {
        draft.example_sentence = Some(example.clone());
    }
    if let Some(translation) = &fields.translation {
        draft.example_translation = Some(translation.clone());
    }
    if let Some(phonetic) = &fields.phonetic {
        draft.pronunciation = Some(phonetic.clone());
    }
    if let Some(category) = &fields.category {
        draft.category_id = Some(resolve_category(project.remote(), category)?.id);
    }
    if let Some(difficulty) = fields.difficulty {
        draft.difficulty = difficulty;
    }
    if let Some(language) = &fields.language {
        draft.language.clone_from(language);
    }
    if let Some(kind) = &fields.word_type {
        draft.word_type = Some(kind.clone());
    }
    Ok(())
}

/// Execute `lx add`.
///
/// # Errors
///
/// Returns an error on validation failure or store failure.
pub fn run_add(args: &AddArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let mut draft = WordDraft::new(&args.word, &args.meaning);
    apply_fields(&project, &mut draft, &args.fields)?;
    draft.created_by = project.author()?;

    let word = project.remote().insert_word(&draft.normalized())?;
    info!(id = word.id, word = %word.word, "word added");

    render_mode(output, &word, |w, out| word_row(out, w), |w, out| {
        writeln!(out, "✓ Added #{} {}", w.id, w.word)
    })
}

/// Execute `lx edit`. Admin only.
///
/// # Errors
///
/// Returns an error when not signed in as admin, the word is missing, or
/// the edited fields fail validation.
pub fn run_edit(args: &EditArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    project.require_admin()?;

    let current = project.remote().get_word(args.id)?;
    let mut draft = current.to_draft();
    if let Some(word) = &args.word {
        draft.word.clone_from(word);
    }
    if let Some(meaning) = &args.meaning {
        draft.meaning.clone_from(meaning);
    }
    apply_fields(&project, &mut draft, &args.fields)?;
    if args.uncategorized {
        draft.category_id = None;
    }

    let word = project.remote().update_word(args.id, &draft.normalized())?;
    render_mode(output, &word, |w, out| word_row(out, w), |w, out| {
        writeln!(out, "✓ Updated #{} {}", w.id, w.word)
    })
}

#[derive(Debug, Serialize)]
struct ShowPayload {
    #[serde(flatten)]
    word: Word,
    favorite: bool,
    upvoted: bool,
}

/// Execute `lx show`.
///
/// # Errors
///
/// Returns an error if the word is missing or soft-deleted.
pub fn run_show(args: &ShowArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let word = project.remote().get_word(args.id)?;
    let reconciler = Reconciler::load(project.prefs());

    let payload = ShowPayload {
        favorite: reconciler.is_favorite(word.id),
        upvoted: reconciler.is_upvoted(word.id),
        word,
    };
    render_mode(
        output,
        &payload,
        |p, w| word_row(w, &p.word),
        |p, w| {
            word_detail(w, &p.word)?;
            let mut marks = Vec::new();
            if p.favorite {
                marks.push("★ favorite");
            }
            if p.upvoted {
                marks.push("▲ upvoted");
            }
            if !marks.is_empty() {
                writeln!(w, "{}", marks.join("  "))?;
            }
            Ok(())
        },
    )
}

/// Execute `lx delete`: soft-delete, admin only.
///
/// # Errors
///
/// Returns an error when not signed in as admin or the word is missing.
pub fn run_delete(args: &DeleteArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let admin = project.require_admin()?;
    project.remote().soft_delete_word(args.id)?;
    info!(id = args.id, by = %admin.email, "word deleted");

    if output.is_json() {
        return render(
            output,
            &serde_json::json!({ "id": args.id, "deleted": true }),
            |_, _| Ok(()),
        );
    }
    render_success(output, &format!("Deleted word #{}", args.id))
}
