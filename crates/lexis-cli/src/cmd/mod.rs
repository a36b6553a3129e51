pub mod auth;
pub mod category;
pub mod completions;
pub mod export;
pub mod favorite;
pub mod import;
pub mod init;
pub mod list;
pub mod offline;
pub mod prefs;
pub mod report;
pub mod stats;
pub mod study;
pub mod vote;
pub mod word;

use lexis_core::error::{StoreError, ValidationError};
use lexis_core::model::{Category, Word};
use lexis_core::store::{RemoteStore, WordFilter};
use std::io::{self, Write};

use crate::output::{pretty_kv, truncate};

/// Resolve a category given by id or by (case-insensitive) name.
///
/// # Errors
///
/// Returns [`StoreError::CategoryNotFound`] when nothing matches.
pub fn resolve_category(store: &dyn RemoteStore, key: &str) -> Result<Category, StoreError> {
    let categories = store.list_categories()?;
    if let Ok(id) = key.trim().parse::<i64>() {
        return categories
            .into_iter()
            .find(|c| c.id == id)
            .ok_or(StoreError::CategoryNotFound(id));
    }
    let name = key.trim();
    categories
        .into_iter()
        .find(|c| c.name.to_lowercase() == name.to_lowercase())
        .ok_or_else(|| {
            let mut err = ValidationError::default();
            err.push("category", format!("no category named '{name}'"));
            StoreError::Validation(err)
        })
}

/// Every live word, newest first.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
pub fn all_words(store: &dyn RemoteStore) -> Result<Vec<Word>, StoreError> {
    store.list_words(&WordFilter::default())
}

/// One tab-separated summary row.
pub fn word_row(w: &mut dyn Write, word: &Word) -> io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}",
        word.id,
        word.word,
        word.meaning,
        word.category_name.as_deref().unwrap_or(""),
        word.upvotes
    )
}

/// Full labeled view of one word.
pub fn word_detail(w: &mut dyn Write, word: &Word) -> io::Result<()> {
    writeln!(w, "#{} {}", word.id, word.word)?;
    if let Some(phonetic) = &word.pronunciation {
        pretty_kv(w, "Phonetic", phonetic)?;
    }
    pretty_kv(w, "Meaning", &word.meaning)?;
    if let Some(example) = &word.example_sentence {
        pretty_kv(w, "Example", example)?;
    }
    if let Some(translation) = &word.example_translation {
        pretty_kv(w, "Translation", translation)?;
    }
    pretty_kv(
        w,
        "Category",
        word.category_name.as_deref().unwrap_or("uncategorized"),
    )?;
    pretty_kv(w, "Difficulty", word.difficulty.label())?;
    pretty_kv(w, "Language", &word.language)?;
    if let Some(kind) = &word.word_type {
        pretty_kv(w, "Type", kind)?;
    }
    pretty_kv(w, "Upvotes", word.upvotes.to_string())?;
    pretty_kv(w, "Added by", &word.created_by)?;
    pretty_kv(w, "Added", word.created_at.format("%Y-%m-%d %H:%M").to_string())
}

/// Compact one-line view used in pretty listings.
pub fn word_line(w: &mut dyn Write, word: &Word, favorite: bool) -> io::Result<()> {
    let star = if favorite { "★" } else { " " };
    writeln!(
        w,
        "{star} {:>5}  {:<20} {:<40} ▲{}",
        word.id,
        truncate(&word.word, 20),
        truncate(&word.meaning, 40),
        word.upvotes
    )
}
