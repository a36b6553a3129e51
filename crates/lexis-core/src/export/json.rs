use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ExportContext, ExportError};
use crate::model::Word;

/// Pretty-printed array of the words, in the given order.
///
/// # Errors
///
/// Returns an error only if serialization fails.
pub fn render(words: &[Word]) -> Result<Vec<u8>, ExportError> {
    let mut out = serde_json::to_vec_pretty(words)?;
    out.push(b'\n');
    Ok(out)
}

#[derive(Debug, Serialize)]
struct FavoritesDocument<'a> {
    export_date: DateTime<Utc>,
    total_words: usize,
    words: &'a [Word],
}

/// Favorites export: the words wrapped with a date and a count.
///
/// # Errors
///
/// Returns an error only if serialization fails.
pub fn render_favorites(words: &[Word], ctx: &ExportContext) -> Result<Vec<u8>, ExportError> {
    let doc = FavoritesDocument {
        export_date: ctx.generated_at,
        total_words: words.len(),
        words,
    };
    let mut out = serde_json::to_vec_pretty(&doc)?;
    out.push(b'\n');
    Ok(out)
}
