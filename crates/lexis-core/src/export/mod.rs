//! Word-list export formatters.
//!
//! Every formatter is a pure function of the word list and an
//! [`ExportContext`]: the same input always yields the same bytes, an empty
//! list yields a valid document with an empty body, and absent optional
//! fields render as empty text rather than failing.

pub mod csv;
pub mod json;
pub mod markdown;
pub mod pdf;

use chrono::{DateTime, Utc};
use std::{fmt, io, str::FromStr};
use thiserror::Error;

use crate::error::ErrorCode;
use crate::model::{ParseEnumError, Word};

/// Content-type prefix of word-list export file names.
pub const VOCABULARY_CONTENT: &str = "vocabulary";
/// Content-type prefix of favorites export file names.
pub const FAVORITES_CONTENT: &str = "favorite-words";
/// Content-type prefix of backup file names.
pub const BACKUP_CONTENT: &str = "vocabulary-backup";
/// Scope label used when no category filter applies.
pub const ALL_SCOPE: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pdf,
    Csv,
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }

    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Csv => "text/csv;charset=utf-8",
            Self::Json => "application/json",
            Self::Markdown => "text/markdown;charset=utf-8",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Markdown => "markdown",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(ParseEnumError {
                expected: "export format (pdf, csv, json, markdown)",
                got: s.to_string(),
            }),
        }
    }
}

/// Labels carried into every export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportContext {
    /// Category name, or [`ALL_SCOPE`].
    pub scope: String,
    pub generated_at: DateTime<Utc>,
}

impl ExportContext {
    pub fn new(scope: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        let scope = scope.into();
        Self {
            scope: if scope.trim().is_empty() {
                ALL_SCOPE.to_string()
            } else {
                scope.trim().to_string()
            },
            generated_at,
        }
    }

    /// Generation date as `YYYY-MM-DD`.
    #[must_use]
    pub fn date(&self) -> String {
        self.generated_at.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv encoding: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("json encoding: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pdf encoding: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("write: {0}")]
    Io(#[from] io::Error),
}

impl ExportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ExportFailed
    }
}

/// Render `words` in `format`.
///
/// # Errors
///
/// Returns an error only if the underlying encoder fails; word content
/// never causes a failure.
pub fn render(
    format: ExportFormat,
    words: &[Word],
    ctx: &ExportContext,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Pdf => pdf::render(words, ctx),
        ExportFormat::Csv => csv::render(words, ctx),
        ExportFormat::Json => json::render(words),
        ExportFormat::Markdown => Ok(markdown::render(words, ctx).into_bytes()),
    }
}

/// `<content>_<scope>_<YYYY-MM-DD>.<ext>` with the scope made file-system safe.
#[must_use]
pub fn file_name(content: &str, scope: &str, ctx: &ExportContext, extension: &str) -> String {
    format!(
        "{content}_{}_{}.{extension}",
        sanitize_scope(scope),
        ctx.date()
    )
}

/// File name for a word-list export in `format`.
#[must_use]
pub fn export_file_name(format: ExportFormat, ctx: &ExportContext) -> String {
    file_name(VOCABULARY_CONTENT, &ctx.scope, ctx, format.extension())
}

/// Keep letters, digits, `-` and `_`; collapse every other run to `-`.
#[must_use]
pub fn sanitize_scope(scope: &str) -> String {
    let mut out = String::with_capacity(scope.len());
    let mut pending_dash = false;
    for ch in scope.trim().chars() {
        if ch.is_alphanumeric() || ch == '-' || ch == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        ALL_SCOPE.to_string()
    } else {
        out
    }
}

/// Per-word display fields shared by the text formatters.
pub(crate) struct Fields<'a> {
    pub word: &'a str,
    pub phonetic: &'a str,
    pub meaning: &'a str,
    pub example: &'a str,
    pub example_translation: &'a str,
    pub category: &'a str,
}

impl<'a> Fields<'a> {
    pub(crate) fn of(word: &'a Word) -> Self {
        Self {
            word: &word.word,
            phonetic: word.pronunciation.as_deref().unwrap_or_default(),
            meaning: &word.meaning,
            example: word.example_sentence.as_deref().unwrap_or_default(),
            example_translation: word.example_translation.as_deref().unwrap_or_default(),
            category: word.category_name.as_deref().unwrap_or_default(),
        }
    }
}
