//! Batch import, full backup and restore.
//!
//! Import rows arrive as JSON objects or CSV records whose keys are matched
//! loosely (case-insensitive, several aliases per field, so an exported CSV
//! imports back). Every row is validated before anything is written, and
//! only valid rows are inserted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::{ErrorCode, StoreError};
use crate::model::{Category, CategoryDraft, Difficulty, Word, WordDraft};
use crate::prefs::{PrefError, PrefStore};
use crate::store::{RemoteStore, WordFilter};

/// Backup document format version.
pub const BACKUP_VERSION: &str = "1.0";
pub const BACKUP_HISTORY_KEY: &str = "lexis_backup_history";
/// Number of backup history entries kept.
pub const BACKUP_HISTORY_LIMIT: usize = 10;
const EXPORTED_BY: &str = "lexis";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("import input must be a JSON array of objects")]
    NotAnArray,

    #[error("unsupported import file '{0}': expected .json or .csv")]
    UnknownFormat(String),

    #[error("unsupported backup version '{0}' (expected {BACKUP_VERSION})")]
    UnsupportedVersion(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ImportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Store(err) => err.code(),
            _ => ErrorCode::ImportFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// Pick the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnknownFormat`] for anything but `.json`/`.csv`.
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(ImportError::UnknownFormat(path.display().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Word,
    Meaning,
    Example,
    ExampleTranslation,
    Category,
    Difficulty,
    Language,
    Pronunciation,
    WordType,
}

fn field_for(key: &str) -> Option<Field> {
    let key = key.trim().trim_start_matches('\u{feff}').to_lowercase();
    let field = match key.as_str() {
        "word" | "单词" => Field::Word,
        "meaning" | "definition" | "释义" => Field::Meaning,
        "example" | "example_sentence" | "examplesentence" | "例句" => Field::Example,
        "example_translation" | "exampletranslation" | "例句释义" => {
            Field::ExampleTranslation
        }
        "category" | "category_name" | "categoryname" | "分类" => Field::Category,
        "difficulty" | "difficulty_level" | "difficultylevel" | "难度" => Field::Difficulty,
        "language" | "语言" => Field::Language,
        "pronunciation" | "phonetic" | "发音" | "音标" => Field::Pronunciation,
        "type" | "word_type" | "wordtype" | "词性" => Field::WordType,
        _ => return None,
    };
    Some(field)
}

/// One raw input record, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    values: HashMap<Field, String>,
}

impl ImportRow {
    fn set(&mut self, key: &str, value: String) {
        if let Some(field) = field_for(key) {
            self.values.insert(field, value);
        }
    }

    fn get(&self, field: Field) -> Option<&str> {
        self.values
            .get(&field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Parse a JSON array of objects.
///
/// # Errors
///
/// Returns an error for invalid JSON or a non-array document.
pub fn parse_json(text: &str) -> Result<Vec<ImportRow>, ImportError> {
    let Value::Array(items) = serde_json::from_str(text.trim_start_matches('\u{feff}'))? else {
        return Err(ImportError::NotAnArray);
    };
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(map) = item else {
            return Err(ImportError::NotAnArray);
        };
        let mut row = ImportRow::default();
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Null => continue,
                other => other.to_string(),
            };
            row.set(&key, text);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Parse CSV with a header row. A leading BOM is ignored.
///
/// # Errors
///
/// Returns an error for malformed CSV.
pub fn parse_csv(text: &str) -> Result<Vec<ImportRow>, ImportError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let mut row = ImportRow::default();
        for (key, value) in headers.iter().zip(record.iter()) {
            row.set(key, value.to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Parse `text` in `format`.
///
/// # Errors
///
/// Returns a parse error.
pub fn parse(format: ImportFormat, text: &str) -> Result<Vec<ImportRow>, ImportError> {
    match format {
        ImportFormat::Json => parse_json(text),
        ImportFormat::Csv => parse_csv(text),
    }
}

/// Validation result for one input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowCheck {
    /// 1-based position in the input.
    pub row: usize,
    pub word: String,
    pub errors: Vec<String>,
    #[serde(skip)]
    pub draft: Option<WordDraft>,
}

impl RowCheck {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.draft.is_some()
    }
}

/// Validate every row against the field rules and the known categories.
#[must_use]
pub fn validate_rows(rows: &[ImportRow], categories: &[Category], created_by: &str) -> Vec<RowCheck> {
    let by_name: HashMap<String, i64> = categories
        .iter()
        .map(|c| (c.name.to_lowercase(), c.id))
        .collect();

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let mut errors = Vec::new();
            let mut draft = WordDraft::new(
                row.get(Field::Word).unwrap_or_default(),
                row.get(Field::Meaning).unwrap_or_default(),
            );
            draft.example_sentence = row.get(Field::Example).map(str::to_string);
            draft.example_translation = row.get(Field::ExampleTranslation).map(str::to_string);
            draft.pronunciation = row.get(Field::Pronunciation).map(str::to_string);
            draft.word_type = row.get(Field::WordType).map(str::to_string);
            if let Some(language) = row.get(Field::Language) {
                draft.language = language.to_string();
            }
            draft.created_by = created_by.to_string();

            if let Some(level) = row.get(Field::Difficulty) {
                match level.parse::<Difficulty>() {
                    Ok(d) => draft.difficulty = d,
                    Err(err) => errors.push(err.to_string()),
                }
            }

            if let Some(name) = row.get(Field::Category) {
                match by_name.get(&name.to_lowercase()) {
                    Some(id) => draft.category_id = Some(*id),
                    None => errors.push(format!("category '{name}' does not exist")),
                }
            }

            let draft = draft.normalized();
            if let Err(problems) = draft.validate() {
                errors.extend(
                    problems
                        .problems
                        .iter()
                        .map(|p| format!("{}: {}", p.field, p.message)),
                );
            }

            RowCheck {
                row: index + 1,
                word: draft.word.clone(),
                draft: errors.is_empty().then_some(draft),
                errors,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
    pub skipped_invalid: usize,
    pub errors: Vec<String>,
}

/// Insert the valid rows. Invalid rows are counted and skipped; store
/// failures on individual rows are collected rather than aborting.
pub fn import_valid(store: &dyn RemoteStore, checks: &[RowCheck]) -> ImportReport {
    let mut report = ImportReport::default();
    for check in checks {
        let Some(draft) = check.draft.as_ref().filter(|_| check.errors.is_empty()) else {
            report.skipped_invalid += 1;
            continue;
        };
        match store.insert_word(draft) {
            Ok(_) => report.imported += 1,
            Err(err) => {
                warn!(row = check.row, error = %err, "import row failed");
                report.failed += 1;
                report.errors.push(format!("{}: {err}", check.word));
            }
        }
    }
    info!(
        imported = report.imported,
        failed = report.failed,
        skipped = report.skipped_invalid,
        "import finished"
    );
    report
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupData {
    pub words: Vec<Word>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub total_words: usize,
    pub total_categories: usize,
    pub exported_by: String,
}

/// Full snapshot of the live vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub data: BackupData,
    pub metadata: BackupMetadata,
}

/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn create_backup(store: &dyn RemoteStore, now: DateTime<Utc>) -> Result<Backup, StoreError> {
    let words = store.list_words(&WordFilter::default())?;
    let categories = store.list_categories()?;
    Ok(Backup {
        version: BACKUP_VERSION.to_string(),
        timestamp: now,
        metadata: BackupMetadata {
            total_words: words.len(),
            total_categories: categories.len(),
            exported_by: EXPORTED_BY.to_string(),
        },
        data: BackupData { words, categories },
    })
}

/// # Errors
///
/// Returns an error for malformed JSON or an unsupported version.
pub fn parse_backup(text: &str) -> Result<Backup, ImportError> {
    let backup: Backup = serde_json::from_str(text.trim_start_matches('\u{feff}'))?;
    if backup.version != BACKUP_VERSION {
        return Err(ImportError::UnsupportedVersion(backup.version));
    }
    Ok(backup)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub imported_words: usize,
    pub imported_categories: usize,
    /// Categories whose name already existed and were reused.
    pub reused_categories: usize,
    pub total_words: usize,
    pub total_categories: usize,
    pub errors: Vec<String>,
}

/// Recreate a backup's categories and words in `store`.
///
/// Categories are matched by name: an existing category with the same name
/// is reused. Word category references are remapped to the new ids. Rows
/// that fail are reported and skipped.
///
/// # Errors
///
/// Returns an error only if existing categories cannot be listed.
pub fn restore_backup(store: &dyn RemoteStore, backup: &Backup) -> Result<RestoreReport, ImportError> {
    let mut report = RestoreReport {
        total_words: backup.data.words.len(),
        total_categories: backup.data.categories.len(),
        ..RestoreReport::default()
    };

    let mut existing: HashMap<String, i64> = store
        .list_categories()?
        .into_iter()
        .map(|c| (c.name.to_lowercase(), c.id))
        .collect();
    let mut remap: BTreeMap<i64, i64> = BTreeMap::new();

    for category in &backup.data.categories {
        if let Some(id) = existing.get(&category.name.to_lowercase()) {
            remap.insert(category.id, *id);
            report.reused_categories += 1;
            continue;
        }
        let draft = CategoryDraft::new(category.name.clone(), category.description.clone());
        match store.insert_category(&draft) {
            Ok(created) => {
                remap.insert(category.id, created.id);
                existing.insert(created.name.to_lowercase(), created.id);
                report.imported_categories += 1;
            }
            Err(err) => report
                .errors
                .push(format!("category '{}': {err}", category.name)),
        }
    }

    for word in &backup.data.words {
        let mut draft = word.to_draft();
        draft.category_id = word.category_id.and_then(|old| remap.get(&old).copied());
        match store.insert_word(&draft) {
            Ok(_) => report.imported_words += 1,
            Err(err) => report.errors.push(format!("word '{}': {err}", word.word)),
        }
    }

    info!(
        words = report.imported_words,
        categories = report.imported_categories,
        errors = report.errors.len(),
        "backup restored"
    );
    Ok(report)
}

/// One remembered backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub timestamp: DateTime<Utc>,
    pub word_count: usize,
    pub category_count: usize,
    pub file: String,
}

/// Remembered backups, newest first.
#[must_use]
pub fn backup_history(prefs: &PrefStore) -> Vec<BackupRecord> {
    prefs.get(BACKUP_HISTORY_KEY, Vec::new())
}

/// Prepend `record` to the history, keeping the newest entries only.
///
/// # Errors
///
/// Returns an error if the preference write fails.
pub fn record_backup(prefs: &mut PrefStore, record: BackupRecord) -> Result<(), PrefError> {
    let mut history = backup_history(prefs);
    history.insert(0, record);
    history.truncate(BACKUP_HISTORY_LIMIT);
    prefs.set(BACKUP_HISTORY_KEY, &history)
}
