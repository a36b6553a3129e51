//! The remote store seam.
//!
//! [`RemoteStore`] is everything the client consumes from the backend: word
//! queries and writes, the atomic upvote increment, categories, reports and
//! auth. [`SqliteStore`] is the bundled implementation.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::model::{
    Category, CategoryDraft, Report, ReportStatus, Session, Word, WordDraft, WordId,
};

/// Server-side filter for word listings.
///
/// Results are ordered newest first and exclude soft-deleted rows unless
/// `include_deleted` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFilter {
    /// Exact category match.
    pub category_id: Option<i64>,
    /// Case-insensitive substring over word, meaning and example sentence.
    pub search: Option<String>,
    pub include_deleted: bool,
}

impl WordFilter {
    #[must_use]
    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.trim().is_empty() {
            None
        } else {
            Some(term)
        };
        self
    }
}

/// Query/command interface of the backend.
pub trait RemoteStore {
    /// List words matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn list_words(&self, filter: &WordFilter) -> Result<Vec<Word>, StoreError>;

    /// Fetch one live (not soft-deleted) word.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WordNotFound`] when absent or deleted.
    fn get_word(&self, id: WordId) -> Result<Word, StoreError>;

    /// # Errors
    ///
    /// Returns an error on validation failure or store failure.
    fn insert_word(&self, draft: &WordDraft) -> Result<Word, StoreError>;

    /// # Errors
    ///
    /// Returns an error on validation failure, a missing word, or store failure.
    fn update_word(&self, id: WordId, draft: &WordDraft) -> Result<Word, StoreError>;

    /// Mark a word deleted; it disappears from every listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WordNotFound`] when absent or already deleted.
    fn soft_delete_word(&self, id: WordId) -> Result<(), StoreError>;

    /// Atomically add one upvote and return the new counter.
    ///
    /// # Errors
    ///
    /// Returns an error when the word is missing or the store fails.
    fn increment_upvotes(&self, id: WordId) -> Result<u32, StoreError>;

    /// Overwrite the upvote counter. There is no atomic decrement; see
    /// [`decrement_upvotes`].
    ///
    /// # Errors
    ///
    /// Returns an error when the word is missing or the store fails.
    fn set_upvotes(&self, id: WordId, upvotes: u32) -> Result<u32, StoreError>;

    /// All categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// # Errors
    ///
    /// Returns an error on validation failure, a duplicate name, or store failure.
    fn insert_category(&self, draft: &CategoryDraft) -> Result<Category, StoreError>;

    /// # Errors
    ///
    /// Returns an error on validation failure, a missing category, or store failure.
    fn update_category(&self, id: i64, draft: &CategoryDraft) -> Result<Category, StoreError>;

    /// Hard-delete a category; its words become uncategorized.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CategoryNotFound`] when absent.
    fn delete_category(&self, id: i64) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns an error when the word is missing, the reason is blank, or the store fails.
    fn insert_report(
        &self,
        word_id: WordId,
        reason: &str,
        reported_by: &str,
    ) -> Result<Report, StoreError>;

    /// Reports, newest first, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn list_reports(&self, status: Option<ReportStatus>) -> Result<Vec<Report>, StoreError>;

    /// # Errors
    ///
    /// Returns an error when the report is missing or the transition is not allowed.
    fn set_report_status(&self, id: i64, status: ReportStatus) -> Result<Report, StoreError>;

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unauthorized`] on bad credentials.
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError>;

    /// Resolve a session token, `None` when unknown or signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn session(&self, token: &str) -> Result<Option<Session>, StoreError>;

    /// # Errors
    ///
    /// Returns an error if the store cannot be updated.
    fn sign_out(&self, token: &str) -> Result<(), StoreError>;
}

/// Client-computed decrement: read the current counter, then write
/// `max(current - 1, 0)`.
///
/// This is read-modify-write, not atomic. A concurrent increment or
/// decrement landing between the read and the write is lost.
///
/// # Errors
///
/// Returns an error if either the read or the write fails.
pub fn decrement_upvotes(store: &dyn RemoteStore, id: WordId) -> Result<u32, StoreError> {
    let current = store.get_word(id)?.upvotes;
    store.set_upvotes(id, current.saturating_sub(1))
}
