//! rusqlite-backed [`RemoteStore`].

use anyhow::Result as AnyResult;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter, types::Type};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info};

use super::{RemoteStore, WordFilter};
use crate::db::{self, from_us, now_us};
use crate::error::{StoreError, ValidationError};
use crate::view;
use crate::model::{
    Category, CategoryDraft, Difficulty, Report, ReportStatus, Session, Word, WordDraft, WordId,
};

const WORD_COLUMNS: &str = "w.word_id, w.word, w.meaning, w.example_sentence, \
     w.example_translation, w.pronunciation, w.category_id, c.name, w.difficulty, \
     w.language, w.word_type, w.upvotes, w.is_deleted, w.created_by, \
     w.created_at_us, w.updated_at_us";

const WORD_FROM: &str = "FROM words w LEFT JOIN categories c ON c.category_id = w.category_id";

const REPORT_SELECT: &str = "SELECT r.report_id, r.word_id, w.word, r.reason, r.reported_by, \
     r.status, r.created_at_us \
     FROM reports r LEFT JOIN words w ON w.word_id = r.word_id";

/// Vocabulary store on a single SQLite database file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating and migrating if needed) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> AnyResult<Self> {
        let conn = db::open_store_db(path)?;
        debug!(path = %path.display(), "opened vocabulary store");
        Ok(Self { conn })
    }

    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn open_in_memory() -> AnyResult<Self> {
        Ok(Self {
            conn: db::open_memory_db()?,
        })
    }

    /// Raw connection, for maintenance queries.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create an account, or reset its password when it already exists.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank email or short password.
    pub fn create_user(&self, email: &str, password: &str) -> Result<(), StoreError> {
        let email = email.trim();
        let mut err = ValidationError::default();
        if email.is_empty() || !email.contains('@') {
            err.push("email", "must be an email address");
        }
        if password.chars().count() < 6 {
            err.push("password", "must be at least 6 characters");
        }
        err.into_result()?;

        let salt = format!("{:016x}", rand::random::<u64>());
        let hash = password_hash(&salt, password);
        self.conn.execute(
            "INSERT INTO users (email, password_salt, password_hash, created_at_us)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(email) DO UPDATE SET
                password_salt = excluded.password_salt,
                password_hash = excluded.password_hash",
            params![email, salt, hash, now_us()],
        )?;
        info!(email, "account saved");
        Ok(())
    }

    fn category_name_taken(&self, name: &str, except: Option<i64>) -> Result<bool, StoreError> {
        let taken = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = ?1 AND category_id IS NOT ?2)",
            params![name, except],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    fn get_category(&self, id: i64) -> Result<Category, StoreError> {
        self.conn
            .query_row(
                "SELECT category_id, name, description, created_at_us, updated_at_us
                 FROM categories WHERE category_id = ?1",
                params![id],
                row_to_category,
            )
            .optional()?
            .ok_or(StoreError::CategoryNotFound(id))
    }

    fn get_report(&self, id: i64) -> Result<Report, StoreError> {
        self.conn
            .query_row(
                &format!("{REPORT_SELECT} WHERE r.report_id = ?1"),
                params![id],
                row_to_report,
            )
            .optional()?
            .ok_or(StoreError::ReportNotFound(id))
    }

    fn ensure_category_exists(&self, category_id: Option<i64>) -> Result<(), StoreError> {
        match category_id {
            Some(id) => self.get_category(id).map(|_| ()),
            None => Ok(()),
        }
    }
}

impl RemoteStore for SqliteStore {
    fn list_words(&self, filter: &WordFilter) -> Result<Vec<Word>, StoreError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if !filter.include_deleted {
            conditions.push("w.is_deleted = 0".to_string());
        }

        if let Some(category_id) = filter.category_id {
            param_values.push(Box::new(category_id));
            conditions.push(format!("w.category_id = ?{}", param_values.len()));
        }

        // LIKE folds ASCII case only, so it narrows ASCII terms in SQL and
        // every term is re-checked with the view's Unicode matcher below.
        let search = filter.search.as_deref();
        if let Some(term) = search.filter(|t| t.is_ascii()) {
            param_values.push(Box::new(like_pattern(term)));
            let n = param_values.len();
            conditions.push(format!(
                "(w.word LIKE ?{n} ESCAPE '\\' \
                 OR w.meaning LIKE ?{n} ESCAPE '\\' \
                 OR COALESCE(w.example_sentence, '') LIKE ?{n} ESCAPE '\\')"
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {WORD_COLUMNS} {WORD_FROM}{where_clause} \
             ORDER BY w.created_at_us DESC, w.word_id DESC"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(AsRef::as_ref).collect();
        let rows = stmt.query_map(params_from_iter(params_ref), row_to_word)?;

        let mut words = Vec::new();
        for row in rows {
            let word = row?;
            if search.is_none_or(|term| view::matches_search(&word, term.trim())) {
                words.push(word);
            }
        }
        debug!(count = words.len(), ?filter, "listed words");
        Ok(words)
    }

    fn get_word(&self, id: WordId) -> Result<Word, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {WORD_COLUMNS} {WORD_FROM} WHERE w.word_id = ?1 AND w.is_deleted = 0"),
                params![id],
                row_to_word,
            )
            .optional()?
            .ok_or(StoreError::WordNotFound(id))
    }

    fn insert_word(&self, draft: &WordDraft) -> Result<Word, StoreError> {
        let draft = draft.clone().normalized();
        draft.validate()?;
        self.ensure_category_exists(draft.category_id)?;

        let now = now_us();
        self.conn.execute(
            "INSERT INTO words (
                word, meaning, example_sentence, example_translation, pronunciation,
                category_id, difficulty, language, word_type, created_by,
                created_at_us, updated_at_us
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                draft.word,
                draft.meaning,
                draft.example_sentence,
                draft.example_translation,
                draft.pronunciation,
                draft.category_id,
                draft.difficulty.level(),
                draft.language,
                draft.word_type,
                draft.created_by,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(word_id = id, word = %draft.word, "word created");
        self.get_word(id)
    }

    fn update_word(&self, id: WordId, draft: &WordDraft) -> Result<Word, StoreError> {
        let draft = draft.clone().normalized();
        draft.validate()?;
        self.ensure_category_exists(draft.category_id)?;

        let changed = self.conn.execute(
            "UPDATE words SET
                word = ?2, meaning = ?3, example_sentence = ?4, example_translation = ?5,
                pronunciation = ?6, category_id = ?7, difficulty = ?8, language = ?9,
                word_type = ?10, updated_at_us = ?11
             WHERE word_id = ?1 AND is_deleted = 0",
            params![
                id,
                draft.word,
                draft.meaning,
                draft.example_sentence,
                draft.example_translation,
                draft.pronunciation,
                draft.category_id,
                draft.difficulty.level(),
                draft.language,
                draft.word_type,
                now_us(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::WordNotFound(id));
        }
        info!(word_id = id, "word updated");
        self.get_word(id)
    }

    fn soft_delete_word(&self, id: WordId) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE words SET is_deleted = 1, updated_at_us = ?2
             WHERE word_id = ?1 AND is_deleted = 0",
            params![id, now_us()],
        )?;
        if changed == 0 {
            return Err(StoreError::WordNotFound(id));
        }
        info!(word_id = id, "word soft-deleted");
        Ok(())
    }

    fn increment_upvotes(&self, id: WordId) -> Result<u32, StoreError> {
        let changed = self.conn.execute(
            "UPDATE words SET upvotes = upvotes + 1, updated_at_us = ?2
             WHERE word_id = ?1 AND is_deleted = 0",
            params![id, now_us()],
        )?;
        if changed == 0 {
            return Err(StoreError::WordNotFound(id));
        }
        let upvotes = self.get_word(id)?.upvotes;
        debug!(word_id = id, upvotes, "upvotes incremented");
        Ok(upvotes)
    }

    fn set_upvotes(&self, id: WordId, upvotes: u32) -> Result<u32, StoreError> {
        let changed = self.conn.execute(
            "UPDATE words SET upvotes = ?2, updated_at_us = ?3
             WHERE word_id = ?1 AND is_deleted = 0",
            params![id, upvotes, now_us()],
        )?;
        if changed == 0 {
            return Err(StoreError::WordNotFound(id));
        }
        debug!(word_id = id, upvotes, "upvotes written");
        Ok(upvotes)
    }

    fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT category_id, name, description, created_at_us, updated_at_us
             FROM categories ORDER BY name COLLATE NOCASE ASC, category_id ASC",
        )?;
        let rows = stmt.query_map([], row_to_category)?;
        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    fn insert_category(&self, draft: &CategoryDraft) -> Result<Category, StoreError> {
        let draft = CategoryDraft::new(draft.name.clone(), draft.description.clone());
        draft.validate()?;
        if self.category_name_taken(&draft.name, None)? {
            return Err(StoreError::DuplicateCategory(draft.name));
        }

        let now = now_us();
        self.conn.execute(
            "INSERT INTO categories (name, description, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?3)",
            params![draft.name, draft.description, now],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(category_id = id, name = %draft.name, "category created");
        self.get_category(id)
    }

    fn update_category(&self, id: i64, draft: &CategoryDraft) -> Result<Category, StoreError> {
        let draft = CategoryDraft::new(draft.name.clone(), draft.description.clone());
        draft.validate()?;
        if self.category_name_taken(&draft.name, Some(id))? {
            return Err(StoreError::DuplicateCategory(draft.name));
        }

        let changed = self.conn.execute(
            "UPDATE categories SET name = ?2, description = ?3, updated_at_us = ?4
             WHERE category_id = ?1",
            params![id, draft.name, draft.description, now_us()],
        )?;
        if changed == 0 {
            return Err(StoreError::CategoryNotFound(id));
        }
        self.get_category(id)
    }

    fn delete_category(&self, id: i64) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE category_id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::CategoryNotFound(id));
        }
        info!(category_id = id, "category deleted");
        Ok(())
    }

    fn insert_report(
        &self,
        word_id: WordId,
        reason: &str,
        reported_by: &str,
    ) -> Result<Report, StoreError> {
        let reason = reason.trim();
        if reason.is_empty() {
            let mut err = ValidationError::default();
            err.push("reason", "must not be empty");
            return Err(err.into());
        }
        self.get_word(word_id)?;

        let now = now_us();
        self.conn.execute(
            "INSERT INTO reports (word_id, reason, reported_by, status, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, 'pending', ?4, ?4)",
            params![word_id, reason, reported_by, now],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(report_id = id, word_id, "report filed");
        self.get_report(id)
    }

    fn list_reports(&self, status: Option<ReportStatus>) -> Result<Vec<Report>, StoreError> {
        let order = "ORDER BY r.created_at_us DESC, r.report_id DESC";
        let mut reports = Vec::new();
        if let Some(status) = status {
            let mut stmt = self
                .conn
                .prepare(&format!("{REPORT_SELECT} WHERE r.status = ?1 {order}"))?;
            let rows = stmt.query_map(params![status.as_str()], row_to_report)?;
            for row in rows {
                reports.push(row?);
            }
        } else {
            let mut stmt = self.conn.prepare(&format!("{REPORT_SELECT} {order}"))?;
            let rows = stmt.query_map([], row_to_report)?;
            for row in rows {
                reports.push(row?);
            }
        }
        Ok(reports)
    }

    fn set_report_status(&self, id: i64, status: ReportStatus) -> Result<Report, StoreError> {
        let current = self.get_report(id)?;
        if !current.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                id,
                from: current.status.as_str(),
                to: status.as_str(),
            });
        }
        self.conn.execute(
            "UPDATE reports SET status = ?2, updated_at_us = ?3 WHERE report_id = ?1",
            params![id, status.as_str(), now_us()],
        )?;
        info!(report_id = id, %status, "report status changed");
        self.get_report(id)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let email = email.trim();
        let stored: Option<(String, String, String)> = self
            .conn
            .query_row(
                "SELECT email, password_salt, password_hash FROM users WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((email, salt, hash)) = stored else {
            return Err(StoreError::Unauthorized("invalid email or password".into()));
        };
        if password_hash(&salt, password) != hash {
            return Err(StoreError::Unauthorized("invalid email or password".into()));
        }

        let token = new_token(&email);
        let now = now_us();
        self.conn.execute(
            "INSERT INTO sessions (token, email, created_at_us) VALUES (?1, ?2, ?3)",
            params![token, email, now],
        )?;
        info!(email = %email, "signed in");
        Ok(Session {
            email,
            token,
            created_at: from_us(now),
        })
    }

    fn session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let session = self
            .conn
            .query_row(
                "SELECT email, token, created_at_us FROM sessions WHERE token = ?1",
                params![token],
                |row| {
                    Ok(Session {
                        email: row.get(0)?,
                        token: row.get(1)?,
                        created_at: from_us(row.get(2)?),
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    fn sign_out(&self, token: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }
}

fn row_to_word(row: &Row<'_>) -> rusqlite::Result<Word> {
    let level: u8 = row.get(8)?;
    let difficulty = Difficulty::try_from(level)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Integer, Box::new(e)))?;
    Ok(Word {
        id: row.get(0)?,
        word: row.get(1)?,
        meaning: row.get(2)?,
        example_sentence: row.get(3)?,
        example_translation: row.get(4)?,
        pronunciation: row.get(5)?,
        category_id: row.get(6)?,
        category_name: row.get(7)?,
        difficulty,
        language: row.get(9)?,
        word_type: row.get(10)?,
        upvotes: row.get(11)?,
        is_deleted: row.get(12)?,
        created_by: row.get(13)?,
        created_at: from_us(row.get(14)?),
        updated_at: from_us(row.get(15)?),
    })
}

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: from_us(row.get(3)?),
        updated_at: from_us(row.get(4)?),
    })
}

fn row_to_report(row: &Row<'_>) -> rusqlite::Result<Report> {
    let status: String = row.get(5)?;
    let status = status
        .parse::<ReportStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    Ok(Report {
        id: row.get(0)?,
        word_id: row.get(1)?,
        word: row.get(2)?,
        reason: row.get(3)?,
        reported_by: row.get(4)?,
        status,
        created_at: from_us(row.get(6)?),
    })
}

/// `%term%` with LIKE wildcards in `term` escaped by backslash.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.trim().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn password_hash(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn new_token(email: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(email.as_bytes());
    hasher.update(&now_us().to_le_bytes());
    hasher.update(&rand::random::<u64>().to_le_bytes());
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::decrement_upvotes;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("in-memory store")
    }

    fn add(store: &SqliteStore, word: &str, meaning: &str) -> Word {
        store
            .insert_word(&WordDraft::new(word, meaning))
            .expect("insert word")
    }

    #[test]
    fn insert_then_get_round_trips_fields() {
        let store = store();
        let travel = store
            .insert_category(&CategoryDraft::new("Travel", None))
            .unwrap();
        let mut draft = WordDraft::new("itinerary", "a planned route");
        draft.example_sentence = Some("Our itinerary includes Rome.".into());
        draft.pronunciation = Some("/aɪˈtɪnəˌrɛri/".into());
        draft.category_id = Some(travel.id);
        draft.difficulty = Difficulty::Advanced;

        let word = store.insert_word(&draft).unwrap();
        let fetched = store.get_word(word.id).unwrap();
        assert_eq!(fetched, word);
        assert_eq!(fetched.category_name.as_deref(), Some("Travel"));
        assert_eq!(fetched.difficulty, Difficulty::Advanced);
        assert_eq!(fetched.upvotes, 0);
        assert_eq!(fetched.created_by, "anonymous");
    }

    #[test]
    fn insert_rejects_invalid_draft() {
        let store = store();
        let err = store.insert_word(&WordDraft::new("", "x")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn insert_rejects_unknown_category() {
        let store = store();
        let mut draft = WordDraft::new("cat", "feline");
        draft.category_id = Some(99);
        let err = store.insert_word(&draft).unwrap_err();
        assert!(matches!(err, StoreError::CategoryNotFound(99)));
    }

    #[test]
    fn soft_deleted_words_are_hidden() {
        let store = store();
        let keep = add(&store, "keep", "stay");
        let gone = add(&store, "gone", "left");
        store.soft_delete_word(gone.id).unwrap();

        let listed = store.list_words(&WordFilter::default()).unwrap();
        assert_eq!(listed.iter().map(|w| w.id).collect::<Vec<_>>(), [keep.id]);
        assert!(matches!(
            store.get_word(gone.id),
            Err(StoreError::WordNotFound(_))
        ));
        assert!(matches!(
            store.soft_delete_word(gone.id),
            Err(StoreError::WordNotFound(_))
        ));

        let all = store
            .list_words(&WordFilter {
                include_deleted: true,
                ..WordFilter::default()
            })
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn list_is_newest_first() {
        let store = store();
        let first = add(&store, "first", "one");
        let second = add(&store, "second", "two");
        let ids: Vec<_> = store
            .list_words(&WordFilter::default())
            .unwrap()
            .iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, [second.id, first.id]);
    }

    #[test]
    fn search_matches_word_meaning_and_example_case_insensitively() {
        let store = store();
        add(&store, "Harbor", "a sheltered port");
        let mut draft = WordDraft::new("quay", "a landing place");
        draft.example_sentence = Some("Boats moored at the HARBOR quay.".into());
        store.insert_word(&draft).unwrap();
        add(&store, "meadow", "a grassy field");

        let hits = store
            .list_words(&WordFilter::default().search("harbor"))
            .unwrap();
        let mut words: Vec<_> = hits.iter().map(|w| w.word.as_str()).collect();
        words.sort_unstable();
        assert_eq!(words, ["Harbor", "quay"]);
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let store = store();
        add(&store, "100%", "completely");
        add(&store, "1000", "a thousand");
        let hits = store.list_words(&WordFilter::default().search("0%")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].word, "100%");
    }

    #[test]
    fn category_filter_is_exact() {
        let store = store();
        let a = store.insert_category(&CategoryDraft::new("A", None)).unwrap();
        let mut draft = WordDraft::new("alpha", "first letter");
        draft.category_id = Some(a.id);
        store.insert_word(&draft).unwrap();
        add(&store, "beta", "second letter");

        let hits = store
            .list_words(&WordFilter::default().category(a.id))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].word, "alpha");
    }

    #[test]
    fn increment_is_atomic_per_call() {
        let store = store();
        let word = add(&store, "cat", "feline");
        assert_eq!(store.increment_upvotes(word.id).unwrap(), 1);
        assert_eq!(store.increment_upvotes(word.id).unwrap(), 2);
        assert!(matches!(
            store.increment_upvotes(404),
            Err(StoreError::WordNotFound(404))
        ));
    }

    #[test]
    fn decrement_clamps_at_zero() {
        let store = store();
        let word = add(&store, "cat", "feline");
        assert_eq!(decrement_upvotes(&store, word.id).unwrap(), 0);
        store.increment_upvotes(word.id).unwrap();
        assert_eq!(decrement_upvotes(&store, word.id).unwrap(), 0);
    }

    #[test]
    fn decrement_is_read_modify_write_and_can_lose_updates() {
        // Two clients read the same counter before either writes back.
        let store = store();
        let word = add(&store, "cat", "feline");
        store.set_upvotes(word.id, 5).unwrap();

        let read_a = store.get_word(word.id).unwrap().upvotes;
        let read_b = store.get_word(word.id).unwrap().upvotes;
        store.set_upvotes(word.id, read_a - 1).unwrap();
        store.set_upvotes(word.id, read_b - 1).unwrap();

        // Two decrements landed, the counter moved by one.
        assert_eq!(store.get_word(word.id).unwrap().upvotes, 4);
    }

    #[test]
    fn update_word_keeps_author_and_counter() {
        let store = store();
        let mut draft = WordDraft::new("colour", "hue");
        draft.created_by = "alice".into();
        let word = store.insert_word(&draft).unwrap();
        store.increment_upvotes(word.id).unwrap();

        let mut edit = word.to_draft();
        edit.word = "color".into();
        edit.created_by = "mallory".into();
        let updated = store.update_word(word.id, &edit).unwrap();
        assert_eq!(updated.word, "color");
        assert_eq!(updated.created_by, "alice");
        assert_eq!(updated.upvotes, 1);
    }

    #[test]
    fn duplicate_category_names_are_rejected_case_insensitively() {
        let store = store();
        store
            .insert_category(&CategoryDraft::new("Business", None))
            .unwrap();
        let err = store
            .insert_category(&CategoryDraft::new("business", None))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCategory(_)));
    }

    #[test]
    fn deleting_category_uncategorizes_words() {
        let store = store();
        let cat = store
            .insert_category(&CategoryDraft::new("Legal", None))
            .unwrap();
        let mut draft = WordDraft::new("tort", "a civil wrong");
        draft.category_id = Some(cat.id);
        let word = store.insert_word(&draft).unwrap();

        store.delete_category(cat.id).unwrap();
        let word = store.get_word(word.id).unwrap();
        assert!(word.category_id.is_none());
        assert!(word.category_name.is_none());
        assert!(matches!(
            store.delete_category(cat.id),
            Err(StoreError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn reports_move_from_pending_once() {
        let store = store();
        let word = add(&store, "spam", "junk");
        let report = store.insert_report(word.id, " offensive ", "anonymous").unwrap();
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.reason, "offensive");
        assert_eq!(report.word.as_deref(), Some("spam"));

        let pending = store.list_reports(Some(ReportStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);

        let resolved = store
            .set_report_status(report.id, ReportStatus::Resolved)
            .unwrap();
        assert_eq!(resolved.status, ReportStatus::Resolved);
        assert!(store.list_reports(Some(ReportStatus::Pending)).unwrap().is_empty());

        let err = store
            .set_report_status(report.id, ReportStatus::Reviewed)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
    }

    #[test]
    fn blank_report_reason_is_rejected() {
        let store = store();
        let word = add(&store, "spam", "junk");
        assert!(matches!(
            store.insert_report(word.id, "   ", "anonymous"),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn sign_in_issues_and_revokes_sessions() {
        let store = store();
        store.create_user("admin@example.com", "hunter22").unwrap();

        assert!(matches!(
            store.sign_in("admin@example.com", "wrong"),
            Err(StoreError::Unauthorized(_))
        ));
        assert!(matches!(
            store.sign_in("nobody@example.com", "hunter22"),
            Err(StoreError::Unauthorized(_))
        ));

        let session = store.sign_in("admin@example.com", "hunter22").unwrap();
        assert_eq!(session.token.len(), 64);
        let found = store.session(&session.token).unwrap().unwrap();
        assert_eq!(found.email, "admin@example.com");

        store.sign_out(&session.token).unwrap();
        assert!(store.session(&session.token).unwrap().is_none());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("a_b%c\\"), "%a\\_b\\%c\\\\%");
    }

    #[test]
    fn out_of_range_difficulty_reads_as_corrupt() {
        let store = store();
        let word = add(&store, "cat", "feline");
        store
            .conn
            .execute_batch("PRAGMA ignore_check_constraints = ON")
            .unwrap();
        store
            .conn
            .execute(
                "UPDATE words SET difficulty = 9 WHERE word_id = ?1",
                params![word.id],
            )
            .unwrap();

        let err = store.get_word(word.id).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)), "{err}");
        assert_eq!(err.code().code(), "E3003");
    }

    #[test]
    fn search_folds_non_ascii_case_like_the_view() {
        let store = store();
        add(&store, "été", "summer");
        add(&store, "Straße", "street");
        add(&store, "cat", "feline");

        let hits = store.list_words(&WordFilter::default().search("ÉTÉ")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].word, "été");

        let hits = store.list_words(&WordFilter::default().search("STRASSE")).unwrap();
        assert!(hits.is_empty(), "no full case folding, same as the view");

        let hits = store.list_words(&WordFilter::default().search("FELINE")).unwrap();
        assert_eq!(hits.len(), 1);
    }
}
