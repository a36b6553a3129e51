//! SQLite schema for the vocabulary store.
//!
//! - `words` holds every entry, soft-deleted rows included (`is_deleted`)
//! - `categories` are hard-deleted; referencing words fall back to uncategorized
//! - `reports` track user reports through pending -> reviewed/resolved
//! - `users` and `sessions` back the sign-in flow
//!
//! The applied version lives in `PRAGMA user_version`.

/// Migration v1: core tables.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE CHECK (length(trim(name)) > 0),
    description TEXT,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS words (
    word_id INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL CHECK (length(trim(word)) > 0),
    meaning TEXT NOT NULL CHECK (length(trim(meaning)) > 0),
    example_sentence TEXT,
    example_translation TEXT,
    pronunciation TEXT,
    category_id INTEGER REFERENCES categories(category_id) ON DELETE SET NULL,
    difficulty INTEGER NOT NULL DEFAULT 1 CHECK (difficulty BETWEEN 1 AND 4),
    language TEXT NOT NULL DEFAULT 'en',
    word_type TEXT,
    upvotes INTEGER NOT NULL DEFAULT 0 CHECK (upvotes >= 0),
    is_deleted INTEGER NOT NULL DEFAULT 0 CHECK (is_deleted IN (0, 1)),
    created_by TEXT NOT NULL DEFAULT 'anonymous',
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS reports (
    report_id INTEGER PRIMARY KEY AUTOINCREMENT,
    word_id INTEGER NOT NULL REFERENCES words(word_id) ON DELETE CASCADE,
    reason TEXT NOT NULL CHECK (length(trim(reason)) > 0),
    reported_by TEXT NOT NULL DEFAULT 'anonymous',
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'reviewed', 'resolved')),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    email TEXT PRIMARY KEY COLLATE NOCASE,
    password_salt TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    email TEXT NOT NULL REFERENCES users(email) ON DELETE CASCADE,
    created_at_us INTEGER NOT NULL
);
";

/// Migration v2: read-path indexes.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_words_deleted_created
    ON words(is_deleted, created_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_words_category
    ON words(category_id, is_deleted);

CREATE INDEX IF NOT EXISTS idx_reports_status_created
    ON reports(status, created_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_sessions_email
    ON sessions(email);
";

/// Indexes that must exist once all migrations are applied.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_words_deleted_created",
    "idx_words_category",
    "idx_reports_status_created",
    "idx_sessions_email",
];
