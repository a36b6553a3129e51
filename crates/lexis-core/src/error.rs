use std::fmt;

use thiserror::Error;

use crate::model::WordId;

/// Machine-readable error codes for scripted callers and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    WordNotFound,
    CategoryNotFound,
    ReportNotFound,
    ValidationFailed,
    InvalidEnumValue,
    DuplicateCategory,
    InvalidStateTransition,
    Unauthorized,
    RemoteUnavailable,
    CorruptStore,
    PrefsWriteFailed,
    LockContention,
    ExportFailed,
    ImportFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::WordNotFound => "E2001",
            Self::CategoryNotFound => "E2002",
            Self::ReportNotFound => "E2003",
            Self::ValidationFailed => "E2004",
            Self::InvalidEnumValue => "E2005",
            Self::DuplicateCategory => "E2006",
            Self::InvalidStateTransition => "E2007",
            Self::Unauthorized => "E3001",
            Self::RemoteUnavailable => "E3002",
            Self::CorruptStore => "E3003",
            Self::PrefsWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::ExportFailed => "E6001",
            Self::ImportFailed => "E6002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Vocabulary project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::WordNotFound => "Word not found",
            Self::CategoryNotFound => "Category not found",
            Self::ReportNotFound => "Report not found",
            Self::ValidationFailed => "Input validation failed",
            Self::InvalidEnumValue => "Invalid difficulty/status/format value",
            Self::DuplicateCategory => "Category already exists",
            Self::InvalidStateTransition => "Invalid report status transition",
            Self::Unauthorized => "Not authorized",
            Self::RemoteUnavailable => "Remote store unavailable",
            Self::CorruptStore => "Corrupt store row",
            Self::PrefsWriteFailed => "Local preference write failed",
            Self::LockContention => "Lock contention",
            Self::ExportFailed => "Export failed",
            Self::ImportFailed => "Import failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `lx init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .lexis/config.toml and retry."),
            Self::WordNotFound | Self::CategoryNotFound | Self::ReportNotFound => {
                Some("Check the id with `lx list`, `lx category list` or `lx reports`.")
            }
            Self::ValidationFailed => Some("Correct the listed fields and retry."),
            Self::InvalidEnumValue => {
                Some("Difficulty is 1-4; formats are pdf, csv, json, markdown.")
            }
            Self::DuplicateCategory => Some("Pick a different category name."),
            Self::InvalidStateTransition => Some("Only pending reports can be reviewed."),
            Self::Unauthorized => Some("Sign in with `lx login` using the admin account."),
            Self::RemoteUnavailable => Some("Retry once the store is reachable."),
            Self::CorruptStore => Some("Restore from a backup with `lx restore`."),
            Self::PrefsWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `lx` process finishes."),
            Self::ExportFailed => Some("Check the output directory and retry."),
            Self::ImportFailed => Some("Fix the rows listed in the import report."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One rule a submitted field failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProblem {
    pub field: &'static str,
    pub message: String,
}

/// Every field rule a draft failed, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub problems: Vec<FieldProblem>,
}

impl ValidationError {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.problems.push(FieldProblem {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// `Ok(())` when no rule failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .problems
            .iter()
            .map(|p| format!("{}: {}", p.field, p.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Errors returned by a [`RemoteStore`](crate::store::RemoteStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("word {0} not found")]
    WordNotFound(WordId),

    #[error("category {0} not found")]
    CategoryNotFound(i64),

    #[error("report {0} not found")]
    ReportNotFound(i64),

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("report {id} is {from} and cannot become {to}")]
    InvalidTransition {
        id: i64,
        from: &'static str,
        to: &'static str,
    },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("sqlite: {0}")]
    Sqlite(#[source] rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    /// Values that fail to convert while mapping a row mean the stored
    /// data is bad, not that the store is unreachable.
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::FromSqlConversionFailure(column, _, source) => {
                Self::Corrupt(format!("column {column}: {source}"))
            }
            rusqlite::Error::IntegralValueOutOfRange(column, value) => {
                Self::Corrupt(format!("column {column}: {value} out of range"))
            }
            other => Self::Sqlite(other),
        }
    }
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::WordNotFound(_) => ErrorCode::WordNotFound,
            Self::CategoryNotFound(_) => ErrorCode::CategoryNotFound,
            Self::ReportNotFound(_) => ErrorCode::ReportNotFound,
            Self::DuplicateCategory(_) => ErrorCode::DuplicateCategory,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::Unavailable(_) | Self::Sqlite(_) => ErrorCode::RemoteUnavailable,
            Self::Corrupt(_) => ErrorCode::CorruptStore,
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
