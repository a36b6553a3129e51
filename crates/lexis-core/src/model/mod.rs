//! Rows owned by the store (words, categories, reports) and the local
//! session handle.

mod category;
mod report;
mod word;

pub use category::{Category, CategoryDraft, MAX_CATEGORY_DESCRIPTION_LEN, MAX_CATEGORY_NAME_LEN};
pub use report::{Report, ReportAction, ReportStatus};
pub use word::{
    Difficulty, MAX_EXAMPLE_LEN, MAX_MEANING_LEN, MAX_PRONUNCIATION_LEN, MAX_WORD_LEN, Word,
    WordDraft,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned word identifier.
pub type WordId = i64;

/// Author tag used when nobody is signed in.
pub const ANONYMOUS: &str = "anonymous";

/// An authenticated store session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// True when the session belongs to the configured admin account.
    #[must_use]
    pub fn is_admin(&self, admin_email: Option<&str>) -> bool {
        admin_email.is_some_and(|admin| admin.eq_ignore_ascii_case(&self.email))
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_match_ignores_case() {
        let session = Session {
            email: "Admin@Example.com".into(),
            token: "t".into(),
            created_at: Utc::now(),
        };
        assert!(session.is_admin(Some("admin@example.com")));
        assert!(!session.is_admin(Some("other@example.com")));
        assert!(!session.is_admin(None));
    }
}
