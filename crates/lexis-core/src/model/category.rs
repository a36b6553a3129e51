use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MAX_CATEGORY_NAME_LEN: usize = 50;
pub const MAX_CATEGORY_DESCRIPTION_LEN: usize = 200;

/// A word category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }

    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the name is blank or a field is too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::default();
        if self.name.trim().is_empty() {
            err.push("name", "must not be empty");
        } else if self.name.chars().count() > MAX_CATEGORY_NAME_LEN {
            err.push(
                "name",
                format!("must be at most {MAX_CATEGORY_NAME_LEN} characters"),
            );
        }
        if self
            .description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_CATEGORY_DESCRIPTION_LEN)
        {
            err.push(
                "description",
                format!("must be at most {MAX_CATEGORY_DESCRIPTION_LEN} characters"),
            );
        }
        err.into_result()
    }
}
