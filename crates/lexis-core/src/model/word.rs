use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{ANONYMOUS, ParseEnumError, WordId};
use crate::error::ValidationError;

pub const MAX_WORD_LEN: usize = 100;
pub const MAX_MEANING_LEN: usize = 500;
pub const MAX_EXAMPLE_LEN: usize = 1000;
pub const MAX_PRONUNCIATION_LEN: usize = 100;

/// Four-step difficulty ordinal, stored and serialized as `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Professional,
}

impl Difficulty {
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 2,
            Self::Advanced => 3,
            Self::Professional => 4,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Professional => "professional",
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = ParseEnumError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Self::Beginner),
            2 => Ok(Self::Intermediate),
            3 => Ok(Self::Advanced),
            4 => Ok(Self::Professional),
            other => Err(ParseEnumError {
                expected: "difficulty (1-4)",
                got: other.to_string(),
            }),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.level()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        match trimmed.as_str() {
            "1" | "beginner" => Ok(Self::Beginner),
            "2" | "intermediate" => Ok(Self::Intermediate),
            "3" | "advanced" => Ok(Self::Advanced),
            "4" | "professional" => Ok(Self::Professional),
            _ => Err(ParseEnumError {
                expected: "difficulty (1-4)",
                got: s.to_string(),
            }),
        }
    }
}

/// A word row as returned by the store, with its category name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub word: String,
    pub meaning: String,
    pub example_sentence: Option<String>,
    pub example_translation: Option<String>,
    pub pronunciation: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_language")]
    pub language: String,
    pub word_type: Option<String>,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default = "default_author")]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Word {
    /// Draft carrying this word's editable fields.
    #[must_use]
    pub fn to_draft(&self) -> WordDraft {
        WordDraft {
            word: self.word.clone(),
            meaning: self.meaning.clone(),
            example_sentence: self.example_sentence.clone(),
            example_translation: self.example_translation.clone(),
            pronunciation: self.pronunciation.clone(),
            category_id: self.category_id,
            difficulty: self.difficulty,
            language: self.language.clone(),
            word_type: self.word_type.clone(),
            created_by: self.created_by.clone(),
        }
    }
}

/// Editable fields submitted on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDraft {
    pub word: String,
    pub meaning: String,
    pub example_sentence: Option<String>,
    pub example_translation: Option<String>,
    pub pronunciation: Option<String>,
    pub category_id: Option<i64>,
    pub difficulty: Difficulty,
    pub language: String,
    pub word_type: Option<String>,
    pub created_by: String,
}

impl WordDraft {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            example_sentence: None,
            example_translation: None,
            pronunciation: None,
            category_id: None,
            difficulty: Difficulty::default(),
            language: default_language(),
            word_type: None,
            created_by: default_author(),
        }
    }

    /// Trim text fields and turn blank optionals into `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.word = self.word.trim().to_string();
        self.meaning = self.meaning.trim().to_string();
        self.example_sentence = blank_to_none(self.example_sentence);
        self.example_translation = blank_to_none(self.example_translation);
        self.pronunciation = blank_to_none(self.pronunciation);
        self.word_type = blank_to_none(self.word_type);
        if self.language.trim().is_empty() {
            self.language = default_language();
        }
        if self.created_by.trim().is_empty() {
            self.created_by = default_author();
        }
        self
    }

    /// Check every field rule; all failures are reported together.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing each failed rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::default();

        let word_len = self.word.chars().count();
        if self.word.trim().is_empty() {
            err.push("word", "must not be empty");
        } else if word_len > MAX_WORD_LEN {
            err.push("word", format!("must be at most {MAX_WORD_LEN} characters"));
        }

        if self.meaning.trim().is_empty() {
            err.push("meaning", "must not be empty");
        } else if self.meaning.chars().count() > MAX_MEANING_LEN {
            err.push(
                "meaning",
                format!("must be at most {MAX_MEANING_LEN} characters"),
            );
        }

        if self
            .example_sentence
            .as_ref()
            .is_some_and(|s| s.chars().count() > MAX_EXAMPLE_LEN)
        {
            err.push(
                "example_sentence",
                format!("must be at most {MAX_EXAMPLE_LEN} characters"),
            );
        }

        if self
            .pronunciation
            .as_ref()
            .is_some_and(|s| s.chars().count() > MAX_PRONUNCIATION_LEN)
        {
            err.push(
                "pronunciation",
                format!("must be at most {MAX_PRONUNCIATION_LEN} characters"),
            );
        }

        err.into_result()
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn default_language() -> String {
    "en".to_string()
}

fn default_author() -> String {
    ANONYMOUS.to_string()
}
