//! Client-side list shaping: filter, search, sort, paginate, suggest.
//!
//! Everything here is a pure function of the fetched words and the local
//! favorite set. The store already applies its own category and search
//! filters; these run again locally so cached lists and favorite views
//! behave the same way.

use serde::Serialize;
use std::{cmp::Ordering, collections::BTreeSet, fmt, str::FromStr};

use crate::model::{ParseEnumError, Word, WordId};

/// Minimum input length before suggestions are offered.
pub const SUGGEST_MIN_CHARS: usize = 2;
/// Maximum number of suggestions returned.
pub const SUGGEST_LIMIT: usize = 6;
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    UpdatedAt,
    Word,
    Upvotes,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Word => "word",
            Self::Upvotes => "upvotes",
        })
    }
}

impl FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created_at" | "created" | "newest" => Ok(Self::CreatedAt),
            "updated_at" | "updated" => Ok(Self::UpdatedAt),
            "word" | "alpha" => Ok(Self::Word),
            "upvotes" | "popular" => Ok(Self::Upvotes),
            _ => Err(ParseEnumError {
                expected: "sort key (created_at, updated_at, word, upvotes)",
                got: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(ParseEnumError {
                expected: "sort order (asc, desc)",
                got: s.to_string(),
            }),
        }
    }
}

/// Local filter and ordering for a word list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub favorites_only: bool,
    pub sort: SortKey,
    pub direction: SortDirection,
}

impl ListQuery {
    fn matches(&self, word: &Word, favorites: &BTreeSet<WordId>) -> bool {
        if word.is_deleted {
            return false;
        }
        if self.favorites_only && !favorites.contains(&word.id) {
            return false;
        }
        if self.category_id.is_some() && word.category_id != self.category_id {
            return false;
        }
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .is_none_or(|term| matches_search(word, term))
    }
}

/// Case-insensitive substring match over word, meaning and example.
#[must_use]
pub fn matches_search(word: &Word, term: &str) -> bool {
    let term = term.to_lowercase();
    word.word.to_lowercase().contains(&term)
        || word.meaning.to_lowercase().contains(&term)
        || word
            .example_sentence
            .as_ref()
            .is_some_and(|s| s.to_lowercase().contains(&term))
}

/// Filter then sort. Ties keep a stable order by id.
#[must_use]
pub fn apply(words: &[Word], query: &ListQuery, favorites: &BTreeSet<WordId>) -> Vec<Word> {
    let mut out: Vec<Word> = words
        .iter()
        .filter(|w| query.matches(w, favorites))
        .cloned()
        .collect();

    out.sort_by(|a, b| {
        let primary = match query.sort {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortKey::Word => a.word.to_lowercase().cmp(&b.word.to_lowercase()),
            SortKey::Upvotes => a.upvotes.cmp(&b.upvotes),
        };
        let ordered = match query.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        ordered.then_with(|| tiebreak(a, b, query.direction))
    });
    out
}

fn tiebreak(a: &Word, b: &Word, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => a.id.cmp(&b.id),
        SortDirection::Desc => b.id.cmp(&a.id),
    }
}

/// One page of a longer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually returned.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice out page `page` (1-based). Out-of-range pages clamp to the last
/// page; a zero page size falls back to the default.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = match page_size {
        0 => DEFAULT_PAGE_SIZE,
        n => n.min(MAX_PAGE_SIZE),
    };
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);
    Page {
        items: items.get(start..end).unwrap_or_default().to_vec(),
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// Unique word texts containing `input`, in list order.
#[must_use]
pub fn suggest(words: &[Word], input: &str) -> Vec<String> {
    let input = input.trim();
    if input.chars().count() < SUGGEST_MIN_CHARS {
        return Vec::new();
    }
    let needle = input.to_lowercase();
    let mut seen = BTreeSet::new();
    words
        .iter()
        .filter(|w| !w.is_deleted)
        .map(|w| w.word.as_str())
        .filter(|text| text.to_lowercase().contains(&needle))
        .filter(|text| seen.insert(text.to_lowercase()))
        .take(SUGGEST_LIMIT)
        .map(str::to_string)
        .collect()
}
