//! Aggregate counters over the live vocabulary.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{Category, Difficulty, Word, WordId};

/// Window counted as "recent" for additions.
pub const RECENT_WINDOW_DAYS: i64 = 7;
/// Number of words listed as most popular.
pub const POPULAR_LIMIT: usize = 5;

/// Per-category breakdown. Uncategorized words have no `category_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category_id: Option<i64>,
    pub name: String,
    pub word_count: usize,
    pub avg_upvotes: f64,
    pub avg_difficulty: f64,
    pub recent_additions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularWord {
    pub id: WordId,
    pub word: String,
    pub upvotes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocabularyStats {
    pub total_words: usize,
    pub total_categories: usize,
    pub avg_upvotes: f64,
    pub recent_additions: usize,
    pub by_category: Vec<CategoryStats>,
    /// Word count per difficulty label.
    pub by_difficulty: BTreeMap<String, usize>,
    /// Word count per language tag.
    pub by_language: BTreeMap<String, usize>,
    pub popular: Vec<PopularWord>,
}

#[derive(Default)]
struct Bucket {
    count: usize,
    upvotes: u64,
    difficulty: u64,
    recent: usize,
}

impl Bucket {
    fn add(&mut self, word: &Word, recent: bool) {
        self.count += 1;
        self.upvotes += u64::from(word.upvotes);
        self.difficulty += u64::from(word.difficulty.level());
        if recent {
            self.recent += 1;
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Compute statistics for `words` as of `now`. Deleted words are skipped.
///
/// Categories are listed by word count descending, then name; categories
/// without words still appear with zero counts.
#[must_use]
pub fn compute(words: &[Word], categories: &[Category], now: DateTime<Utc>) -> VocabularyStats {
    let since = now - Duration::days(RECENT_WINDOW_DAYS);
    let names: BTreeMap<i64, &str> = categories.iter().map(|c| (c.id, c.name.as_str())).collect();

    let mut buckets: BTreeMap<Option<i64>, Bucket> = categories
        .iter()
        .map(|c| (Some(c.id), Bucket::default()))
        .collect();
    let mut by_difficulty: BTreeMap<String, usize> = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Professional,
    ]
    .into_iter()
    .map(|d| (d.label().to_string(), 0))
    .collect();
    let mut by_language: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = Bucket::default();

    let live: Vec<&Word> = words.iter().filter(|w| !w.is_deleted).collect();
    for word in &live {
        let recent = word.created_at >= since;
        let key = word.category_id.filter(|id| names.contains_key(id));
        buckets.entry(key).or_default().add(word, recent);
        total.add(word, recent);
        *by_difficulty
            .entry(word.difficulty.label().to_string())
            .or_default() += 1;
        *by_language.entry(word.language.clone()).or_default() += 1;
    }

    let mut by_category: Vec<CategoryStats> = buckets
        .into_iter()
        .map(|(category_id, bucket)| CategoryStats {
            category_id,
            name: category_id
                .and_then(|id| names.get(&id).copied())
                .unwrap_or("uncategorized")
                .to_string(),
            word_count: bucket.count,
            avg_upvotes: mean(bucket.upvotes, bucket.count),
            avg_difficulty: mean(bucket.difficulty, bucket.count),
            recent_additions: bucket.recent,
        })
        .collect();
    by_category.sort_by(|a, b| {
        b.word_count
            .cmp(&a.word_count)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    let mut ranked = live.clone();
    ranked.sort_by(|a, b| b.upvotes.cmp(&a.upvotes).then_with(|| a.id.cmp(&b.id)));
    let popular = ranked
        .into_iter()
        .filter(|w| w.upvotes > 0)
        .take(POPULAR_LIMIT)
        .map(|w| PopularWord {
            id: w.id,
            word: w.word.clone(),
            upvotes: w.upvotes,
        })
        .collect();

    VocabularyStats {
        total_words: total.count,
        total_categories: categories.len(),
        avg_upvotes: mean(total.upvotes, total.count),
        recent_additions: total.recent,
        by_category,
        by_difficulty,
        by_language,
        popular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.into(),
            description: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn word(id: WordId, category_id: Option<i64>, upvotes: u32, age_days: i64) -> Word {
        Word {
            id,
            word: format!("w{id}"),
            meaning: "m".into(),
            example_sentence: None,
            example_translation: None,
            pronunciation: None,
            category_id,
            category_name: None,
            difficulty: Difficulty::Intermediate,
            language: "en".into(),
            word_type: None,
            upvotes,
            is_deleted: false,
            created_by: "anonymous".into(),
            created_at: now() - Duration::days(age_days),
            updated_at: now(),
        }
    }

    #[test]
    fn empty_input_is_all_zero() {
        let stats = compute(&[], &[], now());
        assert_eq!(stats.total_words, 0);
        assert!(stats.avg_upvotes.abs() < f64::EPSILON);
        assert!(stats.by_category.is_empty());
        assert!(stats.popular.is_empty());
        assert_eq!(stats.by_difficulty.len(), 4);
    }

    #[test]
    fn groups_by_category_and_counts_recent() {
        let categories = [category(1, "Travel"), category(2, "Legal")];
        let mut deleted = word(5, Some(1), 100, 0);
        deleted.is_deleted = true;
        let words = [
            word(1, Some(1), 4, 1),
            word(2, Some(1), 2, 30),
            word(3, None, 0, 2),
            word(4, Some(99), 1, 100),
            deleted,
        ];

        let stats = compute(&words, &categories, now());
        assert_eq!(stats.total_words, 4);
        assert_eq!(stats.recent_additions, 2);
        assert!((stats.avg_upvotes - 7.0 / 4.0).abs() < 1e-9);

        let names: Vec<_> = stats.by_category.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Travel", "uncategorized", "Legal"]);
        let travel = &stats.by_category[0];
        assert_eq!(travel.word_count, 2);
        assert!((travel.avg_upvotes - 3.0).abs() < 1e-9);
        assert!((travel.avg_difficulty - 2.0).abs() < 1e-9);
        assert_eq!(travel.recent_additions, 1);
        assert_eq!(stats.by_category[2].word_count, 0);
        assert_eq!(stats.by_difficulty["intermediate"], 4);
    }

    #[test]
    fn popular_words_are_ranked_and_capped() {
        let words: Vec<_> = (1..=8).map(|i| word(i, None, u32::try_from(i % 4).unwrap(), 0)).collect();
        let stats = compute(&words, &[], now());
        let ids: Vec<_> = stats.popular.iter().map(|p| p.id).collect();
        assert_eq!(ids, [3, 7, 2, 6, 1]);
    }
}
