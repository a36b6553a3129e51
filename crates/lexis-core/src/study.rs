//! Study and dictation sessions.
//!
//! A session is a shuffled deck walked front to back, one answer per word.
//! Flashcards are self-graded; quiz and spelling compare the typed answer
//! with the word, ignoring case and surrounding whitespace. Lifetime study
//! counters live in the preference file under [`STUDY_STATS_KEY`].

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::model::{ParseEnumError, Word, WordId};
use crate::prefs::{PrefError, PrefStore};

pub const STUDY_STATS_KEY: &str = "lexis_study_stats";
/// Words per dictation session.
pub const DICTATION_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    /// Show the word, reveal the meaning, self-grade.
    #[default]
    Flashcard,
    /// Show the meaning, type the word.
    Quiz,
    /// Show the meaning and letter count, type the spelling.
    Spelling,
}

impl StudyMode {
    /// Whether the learner types an answer rather than grading themselves.
    #[must_use]
    pub const fn is_typed(self) -> bool {
        !matches!(self, Self::Flashcard)
    }
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flashcard => "flashcard",
            Self::Quiz => "quiz",
            Self::Spelling => "spelling",
        })
    }
}

impl FromStr for StudyMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flashcard" | "card" => Ok(Self::Flashcard),
            "quiz" => Ok(Self::Quiz),
            "spelling" | "spell" => Ok(Self::Spelling),
            _ => Err(ParseEnumError {
                expected: "study mode (flashcard, quiz, spelling)",
                got: s.to_string(),
            }),
        }
    }
}

/// What the learner sees for one word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub word_id: WordId,
    pub mode: StudyMode,
    /// Lines shown before answering.
    pub front: Vec<String>,
    /// One blank per letter, spelling mode only.
    pub hint: Option<String>,
    /// Lines revealed after answering.
    pub back: Vec<String>,
}

impl Card {
    #[must_use]
    pub fn of(mode: StudyMode, word: &Word) -> Self {
        let phonetic = word.pronunciation.as_ref().map(|p| format!("/{p}/"));
        let example = word
            .example_sentence
            .as_ref()
            .map(|e| format!("Example: \"{e}\""));

        let (front, hint, back) = match mode {
            StudyMode::Flashcard => {
                let mut front = vec![word.word.clone()];
                front.extend(phonetic);
                front.extend(word.word_type.clone());
                let mut back = vec![word.meaning.clone()];
                back.extend(example);
                (front, None, back)
            }
            StudyMode::Quiz => {
                let mut front = vec![word.meaning.clone()];
                front.extend(example);
                (front, None, vec![word.word.clone()])
            }
            StudyMode::Spelling => {
                let mut front = vec![word.meaning.clone()];
                front.extend(phonetic);
                let blanks = vec!["_"; word.word.chars().count()].join(" ");
                (front, Some(blanks), vec![word.word.clone()])
            }
        };

        Self {
            word_id: word.id,
            mode,
            front,
            hint,
            back,
        }
    }
}

/// Compare a typed answer with the word. `None` for a blank answer, which
/// is not graded.
#[must_use]
pub fn check_answer(answer: &str, expected: &str) -> Option<bool> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    Some(answer.to_lowercase() == expected.trim().to_lowercase())
}

/// Parse a flashcard self-grade. `None` when the input is neither.
#[must_use]
pub fn self_grade(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "k" | "known" => Some(true),
        "n" | "no" | "u" | "unknown" => Some(false),
        _ => None,
    }
}

/// Rounded percentage, 0 when nothing was answered.
fn percent(correct: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    u32::try_from((correct * 100 + total / 2) / total).unwrap_or(100)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

impl Score {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    #[must_use]
    pub fn percent(self) -> u32 {
        percent(u64::from(self.correct), u64::from(self.total))
    }
}

/// Lifetime study counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyStats {
    pub total_studied: u64,
    pub correct_answers: u64,
    /// Consecutive correct answers; a miss resets it.
    pub streak_count: u32,
    pub last_study_date: Option<DateTime<Utc>>,
}

impl StudyStats {
    /// Persisted counters, or zeroes when absent or malformed.
    #[must_use]
    pub fn load(prefs: &PrefStore) -> Self {
        prefs.get(STUDY_STATS_KEY, Self::default())
    }

    /// # Errors
    ///
    /// Returns an error if the preference file cannot be written.
    pub fn save(&self, prefs: &mut PrefStore) -> Result<(), PrefError> {
        prefs.set(STUDY_STATS_KEY, self)
    }

    pub fn record(&mut self, correct: bool, at: DateTime<Utc>) {
        self.total_studied += 1;
        if correct {
            self.correct_answers += 1;
            self.streak_count = self.streak_count.saturating_add(1);
        } else {
            self.streak_count = 0;
        }
        self.last_study_date = Some(at);
    }

    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        percent(self.correct_answers, self.total_studied)
    }
}

/// Result of grading the current word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answered {
    pub word_id: WordId,
    pub expected: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub deck_size: usize,
    pub correct: u32,
    pub total: u32,
    pub percent: u32,
    pub elapsed_secs: i64,
    /// `m:ss`.
    pub elapsed: String,
    pub finished: bool,
}

/// A shuffled deck and the running score.
#[derive(Debug, Clone)]
pub struct Session {
    deck: Vec<Word>,
    position: usize,
    score: Score,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Shuffle `words` and keep at most `limit` of them.
    pub fn new<R: Rng + ?Sized>(
        mut words: Vec<Word>,
        limit: Option<usize>,
        rng: &mut R,
        started_at: DateTime<Utc>,
    ) -> Self {
        words.shuffle(rng);
        if let Some(limit) = limit {
            words.truncate(limit);
        }
        Self {
            deck: words,
            position: 0,
            score: Score::default(),
            started_at,
        }
    }

    /// A dictation deck: [`DICTATION_LIMIT`] shuffled words.
    pub fn dictation<R: Rng + ?Sized>(
        words: Vec<Word>,
        rng: &mut R,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self::new(words, Some(DICTATION_LIMIT), rng, started_at)
    }

    #[must_use]
    pub fn deck(&self) -> &[Word] {
        &self.deck
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.deck.len()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Word> {
        self.deck.get(self.position)
    }

    /// Record a grade for the current word and move to the next one.
    /// `None` once the deck is exhausted.
    pub fn grade(&mut self, correct: bool) -> Option<Answered> {
        let word = self.deck.get(self.position)?;
        let answered = Answered {
            word_id: word.id,
            expected: word.word.clone(),
            correct,
        };
        self.score.record(correct);
        self.position += 1;
        Some(answered)
    }

    /// Grade a typed answer against the current word. A blank answer is
    /// ignored and the session stays on the same word.
    pub fn answer(&mut self, typed: &str) -> Option<Answered> {
        let correct = check_answer(typed, &self.current()?.word)?;
        self.grade(correct)
    }

    #[must_use]
    pub fn summary(&self, now: DateTime<Utc>) -> SessionSummary {
        let elapsed_secs = (now - self.started_at).num_seconds().max(0);
        SessionSummary {
            deck_size: self.deck.len(),
            correct: self.score.correct,
            total: self.score.total,
            percent: self.score.percent(),
            elapsed_secs,
            elapsed: format_elapsed(elapsed_secs),
            finished: self.is_finished(),
        }
    }
}

/// Seconds as `m:ss`.
#[must_use]
pub fn format_elapsed(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}
