//! `lx study` and `lx dictation`: interactive practice over the vocabulary.
//!
//! Prompts go to stderr and answers are read line by line from stdin, so
//! stdout carries only the final summary (JSON with `--json`). End of input
//! stops the session early; the summary covers what was answered.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use lexis_core::store::WordFilter;
use lexis_core::study::{Answered, Card, Session, SessionSummary, StudyMode, StudyStats, self_grade};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{info, warn};

use super::resolve_category;
use crate::output::{OutputMode, pretty_kv, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct StudyArgs {
    /// Study mode: flashcard, quiz, spelling.
    #[arg(short, long, default_value = "flashcard")]
    pub mode: StudyMode,

    /// Study at most this many words.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Only words in this category (id or name).
    #[arg(short, long)]
    pub category: Option<String>,

    /// Shuffle seed, for a repeatable order.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Show lifetime study statistics instead of starting a session.
    #[arg(long, conflicts_with_all = ["mode", "limit", "category", "seed"])]
    pub stats: bool,
}

#[derive(Args, Debug)]
pub struct DictationArgs {
    /// Only words in this category (id or name).
    #[arg(short, long)]
    pub category: Option<String>,

    /// Shuffle seed, for a repeatable order.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct StudyReport {
    mode: StudyMode,
    #[serde(flatten)]
    summary: SessionSummary,
    missed: Vec<String>,
    stats: StudyStats,
}

#[derive(Debug, Serialize)]
struct DictationReport {
    #[serde(flatten)]
    summary: SessionSummary,
    missed: Vec<String>,
}

fn rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

fn load_session(
    project: &Project,
    category: Option<&str>,
    limit: Option<usize>,
    seed: Option<u64>,
    dictation: bool,
) -> Result<Session> {
    let mut filter = WordFilter::default();
    if let Some(key) = category {
        filter = filter.category(resolve_category(project.remote(), key)?.id);
    }
    let words = project.remote().list_words(&filter)?;
    let mut rng = rng(seed);
    let now = Utc::now();
    Ok(if dictation {
        Session::dictation(words, &mut rng, now)
    } else {
        Session::new(words, limit, &mut rng, now)
    })
}

/// Read one line. `None` at end of input.
fn read_line(input: &mut dyn BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn show_lines(prompt: &mut dyn Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(prompt, "  {line}")?;
    }
    Ok(())
}

/// Ask until a gradable answer arrives. `None` at end of input.
fn ask(
    session: &mut Session,
    mode: StudyMode,
    input: &mut dyn BufRead,
    prompt: &mut dyn Write,
) -> io::Result<Option<Answered>> {
    let Some(word) = session.current() else {
        return Ok(None);
    };
    let card = Card::of(mode, word);
    writeln!(prompt, "[{}/{}]", session.position() + 1, session.deck().len())?;
    show_lines(prompt, &card.front)?;
    if let Some(hint) = &card.hint {
        writeln!(prompt, "  {hint}")?;
    }

    if !mode.is_typed() {
        write!(prompt, "Enter to reveal> ")?;
        prompt.flush()?;
        if read_line(input)?.is_none() {
            return Ok(None);
        }
        show_lines(prompt, &card.back)?;
    }

    loop {
        let label = if mode.is_typed() { "answer" } else { "known? [y/n]" };
        write!(prompt, "{label}> ")?;
        prompt.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        let answered = if mode.is_typed() {
            session.answer(&line)
        } else {
            self_grade(&line).and_then(|known| session.grade(known))
        };
        if let Some(answered) = answered {
            if mode.is_typed() {
                let verdict = if answered.correct { "correct" } else { "wrong" };
                writeln!(prompt, "  {verdict}: {}", answered.expected)?;
            }
            return Ok(Some(answered));
        }
    }
}

/// Run a session to the end of the deck or of input. Returns the words
/// answered wrongly, in order.
fn drill(
    session: &mut Session,
    mode: StudyMode,
    input: &mut dyn BufRead,
    prompt: &mut dyn Write,
    mut on_answer: impl FnMut(&Answered),
) -> io::Result<Vec<String>> {
    let mut missed = Vec::new();
    while let Some(answered) = ask(session, mode, input, prompt)? {
        on_answer(&answered);
        if !answered.correct {
            missed.push(answered.expected);
        }
    }
    Ok(missed)
}

fn summary_lines(w: &mut dyn Write, summary: &SessionSummary, missed: &[String]) -> io::Result<()> {
    if summary.deck_size == 0 {
        return writeln!(w, "No words to practice. Add some with `lx add`.");
    }
    let status = if summary.finished { "Session complete" } else { "Session stopped" };
    writeln!(w, "{status}")?;
    pretty_kv(w, "Score", format!("{}/{}", summary.correct, summary.total))?;
    pretty_kv(w, "Accuracy", format!("{}%", summary.percent))?;
    pretty_kv(w, "Time", &summary.elapsed)?;
    if !missed.is_empty() {
        pretty_kv(w, "Review", missed.join(", "))?;
    }
    Ok(())
}

fn stats_lines(w: &mut dyn Write, stats: &StudyStats) -> io::Result<()> {
    pretty_kv(w, "Studied", stats.total_studied.to_string())?;
    pretty_kv(w, "Correct", stats.correct_answers.to_string())?;
    pretty_kv(w, "Accuracy", format!("{}%", stats.accuracy_percent()))?;
    pretty_kv(w, "Streak", stats.streak_count.to_string())?;
    pretty_kv(
        w,
        "Last study",
        stats
            .last_study_date
            .map_or_else(|| "never".to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string()),
    )
}

/// Execute `lx study`.
///
/// # Errors
///
/// Returns an error if the store cannot be read, the category is unknown,
/// or stdin/stderr fail.
pub fn run_study(args: &StudyArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let mut prefs = project.prefs();
    let mut stats = StudyStats::load(&prefs);

    if args.stats {
        return render_mode(
            output,
            &stats,
            |s, w| {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}",
                    s.total_studied,
                    s.correct_answers,
                    s.accuracy_percent(),
                    s.streak_count
                )
            },
            |s, w| stats_lines(w, s),
        );
    }

    let mut session = load_session(
        &project,
        args.category.as_deref(),
        args.limit,
        args.seed,
        false,
    )?;
    info!(mode = %args.mode, words = session.deck().len(), "study session started");

    let stdin = io::stdin();
    let missed = drill(
        &mut session,
        args.mode,
        &mut stdin.lock(),
        &mut io::stderr(),
        |answered| stats.record(answered.correct, Utc::now()),
    )?;
    if session.score().total > 0 {
        stats.save(&mut prefs).unwrap_or_else(|err| {
            warn!(error = %err, code = %err.code(), "study stats not persisted");
        });
    }

    let report = StudyReport {
        mode: args.mode,
        summary: session.summary(Utc::now()),
        missed,
        stats,
    };
    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "{}\t{}\t{}", r.summary.correct, r.summary.total, r.summary.percent),
        |r, w| {
            summary_lines(w, &r.summary, &r.missed)?;
            pretty_kv(w, "Streak", r.stats.streak_count.to_string())
        },
    )
}

/// Execute `lx dictation`: up to twenty shuffled words, typed from their
/// meaning. Scores are per session and not persisted.
///
/// # Errors
///
/// Returns an error if the store cannot be read, the category is unknown,
/// or stdin/stderr fail.
pub fn run_dictation(args: &DictationArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let mut session = load_session(&project, args.category.as_deref(), None, args.seed, true)?;
    info!(words = session.deck().len(), "dictation started");

    let stdin = io::stdin();
    let missed = drill(
        &mut session,
        StudyMode::Spelling,
        &mut stdin.lock(),
        &mut io::stderr(),
        |_| {},
    )?;

    let report = DictationReport {
        summary: session.summary(Utc::now()),
        missed,
    };
    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "{}\t{}\t{}", r.summary.correct, r.summary.total, r.summary.percent),
        |r, w| summary_lines(w, &r.summary, &r.missed),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::Parser;
    use lexis_core::model::{Difficulty, Word};

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: StudyArgs,
    }

    fn word(id: i64, text: &str, meaning: &str) -> Word {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Word {
            id,
            word: text.to_string(),
            meaning: meaning.to_string(),
            example_sentence: None,
            example_translation: None,
            pronunciation: None,
            category_id: None,
            category_name: None,
            difficulty: Difficulty::Beginner,
            language: "en".to_string(),
            word_type: None,
            upvotes: 0,
            is_deleted: false,
            created_by: "anonymous".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    fn one_word_session() -> Session {
        Session::new(
            vec![word(1, "cat", "a small feline")],
            None,
            &mut StdRng::seed_from_u64(0),
            Utc::now(),
        )
    }

    #[test]
    fn study_args_parse() {
        let w = Wrapper::parse_from(["test", "-m", "quiz", "-n", "5", "--seed", "9"]);
        assert_eq!(w.args.mode, StudyMode::Quiz);
        assert_eq!(w.args.limit, Some(5));
        assert_eq!(w.args.seed, Some(9));
        assert!(Wrapper::try_parse_from(["test", "--stats", "-m", "quiz"]).is_err());
        assert!(Wrapper::try_parse_from(["test", "-m", "essay"]).is_err());
    }

    #[test]
    fn typed_drill_skips_blank_lines() {
        let mut session = one_word_session();
        let mut input = io::Cursor::new("\n  \nCAT\n");
        let mut prompt = Vec::new();
        let mut graded = 0;
        let missed = drill(&mut session, StudyMode::Quiz, &mut input, &mut prompt, |_| {
            graded += 1;
        })
        .unwrap();

        assert!(missed.is_empty());
        assert_eq!(graded, 1);
        assert!(session.is_finished());
        let shown = String::from_utf8(prompt).unwrap();
        assert!(shown.contains("a small feline"));
        assert!(shown.contains("correct: cat"));
    }

    #[test]
    fn flashcard_drill_reveals_then_grades() {
        let mut session = one_word_session();
        let mut input = io::Cursor::new("\nmaybe\nn\n");
        let mut prompt = Vec::new();
        let missed =
            drill(&mut session, StudyMode::Flashcard, &mut input, &mut prompt, |_| {}).unwrap();

        assert_eq!(missed, ["cat"]);
        assert_eq!(session.score().total, 1);
        let shown = String::from_utf8(prompt).unwrap();
        assert!(shown.find("cat").unwrap() < shown.find("a small feline").unwrap());
    }

    #[test]
    fn end_of_input_stops_early() {
        let mut session = Session::new(
            vec![word(1, "cat", "feline"), word(2, "dog", "canine")],
            None,
            &mut StdRng::seed_from_u64(0),
            Utc::now(),
        );
        let mut input = io::Cursor::new("");
        let missed =
            drill(&mut session, StudyMode::Spelling, &mut input, &mut Vec::<u8>::new(), |_| {}).unwrap();
        assert!(missed.is_empty());
        assert!(!session.summary(Utc::now()).finished);
    }
}
