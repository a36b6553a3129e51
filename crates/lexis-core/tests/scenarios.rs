//! End-to-end library scenarios against the bundled SQLite store.

use chrono::{Duration, Utc};
use lexis_core::export::{ExportContext, ExportFormat, export_file_name, render};
use lexis_core::import::{self, ImportFormat};
use lexis_core::model::{CategoryDraft, Difficulty, WordDraft};
use lexis_core::prefs::PrefStore;
use lexis_core::reconcile::{Reconciler, WordCache};
use lexis_core::stats;
use lexis_core::store::{RemoteStore, SqliteStore, WordFilter};
use lexis_core::view::{self, ListQuery, SortDirection, SortKey};
use std::collections::BTreeSet;
use tempfile::TempDir;

fn seeded() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    let nouns = store
        .insert_category(&CategoryDraft::new("Nouns", Some("things".into())))
        .unwrap();
    let verbs = store.insert_category(&CategoryDraft::new("Verbs", None)).unwrap();

    for (text, meaning, category, difficulty) in [
        ("apple", "a fruit", nouns.id, Difficulty::Beginner),
        ("run", "move fast", verbs.id, Difficulty::Beginner),
        ("serendipity", "a happy accident", nouns.id, Difficulty::Advanced),
        ("ameliorate", "make better", verbs.id, Difficulty::Professional),
    ] {
        let mut draft = WordDraft::new(text, meaning);
        draft.category_id = Some(category);
        draft.difficulty = difficulty;
        store.insert_word(&draft).unwrap();
    }
    store
}

#[test]
fn favorites_filter_sort_and_paginate() {
    let store = seeded();
    let words = store.list_words(&WordFilter::default()).unwrap();
    let mut rec = Reconciler::load(PrefStore::in_memory());
    let mut cache = WordCache::new(words.clone());

    let apple = words.iter().find(|w| w.word == "apple").unwrap().id;
    let run = words.iter().find(|w| w.word == "run").unwrap().id;
    rec.toggle_favorite(apple);
    rec.toggle_favorite(run);
    rec.toggle_upvote(&mut cache, &store, run);

    let query = ListQuery {
        favorites_only: true,
        sort: SortKey::Upvotes,
        direction: SortDirection::Desc,
        ..ListQuery::default()
    };
    let listed = view::apply(cache.words(), &query, rec.favorites());
    let texts: Vec<&str> = listed.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(texts, ["run", "apple"]);

    let page = view::paginate(&listed, 2, 1);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items[0].word, "apple");
}

#[test]
fn favorites_survive_a_reload_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");

    let mut rec = Reconciler::load(PrefStore::open(&path));
    rec.toggle_favorite(7);
    rec.toggle_favorite(9);
    rec.mark_favorites_read();
    drop(rec);

    let rec = Reconciler::load(PrefStore::open(&path));
    assert_eq!(rec.favorites(), &BTreeSet::from([7, 9]));
    assert_eq!(rec.unread_favorites(), 0);
}

#[test]
fn backup_restores_into_an_empty_store() {
    let source = seeded();
    let backup = import::create_backup(&source, Utc::now()).unwrap();
    assert_eq!(backup.metadata.total_words, 4);
    assert_eq!(backup.metadata.total_categories, 2);

    let text = serde_json::to_string_pretty(&backup).unwrap();
    let parsed = import::parse_backup(&text).unwrap();

    let target = SqliteStore::open_in_memory().unwrap();
    target.insert_category(&CategoryDraft::new("verbs", None)).unwrap();
    let report = import::restore_backup(&target, &parsed).unwrap();

    assert_eq!(report.imported_words, 4);
    assert_eq!(report.imported_categories, 1);
    assert_eq!(report.reused_categories, 1);
    assert!(report.errors.is_empty());

    let restored = target.list_words(&WordFilter::default()).unwrap();
    let run = restored.iter().find(|w| w.word == "run").unwrap();
    assert_eq!(run.category_name.as_deref(), Some("verbs"));
    let apple = restored.iter().find(|w| w.word == "apple").unwrap();
    assert_eq!(apple.category_name.as_deref(), Some("Nouns"));
}

#[test]
fn csv_import_reports_bad_rows_and_keeps_good_ones() {
    let store = seeded();
    let csv = "\u{feff}单词,释义,分类,难度\n\
               zephyr,a gentle breeze,Nouns,2\n\
               ,missing word,Nouns,1\n\
               quell,put an end to,Adjectives,1\n\
               vex,annoy,Verbs,9\n";
    let rows = import::parse(ImportFormat::Csv, csv).unwrap();
    assert_eq!(rows.len(), 4);

    let categories = store.list_categories().unwrap();
    let checks = import::validate_rows(&rows, &categories, "admin@example.com");
    let valid: Vec<usize> = checks.iter().filter(|c| c.is_valid()).map(|c| c.row).collect();
    assert_eq!(valid, [1]);
    assert!(checks[2].errors.iter().any(|e| e.contains("Adjectives")));

    let report = import::import_valid(&store, &checks);
    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped_invalid, 3);

    let zephyr = store
        .list_words(&WordFilter::default().search("zephyr"))
        .unwrap()
        .remove(0);
    assert_eq!(zephyr.difficulty, Difficulty::Intermediate);
    assert_eq!(zephyr.created_by, "admin@example.com");
}

#[test]
fn stats_skip_deleted_words() {
    let store = seeded();
    let words = store.list_words(&WordFilter::default()).unwrap();
    let run = words.iter().find(|w| w.word == "run").unwrap().id;
    store.set_upvotes(run, 6).unwrap();
    let apple = words.iter().find(|w| w.word == "apple").unwrap().id;
    store.soft_delete_word(apple).unwrap();

    let all = store
        .list_words(&WordFilter {
            include_deleted: true,
            ..WordFilter::default()
        })
        .unwrap();
    let categories = store.list_categories().unwrap();
    let summary = stats::compute(&all, &categories, Utc::now() + Duration::days(30));

    assert_eq!(summary.total_words, 3);
    assert_eq!(summary.recent_additions, 0);
    assert_eq!(summary.popular[0].word, "run");
    assert_eq!(summary.by_difficulty["beginner"], 1);
}

#[test]
fn every_export_format_renders_a_category_scope() {
    let store = seeded();
    let nouns = store.list_categories().unwrap().remove(0);
    let words = store
        .list_words(&WordFilter::default().category(nouns.id))
        .unwrap();
    let ctx = ExportContext::new(nouns.name.clone(), Utc::now());

    for format in [
        ExportFormat::Pdf,
        ExportFormat::Csv,
        ExportFormat::Json,
        ExportFormat::Markdown,
    ] {
        let bytes = render(format, &words, &ctx).unwrap();
        assert!(!bytes.is_empty(), "{format} rendered nothing");
        let name = export_file_name(format, &ctx);
        assert!(name.starts_with("vocabulary_Nouns_"), "{name}");
        assert!(name.ends_with(format.extension()), "{name}");
    }

    let pdf = render(ExportFormat::Pdf, &words, &ctx).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}
