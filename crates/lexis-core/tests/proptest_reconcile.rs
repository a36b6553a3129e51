//! Property tests for the favorite/upvote reconciler and the CSV export.

use chrono::{TimeZone, Utc};
use lexis_core::error::StoreError;
use lexis_core::export::{ExportContext, ExportFormat, csv::BOM, render};
use lexis_core::model::{Difficulty, Word, WordDraft, WordId};
use lexis_core::prefs::PrefStore;
use lexis_core::reconcile::{Reconciler, UpvoteDirection, WordCache};
use lexis_core::store::{RemoteStore, SqliteStore};
use proptest::prelude::*;

fn word(id: WordId, text: &str, meaning: &str, upvotes: u32) -> Word {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
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
        upvotes,
        is_deleted: false,
        created_by: "anonymous".to_string(),
        created_at: at,
        updated_at: at,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn unread_count_tracks_favorite_set(ids in proptest::collection::vec(1_i64..20, 0..40)) {
        let mut rec = Reconciler::load(PrefStore::in_memory());
        for id in &ids {
            rec.toggle_favorite(*id);
            prop_assert_eq!(rec.unread_favorites() as usize, rec.favorites().len());
        }
    }

    #[test]
    fn toggling_a_sequence_twice_is_identity(ids in proptest::collection::vec(1_i64..20, 0..40)) {
        let mut rec = Reconciler::load(PrefStore::in_memory());
        for id in ids.iter().chain(ids.iter()) {
            rec.toggle_favorite(*id);
        }
        prop_assert!(rec.favorites().is_empty());
        prop_assert_eq!(rec.unread_favorites(), 0);
    }

    #[test]
    fn failed_remote_restores_prior_state(
        start in 0_u32..1000,
        already_upvoted in any::<bool>(),
    ) {
        let mut cache = WordCache::new(vec![word(1, "cat", "feline", start)]);
        let mut rec = Reconciler::load(PrefStore::in_memory());
        if already_upvoted {
            let ticket = rec.begin_upvote(&mut cache, 1);
            let outcome = rec.settle_upvote(&mut cache, ticket, Ok(start.saturating_add(1)));
            prop_assert!(outcome.is_committed());
        }
        let before_count = cache.upvotes(1);
        let before_member = rec.is_upvoted(1);

        let ticket = rec.begin_upvote(&mut cache, 1);
        prop_assert_ne!(rec.is_upvoted(1), before_member);
        let outcome = rec.settle_upvote(
            &mut cache,
            ticket,
            Err(StoreError::Unavailable("connection reset".into())),
        );

        prop_assert!(!outcome.is_committed());
        prop_assert_eq!(cache.upvotes(1), before_count);
        prop_assert_eq!(rec.is_upvoted(1), before_member);
    }

    #[test]
    fn interleaved_toggles_settle_to_last_successful_direction(
        (outcomes, order) in proptest::collection::vec(any::<bool>(), 1..6).prop_flat_map(|outcomes| {
            let order: Vec<usize> = (0..outcomes.len()).collect();
            (Just(outcomes), Just(order).prop_shuffle())
        }),
        initially_upvoted in any::<bool>(),
    ) {
        let start = 10_u32;
        let mut cache = WordCache::new(vec![word(1, "cat", "feline", start)]);
        let mut rec = Reconciler::load(PrefStore::in_memory());
        if initially_upvoted {
            let ticket = rec.begin_upvote(&mut cache, 1);
            let _ = rec.settle_upvote(&mut cache, ticket, Ok(start + 1));
            cache.set_upvotes(1, start);
        }

        let mut tickets: Vec<Option<_>> = outcomes
            .iter()
            .map(|_| Some(rec.begin_upvote(&mut cache, 1)))
            .collect();
        let directions: Vec<UpvoteDirection> = tickets
            .iter()
            .flatten()
            .map(|t| t.direction)
            .collect();
        for i in order {
            let ticket = tickets[i].take().unwrap();
            let remote = if outcomes[i] {
                Ok(start)
            } else {
                Err(StoreError::Unavailable("offline".into()))
            };
            let _ = rec.settle_upvote(&mut cache, ticket, remote);
        }

        let expected_member = directions
            .iter()
            .zip(&outcomes)
            .rev()
            .find(|(_, ok)| **ok)
            .map_or(initially_upvoted, |(d, _)| *d == UpvoteDirection::Add);
        prop_assert_eq!(rec.is_upvoted(1), expected_member);

        let expected_count = directions
            .iter()
            .zip(&outcomes)
            .filter(|(_, ok)| **ok)
            .fold(start, |n, (d, _)| match d {
                UpvoteDirection::Add => n + 1,
                UpvoteDirection::Remove => n - 1,
            });
        prop_assert_eq!(cache.upvotes(1), Some(expected_count));
    }

    #[test]
    fn upvote_then_withdraw_leaves_counter_unchanged(start in 0_u32..500) {
        let store = SqliteStore::open_in_memory().unwrap();
        let created = store.insert_word(&WordDraft::new("cat", "feline")).unwrap();
        store.set_upvotes(created.id, start).unwrap();
        let mut cache = WordCache::new(store.list_words(&Default::default()).unwrap());
        let mut rec = Reconciler::load(PrefStore::in_memory());

        prop_assert!(rec.toggle_upvote(&mut cache, &store, created.id).is_committed());
        prop_assert_eq!(store.get_word(created.id).unwrap().upvotes, start + 1);
        prop_assert!(rec.toggle_upvote(&mut cache, &store, created.id).is_committed());

        prop_assert_eq!(store.get_word(created.id).unwrap().upvotes, start);
        prop_assert_eq!(cache.upvotes(created.id), Some(start));
        prop_assert!(!rec.is_upvoted(created.id));
    }

    #[test]
    fn csv_export_reads_back_with_a_standard_reader(
        texts in proptest::collection::vec(("[a-z ,\"\n]{1,20}", "[a-zA-Z ,;\"\n]{0,40}"), 1..8),
    ) {
        let words: Vec<Word> = texts
            .iter()
            .enumerate()
            .map(|(i, (w, m))| word(i as i64 + 1, w, m, i as u32))
            .collect();
        let ctx = ExportContext::new("all", Utc::now());
        let bytes = render(ExportFormat::Csv, &words, &ctx).unwrap();
        let body = bytes.strip_prefix(BOM).unwrap();

        let mut reader = csv::ReaderBuilder::new().from_reader(body);
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        prop_assert_eq!(rows.len(), words.len());
        for (row, original) in rows.iter().zip(&words) {
            prop_assert_eq!(&row[0], original.word.as_str());
            prop_assert_eq!(&row[2], original.meaning.as_str());
            let upvotes = original.upvotes.to_string();
            prop_assert_eq!(&row[7], upvotes.as_str());
        }
    }
}
