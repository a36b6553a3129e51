//! Favorites and upvote reconciliation.
//!
//! Favorites are purely local. Upvotes are optimistic: the cached counter
//! and the local upvoted set change first, the remote command runs second,
//! and a failed command undoes only its own change. The two phases are
//! separate calls ([`Reconciler::begin_upvote`] and
//! [`Reconciler::settle_upvote`]) so callers can hold several toggles in
//! flight and settle them in any order.
//!
//! Membership follows the most recently begun toggle that has not failed.
//! Once every toggle on a word has settled, the word is upvoted iff the
//! last successful toggle (in begin order) was an add, or, with none
//! successful, iff it was upvoted before the first one began.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::model::{Word, WordId};
use crate::prefs::PrefStore;
use crate::store::{RemoteStore, decrement_upvotes};

pub const FAVORITES_KEY: &str = "lexis_favorites";
pub const UNREAD_FAVORITES_KEY: &str = "lexis_unread_favorites";
pub const UPVOTED_KEY: &str = "lexis_upvoted_words";

/// Client-side copy of fetched words; the target of optimistic updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCache {
    words: Vec<Word>,
}

impl WordCache {
    #[must_use]
    pub const fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    #[must_use]
    pub fn into_words(self) -> Vec<Word> {
        self.words
    }

    #[must_use]
    pub fn get(&self, id: WordId) -> Option<&Word> {
        self.words.iter().find(|w| w.id == id)
    }

    #[must_use]
    pub fn upvotes(&self, id: WordId) -> Option<u32> {
        self.get(id).map(|w| w.upvotes)
    }

    /// Overwrite the cached counter, returning the previous value.
    pub fn set_upvotes(&mut self, id: WordId, upvotes: u32) -> Option<u32> {
        let word = self.words.iter_mut().find(|w| w.id == id)?;
        Some(std::mem::replace(&mut word.upvotes, upvotes))
    }

    /// Swap in a fresh listing from the store.
    pub fn replace(&mut self, words: Vec<Word>) {
        self.words = words;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpvoteDirection {
    Add,
    Remove,
}

/// Result of one upvote toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The remote accepted; local state keeps the optimistic change.
    Committed {
        word_id: WordId,
        direction: UpvoteDirection,
        remote_upvotes: u32,
        cached_upvotes: Option<u32>,
    },
    /// The remote rejected; local state was restored.
    RolledBack {
        word_id: WordId,
        direction: UpvoteDirection,
        reason: String,
        error_code: &'static str,
        cached_upvotes: Option<u32>,
    },
}

impl ToggleOutcome {
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    #[must_use]
    pub const fn direction(&self) -> UpvoteDirection {
        match self {
            Self::Committed { direction, .. } | Self::RolledBack { direction, .. } => *direction,
        }
    }
}

/// An optimistic upvote change awaiting its remote result.
///
/// Dropping a ticket without settling it leaves the optimistic state in
/// place.
#[must_use = "settle the ticket with the remote result"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpvote {
    pub word_id: WordId,
    pub direction: UpvoteDirection,
    seq: u64,
    /// Whether the cached counter moved; a clamped or uncached word has
    /// nothing to undo.
    adjusted: bool,
}

/// Unsettled toggles on one word.
#[derive(Debug, Default)]
struct Flight {
    /// Membership as of the latest successful toggle, or before the first.
    settled: bool,
    settled_seq: u64,
    pending: BTreeMap<u64, UpvoteDirection>,
}

impl Flight {
    /// Membership the view should show right now.
    fn membership(&self) -> bool {
        match self.pending.last_key_value() {
            Some((&seq, &direction)) if seq > self.settled_seq => {
                direction == UpvoteDirection::Add
            }
            _ => self.settled,
        }
    }
}

/// Owner of the favorite set, the unread counter and the upvoted set.
#[derive(Debug)]
pub struct Reconciler {
    favorites: BTreeSet<WordId>,
    unread_favorites: u32,
    upvoted: BTreeSet<WordId>,
    in_flight: BTreeMap<WordId, Flight>,
    next_seq: u64,
    prefs: PrefStore,
}

impl Reconciler {
    /// Load persisted state. Missing or malformed entries start empty.
    #[must_use]
    pub fn load(prefs: PrefStore) -> Self {
        let favorites: Vec<WordId> = prefs.get(FAVORITES_KEY, Vec::new());
        let upvoted: Vec<WordId> = prefs.get(UPVOTED_KEY, Vec::new());
        let unread_favorites = prefs.get(UNREAD_FAVORITES_KEY, 0_u32);
        Self {
            favorites: favorites.into_iter().collect(),
            unread_favorites,
            upvoted: upvoted.into_iter().collect(),
            in_flight: BTreeMap::new(),
            next_seq: 0,
            prefs,
        }
    }

    #[must_use]
    pub const fn favorites(&self) -> &BTreeSet<WordId> {
        &self.favorites
    }

    #[must_use]
    pub const fn upvoted(&self) -> &BTreeSet<WordId> {
        &self.upvoted
    }

    #[must_use]
    pub const fn unread_favorites(&self) -> u32 {
        self.unread_favorites
    }

    #[must_use]
    pub fn is_favorite(&self, id: WordId) -> bool {
        self.favorites.contains(&id)
    }

    #[must_use]
    pub fn is_upvoted(&self, id: WordId) -> bool {
        self.upvoted.contains(&id)
    }

    #[must_use]
    pub const fn prefs(&self) -> &PrefStore {
        &self.prefs
    }

    pub fn prefs_mut(&mut self) -> &mut PrefStore {
        &mut self.prefs
    }

    /// Flip favorite membership. Returns `true` when the word is now a
    /// favorite.
    pub fn toggle_favorite(&mut self, id: WordId) -> bool {
        let added = if self.favorites.remove(&id) {
            self.unread_favorites = self.unread_favorites.saturating_sub(1);
            false
        } else {
            self.favorites.insert(id);
            self.unread_favorites = self.unread_favorites.saturating_add(1);
            true
        };
        debug!(word_id = id, added, "favorite toggled");
        self.persist_favorites();
        added
    }

    pub fn mark_favorites_read(&mut self) {
        self.unread_favorites = 0;
        persist(&mut self.prefs, UNREAD_FAVORITES_KEY, &0_u32);
    }

    /// Forget all favorites and upvotes.
    pub fn clear(&mut self) {
        self.favorites.clear();
        self.upvoted.clear();
        self.in_flight.clear();
        self.unread_favorites = 0;
        self.persist_favorites();
        self.persist_upvoted();
    }

    /// Optimistic phase: adjust the cached counter and flip membership.
    pub fn begin_upvote(&mut self, cache: &mut WordCache, id: WordId) -> PendingUpvote {
        let was_upvoted = self.upvoted.contains(&id);
        let direction = if was_upvoted {
            UpvoteDirection::Remove
        } else {
            UpvoteDirection::Add
        };

        let adjusted = match (cache.upvotes(id), direction) {
            (Some(current), UpvoteDirection::Add) => {
                cache.set_upvotes(id, current.saturating_add(1));
                true
            }
            (Some(current), UpvoteDirection::Remove) if current > 0 => {
                cache.set_upvotes(id, current - 1);
                true
            }
            _ => false,
        };

        self.next_seq += 1;
        let seq = self.next_seq;
        let flight = self.in_flight.entry(id).or_insert_with(|| Flight {
            settled: was_upvoted,
            ..Flight::default()
        });
        flight.pending.insert(seq, direction);
        self.show_membership(id);

        debug!(word_id = id, ?direction, seq, "upvote applied optimistically");
        PendingUpvote {
            word_id: id,
            direction,
            seq,
            adjusted,
        }
    }

    /// Commit or roll back a pending toggle given the remote result.
    pub fn settle_upvote(
        &mut self,
        cache: &mut WordCache,
        ticket: PendingUpvote,
        remote: Result<u32, StoreError>,
    ) -> ToggleOutcome {
        let PendingUpvote {
            word_id,
            direction,
            seq,
            adjusted,
        } = ticket;

        if let Some(flight) = self.in_flight.get_mut(&word_id) {
            flight.pending.remove(&seq);
            if remote.is_ok() && seq > flight.settled_seq {
                flight.settled = direction == UpvoteDirection::Add;
                flight.settled_seq = seq;
            }
        }
        self.show_membership(word_id);
        if self
            .in_flight
            .get(&word_id)
            .is_some_and(|flight| flight.pending.is_empty())
        {
            self.in_flight.remove(&word_id);
        }

        match remote {
            Ok(remote_upvotes) => {
                info!(word_id, ?direction, remote_upvotes, "upvote committed");
                ToggleOutcome::Committed {
                    word_id,
                    direction,
                    remote_upvotes,
                    cached_upvotes: cache.upvotes(word_id),
                }
            }
            Err(err) => {
                if let (true, Some(current)) = (adjusted, cache.upvotes(word_id)) {
                    let undone = match direction {
                        UpvoteDirection::Add => current.saturating_sub(1),
                        UpvoteDirection::Remove => current.saturating_add(1),
                    };
                    cache.set_upvotes(word_id, undone);
                }

                warn!(word_id, ?direction, error = %err, "upvote rolled back");
                ToggleOutcome::RolledBack {
                    word_id,
                    direction,
                    reason: err.to_string(),
                    error_code: err.code().code(),
                    cached_upvotes: cache.upvotes(word_id),
                }
            }
        }
    }

    /// Full toggle: optimistic change, remote command, settle.
    ///
    /// Adding calls the atomic increment. Removing reads the counter and
    /// writes it back minus one, which can lose a concurrent update.
    pub fn toggle_upvote(
        &mut self,
        cache: &mut WordCache,
        store: &dyn RemoteStore,
        id: WordId,
    ) -> ToggleOutcome {
        let ticket = self.begin_upvote(cache, id);
        let remote = match ticket.direction {
            UpvoteDirection::Add => store.increment_upvotes(id),
            UpvoteDirection::Remove => decrement_upvotes(store, id),
        };
        self.settle_upvote(cache, ticket, remote)
    }

    /// Bring the upvoted set in line with the word's in-flight toggles.
    fn show_membership(&mut self, id: WordId) {
        let Some(member) = self.in_flight.get(&id).map(Flight::membership) else {
            return;
        };
        let changed = if member {
            self.upvoted.insert(id)
        } else {
            self.upvoted.remove(&id)
        };
        if changed {
            self.persist_upvoted();
        }
    }

    fn persist_favorites(&mut self) {
        persist(&mut self.prefs, FAVORITES_KEY, &self.favorites);
        persist(&mut self.prefs, UNREAD_FAVORITES_KEY, &self.unread_favorites);
    }

    fn persist_upvoted(&mut self) {
        persist(&mut self.prefs, UPVOTED_KEY, &self.upvoted);
    }
}

fn persist<T: Serialize + ?Sized>(prefs: &mut PrefStore, key: &str, value: &T) {
    if let Err(err) = prefs.set(key, value) {
        warn!(key, error = %err, code = %err.code(), "preference not persisted");
    }
}
