//! Matchup scheduling for tournament runs.
//!
//! Two schedule shapes exist:
//! - **Round robin**: every unordered pair among the participants exactly
//!   once, shuffled once at build time.
//! - **Seeding**: one new item against each member of an existing top set,
//!   in rank order.
//!
//! Both take item ids only. A [`Schedule`] is immutable once built.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::item::Item;

/// An unordered pair of item ids, compared once within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matchup {
    pub first: String,
    pub second: String,
}

impl Matchup {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    #[must_use]
    pub fn involves(&self, id: &str) -> bool {
        self.first == id || self.second == id
    }

    /// The other participant, if `id` is one of the pair.
    #[must_use]
    pub fn opponent_of(&self, id: &str) -> Option<&str> {
        if self.first == id {
            Some(self.second.as_str())
        } else if self.second == id {
            Some(self.first.as_str())
        } else {
            None
        }
    }

    /// Order-independent key for duplicate detection.
    fn unordered_key(&self) -> (&str, &str) {
        if self.first <= self.second {
            (self.first.as_str(), self.second.as_str())
        } else {
            (self.second.as_str(), self.first.as_str())
        }
    }
}

/// Fixed, ordered list of matchups for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    matchups: Vec<Matchup>,
}

impl Schedule {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// All `n·(n−1)/2` pairs of `items`, in an order shuffled by `rng`.
    ///
    /// Fewer than two items yields an empty schedule. Items sharing an id are
    /// treated as one participant.
    pub fn round_robin<R: Rng + ?Sized>(items: &[Item], rng: &mut R) -> Self {
        let mut seen = HashSet::new();
        let ids: Vec<&str> = items
            .iter()
            .map(|item| item.id.as_str())
            .filter(|id| seen.insert(*id))
            .collect();

        if ids.len() < 2 {
            log::debug!("Round robin over {} item(s): nothing to compare", ids.len());
            return Self::empty();
        }

        let mut matchups: Vec<Matchup> = ids
            .iter()
            .enumerate()
            .flat_map(|(i, first)| ids[i + 1..].iter().map(move |second| Matchup::new(*first, *second)))
            .collect();
        matchups.shuffle(rng);

        log::debug!("Built round robin: {} items, {} matchups", ids.len(), matchups.len());
        Self { matchups }
    }

    /// `new_item` against each of `top_items`, in the given (rank) order.
    ///
    /// An empty top set yields an empty schedule; the caller places the new
    /// item directly instead. A top item sharing the new item's id is skipped.
    #[must_use]
    pub fn seeding(new_item: &Item, top_items: &[Item]) -> Self {
        let mut seen = HashSet::new();
        let matchups: Vec<Matchup> = top_items
            .iter()
            .filter(|top| top.id != new_item.id && seen.insert(top.id.as_str()))
            .map(|top| Matchup::new(new_item.id.as_str(), top.id.as_str()))
            .collect();

        log::debug!("Built seeding schedule for `{}': {} matchups", new_item.id, matchups.len());
        Self { matchups }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matchups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchups.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Matchup> {
        self.matchups.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Matchup> {
        self.matchups.iter()
    }

    /// True when no unordered pair occurs twice.
    #[must_use]
    pub fn has_unique_pairs(&self) -> bool {
        let mut seen = HashSet::new();
        self.matchups.iter().all(|m| seen.insert(m.unordered_key()))
    }
}
