//! The persisted, per-category ranked list and how run results merge into it.
//!
//! A [`RankingList`] is kept sorted by rating, best first. Sorting is stable,
//! so items with equal ratings keep their previous relative order. Only the
//! first [`TOP_N`] entries are meant for display; the full list is what gets
//! stored.

use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::tournament::RunResults;

/// How many entries are surfaced for display and used as the seeding set.
pub const TOP_N: usize = 5;

/// Where a newly inserted item landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// 1-indexed position after sorting.
    pub rank: usize,
    /// Length of the list after insertion.
    pub total: usize,
}

/// Ordered list of ranked items for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Item>", into = "Vec<Item>")]
pub struct RankingList {
    items: Vec<Item>,
}

impl From<Vec<Item>> for RankingList {
    fn from(items: Vec<Item>) -> Self {
        Self::from_items(items)
    }
}

impl From<RankingList> for Vec<Item> {
    fn from(list: RankingList) -> Self {
        list.items
    }
}

impl RankingList {
    /// Builds a list from `items`, sorting them. Display scores are derived
    /// from the ratings, never taken as given.
    #[must_use]
    pub fn from_items(items: Vec<Item>) -> Self {
        let items = items.into_iter().map(Item::with_derived_display).collect();
        let mut list = Self { items };
        list.sort();
        list
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First `n` entries, best first.
    #[must_use]
    pub fn top(&self, n: usize) -> &[Item] {
        &self.items[..n.min(self.items.len())]
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// 1-indexed rank of `id`.
    #[must_use]
    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id).map(|i| i + 1)
    }

    /// Merges a completed full run.
    ///
    /// Items already in the list take their rating from the run; items not
    /// in the run are untouched. Participants missing from the list are
    /// appended, which is how the first ranking pass fills an empty list.
    pub fn merge_full_run(&mut self, results: &RunResults) {
        self.update_from(results);

        for standing in &results.standings {
            if !self.contains(&standing.id) {
                self.items.push(standing.clone());
            }
        }

        self.sort();
        log::info!(
            "Merged full {} run ({} participants) into list of {}",
            results.category,
            results.standings.len(),
            self.items.len()
        );
    }

    /// Merges a completed seeding run and appends `new_item_final`.
    ///
    /// Existing items that took part get their run rating. Returns where the
    /// new item landed.
    pub fn merge_seeded_run(&mut self, new_item_final: Item, results: &RunResults) -> Placement {
        self.update_from(results);
        self.insert(new_item_final)
    }

    /// Places `item` directly without comparisons (first item in a list).
    pub fn insert(&mut self, item: Item) -> Placement {
        let id = item.id.clone();
        self.items.push(item);
        self.sort();

        let placement = Placement {
            rank: self.rank_of(&id).unwrap_or(self.items.len()),
            total: self.items.len(),
        };
        log::info!("Placed `{id}' at #{} of {}", placement.rank, placement.total);
        placement
    }

    fn update_from(&mut self, results: &RunResults) {
        for item in &mut self.items {
            if let Some(rating) = results.rating_of(&item.id) {
                item.set_rating(rating);
            }
        }
    }

    fn sort(&mut self) {
        self.items.sort_by(|a, b| b.rating.cmp(&a.rating));
    }
}
