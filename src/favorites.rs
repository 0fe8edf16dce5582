//! Favorite selection: the set of titles a full ranking pass runs over.

use crate::item::{Category, Item};

/// Fewest favorites a full ranking pass accepts.
pub const MIN_FAVORITES: usize = 5;

/// Most favorites a selection can hold.
pub const MAX_FAVORITES: usize = 10;

/// What [`FavoriteSelection::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Selection is full; nothing changed.
    AtCapacity,
}

/// Picked favorites for one category, in pick order.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteSelection {
    category: Category,
    items: Vec<Item>,
}

impl FavoriteSelection {
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self {
            category,
            items: Vec::new(),
        }
    }

    /// Restores a stored snapshot. Entries from another category, duplicates
    /// and anything past [`MAX_FAVORITES`] are dropped.
    #[must_use]
    pub fn from_items(category: Category, items: Vec<Item>) -> Self {
        let mut selection = Self::new(category);
        for item in items {
            if item.category == category && !selection.contains(&item.id) && !selection.is_full() {
                selection.items.push(item);
            }
        }
        selection
    }

    /// Adds `item`, or removes it if already selected.
    pub fn toggle(&mut self, item: Item) -> Toggle {
        if let Some(index) = self.items.iter().position(|picked| picked.id == item.id) {
            self.items.remove(index);
            return Toggle::Removed;
        }
        if self.is_full() {
            return Toggle::AtCapacity;
        }
        self.items.push(item);
        Toggle::Added
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_FAVORITES
    }

    /// True when the selection is large enough to rank.
    #[must_use]
    pub fn can_finish(&self) -> bool {
        (MIN_FAVORITES..=MAX_FAVORITES).contains(&self.items.len())
    }
}
