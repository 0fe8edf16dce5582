//! Category-scoped access to persisted rankings and favorites.
//!
//! All storage keys are derived here from the [`Category`], so no other module
//! spells out a key. Stored values that are missing or fail to parse load as
//! empty collections.

use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::item::{Category, Item};
use crate::ranking::RankingList;
use crate::store::KeyValueStore;

/// Persisted rankings and favorite selections over a [`KeyValueStore`].
#[derive(Debug)]
pub struct RankingRepository<S> {
    store: S,
}

impl<S: KeyValueStore> RankingRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn rankings_key(category: Category) -> String {
        format!("{}Rankings", category.as_str())
    }

    #[must_use]
    pub fn favorites_key(category: Category) -> String {
        format!("{}Favorites", category.as_str())
    }

    /// Full ranked list for `category`; empty if absent or malformed.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself cannot be read.
    pub fn load_rankings(&self, category: Category) -> Result<RankingList, StoreError> {
        let items: Vec<Item> = self.load_json(&Self::rankings_key(category))?;
        Ok(RankingList::from_items(items))
    }

    /// Writes the full list for `category`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn save_rankings(&mut self, category: Category, list: &RankingList) -> Result<(), StoreError> {
        let json = serde_json::to_string(list)?;
        self.store.set(&Self::rankings_key(category), &json)?;
        log::debug!("Saved {} {} ranking(s)", list.len(), category);
        Ok(())
    }

    /// Favorite-selection snapshot for `category`; empty if absent or malformed.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself cannot be read.
    pub fn load_favorites(&self, category: Category) -> Result<Vec<Item>, StoreError> {
        let items: Vec<Item> = self.load_json(&Self::favorites_key(category))?;
        Ok(items.into_iter().map(Item::with_derived_display).collect())
    }

    /// Writes the favorite-selection snapshot for `category`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn save_favorites(&mut self, category: Category, items: &[Item]) -> Result<(), StoreError> {
        let json = serde_json::to_string(items)?;
        self.store.set(&Self::favorites_key(category), &json)
    }

    fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        let Some(raw) = self.store.get(key)? else {
            log::trace!("Nothing stored under `{key}'");
            return Ok(T::default());
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!("Ignoring malformed data under `{key}': {e}");
                Ok(T::default())
            }
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn repo() -> RankingRepository<MemoryStore> {
        RankingRepository::new(MemoryStore::new())
    }

    #[test]
    fn test_keys_are_per_category() {
        assert_eq!(RankingRepository::<MemoryStore>::rankings_key(Category::Movie), "movieRankings");
        assert_eq!(RankingRepository::<MemoryStore>::rankings_key(Category::Show), "showRankings");
        assert_eq!(RankingRepository::<MemoryStore>::favorites_key(Category::Show), "showFavorites");
    }

    #[test]
    fn test_absent_rankings_load_empty() {
        assert!(repo().load_rankings(Category::Movie).unwrap().is_empty());
        assert!(repo().load_favorites(Category::Show).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_rankings_load_empty() {
        let mut repo = repo();
        repo.store_mut().set("movieRankings", "{not json").unwrap();
        repo.store_mut().set("showFavorites", r#"{"id": 5}"#).unwrap();

        assert!(repo.load_rankings(Category::Movie).unwrap().is_empty());
        assert!(repo.load_favorites(Category::Show).unwrap().is_empty());
    }

    #[test]
    fn test_rankings_round_trip() {
        let mut repo = repo();
        let list = RankingList::from_items(vec![
            Item::new("1", "One", Category::Movie, "2001").with_rating(1040),
            Item::new("2", "Two", Category::Movie, "").with_rating(990),
        ]);
        repo.save_rankings(Category::Movie, &list).unwrap();

        assert_eq!(repo.load_rankings(Category::Movie).unwrap(), list);
        assert!(repo.load_rankings(Category::Show).unwrap().is_empty());
    }

    #[test]
    fn test_stored_display_scores_are_not_trusted() {
        let mut repo = repo();
        let stale = r#"[{"id":"a","title":"A","category":"movie","rating":1016,"displayRating":5.2}]"#;
        repo.store_mut().set("movieRankings", stale).unwrap();
        repo.store_mut().set("movieFavorites", stale).unwrap();

        assert_eq!(repo.load_rankings(Category::Movie).unwrap().items()[0].display_rating, 9.1);
        assert_eq!(repo.load_favorites(Category::Movie).unwrap()[0].display_rating, 9.1);
    }

    #[test]
    fn test_extreme_stored_rating_loads_clamped() {
        let mut repo = repo();
        repo.store_mut()
            .set(
                "movieRankings",
                r#"[{"id":"a","title":"A","category":"movie","rating":-9223372036854775808}]"#,
            )
            .unwrap();

        let list = repo.load_rankings(Category::Movie).unwrap();
        assert_eq!(list.items()[0].rating, i64::MIN);
        assert_eq!(list.items()[0].display_rating, 0.0);
    }

    #[test]
    fn test_legacy_entries_without_ratings_load_at_baseline() {
        let mut repo = repo();
        repo.store_mut()
            .set("showFavorites", r#"[{"id":"1396","title":"Breaking Bad","category":"show","year":"2008"}]"#)
            .unwrap();

        let favorites = repo.load_favorites(Category::Show).unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].rating, crate::elo::DEFAULT_RATING);
    }
}
