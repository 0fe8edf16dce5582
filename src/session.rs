//! Ranking session: owns at most one active run per category and merges
//! completed runs into the persisted lists.
//!
//! Starting a run while one is already held for the same category is
//! rejected with [`RankError::RunAlreadyActive`]; call
//! [`RankingSession::abandon`] first to discard it. A run that never reaches
//! completion has no effect on stored data.
//!
//! When a completed run cannot be saved the session keeps it, so
//! [`RankingSession::retry_save`] can merge it again without repeating any
//! comparisons.

use rand::Rng;
use std::collections::HashMap;

use crate::elo::DEFAULT_RATING;
use crate::error::{RankError, RankResult};
use crate::favorites::{FavoriteSelection, Toggle, MAX_FAVORITES, MIN_FAVORITES};
use crate::item::{Category, Item};
use crate::ranking::{Placement, RankingList, TOP_N};
use crate::repository::RankingRepository;
use crate::schedule::Matchup;
use crate::store::KeyValueStore;
use crate::tournament::TournamentRun;

/// What a run is for, which decides how it merges.
#[derive(Debug, Clone)]
enum RunKind {
    Full,
    Insertion { new_item: Item },
}

#[derive(Debug)]
struct ActiveRun {
    run: TournamentRun,
    kind: RunKind,
}

/// Result of a merged and saved run.
#[derive(Debug, Clone, PartialEq)]
pub enum Finish {
    /// A full pass; participants with final ratings, best first.
    Ranked { standings: Vec<Item> },
    /// A single item was placed in the list.
    Inserted { item: Item, placement: Placement },
}

/// What the caller should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Ask the user about this matchup.
    Next(Matchup),
    /// The run is over and its results are stored.
    Finished(Finish),
}

/// Per-category run handles over a ranking repository.
#[derive(Debug)]
pub struct RankingSession<S> {
    repo: RankingRepository<S>,
    active: HashMap<Category, ActiveRun>,
    top_n: usize,
}

impl<S: KeyValueStore> RankingSession<S> {
    pub fn new(store: S) -> Self {
        Self::with_repository(RankingRepository::new(store))
    }

    pub fn with_repository(repo: RankingRepository<S>) -> Self {
        Self {
            repo,
            active: HashMap::new(),
            top_n: TOP_N,
        }
    }

    /// Overrides how many entries are displayed and used for seeding.
    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    #[must_use]
    pub fn repository(&self) -> &RankingRepository<S> {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut RankingRepository<S> {
        &mut self.repo
    }

    #[must_use]
    pub fn top_n(&self) -> usize {
        self.top_n
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    /// Stored favorite selection for `category`.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::PersistenceUnavailable`] if the store cannot be read.
    pub fn favorites(&self, category: Category) -> RankResult<FavoriteSelection> {
        let items = self.repo.load_favorites(category)?;
        Ok(FavoriteSelection::from_items(category, items))
    }

    /// Adds or removes `item` from the stored selection of its category.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::PersistenceUnavailable`] if the store fails.
    pub fn toggle_favorite(&mut self, item: Item) -> RankResult<Toggle> {
        let category = item.category;
        let mut selection = self.favorites(category)?;
        let toggle = selection.toggle(item);
        if toggle != Toggle::AtCapacity {
            self.repo.save_favorites(category, selection.items())?;
        }
        log::debug!("Favorite toggle in {category}: {toggle:?} ({} selected)", selection.len());
        Ok(toggle)
    }

    // ------------------------------------------------------------------
    // Starting runs
    // ------------------------------------------------------------------

    /// Starts a full round robin over the stored favorites of `category`.
    ///
    /// # Errors
    ///
    /// - [`RankError::NotEnoughFavorites`] unless the selection can finish
    /// - [`RankError::RunAlreadyActive`] if a run is held for `category`
    /// - [`RankError::PersistenceUnavailable`] if the store fails
    pub fn start_favorites_run<R: Rng + ?Sized>(&mut self, category: Category, rng: &mut R) -> RankResult<Step> {
        let selection = self.favorites(category)?;
        if !selection.can_finish() {
            return Err(RankError::NotEnoughFavorites {
                have: selection.len(),
                min: MIN_FAVORITES,
                max: MAX_FAVORITES,
            });
        }
        self.start_full_run(category, selection.items().to_vec(), rng)
    }

    /// Starts a full round robin over `items`.
    ///
    /// Items already ranked start from their stored rating, new ones from
    /// [`DEFAULT_RATING`]. Fewer than two items complete at once.
    ///
    /// # Errors
    ///
    /// - [`RankError::RunAlreadyActive`] if a run is held for `category`
    /// - [`RankError::PersistenceUnavailable`] if the store fails
    pub fn start_full_run<R: Rng + ?Sized>(
        &mut self,
        category: Category,
        items: Vec<Item>,
        rng: &mut R,
    ) -> RankResult<Step> {
        self.ensure_idle(category)?;
        let list = self.repo.load_rankings(category)?;

        let participants: Vec<Item> = items
            .into_iter()
            .filter(|item| item.category == category)
            .map(|mut item| {
                let known = list
                    .items()
                    .iter()
                    .find(|ranked| ranked.id == item.id)
                    .map_or(DEFAULT_RATING, |ranked| ranked.rating);
                item.set_rating(known);
                item
            })
            .collect();

        log::info!("Starting full {category} run over {} item(s)", participants.len());
        let run = TournamentRun::round_robin(category, participants, rng);
        self.begin(category, run, RunKind::Full)
    }

    /// Starts placing `new_item` against the current top set of its category.
    ///
    /// With an empty list the item is placed straight away at
    /// [`DEFAULT_RATING`], returning `rank 1 of 1`.
    ///
    /// # Errors
    ///
    /// - [`RankError::AlreadyRanked`] if the id is already in the list
    /// - [`RankError::RunAlreadyActive`] if a run is held for the category
    /// - [`RankError::PersistenceUnavailable`] if the store fails
    pub fn start_insertion(&mut self, mut new_item: Item) -> RankResult<Step> {
        let category = new_item.category;
        self.ensure_idle(category)?;

        let list = self.repo.load_rankings(category)?;
        if list.contains(&new_item.id) {
            return Err(RankError::AlreadyRanked { id: new_item.id });
        }

        new_item.set_rating(DEFAULT_RATING);
        let top = list.top(self.top_n).to_vec();
        log::info!(
            "Starting {category} insertion of `{}' against top {}",
            new_item.id,
            top.len()
        );

        let run = TournamentRun::seeding(category, new_item.clone(), top);
        self.begin(category, run, RunKind::Insertion { new_item })
    }

    fn ensure_idle(&self, category: Category) -> RankResult<()> {
        if self.active.contains_key(&category) {
            return Err(RankError::RunAlreadyActive(category));
        }
        Ok(())
    }

    fn begin(&mut self, category: Category, run: TournamentRun, kind: RunKind) -> RankResult<Step> {
        self.active.insert(category, ActiveRun { run, kind });
        self.next_step(category)
    }

    // ------------------------------------------------------------------
    // Resolving matchups
    // ------------------------------------------------------------------

    /// The run held for `category`, if any.
    #[must_use]
    pub fn active_run(&self, category: Category) -> Option<&TournamentRun> {
        self.active.get(&category).map(|active| &active.run)
    }

    /// Picks `id` as the winner of the current matchup in `category`.
    ///
    /// # Errors
    ///
    /// - [`RankError::NoActiveRun`] if nothing is held for `category`
    /// - any error from [`TournamentRun::choose_winner`]
    /// - [`RankError::PersistenceUnavailable`] if the final merge cannot be
    ///   saved (the run is kept for [`Self::retry_save`])
    pub fn choose_winner(&mut self, category: Category, id: &str) -> RankResult<Step> {
        self.active_mut(category)?.run.choose_winner(id)?;
        self.next_step(category)
    }

    /// Calls the current matchup in `category` a draw.
    ///
    /// # Errors
    ///
    /// As [`Self::choose_winner`], plus [`RankError::DrawAlreadyUsed`].
    pub fn invoke_draw(&mut self, category: Category) -> RankResult<Step> {
        self.active_mut(category)?.run.invoke_draw()?;
        self.next_step(category)
    }

    /// Merges and saves a completed run that failed to save earlier.
    ///
    /// # Errors
    ///
    /// - [`RankError::NoActiveRun`] if nothing is held for `category`
    /// - [`RankError::RunInProgress`] if the held run is not complete
    /// - [`RankError::PersistenceUnavailable`] if saving fails again
    pub fn retry_save(&mut self, category: Category) -> RankResult<Finish> {
        self.finish(category)
    }

    /// Discards the run held for `category` without touching stored data.
    pub fn abandon(&mut self, category: Category) -> Option<TournamentRun> {
        let dropped = self.active.remove(&category).map(|active| active.run);
        if let Some(run) = &dropped {
            log::info!(
                "Abandoned {category} run after {}/{} matchups",
                run.resolved(),
                run.schedule().len()
            );
        }
        dropped
    }

    fn active_mut(&mut self, category: Category) -> RankResult<&mut ActiveRun> {
        self.active
            .get_mut(&category)
            .ok_or(RankError::NoActiveRun(category))
    }

    fn next_step(&mut self, category: Category) -> RankResult<Step> {
        let next = self
            .active
            .get(&category)
            .ok_or(RankError::NoActiveRun(category))?
            .run
            .current_matchup()
            .cloned();

        match next {
            Some(matchup) => Ok(Step::Next(matchup)),
            None => self.finish(category).map(Step::Finished),
        }
    }

    fn finish(&mut self, category: Category) -> RankResult<Finish> {
        let active = self
            .active
            .get(&category)
            .ok_or(RankError::NoActiveRun(category))?;
        let results = active
            .run
            .results()
            .ok_or(RankError::RunInProgress(category))?;

        let mut list = self.repo.load_rankings(category)?;
        let finish = match &active.kind {
            RunKind::Full => {
                list.merge_full_run(&results);
                Finish::Ranked {
                    standings: results.standings,
                }
            }
            RunKind::Insertion { new_item } => {
                let mut item = new_item.clone();
                if let Some(rating) = results.rating_of(&item.id) {
                    item.set_rating(rating);
                }
                let placement = list.merge_seeded_run(item.clone(), &results);
                Finish::Inserted { item, placement }
            }
        };

        if let Err(e) = self.repo.save_rankings(category, &list) {
            log::warn!("Could not save {category} rankings, keeping completed run: {e}");
            return Err(e.into());
        }

        self.active.remove(&category);
        Ok(finish)
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// Full stored list for `category`.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::PersistenceUnavailable`] if the store cannot be read.
    pub fn rankings(&self, category: Category) -> RankResult<RankingList> {
        Ok(self.repo.load_rankings(category)?)
    }

    /// The displayed top entries for `category`.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::PersistenceUnavailable`] if the store cannot be read.
    pub fn top(&self, category: Category) -> RankResult<Vec<Item>> {
        Ok(self.rankings(category)?.top(self.top_n).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Unavailable("disk full".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    fn movie(id: &str) -> Item {
        Item::new(id, id.to_uppercase(), Category::Movie, "2001")
    }

    fn drive(session: &mut RankingSession<impl KeyValueStore>, first: Step, preference: &[&str]) -> Finish {
        let mut step = first;
        loop {
            match step {
                Step::Next(matchup) => {
                    let winner = preference
                        .iter()
                        .find(|id| matchup.involves(id))
                        .expect("preference covers the matchup");
                    step = session.choose_winner(Category::Movie, winner).unwrap();
                }
                Step::Finished(finish) => return finish,
            }
        }
    }

    #[test]
    fn test_full_run_persists_sorted_list() {
        let mut session = RankingSession::new(MemoryStore::new());
        let mut rng = StdRng::seed_from_u64(8);

        let first = session
            .start_full_run(Category::Movie, vec![movie("a"), movie("b"), movie("c")], &mut rng)
            .unwrap();
        let finish = drive(&mut session, first, &["a", "b", "c"]);

        let Finish::Ranked { standings } = finish else {
            panic!("expected a full ranking");
        };
        assert_eq!(standings.len(), 3);
        assert!(session.active_run(Category::Movie).is_none());

        let stored = session.rankings(Category::Movie).unwrap();
        let ids: Vec<&str> = stored.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(stored.items(), standings.as_slice());
    }

    #[test]
    fn test_second_start_is_rejected_until_abandoned() {
        let mut session = RankingSession::new(MemoryStore::new());
        let mut rng = StdRng::seed_from_u64(1);
        session
            .start_full_run(Category::Movie, vec![movie("a"), movie("b")], &mut rng)
            .unwrap();

        let err = session
            .start_insertion(movie("z"))
            .unwrap_err();
        assert!(matches!(err, RankError::RunAlreadyActive(Category::Movie)));

        assert!(session.abandon(Category::Movie).is_some());
        assert!(session.rankings(Category::Movie).unwrap().is_empty());
        assert!(matches!(session.start_insertion(movie("z")).unwrap(), Step::Finished(_)));
    }

    #[test]
    fn test_categories_run_independently() {
        let mut session = RankingSession::new(MemoryStore::new());
        let mut rng = StdRng::seed_from_u64(2);
        session
            .start_full_run(Category::Movie, vec![movie("a"), movie("b")], &mut rng)
            .unwrap();

        let show = Item::new("s", "S", Category::Show, "2015");
        let step = session.start_insertion(show).unwrap();
        assert!(matches!(
            step,
            Step::Finished(Finish::Inserted { placement: Placement { rank: 1, total: 1 }, .. })
        ));
        assert!(session.active_run(Category::Movie).is_some());
    }

    #[test]
    fn test_insertion_into_empty_list_places_first() {
        let mut session = RankingSession::new(MemoryStore::new());
        let step = session.start_insertion(movie("d").with_rating(1500)).unwrap();

        let Step::Finished(Finish::Inserted { item, placement }) = step else {
            panic!("expected immediate placement");
        };
        assert_eq!(placement, Placement { rank: 1, total: 1 });
        assert_eq!(item.rating, DEFAULT_RATING);
        assert_eq!(item.display_rating, 9.0);
        assert_eq!(session.top(Category::Movie).unwrap(), vec![item]);
    }

    #[test]
    fn test_insertion_against_top_set() {
        let mut session = RankingSession::new(MemoryStore::new());
        let existing: Vec<Item> = (0..7)
            .map(|i| movie(&format!("m{i}")).with_rating(1100 - i * 20))
            .collect();
        session
            .repository_mut()
            .save_rankings(Category::Movie, &RankingList::from_items(existing))
            .unwrap();

        let first = session.start_insertion(movie("new")).unwrap();
        assert_eq!(session.active_run(Category::Movie).unwrap().schedule().len(), TOP_N);
        assert_eq!(first, Step::Next(Matchup::new("new", "m0")));

        let finish = drive(&mut session, first, &["new", "m0", "m1", "m2", "m3", "m4"]);
        let Finish::Inserted { item, placement } = finish else {
            panic!("expected insertion");
        };
        assert_eq!(placement.total, 8);
        assert_eq!(placement.rank, 1);
        assert_eq!(item.rating, 1085);

        let stored = session.rankings(Category::Movie).unwrap();
        assert_eq!(stored.rank_of("new"), Some(1));
        assert_eq!(stored.items().iter().find(|i| i.id == "m6").unwrap().rating, 980);
    }

    #[test]
    fn test_duplicate_insertion_is_rejected() {
        let mut session = RankingSession::new(MemoryStore::new());
        session.start_insertion(movie("d")).unwrap();
        assert!(matches!(
            session.start_insertion(movie("d")),
            Err(RankError::AlreadyRanked { ref id }) if id == "d"
        ));
    }

    #[test]
    fn test_failed_save_keeps_run_for_retry() {
        let mut session = RankingSession::new(FlakyStore::default());
        let mut rng = StdRng::seed_from_u64(5);
        let first = session
            .start_full_run(Category::Movie, vec![movie("a"), movie("b")], &mut rng)
            .unwrap();
        let Step::Next(matchup) = first else {
            panic!("two items need one matchup");
        };

        session.repository_mut().store_mut().fail_writes = true;
        let err = session.choose_winner(Category::Movie, &matchup.first).unwrap_err();
        assert!(matches!(err, RankError::PersistenceUnavailable(_)));
        assert!(session.active_run(Category::Movie).unwrap().is_complete());
        assert!(session.rankings(Category::Movie).unwrap().is_empty());

        session.repository_mut().store_mut().fail_writes = false;
        let finish = session.retry_save(Category::Movie).unwrap();
        let Finish::Ranked { standings } = finish else {
            panic!("expected a full ranking");
        };
        assert_eq!(standings[0].id, matchup.first);
        assert_eq!(standings[0].rating, 1016);
        assert!(session.active_run(Category::Movie).is_none());
        assert_eq!(session.rankings(Category::Movie).unwrap().len(), 2);
    }

    #[test]
    fn test_retry_save_needs_complete_run() {
        let mut session = RankingSession::new(MemoryStore::new());
        assert!(matches!(session.retry_save(Category::Show), Err(RankError::NoActiveRun(Category::Show))));

        let mut rng = StdRng::seed_from_u64(5);
        session
            .start_full_run(Category::Movie, vec![movie("a"), movie("b")], &mut rng)
            .unwrap();
        assert!(matches!(session.retry_save(Category::Movie), Err(RankError::RunInProgress(Category::Movie))));
    }

    #[test]
    fn test_draw_once_through_session() {
        let mut session = RankingSession::new(MemoryStore::new());
        let mut rng = StdRng::seed_from_u64(13);
        session
            .start_full_run(Category::Movie, vec![movie("a"), movie("b"), movie("c")], &mut rng)
            .unwrap();

        assert!(matches!(session.invoke_draw(Category::Movie).unwrap(), Step::Next(_)));
        assert!(matches!(session.invoke_draw(Category::Movie), Err(RankError::DrawAlreadyUsed)));
        assert_eq!(session.active_run(Category::Movie).unwrap().resolved(), 1);
    }

    #[test]
    fn test_rerun_starts_from_stored_ratings() {
        let mut session = RankingSession::new(MemoryStore::new());
        session
            .repository_mut()
            .save_rankings(
                Category::Movie,
                &RankingList::from_items(vec![movie("a").with_rating(1200), movie("b").with_rating(900)]),
            )
            .unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        session
            .start_full_run(Category::Movie, vec![movie("a"), movie("b"), movie("c")], &mut rng)
            .unwrap();
        let run = session.active_run(Category::Movie).unwrap();
        assert_eq!(run.rating_of("a"), Some(1200));
        assert_eq!(run.rating_of("b"), Some(900));
        assert_eq!(run.rating_of("c"), Some(DEFAULT_RATING));
    }

    #[test]
    fn test_stored_lists_show_scores_matching_ratings() {
        let mut session = RankingSession::new(MemoryStore::new());
        session
            .repository_mut()
            .store_mut()
            .set(
                "movieRankings",
                r#"[{"id":"a","title":"A","category":"movie","rating":1016,"displayRating":5.2},
                    {"id":"low","title":"Low","category":"movie","rating":-9223372036854775808}]"#,
            )
            .unwrap();
        assert_eq!(session.top(Category::Movie).unwrap()[0].display_rating, 9.1);

        let mut rng = StdRng::seed_from_u64(6);
        let first = session
            .start_full_run(Category::Movie, vec![movie("low"), movie("c")], &mut rng)
            .unwrap();
        drive(&mut session, first, &["c", "low"]);

        let stored = session.rankings(Category::Movie).unwrap();
        for item in stored.items() {
            assert_eq!(item.display_rating, crate::display::to_display_rating(item.rating), "{}", item.id);
        }
        assert_eq!(stored.items().iter().find(|i| i.id == "a").unwrap().display_rating, 9.1);
    }

    #[test]
    fn test_favorites_gate_full_run() {
        let mut session = RankingSession::new(MemoryStore::new());
        let mut rng = StdRng::seed_from_u64(3);
        for i in 0..MIN_FAVORITES - 1 {
            assert_eq!(session.toggle_favorite(movie(&format!("f{i}"))).unwrap(), Toggle::Added);
        }
        assert!(matches!(
            session.start_favorites_run(Category::Movie, &mut rng),
            Err(RankError::NotEnoughFavorites { have: 4, .. })
        ));

        session.toggle_favorite(movie("f-last")).unwrap();
        let step = session.start_favorites_run(Category::Movie, &mut rng).unwrap();
        assert!(matches!(step, Step::Next(_)));
        assert_eq!(session.active_run(Category::Movie).unwrap().schedule().len(), 10);
    }
}
