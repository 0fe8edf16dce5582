//! One ranking run: a fixed schedule resolved one choice at a time.
//!
//! The same run type drives both the full round robin over freshly picked
//! favorites and the seeding of a single new item against the current top
//! set; only the schedule differs.
//!
//! ```text
//! Scheduling ──(empty schedule)──────────────────────────┐
//!     │                                                   ▼
//!     └──► AwaitingChoice ──choose_winner / invoke_draw──► Complete
//!              ▲        │
//!              └────────┘ (more matchups left)
//! ```

use rand::Rng;
use std::collections::HashMap;

use crate::elo::{self, Outcome, DEFAULT_RATING};
use crate::error::{RankError, RankResult};
use crate::item::{Category, Item};
use crate::schedule::{Matchup, Schedule};

/// Lifecycle state of a [`TournamentRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Initial state inside the constructor; a returned run is never in it.
    Scheduling,
    AwaitingChoice,
    Complete,
}

/// Final ratings of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResults {
    pub category: Category,
    /// Participants with final rating and display rating, best first.
    pub standings: Vec<Item>,
}

impl RunResults {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.standings.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn rating_of(&self, id: &str) -> Option<i64> {
        self.get(id).map(|item| item.rating)
    }
}

/// An in-memory ranking run.
#[derive(Debug, Clone)]
pub struct TournamentRun {
    category: Category,
    participants: Vec<Item>,
    schedule: Schedule,
    cursor: usize,
    ratings: HashMap<String, i64>,
    draw_used: bool,
    status: RunStatus,
}

impl TournamentRun {
    /// Creates a run over `participants` following `schedule`.
    ///
    /// Each participant's live rating starts from its current `rating`.
    /// An empty schedule completes the run immediately with ratings unchanged.
    pub fn new(category: Category, participants: Vec<Item>, schedule: Schedule) -> Self {
        let mut unique: Vec<Item> = Vec::with_capacity(participants.len());
        for item in participants {
            if !unique.iter().any(|seen| seen.id == item.id) {
                unique.push(item);
            }
        }

        let ratings = unique
            .iter()
            .map(|item| (item.id.clone(), item.rating))
            .collect();

        let mut run = Self {
            category,
            participants: unique,
            schedule,
            cursor: 0,
            ratings,
            draw_used: false,
            status: RunStatus::Scheduling,
        };

        run.status = if run.schedule.is_empty() {
            log::debug!("Empty {} schedule, run completes without comparisons", category);
            RunStatus::Complete
        } else {
            RunStatus::AwaitingChoice
        };
        run
    }

    /// Full round robin over `items`, shuffled with `rng`.
    pub fn round_robin<R: Rng + ?Sized>(category: Category, items: Vec<Item>, rng: &mut R) -> Self {
        let schedule = Schedule::round_robin(&items, rng);
        Self::new(category, items, schedule)
    }

    /// `new_item` against each of `top_items` in rank order.
    pub fn seeding(category: Category, new_item: Item, top_items: Vec<Item>) -> Self {
        let schedule = Schedule::seeding(&new_item, &top_items);
        let participants = std::iter::once(new_item).chain(top_items).collect();
        Self::new(category, participants, schedule)
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }

    #[must_use]
    pub fn draw_used(&self) -> bool {
        self.draw_used
    }

    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    #[must_use]
    pub fn participants(&self) -> &[Item] {
        &self.participants
    }

    #[must_use]
    pub fn participant(&self, id: &str) -> Option<&Item> {
        self.participants.iter().find(|item| item.id == id)
    }

    /// The matchup awaiting a choice, if any.
    #[must_use]
    pub fn current_matchup(&self) -> Option<&Matchup> {
        match self.status {
            RunStatus::AwaitingChoice => self.schedule.get(self.cursor),
            RunStatus::Scheduling | RunStatus::Complete => None,
        }
    }

    /// `(position, total)` of the current matchup, 1-indexed.
    #[must_use]
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.current_matchup()
            .map(|_| (self.cursor + 1, self.schedule.len()))
    }

    /// Number of matchups resolved so far.
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn rating_of(&self, id: &str) -> Option<i64> {
        self.ratings.get(id).copied()
    }

    #[must_use]
    pub fn ratings(&self) -> &HashMap<String, i64> {
        &self.ratings
    }

    /// Resolves the current matchup in favor of `id`.
    ///
    /// # Errors
    ///
    /// - [`RankError::RunComplete`] if nothing is awaiting a choice
    /// - [`RankError::InvalidChoice`] if `id` is not in the current matchup
    ///
    /// On error the run is unchanged.
    pub fn choose_winner(&mut self, id: &str) -> RankResult<()> {
        let matchup = self.current_matchup().ok_or(RankError::RunComplete)?;
        let loser = matchup
            .opponent_of(id)
            .ok_or_else(|| RankError::InvalidChoice { id: id.to_string() })?
            .to_string();

        self.resolve(id, &loser, Outcome::Win);
        Ok(())
    }

    /// Resolves the current matchup as a draw. Allowed once per run.
    ///
    /// # Errors
    ///
    /// - [`RankError::RunComplete`] if nothing is awaiting a choice
    /// - [`RankError::DrawAlreadyUsed`] on a second draw in the same run
    pub fn invoke_draw(&mut self) -> RankResult<()> {
        let matchup = self.current_matchup().ok_or(RankError::RunComplete)?;
        if self.draw_used {
            return Err(RankError::DrawAlreadyUsed);
        }
        let (first, second) = (matchup.first.clone(), matchup.second.clone());

        self.draw_used = true;
        self.resolve(&first, &second, Outcome::Draw);
        Ok(())
    }

    fn resolve(&mut self, winner: &str, loser: &str, outcome: Outcome) {
        let old_winner = self.live_rating(winner);
        let old_loser = self.live_rating(loser);
        let (new_winner, new_loser) = elo::apply_outcome(old_winner, old_loser, outcome);

        self.ratings.insert(winner.to_string(), new_winner);
        self.ratings.insert(loser.to_string(), new_loser);
        log::debug!(
            "Matchup {}/{} ({outcome:?}): {winner} {old_winner}->{new_winner}, {loser} {old_loser}->{new_loser}",
            self.cursor + 1,
            self.schedule.len()
        );

        self.cursor += 1;
        if self.cursor >= self.schedule.len() {
            self.status = RunStatus::Complete;
            log::info!("{} run complete after {} matchups", self.category, self.cursor);
        }
    }

    fn live_rating(&self, id: &str) -> i64 {
        self.ratings.get(id).copied().unwrap_or(DEFAULT_RATING)
    }

    /// Final standings, available once the run is complete.
    ///
    /// Display ratings are recomputed from the final ratings. Ties keep
    /// participant order.
    #[must_use]
    pub fn results(&self) -> Option<RunResults> {
        if !self.is_complete() {
            return None;
        }

        let mut standings: Vec<Item> = self
            .participants
            .iter()
            .map(|item| item.clone().with_rating(self.live_rating(&item.id)))
            .collect();
        standings.sort_by(|a, b| b.rating.cmp(&a.rating));

        Some(RunResults {
            category: self.category,
            standings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn movie(id: &str) -> Item {
        Item::new(id, id.to_uppercase(), Category::Movie, "1999")
    }

    fn abc_run(seed: u64) -> TournamentRun {
        let mut rng = StdRng::seed_from_u64(seed);
        TournamentRun::round_robin(Category::Movie, vec![movie("a"), movie("b"), movie("c")], &mut rng)
    }

    /// Picks whichever participant comes first in `preference`.
    fn choose_by(run: &mut TournamentRun, preference: &[&str]) {
        while let Some(matchup) = run.current_matchup().cloned() {
            let winner = preference
                .iter()
                .find(|id| matchup.involves(id))
                .expect("preference covers every participant");
            run.choose_winner(winner).unwrap();
        }
    }

    #[test]
    fn test_transitive_preferences_rank_in_order() {
        for seed in 0..12 {
            let mut run = abc_run(seed);
            assert_eq!(run.schedule().len(), 3);
            choose_by(&mut run, &["a", "b", "c"]);

            let results = run.results().expect("run is complete");
            let order: Vec<&str> = results.standings.iter().map(|i| i.id.as_str()).collect();
            assert_eq!(order, ["a", "b", "c"], "seed {seed}");
            let (a, b, c) = (
                results.rating_of("a").unwrap(),
                results.rating_of("b").unwrap(),
                results.rating_of("c").unwrap(),
            );
            assert!(a > b && b > c, "seed {seed}: {a} {b} {c}");
        }
    }

    #[test]
    fn test_first_win_moves_sixteen_points() {
        let mut run = abc_run(5);
        let matchup = run.current_matchup().unwrap().clone();
        run.choose_winner(&matchup.first).unwrap();

        assert_eq!(run.rating_of(&matchup.first), Some(1016));
        assert_eq!(run.rating_of(&matchup.second), Some(984));
        assert_eq!(run.progress(), Some((2, 3)));
    }

    #[test]
    fn test_invalid_choice_leaves_run_unchanged() {
        let mut run = abc_run(9);
        let before_ratings = run.ratings().clone();
        let before_matchup = run.current_matchup().cloned();

        let err = run.choose_winner("zzz").unwrap_err();
        assert!(matches!(err, RankError::InvalidChoice { ref id } if id == "zzz"));
        assert_eq!(run.ratings(), &before_ratings);
        assert_eq!(run.current_matchup().cloned(), before_matchup);
        assert_eq!(run.resolved(), 0);
    }

    #[test]
    fn test_participant_outside_current_matchup_is_invalid() {
        let mut run = abc_run(2);
        let matchup = run.current_matchup().unwrap().clone();
        let bystander = ["a", "b", "c"]
            .into_iter()
            .find(|id| !matchup.involves(id))
            .unwrap();

        assert!(matches!(
            run.choose_winner(bystander),
            Err(RankError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn test_draw_only_once() {
        let mut run = abc_run(4);
        assert!(!run.draw_used());
        run.invoke_draw().unwrap();
        assert!(run.draw_used());

        let ratings = run.ratings().clone();
        let cursor = run.resolved();
        assert!(matches!(run.invoke_draw(), Err(RankError::DrawAlreadyUsed)));
        assert_eq!(run.ratings(), &ratings);
        assert_eq!(run.resolved(), cursor);
        assert!(run.draw_used());
    }

    #[test]
    fn test_draw_between_equals_changes_nothing() {
        let mut run = abc_run(11);
        run.invoke_draw().unwrap();
        assert!(run.ratings().values().all(|&r| r == DEFAULT_RATING));
        assert_eq!(run.resolved(), 1);
    }

    #[test]
    fn test_schedule_order_is_fixed() {
        let mut run = abc_run(21);
        let planned: Vec<Matchup> = run.schedule().iter().cloned().collect();
        let mut served = Vec::new();
        while let Some(matchup) = run.current_matchup().cloned() {
            run.choose_winner(&matchup.second).unwrap();
            served.push(matchup);
        }
        assert_eq!(served, planned);
    }

    #[test]
    fn test_complete_run_rejects_further_input() {
        let mut run = abc_run(1);
        choose_by(&mut run, &["c", "b", "a"]);
        assert_eq!(run.status(), RunStatus::Complete);
        assert!(run.current_matchup().is_none());
        assert!(run.progress().is_none());
        assert!(matches!(run.choose_winner("a"), Err(RankError::RunComplete)));
        assert!(matches!(run.invoke_draw(), Err(RankError::RunComplete)));
    }

    #[test]
    fn test_single_participant_completes_immediately() {
        let mut rng = StdRng::seed_from_u64(0);
        let run = TournamentRun::round_robin(Category::Show, vec![movie("solo")], &mut rng);
        assert!(run.is_complete());
        let results = run.results().unwrap();
        assert_eq!(results.rating_of("solo"), Some(DEFAULT_RATING));
    }

    #[test]
    fn test_results_unavailable_before_completion() {
        let run = abc_run(3);
        assert_eq!(run.status(), RunStatus::AwaitingChoice);
        assert!(run.results().is_none());
    }

    #[test]
    fn test_seeding_uses_known_ratings() {
        let top = vec![movie("t1").with_rating(1100), movie("t2").with_rating(1050)];
        let mut run = TournamentRun::seeding(Category::Movie, movie("new"), top);

        assert_eq!(run.rating_of("new"), Some(DEFAULT_RATING));
        assert_eq!(run.rating_of("t1"), Some(1100));
        assert_eq!(run.current_matchup(), Some(&Matchup::new("new", "t1")));

        run.choose_winner("new").unwrap();
        assert_eq!(run.current_matchup(), Some(&Matchup::new("new", "t2")));
        run.choose_winner("t2").unwrap();

        let results = run.results().unwrap();
        assert!(results.rating_of("new").unwrap() > DEFAULT_RATING);
        assert!(results.rating_of("t1").unwrap() < 1100);
        let new_item = results.get("new").unwrap();
        assert_eq!(new_item.display_rating, crate::display::to_display_rating(new_item.rating));
    }

    #[test]
    fn test_seeding_against_empty_top_completes() {
        let run = TournamentRun::seeding(Category::Movie, movie("new"), Vec::new());
        assert!(run.is_complete());
        assert_eq!(run.results().unwrap().standings.len(), 1);
    }
}
