//! Elo rating updates for pairwise preference comparisons.

/// Rating every item starts with the first time it is seen.
pub const DEFAULT_RATING: i64 = 1000;

/// K-factor for Elo updates (higher = more volatile)
pub const K_FACTOR: f64 = 32.0;

/// Result of a single comparison between two items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The first rating belongs to the preferred item.
    Win,
    /// Neither item was preferred.
    Draw,
}

impl Outcome {
    /// Actual scores `(first, second)` for this outcome.
    const fn actual_scores(self) -> (f64, f64) {
        match self {
            Outcome::Win => (1.0, 0.0),
            Outcome::Draw => (0.5, 0.5),
        }
    }
}

/// Expected score of an item rated `rating_a` against one rated `rating_b`.
#[must_use]
pub fn expected_score(rating_a: i64, rating_b: i64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((rating_b as f64 - rating_a as f64) / 400.0))
}

/// Updated `(winner, loser)` ratings after a comparison.
///
/// For a draw the argument order does not matter. Each side is rounded to the
/// nearest integer independently, so the pair's sum can drift by one. Ratings
/// are never clamped.
#[must_use]
pub fn apply_outcome(rating_winner: i64, rating_loser: i64, outcome: Outcome) -> (i64, i64) {
    let expected_winner = expected_score(rating_winner, rating_loser);
    let expected_loser = expected_score(rating_loser, rating_winner);
    let (actual_winner, actual_loser) = outcome.actual_scores();

    let new_winner = rating_winner as f64 + K_FACTOR * (actual_winner - expected_winner);
    let new_loser = rating_loser as f64 + K_FACTOR * (actual_loser - expected_loser);

    log::trace!(
        "Elo {outcome:?}: {rating_winner} -> {new_winner:.2}, {rating_loser} -> {new_loser:.2}"
    );
    (new_winner.round() as i64, new_loser.round() as i64)
}
