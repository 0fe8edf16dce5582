//! Conversion from skill ratings to the 0–10 score shown to users.
//!
//! The scale is centered on the baseline rating: a freshly added favorite
//! (1000) shows as 9.0, and every 400 rating points move the score by 3.
//! Results are rounded to one decimal and clamped to `[0, 10]`.

use crate::elo::DEFAULT_RATING;

/// Display score of an item sitting exactly at [`DEFAULT_RATING`].
pub const BASELINE_DISPLAY: f64 = 9.0;

/// Display points gained per 400 rating points.
const POINTS_PER_400: f64 = 3.0;

pub const MIN_DISPLAY: f64 = 0.0;
pub const MAX_DISPLAY: f64 = 10.0;

/// Maps a skill rating to its display score.
#[must_use]
pub fn to_display_rating(rating: i64) -> f64 {
    let offset = (rating as f64 - DEFAULT_RATING as f64) / 400.0 * POINTS_PER_400;
    round_one_decimal(BASELINE_DISPLAY + offset).clamp(MIN_DISPLAY, MAX_DISPLAY)
}

#[inline]
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_is_nine() {
        assert_eq!(to_display_rating(1000), 9.0);
    }

    #[test]
    fn test_known_points() {
        assert_eq!(to_display_rating(1016), 9.1);
        assert_eq!(to_display_rating(984), 8.9);
        assert_eq!(to_display_rating(600), 6.0);
        assert_eq!(to_display_rating(1133), 10.0);
    }

    #[test]
    fn test_clamped_to_bounds() {
        assert_eq!(to_display_rating(5000), MAX_DISPLAY);
        assert_eq!(to_display_rating(-2000), MIN_DISPLAY);
    }

    #[test]
    fn test_monotonic_over_range() {
        let mut previous = to_display_rating(-1000);
        for rating in (-1000..3000).step_by(7) {
            let current = to_display_rating(rating);
            assert!(current >= previous, "display dropped at {rating}");
            assert!((MIN_DISPLAY..=MAX_DISPLAY).contains(&current));
            previous = current;
        }
    }

    #[test]
    fn test_extreme_ratings_clamp_without_overflow() {
        assert_eq!(to_display_rating(i64::MIN), MIN_DISPLAY);
        assert_eq!(to_display_rating(i64::MAX), MAX_DISPLAY);
    }

    #[test]
    fn test_one_decimal_place() {
        for rating in [777, 912, 1001, 1042] {
            let display = to_display_rating(rating);
            assert!(((display * 10.0).round() - display * 10.0).abs() < 1e-9);
        }
    }
}
