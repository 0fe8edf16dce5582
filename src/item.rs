//! Ranked candidates: movies and shows.
//!
//! An [`Item`] is supplied by the caller (usually from an external title
//! search) and carries its own skill rating once it has been compared.
//! Identity is the opaque `id` alone; two items with the same title in
//! different categories are unrelated.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::display::to_display_rating;
use crate::elo::DEFAULT_RATING;

/// Sentinel stored when a title has no known release year.
pub const UNKNOWN_YEAR: &str = "unknown";

/// Which ranked list an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Movie,
    #[serde(alias = "tv")]
    Show,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Movie, Category::Show];

    /// Lowercase name, also used as the storage key prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Movie => "movie",
            Category::Show => "show",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" | "movies" | "film" => Ok(Category::Movie),
            "show" | "shows" | "tv" | "series" => Ok(Category::Show),
            other => Err(format!("Unknown category: {other}. Use 'movie' or 'show'")),
        }
    }
}

/// A movie or show that can be ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Opaque identifier, unique within a category.
    pub id: String,
    pub title: String,
    pub category: Category,
    /// Release year, or [`UNKNOWN_YEAR`].
    #[serde(default = "unknown_year")]
    pub year: String,
    /// Opaque poster reference from the metadata provider.
    #[serde(default)]
    pub poster_ref: Option<String>,
    /// Integer skill rating.
    #[serde(default = "default_rating")]
    pub rating: i64,
    /// 0.0–10.0 score derived from `rating`.
    #[serde(default = "default_display_rating")]
    pub display_rating: f64,
}

fn unknown_year() -> String {
    UNKNOWN_YEAR.to_string()
}

fn default_rating() -> i64 {
    DEFAULT_RATING
}

fn default_display_rating() -> f64 {
    to_display_rating(DEFAULT_RATING)
}

impl Item {
    /// Creates an unranked item at the baseline rating.
    ///
    /// An empty or whitespace-only `year` is stored as [`UNKNOWN_YEAR`].
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: Category,
        year: impl Into<String>,
    ) -> Self {
        let year = year.into();
        let year = match year.trim() {
            "" => unknown_year(),
            trimmed => trimmed.to_string(),
        };

        Self {
            id: id.into(),
            title: title.into(),
            category,
            year,
            poster_ref: None,
            rating: DEFAULT_RATING,
            display_rating: to_display_rating(DEFAULT_RATING),
        }
    }

    #[must_use]
    pub fn with_poster(mut self, poster_ref: impl Into<String>) -> Self {
        self.poster_ref = Some(poster_ref.into());
        self
    }

    /// Sets the skill rating and recomputes the display rating from it.
    pub fn set_rating(&mut self, rating: i64) {
        self.rating = rating;
        self.display_rating = to_display_rating(rating);
    }

    #[must_use]
    pub fn with_rating(mut self, rating: i64) -> Self {
        self.set_rating(rating);
        self
    }

    /// Drops whatever display score came with the item and derives it from
    /// `rating` again.
    #[must_use]
    pub fn with_derived_display(mut self) -> Self {
        self.display_rating = to_display_rating(self.rating);
        self
    }

    #[must_use]
    pub fn has_known_year(&self) -> bool {
        self.year != UNKNOWN_YEAR
    }
}
