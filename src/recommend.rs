//! Data exchanged with an external recommendation service.
//!
//! The ranking core never calls that service. It only builds the request body
//! from the stored lists and decodes whatever comes back.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::StoreError;
use crate::item::Category;
use crate::repository::RankingRepository;
use crate::store::KeyValueStore;

/// One ranked title sent to the recommender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteTitle {
    pub title: String,
    #[serde(rename = "type", serialize_with = "serialize_wire_category")]
    pub category: Category,
}

/// Request body: `{"favorites": [{"title": .., "type": "movie" | "tv"}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecommendationRequest {
    pub favorites: Vec<FavoriteTitle>,
}

impl RecommendationRequest {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }
}

fn serialize_wire_category<S: Serializer>(category: &Category, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(match category {
        Category::Movie => "movie",
        Category::Show => "tv",
    })
}

/// Suggested title returned by the recommender.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Recommendation {
    pub title: String,
    #[serde(alias = "type")]
    pub category: Category,
    #[serde(default)]
    pub reason: String,
    #[serde(default, alias = "posterRef", alias = "poster_path")]
    pub poster_ref: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseBody {
    Wrapped { recommendations: Vec<Recommendation> },
    Bare(Vec<Recommendation>),
}

/// Top `n` titles of each category, movies first.
///
/// # Errors
///
/// Returns an error only if the store itself cannot be read.
pub fn favorite_titles<S: KeyValueStore>(
    repo: &RankingRepository<S>,
    n: usize,
) -> Result<RecommendationRequest, StoreError> {
    let mut favorites = Vec::new();
    for category in Category::ALL {
        let list = repo.load_rankings(category)?;
        favorites.extend(list.top(n).iter().map(|item| FavoriteTitle {
            title: item.title.clone(),
            category,
        }));
    }
    Ok(RecommendationRequest { favorites })
}

/// Decodes a recommender response; anything unreadable yields no entries.
#[must_use]
pub fn parse_recommendations(body: &str) -> Vec<Recommendation> {
    match serde_json::from_str::<ResponseBody>(body) {
        Ok(ResponseBody::Wrapped { recommendations } | ResponseBody::Bare(recommendations)) => recommendations,
        Err(e) => {
            log::warn!("Ignoring unreadable recommendation response: {e}");
            Vec::new()
        }
    }
}
