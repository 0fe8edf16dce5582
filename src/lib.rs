//! Preference-driven ranking for movies and shows.
//!
//! Users answer "which do you prefer?" for pairs of titles; each answer moves
//! an Elo rating, and the ratings order a persisted list per category.
//!
//! Core modules:
//! - [`elo`] - Rating updates for one comparison
//! - [`display`] - Internal rating to 0.0–10.0 display score
//! - [`schedule`] - Round-robin and seeding matchup lists
//! - [`tournament`] - One run's state machine
//! - [`ranking`] - Sorted per-category list and merge rules
//! - [`session`] - Active runs per category, merged and saved on completion
//!
//! ### Supporting Modules
//!
//! - [`item`] - Movies, shows and their categories
//! - [`store`] / [`repository`] - Key-value persistence and key naming
//! - [`favorites`] - Favorite selection feeding full ranking passes
//! - [`recommend`] - Payloads for an external recommender
//! - [`config`], [`cli`], [`prompt`], [`completion`] - Command-line surface
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use reelrank::item::{Category, Item};
//! use reelrank::session::{RankingSession, Step};
//! use reelrank::store::MemoryStore;
//!
//! let mut session = RankingSession::new(MemoryStore::new());
//! let items = vec![
//!     Item::new("603", "The Matrix", Category::Movie, "1999"),
//!     Item::new("78", "Blade Runner", Category::Movie, "1982"),
//! ];
//! let mut rng = StdRng::seed_from_u64(1);
//!
//! let mut step = session.start_full_run(Category::Movie, items, &mut rng)?;
//! while let Step::Next(matchup) = step {
//!     step = session.choose_winner(Category::Movie, &matchup.first)?;
//! }
//! for item in session.top(Category::Movie)? {
//!     println!("{} {:.1}", item.title, item.display_rating);
//! }
//! # Ok::<(), reelrank::error::RankError>(())
//! ```

pub mod cli;
pub mod completion;
pub mod config;
pub mod display;
pub mod elo;
pub mod error;
pub mod favorites;
pub mod item;
pub mod prompt;
pub mod ranking;
pub mod recommend;
pub mod repository;
pub mod schedule;
pub mod session;
pub mod store;
pub mod tournament;
