//! # Command-Line Interface
//!
//! Clap derive definitions for the `reelrank` binary.
//!
//! ## Examples
//!
//! ```bash
//! reelrank favorites add movie 603 "The Matrix" --year 1999
//! reelrank rank movie
//! reelrank add show 1396 "Breaking Bad" --year 2008
//! reelrank list show --all
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::item::Category;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "reelrank")]
#[command(about = "Rank your movies and shows by picking favorites head to head")]
#[command(version)]
pub struct Args {
    /// Database file (defaults to the platform data directory)
    #[arg(long, global = true, env = "REELRANK_DB", value_hint = clap::ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    /// Seed for the matchup shuffle, for reproducible runs
    #[arg(long, global = true, env = "REELRANK_SEED")]
    pub seed: Option<u64>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Title details given on the command line.
#[derive(clap::Args, Debug, Clone)]
pub struct TitleArgs {
    /// Category: movie or show
    pub category: Category,

    /// Stable id from your title source (e.g. a TMDb id)
    pub id: String,

    /// Display title
    pub title: String,

    /// Release year
    #[arg(long, default_value = "")]
    pub year: String,

    /// Poster path or URL
    #[arg(long)]
    pub poster: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the favorites a full ranking pass runs over
    ///
    /// Each category holds between 5 and 10 favorites before `rank` will
    /// start.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Rank all favorites of a category head to head
    ///
    /// Every pair of favorites is compared once, in shuffled order. Answer
    /// `1` or `2` to pick, `d` once per run for a draw, `q` to quit without
    /// saving.
    Rank {
        /// Category to rank: movie or show
        category: Category,
    },

    /// Place a new title into an existing ranking
    ///
    /// The title is compared against the current top five. An empty list
    /// takes it directly at the baseline rating.
    Add {
        #[command(flatten)]
        title: TitleArgs,
    },

    /// Show the stored ranking of a category
    List {
        /// Category to show: movie or show
        category: Category,

        /// Show every ranked title, not just the top entries
        #[arg(long)]
        all: bool,
    },

    /// Print the request body for an external recommender
    ///
    /// Emits `{"favorites": [{"title", "type"}]}` built from the top entries
    /// of both categories.
    RecommendRequest,

    /// Generate shell completions
    ///
    /// Outputs completion script for the specified shell to stdout.
    /// Redirect to appropriate file for your shell:
    ///
    /// Bash: reelrank completion bash > ~/.local/share/bash-completion/completions/reelrank
    /// Zsh: reelrank completion zsh > ~/.config/zsh/completions/_reelrank
    /// Fish: reelrank completion fish > ~/.config/fish/completions/reelrank.fish
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum FavoritesAction {
    /// Add a title to the favorites of its category
    Add {
        #[command(flatten)]
        title: TitleArgs,
    },

    /// Remove a title from the favorites
    Remove {
        /// Category: movie or show
        category: Category,

        /// Id of the favorite to remove
        id: String,
    },

    /// List the favorites of a category
    List {
        /// Category: movie or show
        category: Category,
    },
}
