//! # reelrank
//!
//! Ranks movies and shows by asking which of two titles you prefer.
//!
//! ## Usage
//!
//! ```bash
//! # Pick 5-10 favorites, then rank them
//! reelrank favorites add movie 603 "The Matrix" --year 1999
//! reelrank rank movie
//!
//! # Slot a new title into the ranking
//! reelrank add movie 78 "Blade Runner" --year 1982
//!
//! # Show the ranking
//! reelrank list movie --all
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use std::io::{self, Write};

use reelrank::cli::{self, FavoritesAction, TitleArgs};
use reelrank::completion;
use reelrank::config::RuntimeConfig;
use reelrank::favorites::{Toggle, MAX_FAVORITES, MIN_FAVORITES};
use reelrank::item::{Category, Item};
use reelrank::prompt;
use reelrank::recommend;
use reelrank::session::{Finish, RankingSession};
use reelrank::store::SqliteStore;

fn item_from_args(args: TitleArgs) -> Item {
    let item = Item::new(args.id, args.title, args.category, args.year);
    match args.poster {
        Some(poster) => item.with_poster(poster),
        None => item,
    }
}

fn open_session(config: &RuntimeConfig) -> Result<RankingSession<SqliteStore>> {
    debug!("Opening rankings database at {}", config.db_path.display());
    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("Failed to open rankings database at {}", config.db_path.display()))?;
    Ok(RankingSession::new(store).with_top_n(config.top_n))
}

fn report(finish: &Finish, out: &mut impl Write) -> Result<()> {
    match finish {
        Finish::Ranked { standings } => {
            writeln!(out, "Ranking saved:")?;
            prompt::write_rankings(out, standings)?;
        }
        Finish::Inserted { item, placement } => {
            writeln!(
                out,
                "{} placed #{} of {} ({:.1})",
                prompt::label(item),
                placement.rank,
                placement.total,
                item.display_rating
            )?;
        }
    }
    Ok(())
}

fn favorites(config: &RuntimeConfig, action: FavoritesAction, out: &mut impl Write) -> Result<()> {
    let mut session = open_session(config)?;
    match action {
        FavoritesAction::Add { title } => {
            let item = item_from_args(title);
            let category = item.category;
            if session.favorites(category)?.contains(&item.id) {
                writeln!(out, "{} is already a favorite", prompt::label(&item))?;
                return Ok(());
            }
            let label = prompt::label(&item);
            match session.toggle_favorite(item)? {
                Toggle::AtCapacity => {
                    writeln!(out, "Already {MAX_FAVORITES} {category} favorites; remove one first")?;
                }
                _ => {
                    let count = session.favorites(category)?.len();
                    writeln!(out, "Added {label} ({count}/{MAX_FAVORITES})")?;
                }
            }
        }
        FavoritesAction::Remove { category, id } => {
            let selection = session.favorites(category)?;
            let Some(item) = selection.items().iter().find(|item| item.id == id).cloned() else {
                anyhow::bail!("No {category} favorite with id {id}");
            };
            let label = prompt::label(&item);
            session.toggle_favorite(item)?;
            writeln!(out, "Removed {label}")?;
        }
        FavoritesAction::List { category } => {
            let selection = session.favorites(category)?;
            for (i, item) in selection.items().iter().enumerate() {
                writeln!(out, "{:>3}. {}", i + 1, prompt::label(item))?;
            }
            if !selection.can_finish() {
                writeln!(
                    out,
                    "{} of {MIN_FAVORITES}-{MAX_FAVORITES} favorites picked",
                    selection.len()
                )?;
            }
        }
    }
    Ok(())
}

fn rank(config: &RuntimeConfig, category: Category, out: &mut impl Write) -> Result<()> {
    let mut session = open_session(config)?;
    let mut rng = config.rng();
    let first = session.start_favorites_run(category, &mut rng)?;

    let stdin = io::stdin();
    match prompt::run_interactive(&mut session, category, first, &mut stdin.lock(), out)? {
        Some(finish) => report(&finish, out),
        None => {
            writeln!(out, "Run discarded; nothing saved.")?;
            Ok(())
        }
    }
}

fn add(config: &RuntimeConfig, title: TitleArgs, out: &mut impl Write) -> Result<()> {
    let mut session = open_session(config)?;
    let item = item_from_args(title);
    let category = item.category;
    info!("Placing {} into {category} ranking", item.id);
    let first = session.start_insertion(item)?;

    let stdin = io::stdin();
    match prompt::run_interactive(&mut session, category, first, &mut stdin.lock(), out)? {
        Some(finish) => report(&finish, out),
        None => {
            writeln!(out, "Insertion discarded; nothing saved.")?;
            Ok(())
        }
    }
}

fn list(config: &RuntimeConfig, category: Category, all: bool, out: &mut impl Write) -> Result<()> {
    let session = open_session(config)?;
    let items = if all {
        session.rankings(category)?.into_items()
    } else {
        session.top(category)?
    };

    if items.is_empty() {
        writeln!(out, "No {category} rankings yet")?;
    } else {
        prompt::write_rankings(out, &items)?;
    }
    Ok(())
}

fn recommend_request(config: &RuntimeConfig, out: &mut impl Write) -> Result<()> {
    let session = open_session(config)?;
    let request = recommend::favorite_titles(session.repository(), config.top_n)?;
    if request.is_empty() {
        anyhow::bail!("Nothing ranked yet; rank some titles first");
    }
    serde_json::to_writer_pretty(&mut *out, &request)?;
    writeln!(out)?;
    Ok(())
}

/// Initializes logging, parses arguments and dispatches the subcommand.
///
/// Logging is controlled via `RUST_LOG`, e.g. `RUST_LOG=reelrank=debug`.
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let config = || RuntimeConfig::resolve(args.db.clone(), args.seed);

    match args.command {
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd, &mut out);
        }
        cli::Command::Favorites { action } => favorites(&config()?, action, &mut out)?,
        cli::Command::Rank { category } => rank(&config()?, category, &mut out)?,
        cli::Command::Add { title } => add(&config()?, title, &mut out)?,
        cli::Command::List { category, all } => list(&config()?, category, all, &mut out)?,
        cli::Command::RecommendRequest => recommend_request(&config()?, &mut out)?,
    }
    Ok(())
}
