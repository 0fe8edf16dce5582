//! Interactive comparison prompt.
//!
//! Drives a [`RankingSession`] from line-based input: `1` or `2` picks a
//! side, `d` calls a draw (once per run), `q` quits and discards the run.
//! End of input counts as `q`.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::error::RankError;
use crate::item::{Category, Item};
use crate::schedule::Matchup;
use crate::session::{Finish, RankingSession, Step};
use crate::store::KeyValueStore;

/// `Title (year)`, or just the title when the year is unknown.
#[must_use]
pub fn label(item: &Item) -> String {
    if item.has_known_year() {
        format!("{} ({})", item.title, item.year)
    } else {
        item.title.clone()
    }
}

/// Writes `items` as a numbered list with display ratings.
///
/// # Errors
///
/// Returns an error if `output` cannot be written.
pub fn write_rankings<W: Write>(output: &mut W, items: &[Item]) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        writeln!(output, "{:>3}. {:<48} {:>4.1}", i + 1, label(item), item.display_rating)?;
    }
    Ok(())
}

enum Answer {
    First,
    Second,
    Draw,
    Quit,
}

fn parse_answer(line: &str) -> Option<Answer> {
    match line.trim().to_lowercase().as_str() {
        "1" => Some(Answer::First),
        "2" => Some(Answer::Second),
        "d" | "draw" => Some(Answer::Draw),
        "q" | "quit" => Some(Answer::Quit),
        _ => None,
    }
}

/// Reads one line; `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read answer")?;
    Ok((read > 0).then_some(line))
}

fn ask<S: KeyValueStore, W: Write>(
    session: &RankingSession<S>,
    category: Category,
    matchup: &Matchup,
    output: &mut W,
) -> Result<()> {
    let run = session
        .active_run(category)
        .with_context(|| format!("No {category} run to prompt for"))?;
    let title_of = |id: &str| run.participant(id).map_or_else(|| id.to_string(), label);

    if let Some((position, total)) = run.progress() {
        writeln!(output, "[{position}/{total}] Which do you prefer?")?;
    }
    writeln!(output, "  1) {}", title_of(&matchup.first))?;
    writeln!(output, "  2) {}", title_of(&matchup.second))?;
    if !run.draw_used() {
        writeln!(output, "  d) too close to call (once per run)")?;
    }
    writeln!(output, "  q) quit without saving")?;
    write!(output, "> ")?;
    output.flush()?;
    Ok(())
}

/// Offers to retry a failed save until it works or the user declines.
fn offer_retry<S: KeyValueStore, R: BufRead, W: Write>(
    session: &mut RankingSession<S>,
    category: Category,
    mut error: RankError,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Finish>> {
    loop {
        writeln!(output, "Saving failed: {error}")?;
        write!(output, "Retry? [y/N] ")?;
        output.flush()?;

        let retry = read_line(input)?.is_some_and(|line| line.trim().eq_ignore_ascii_case("y"));
        if !retry {
            session.abandon(category);
            return Ok(None);
        }
        match session.retry_save(category) {
            Ok(finish) => return Ok(Some(finish)),
            Err(e @ RankError::PersistenceUnavailable(_)) => error = e,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Answers matchups from `input` until the run finishes or the user quits.
///
/// Returns the stored outcome, or `None` if the run was abandoned.
///
/// # Errors
///
/// Returns an error on I/O failure or an unexpected session error.
pub fn run_interactive<S: KeyValueStore, R: BufRead, W: Write>(
    session: &mut RankingSession<S>,
    category: Category,
    first: Step,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Finish>> {
    let mut step = first;
    loop {
        let matchup = match step {
            Step::Finished(finish) => return Ok(Some(finish)),
            Step::Next(matchup) => matchup,
        };
        ask(session, category, &matchup, output)?;

        let Some(line) = read_line(input)? else {
            writeln!(output)?;
            session.abandon(category);
            return Ok(None);
        };

        let outcome = match parse_answer(&line) {
            Some(Answer::First) => session.choose_winner(category, &matchup.first),
            Some(Answer::Second) => session.choose_winner(category, &matchup.second),
            Some(Answer::Draw) => session.invoke_draw(category),
            Some(Answer::Quit) => {
                session.abandon(category);
                return Ok(None);
            }
            None => {
                writeln!(output, "Please answer 1, 2, d or q.")?;
                step = Step::Next(matchup);
                continue;
            }
        };

        step = match outcome {
            Ok(next) => next,
            Err(RankError::DrawAlreadyUsed) => {
                writeln!(output, "The draw is already used for this run; pick 1 or 2.")?;
                Step::Next(matchup)
            }
            Err(e @ RankError::PersistenceUnavailable(_)) => {
                return offer_retry(session, category, e, input, output);
            }
            Err(e) => return Err(e.into()),
        };
    }
}
