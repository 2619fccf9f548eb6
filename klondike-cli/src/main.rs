mod utils;

use crate::utils::*;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use klondike_common::action::{Action, describe_action, format_actions};
use klondike_game::{Config, Session, Tick};
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;

use std::{path::PathBuf, time::Instant};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info", global = true)]
    log_level: LevelFilter,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Let the bot play one or more games
    Play {
        /// Number of games to play
        #[arg(short, long, default_value_t = 1, value_name = "NUM")]
        games: usize,
        /// Seed for the shuffles
        #[arg(short, long, value_name = "SEED")]
        seed: Option<u64>,
        /// Give up on a game after this many bot moves
        #[arg(short, long, default_value_t = 2_000, value_name = "NUM")]
        max_ticks: usize,
        /// Print the deal and the moves of every game
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print a freshly dealt board
    Deal {
        /// Seed for the shuffle
        #[arg(short, long, value_name = "SEED")]
        seed: Option<u64>,
    },
    /// Suggest a move for a board and show what the bot would play
    Hint {
        /// Path to a board file, read from stdin if omitted
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Won,
    Stuck,
    Abandoned,
    OutOfTicks,
}

fn main() -> Result<()> {
    let Cli { log_level, command } = Cli::parse();
    initialize_logging(log_level);

    match command {
        Command::Play {
            games,
            seed,
            max_ticks,
            verbose,
        } => play(games, seed, max_ticks, verbose),
        Command::Deal { seed } => {
            let mut session = Session::new(&Config {
                seed,
                ..Default::default()
            });
            session.deal_all();
            println!("{}", session.board().pretty_print());
            Ok(())
        }
        Command::Hint { file } => {
            let board = read_board(file.as_deref())?;
            if !board.has_ordered_runs() {
                bail!("The board has face-up runs that are not in sequence.");
            }
            println!("Hint: {}", klondike_bot::hint(&board));
            match klondike_bot::next_action(&board) {
                Some(action) => println!("Bot:  {}", describe_action(&board, &action)),
                None => println!("Bot:  stuck"),
            }
            Ok(())
        }
    }
}

fn play(games: usize, seed: Option<u64>, max_ticks: usize, verbose: bool) -> Result<()> {
    if games == 0 {
        bail!("Nothing to play with `--games 0`.");
    }
    let started = Instant::now();
    let mut session = Session::new(&Config {
        seed,
        ..Default::default()
    });
    let mut outcomes = Vec::with_capacity(games);

    for game in 1..=games {
        if game > 1 {
            session.new_game();
        }
        session.deal_all();
        if verbose {
            println!("Game {game}\n{}\n", session.board().pretty_print());
        }
        let (outcome, actions) = play_one(&mut session, max_ticks);
        info!(game, ?outcome, moves = session.moves(), score = session.score(), "Game over");
        if verbose {
            println!("{}", format_actions(&actions));
        }
        outcomes.push(outcome);
    }

    let count = |wanted: Outcome| outcomes.iter().filter(|&&o| o == wanted).count();
    let won = count(Outcome::Won);
    let mut summary = format!(
        "✓ Played {}: {won} won, {} stuck",
        plural(games, "game"),
        count(Outcome::Stuck)
    );
    let abandoned = count(Outcome::Abandoned);
    if abandoned > 0 {
        summary.push_str(&format!(", {} after idle stock cycles", plural(abandoned, "restart")));
    }
    let out_of_ticks = count(Outcome::OutOfTicks);
    if out_of_ticks > 0 {
        summary.push_str(&format!(", {out_of_ticks} out of moves"));
    }
    println!(
        "{summary}. Win rate: {:.1}%, Time: {}",
        won as f64 * 100.0 / games as f64,
        format_elapsed(started.elapsed())
    );
    Ok(())
}

fn play_one(session: &mut Session, max_ticks: usize) -> (Outcome, Vec<Action>) {
    session.start_bot();
    let mut actions = vec![];
    for _ in 0..max_ticks {
        match session.tick() {
            Tick::Played(action) => actions.push(action),
            Tick::Restarted => return (Outcome::Abandoned, actions),
            Tick::Stuck => return (Outcome::Stuck, actions),
            Tick::Idle => {
                debug!("Bot went idle");
                break;
            }
        }
        if session.is_won() {
            return (Outcome::Won, actions);
        }
    }
    session.stop_bot();
    (Outcome::OutOfTicks, actions)
}
