#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

mod app;

use crate::app::KlondikeApp;

use anyhow::Context;
use clap::Parser;
use klondike_common::board::Board;
use klondike_game::{Config, Session};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use std::{path::PathBuf, time::Duration};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Seed for the shuffles
    #[arg(short, long, value_name = "SEED")]
    seed: Option<u64>,
    /// Start with the bot playing
    #[arg(short, long)]
    bot: bool,
    /// Milliseconds between two bot moves
    #[arg(long, default_value_t = 1200, value_name = "MS")]
    bot_interval: u64,
    /// Milliseconds between two dealt cards
    #[arg(long, default_value_t = 50, value_name = "MS")]
    deal_interval: u64,
    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
    /// Path to a board file to continue from
    file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    initialize_logging(cli.log_level);

    let config = Config {
        seed: cli.seed,
        bot_interval: Duration::from_millis(cli.bot_interval),
        deal_interval: Duration::from_millis(cli.deal_interval),
        ..Default::default()
    };
    let mut session = match cli.file {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let board = Board::parse(&content).context("Failed to parse board")?;
            Session::from_board(board)
        }
        None => Session::new(&config),
    };
    if cli.bot {
        session.deal_all();
        session.start_bot();
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([710.0, 775.0]),
        ..Default::default()
    };
    let app = KlondikeApp::new(session, config);

    eframe::run_native(
        "Klondike Solitaire",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app; {e}"))?;

    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(Targets::new().with_default(level))
        .init();
}
