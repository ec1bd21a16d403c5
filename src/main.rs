//! AlgoPred: round predictor dashboard for a one-minute colour/number game.
//!
//! Single-binary Tokio application that:
//! 1. Polls the game API for the open round and the recent results
//! 2. Scores ten heuristics and publishes the most confident call
//! 3. Settles earlier calls against drawn rounds and tracks win/loss streaks
//! 4. Renders the dashboard and exports CSV on demand

mod config;
mod controller;
mod countdown;
mod display;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};

use common::{AppConfig, Error};
use game_client::GameClient;
use ledger::export::{
    current_prediction_csv, current_prediction_filename, full_history_csv, recent_history_csv,
    write_export, FULL_HISTORY_FILENAME, RECENT_HISTORY_FILENAME,
};
use ledger::{clear_all, FileStore, Theme};

use crate::controller::Controller;
use crate::display::Palette;
use crate::state::AppState;

/// Round predictor dashboard
#[derive(Parser)]
#[command(name = "algopred", about = "Round predictor dashboard", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the live dashboard until Ctrl+C (default).
    Run,
    /// Run a single fetch-settle-predict cycle and exit.
    Once,
    /// Print win/loss statistics.
    Stats,
    /// Print distributions, pattern detection and logic performance.
    Analysis,
    /// Print the settled prediction history, newest first.
    History,
    /// Write a CSV export to the export directory.
    Export {
        #[arg(value_enum)]
        scope: ExportScope,
    },
    /// Show or change the dashboard theme.
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },
    /// Clear win/loss counters and the prediction history.
    ResetStats {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
    /// Remove every stored preference and statistic.
    ClearCache {
        /// Confirm the removal.
        #[arg(long)]
        yes: bool,
    },
    /// Check for a newer release.
    CheckUpdates,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportScope {
    /// The prediction for the open round.
    Current,
    /// The last ten drawn rounds.
    Recent,
    /// Every settled prediction.
    Full,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeAction {
    Toggle,
    Dark,
    Light,
}

fn open_store(cfg: &AppConfig) -> Result<FileStore, Error> {
    let store = FileStore::open(PathBuf::from(&cfg.storage.data_dir))?;
    info!("State directory: {}", store.dir().display());
    Ok(store)
}

fn build_client(cfg: &AppConfig) -> Result<GameClient, Error> {
    GameClient::new(cfg.api.clone())
}

/// Refresh rounds and the open round once, for commands that need live data.
async fn fetch_state(cfg: &AppConfig, store: FileStore) -> Result<AppState, Error> {
    let mut controller = Controller::new(cfg, build_client(cfg)?, store);
    if let Err(e) = controller.cycle().await {
        warn!("Could not refresh from the game API: {}", e);
    }
    Ok(controller.state().clone())
}

async fn export(cfg: &AppConfig, store: FileStore, scope: ExportScope) -> Result<(), Error> {
    let dir = PathBuf::from(&cfg.storage.export_dir);
    let path = match scope {
        ExportScope::Full => {
            let state = AppState::load(&store);
            write_export(&dir, FULL_HISTORY_FILENAME, &full_history_csv(state.tracker.history()))?
        }
        ExportScope::Recent => {
            let state = fetch_state(cfg, store).await?;
            let csv = recent_history_csv(&state.rounds, &state.tracker);
            write_export(&dir, RECENT_HISTORY_FILENAME, &csv)?
        }
        ExportScope::Current => {
            let state = fetch_state(cfg, store).await?;
            if state.current.is_none() {
                return Err(Error::Other(
                    "no open round is known; cannot export the current prediction".into(),
                ));
            }
            let period = state.period();
            let csv = current_prediction_csv(period, &state.prediction);
            write_export(&dir, &current_prediction_filename(period), &csv)?
        }
    };
    println!("Exported {}", path.display());
    Ok(())
}

fn theme(store: &mut FileStore, action: Option<ThemeAction>) -> Result<(), Error> {
    let theme = match action {
        None => Theme::load(&*store),
        Some(ThemeAction::Toggle) => Theme::toggle(store)?,
        Some(ThemeAction::Dark) => {
            Theme::Dark.save(store)?;
            Theme::Dark
        }
        Some(ThemeAction::Light) => {
            Theme::Light.save(store)?;
            Theme::Light
        }
    };
    println!("Theme: {theme}");
    Ok(())
}

async fn dispatch(cfg: AppConfig, command: Command) -> Result<(), Error> {
    let mut store = open_store(&cfg)?;

    match command {
        Command::Run => {
            let controller = Controller::new(&cfg, build_client(&cfg)?, store);
            controller.run().await;
        }
        Command::Once => {
            let mut controller = Controller::new(&cfg, build_client(&cfg)?, store);
            controller.cycle().await?;
            println!("{}", display::render_dashboard(controller.state()));
        }
        Command::Stats => {
            let state = AppState::load(&store);
            let palette = Palette::detect(state.theme);
            println!("{}", display::render_stats(&state.tracker, &palette));
        }
        Command::Analysis => {
            let state = fetch_state(&cfg, store).await?;
            let palette = Palette::detect(state.theme);
            println!(
                "{}",
                display::render_analysis(&state.rounds, &state.tracker, &palette)
            );
        }
        Command::History => {
            let state = AppState::load(&store);
            let palette = Palette::detect(state.theme);
            println!("{}", display::render_prediction_history(&state.tracker, &palette));
        }
        Command::Export { scope } => export(&cfg, store, scope).await?,
        Command::Theme { action } => theme(&mut store, action)?,
        Command::ResetStats { yes } => {
            if !yes {
                println!("Refusing to reset statistics without --yes");
                return Ok(());
            }
            let mut state = AppState::load(&store);
            state.tracker.reset();
            state.pending.clear();
            state.save(&mut store)?;
            info!("Statistics reset");
            println!("Statistics reset.");
        }
        Command::ClearCache { yes } => {
            if !yes {
                println!("Refusing to clear stored data without --yes");
                return Ok(());
            }
            clear_all(&mut store)?;
            info!("Cleared stored data in {}", store.dir().display());
            println!("Stored data cleared.");
        }
        Command::CheckUpdates => {
            println!("AlgoPred {} is up to date!", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "algopred=info,game_client=info,predictor=info,ledger=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    // Load configuration.
    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "API: {} (history size {}, retry {}s..{}s)",
        cfg.api.base_url,
        cfg.feed.history_size,
        cfg.timing.retry_delay_secs,
        cfg.timing.retry_max_delay_secs
    );

    match dispatch(cfg, cli.command.unwrap_or(Command::Run)).await {
        Ok(()) => {}
        Err(e @ Error::Config(_)) => {
            error!("{}", e);
            std::process::exit(1);
        }
        Err(e) => error!("{}", e),
    }
}
