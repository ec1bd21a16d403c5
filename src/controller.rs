//! The live loop: fetch, settle, predict, count down, repeat.

use std::io::Write as _;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{AppConfig, Error};
use game_client::{GameClient, RetryPolicy};
use ledger::FileStore;
use predictor::PredictionEngine;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{debug, error, info, warn};

use crate::countdown::{Countdown, Event, RetryTimer};
use crate::display;
use crate::state::AppState;

/// Owns the application state; every mutation happens on this task.
pub struct Controller {
    client: GameClient,
    engine: PredictionEngine,
    store: FileStore,
    state: AppState,
    history_size: u32,
    retry: RetryPolicy,
    retry_attempt: u32,
    countdown: Countdown,
    retry_timer: RetryTimer,
    events: UnboundedReceiver<Event>,
}

impl Controller {
    pub fn new(cfg: &AppConfig, client: GameClient, store: FileStore) -> Self {
        let (tx, events) = unbounded_channel();
        let state = AppState::load(&store);
        info!(
            "Loaded {} settled predictions, {} pending",
            state.tracker.history().len(),
            state.pending.len()
        );
        let engine = PredictionEngine::new(cfg.predictor.rng_seed);
        debug!("Scorer battery: {}", engine.scorer_names().join(", "));
        Self {
            client,
            engine,
            store,
            state,
            history_size: cfg.feed.history_size,
            retry: RetryPolicy::from_config(&cfg.timing),
            retry_attempt: 0,
            countdown: Countdown::new(tx.clone(), Duration::from_secs(cfg.timing.tick_secs)),
            retry_timer: RetryTimer::new(tx),
            events,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// One full cycle. Returns the end time of the newly opened round.
    ///
    /// A failed current-round fetch aborts the cycle. A failed recent-rounds
    /// fetch keeps the previous rounds and still predicts.
    pub async fn cycle(&mut self) -> Result<DateTime<Utc>, Error> {
        let meta = self.client.fetch_current_round().await?;
        let end_time = meta.end_time;

        match self.client.fetch_recent_rounds(self.history_size).await {
            Ok(rounds) => {
                for record in self.state.ingest_rounds(rounds) {
                    info!(
                        "Settled period {}: {} vs {} ({}) → {}",
                        record.period,
                        record.prediction,
                        record.number,
                        record.color,
                        record.result.label()
                    );
                }
            }
            Err(e) => error!("Failed to fetch recent rounds: {}", e),
        }

        self.state.open_round(meta, &mut self.engine);
        self.persist();
        Ok(end_time)
    }

    fn persist(&mut self) {
        if let Err(e) = self.state.save(&mut self.store) {
            warn!("Failed to persist state: {}", e);
        }
    }

    /// Run a cycle and arm the timer that triggers the next one.
    async fn advance(&mut self) {
        match self.cycle().await {
            Ok(end_time) => {
                self.retry_attempt = 0;
                self.retry_timer.cancel();
                self.countdown.restart(end_time);
                println!("{}", display::render_dashboard(&self.state));
            }
            Err(e) if e.is_transport() => {
                let delay = self.retry.delay_for(self.retry_attempt);
                self.retry_attempt = self.retry_attempt.saturating_add(1);
                warn!(
                    "Failed to fetch current round: {}; retrying in {}s (attempt {})",
                    e,
                    delay.as_secs(),
                    self.retry_attempt
                );
                self.retry_timer.schedule(delay);
            }
            Err(e) => {
                self.countdown.cancel();
                error!("Failed to fetch current round: {}", e);
                warn!("No retry is scheduled for this failure; restart to resume");
            }
        }
    }

    fn on_tick(&self, remaining: Duration) {
        print!("\r{}", display::render_countdown(self.state.period(), remaining));
        let _ = std::io::stdout().flush();
    }

    /// Drive the loop until Ctrl+C.
    pub async fn run(mut self) {
        self.advance().await;

        info!("🚀 AlgoPred is running. Press Ctrl+C to stop.");
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    println!();
                    info!("Shutdown signal received");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(Event::Tick(remaining)) => self.on_tick(remaining),
                    Some(Event::RoundElapsed) => {
                        println!();
                        info!("Period {} closed", self.state.period());
                        self.advance().await;
                    }
                    Some(Event::RetryDue) => self.advance().await,
                    None => break,
                },
            }
        }

        self.countdown.cancel();
        self.retry_timer.cancel();
        self.persist();
        info!("AlgoPred shut down.");
    }
}
