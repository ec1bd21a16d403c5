//! Running win/loss statistics and the settled prediction history.

use common::{Error, Outcome, PredictionRecord, StatsSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::{KvStore, STATS_KEY};

/// Persisted form: the snapshot fields plus the history, camelCase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StatsBlob {
    #[serde(flatten)]
    snapshot: StatsSnapshot,
    prediction_history: Vec<PredictionRecord>,
}

/// Counters, streaks and the append-only prediction history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsTracker {
    snapshot: StatsSnapshot,
    history: Vec<PredictionRecord>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.snapshot
    }

    /// Settled predictions, oldest first.
    pub fn history(&self) -> &[PredictionRecord] {
        &self.history
    }

    /// The settled prediction for `period`, if any.
    pub fn find(&self, period: &str) -> Option<&PredictionRecord> {
        self.history.iter().rev().find(|r| r.period == period)
    }

    /// Apply one outcome to the counters and streaks.
    pub fn record(&mut self, outcome: Outcome) -> StatsSnapshot {
        let s = &mut self.snapshot;
        match outcome {
            Outcome::Win => {
                s.win_count += 1;
                s.current_streak = s.current_streak.max(0) + 1;
                s.highest_win_streak = s.highest_win_streak.max(s.current_streak);
            }
            Outcome::Loss => {
                s.loss_count += 1;
                s.current_streak = s.current_streak.min(0) - 1;
                s.highest_loss_streak = s.highest_loss_streak.min(s.current_streak);
            }
        }
        *s
    }

    /// Append a settled prediction and record its outcome.
    ///
    /// A period already in the history is ignored so a round is never
    /// counted twice.
    pub fn append(&mut self, record: PredictionRecord) -> StatsSnapshot {
        if self.find(&record.period).is_some() {
            debug!("Period {} already settled; ignoring", record.period);
            return self.snapshot;
        }
        let outcome = record.result;
        self.history.push(record);
        self.record(outcome)
    }

    /// Rounded win percentage, 0 when nothing has been settled.
    pub fn win_rate(&self) -> u32 {
        let total = self.snapshot.win_count + self.snapshot.loss_count;
        if total == 0 {
            return 0;
        }
        (self.snapshot.win_count as f64 / total as f64 * 100.0).round() as u32
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Load from `store`; absent or malformed state yields empty stats.
    pub fn load(store: &dyn KvStore) -> Self {
        let raw = match store.get(STATS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!("Could not read stored stats, starting fresh: {}", e);
                return Self::default();
            }
        };

        match serde_json::from_str::<StatsBlob>(&raw) {
            Ok(blob) => {
                debug!(
                    "Loaded stats: {} wins, {} losses, {} records",
                    blob.snapshot.win_count,
                    blob.snapshot.loss_count,
                    blob.prediction_history.len()
                );
                Self {
                    snapshot: blob.snapshot,
                    history: blob.prediction_history,
                }
            }
            Err(e) => {
                warn!("Stored stats are malformed, starting fresh: {}", e);
                Self::default()
            }
        }
    }

    /// Persist the whole snapshot and history.
    pub fn save(&self, store: &mut dyn KvStore) -> Result<(), Error> {
        let blob = StatsBlob {
            snapshot: self.snapshot,
            prediction_history: self.history.clone(),
        };
        let raw = serde_json::to_string(&blob)?;
        store.set(STATS_KEY, &raw)
    }
}
