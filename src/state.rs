//! Application state owned by the controller.

use common::{Error, PredictionRecord, RoundMetadata, RoundResult, ScoredPrediction};
use ledger::{
    load_pending, save_pending, KvStore, PendingPrediction, StatsTracker, Theme, MAX_PENDING,
};
use predictor::PredictionEngine;
use tracing::{debug, info};

/// Everything the dashboard shows, plus predictions awaiting settlement.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Latest settled rounds, newest first.
    pub rounds: Vec<RoundResult>,
    /// Round currently open for play.
    pub current: Option<RoundMetadata>,
    /// Prediction for `current`.
    pub prediction: ScoredPrediction,
    /// Issued predictions not yet matched to a drawn round, oldest first.
    pub pending: Vec<PendingPrediction>,
    pub tracker: StatsTracker,
    pub theme: Theme,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            rounds: Vec::new(),
            current: None,
            prediction: ScoredPrediction::placeholder(),
            pending: Vec::new(),
            tracker: StatsTracker::new(),
            theme: Theme::default(),
        }
    }
}

impl AppState {
    /// Restore stats, theme and pending predictions from `store`.
    pub fn load(store: &dyn KvStore) -> Self {
        Self {
            pending: load_pending(store),
            tracker: StatsTracker::load(store),
            theme: Theme::load(store),
            ..Self::default()
        }
    }

    /// Replace the recent rounds and settle every pending prediction whose
    /// period has now been drawn. Returns the newly settled records.
    pub fn ingest_rounds(&mut self, rounds: Vec<RoundResult>) -> Vec<PredictionRecord> {
        self.rounds = rounds;

        let mut settled = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for pending in self.pending.drain(..) {
            match pending.settle(&self.rounds) {
                Some(record) => settled.push(record),
                None => still_pending.push(pending),
            }
        }
        self.pending = still_pending;

        // Periods older than the fetched page can no longer be settled.
        if let Some(oldest) = self.rounds.last() {
            let before = self.pending.len();
            self.pending
                .retain(|p| !period_precedes(&p.period, &oldest.issue_number));
            let expired = before - self.pending.len();
            if expired > 0 {
                info!(
                    "Dropped {} predictions older than period {}",
                    expired, oldest.issue_number
                );
            }
        }

        for record in &settled {
            self.tracker.append(record.clone());
        }
        settled
    }

    /// Open `meta` for play: predict from the known rounds and queue the
    /// prediction for settlement.
    pub fn open_round(
        &mut self,
        meta: RoundMetadata,
        engine: &mut PredictionEngine,
    ) -> ScoredPrediction {
        let already_open = self
            .current
            .as_ref()
            .is_some_and(|m| m.issue_number == meta.issue_number);
        if already_open {
            // Same round fetched again (e.g. after a retry); keep the issued call.
            debug!("Round {} already open", meta.issue_number);
            self.current = Some(meta);
            return self.prediction;
        }

        let prediction = engine.predict(&self.rounds);
        info!(
            "Period {}: {} @ {}% ({})",
            meta.issue_number,
            prediction.prediction_label(),
            prediction.confidence,
            prediction.logic
        );

        let queued = self.pending.iter().any(|p| p.period == meta.issue_number)
            || self.tracker.find(&meta.issue_number).is_some();
        if !queued {
            if let Some(pending) = PendingPrediction::issue(meta.issue_number.clone(), &prediction) {
                self.pending.push(pending);
            }
        }
        let excess = self.pending.len().saturating_sub(MAX_PENDING);
        if excess > 0 {
            self.pending.drain(..excess);
            debug!("Pending queue full; dropped the {} oldest", excess);
        }

        self.current = Some(meta);
        self.prediction = prediction;
        prediction
    }

    /// Period of the open round, or an empty string before the first fetch.
    pub fn period(&self) -> &str {
        self.current
            .as_ref()
            .map(|m| m.issue_number.as_str())
            .unwrap_or_default()
    }

    /// Persist stats and pending predictions.
    pub fn save(&self, store: &mut dyn KvStore) -> Result<(), Error> {
        self.tracker.save(store)?;
        save_pending(store, &self.pending)
    }
}

/// Whether period `a` was drawn before `b`. Periods are digit strings of
/// growing value, so a shorter one is older.
fn period_precedes(a: &str, b: &str) -> bool {
    (a.len(), a) < (b.len(), b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::{Colour, Outcome, Pick};
    use ledger::MemoryStore;

    fn meta(period: &str) -> RoundMetadata {
        RoundMetadata {
            issue_number: period.into(),
            end_time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 1, 0).unwrap(),
        }
    }

    /// `count` rounds ending at period `newest`, alternating SMALL/BIG.
    fn rounds(newest: u64, count: u64) -> Vec<RoundResult> {
        (0..count)
            .map(|i| {
                let n = if i % 2 == 0 { 2 } else { 7 };
                let colour = if i % 2 == 0 { Colour::Red } else { Colour::Green };
                RoundResult::new((newest - i).to_string(), n, colour)
            })
            .collect()
    }

    #[test]
    fn test_placeholder_is_not_queued() {
        let mut state = AppState::default();
        let mut engine = PredictionEngine::new(Some(1));
        state.ingest_rounds(rounds(100, 3));
        let p = state.open_round(meta("101"), &mut engine);
        assert!(p.is_placeholder());
        assert!(state.pending.is_empty());
        assert_eq!(state.period(), "101");
    }

    #[test]
    fn test_issue_then_settle_on_next_cycle() {
        let mut state = AppState::default();
        let mut engine = PredictionEngine::new(Some(1));

        state.ingest_rounds(rounds(100, 10));
        let p = state.open_round(meta("101"), &mut engine);
        // Newest is SMALL after BIG: alternation calls BIG.
        assert_eq!(p.pick, Some(Pick::Big));
        assert_eq!(state.pending.len(), 1);

        // Round 101 drew a 7.
        let mut next = rounds(100, 10);
        next.insert(0, RoundResult::new("101", 7, Colour::Green));
        let settled = state.ingest_rounds(next);
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].result, Outcome::Win);
        assert!(state.pending.is_empty());
        assert_eq!(state.tracker.snapshot().win_count, 1);
        assert_eq!(state.tracker.history()[0].period, "101");
    }

    #[test]
    fn test_reopening_same_round_keeps_prediction() {
        let mut state = AppState::default();
        let mut engine = PredictionEngine::new(Some(1));
        state.ingest_rounds(rounds(100, 10));
        let first = state.open_round(meta("101"), &mut engine);
        state.rounds.clear();
        let second = state.open_round(meta("101"), &mut engine);
        assert_eq!(first, second);
        assert_eq!(state.pending.len(), 1);
    }

    #[test]
    fn test_undrawn_pending_survives() {
        let mut state = AppState::default();
        let mut engine = PredictionEngine::new(Some(1));
        state.ingest_rounds(rounds(100, 10));
        state.open_round(meta("101"), &mut engine);
        assert!(state.ingest_rounds(rounds(100, 10)).is_empty());
        assert_eq!(state.pending.len(), 1);
    }

    #[test]
    fn test_unsettled_queue_is_capped() {
        let mut state = AppState::default();
        let mut engine = PredictionEngine::new(Some(1));
        state.ingest_rounds(rounds(100, 10));
        for period in 101..101 + MAX_PENDING as u64 + 5 {
            state.open_round(meta(&period.to_string()), &mut engine);
        }
        assert_eq!(state.pending.len(), MAX_PENDING);
        assert_eq!(state.pending[0].period, "106");
        assert_eq!(state.pending[MAX_PENDING - 1].period, "121");
    }

    #[test]
    fn test_pending_older_than_page_expires() {
        let mut state = AppState::default();
        let mut engine = PredictionEngine::new(Some(1));
        state.ingest_rounds(rounds(100, 10));
        state.open_round(meta("101"), &mut engine);
        state.open_round(meta("102"), &mut engine);
        assert_eq!(state.pending.len(), 2);

        // The page now starts at 200 and ends at 191; neither period is on it.
        assert!(state.ingest_rounds(rounds(200, 10)).is_empty());
        assert!(state.pending.is_empty());
    }

    #[test]
    fn test_period_order() {
        assert!(period_precedes("99", "100"));
        assert!(period_precedes("20260101100010001", "20260101100010002"));
        assert!(!period_precedes("101", "101"));
        assert!(!period_precedes("102", "91"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut store = MemoryStore::new();
        let mut state = AppState::default();
        let mut engine = PredictionEngine::new(Some(1));
        state.ingest_rounds(rounds(100, 10));
        state.open_round(meta("101"), &mut engine);
        state.save(&mut store).unwrap();

        let loaded = AppState::load(&store);
        assert_eq!(loaded.pending, state.pending);
        assert_eq!(loaded.tracker, state.tracker);
        assert_eq!(loaded.theme, Theme::Dark);
        assert!(loaded.current.is_none());
    }
}
