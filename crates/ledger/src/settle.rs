//! Settling an issued prediction against the realised round.

use common::{Error, Outcome, Pick, PredictionRecord, RoundResult, ScoredPrediction};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::{KvStore, PENDING_KEY};

/// Unsettled predictions kept across cycles; older ones are dropped.
pub const MAX_PENDING: usize = 16;

/// A prediction issued for a round that has not been drawn yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPrediction {
    pub period: String,
    pub pick: Pick,
    pub confidence: u8,
    pub logic: String,
}

impl PendingPrediction {
    /// `None` for the placeholder, which has nothing to settle.
    pub fn issue(period: impl Into<String>, prediction: &ScoredPrediction) -> Option<Self> {
        let pick = prediction.pick?;
        Some(Self {
            period: period.into(),
            pick,
            confidence: prediction.confidence,
            logic: prediction.logic.to_string(),
        })
    }

    /// Settle against `rounds` if the predicted period has been drawn.
    pub fn settle(&self, rounds: &[RoundResult]) -> Option<PredictionRecord> {
        let round = rounds.iter().find(|r| r.issue_number == self.period)?;
        let result = if self.pick.wins_against(round) {
            Outcome::Win
        } else {
            Outcome::Loss
        };
        Some(PredictionRecord {
            period: self.period.clone(),
            number: round.number,
            color: round.colour,
            prediction: self.pick,
            result,
            logic: self.logic.clone(),
        })
    }
}

/// Predictions issued by an earlier run, oldest first. Absent or
/// malformed state yields an empty list.
pub fn load_pending(store: &dyn KvStore) -> Vec<PendingPrediction> {
    match store.get(PENDING_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Stored pending predictions are malformed, dropping them: {}", e);
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("Could not read pending predictions: {}", e);
            Vec::new()
        }
    }
}

/// Persist at most the newest [`MAX_PENDING`] entries.
pub fn save_pending(store: &mut dyn KvStore, pending: &[PendingPrediction]) -> Result<(), Error> {
    let start = pending.len().saturating_sub(MAX_PENDING);
    let raw = serde_json::to_string(&pending[start..])?;
    store.set(PENDING_KEY, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use common::Colour;

    fn drawn() -> Vec<RoundResult> {
        vec![
            RoundResult::new("1002", 8, Colour::Red),
            RoundResult::new("1001", 2, Colour::Green),
        ]
    }

    #[test]
    fn test_placeholder_is_not_issued() {
        assert!(PendingPrediction::issue("1", &ScoredPrediction::placeholder()).is_none());
    }

    #[test]
    fn test_size_pick_settles_on_size() {
        let p = ScoredPrediction::new(Pick::Big, 65, "Alternation Pattern");
        let pending = PendingPrediction::issue("1002", &p).unwrap();
        let record = pending.settle(&drawn()).unwrap();
        assert_eq!(record.result, Outcome::Win);
        assert_eq!(record.number, 8);
        assert_eq!(record.color, Colour::Red);
        assert_eq!(record.logic, "Alternation Pattern");

        let pending = PendingPrediction::issue("1001", &p).unwrap();
        assert_eq!(pending.settle(&drawn()).unwrap().result, Outcome::Loss);
    }

    #[test]
    fn test_colour_pick_settles_on_colour() {
        let p = ScoredPrediction::new(Pick::Green, 75, "Color Streak Reversal");
        let pending = PendingPrediction::issue("1001", &p).unwrap();
        assert_eq!(pending.settle(&drawn()).unwrap().result, Outcome::Win);
        let pending = PendingPrediction::issue("1002", &p).unwrap();
        assert_eq!(pending.settle(&drawn()).unwrap().result, Outcome::Loss);
    }

    #[test]
    fn test_undrawn_period_stays_pending() {
        let p = ScoredPrediction::new(Pick::Small, 55, "Size Continuation");
        let pending = PendingPrediction::issue("1003", &p).unwrap();
        assert!(pending.settle(&drawn()).is_none());
    }

    #[test]
    fn test_pending_persistence_keeps_newest() {
        let mut store = MemoryStore::new();
        assert!(load_pending(&store).is_empty());

        let p = ScoredPrediction::new(Pick::Red, 60, "Weighted Average");
        let pending: Vec<PendingPrediction> = (0..MAX_PENDING + 3)
            .filter_map(|i| PendingPrediction::issue(i.to_string(), &p))
            .collect();
        save_pending(&mut store, &pending).unwrap();

        let loaded = load_pending(&store);
        assert_eq!(loaded.len(), MAX_PENDING);
        assert_eq!(loaded[0].period, "3");
        assert_eq!(loaded.last().unwrap().period, (MAX_PENDING + 2).to_string());

        store.set(PENDING_KEY, "[{").unwrap();
        assert!(load_pending(&store).is_empty());
    }
}
