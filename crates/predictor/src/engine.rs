//! Prediction engine: runs the scorer battery and keeps the most confident output.

use common::{RoundResult, ScoredPrediction};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use crate::heuristics::{self, ScoringContext};

/// A single heuristic in the battery.
pub trait Scorer: Send {
    fn name(&self) -> &str;
    fn score(&self, ctx: &ScoringContext<'_>, rng: &mut dyn RngCore) -> ScoredPrediction;
}

/// Adapter turning a plain function into a [`Scorer`].
pub struct FnScorer<F> {
    name: &'static str,
    f: F,
}

impl<F> FnScorer<F>
where
    F: Fn(&ScoringContext<'_>, &mut dyn RngCore) -> ScoredPrediction + Send,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> Scorer for FnScorer<F>
where
    F: Fn(&ScoringContext<'_>, &mut dyn RngCore) -> ScoredPrediction + Send,
{
    fn name(&self) -> &str {
        self.name
    }

    fn score(&self, ctx: &ScoringContext<'_>, rng: &mut dyn RngCore) -> ScoredPrediction {
        (self.f)(ctx, rng)
    }
}

fn deterministic(
    name: &'static str,
    f: fn(&ScoringContext<'_>) -> ScoredPrediction,
) -> Box<dyn Scorer> {
    Box::new(FnScorer::new(name, move |ctx: &ScoringContext<'_>, _: &mut dyn RngCore| f(ctx)))
}

/// The ten built-in heuristics in battery order.
pub fn default_scorers() -> Vec<Box<dyn Scorer>> {
    vec![
        deterministic("alternation", heuristics::alternation),
        deterministic("color_streak", heuristics::color_streak),
        deterministic("size_streak", heuristics::size_streak),
        deterministic("pattern_recognition", heuristics::pattern_recognition),
        deterministic("hot_number", heuristics::hot_number),
        Box::new(FnScorer::new("cold_number", heuristics::cold_number)),
        deterministic("weighted_average", heuristics::weighted_average),
        deterministic("fibonacci", heuristics::fibonacci),
        deterministic("prime_number", heuristics::prime_number),
        deterministic("even_odd_balance", heuristics::even_odd_balance),
    ]
}

/// Highest confidence wins; on a tie the earliest candidate is kept.
pub fn select_best<I>(candidates: I) -> Option<ScoredPrediction>
where
    I: IntoIterator<Item = ScoredPrediction>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(b) if b.confidence >= candidate.confidence => Some(b),
        _ => Some(candidate),
    })
}

/// Scorer battery plus the random source the randomised scorers draw from.
pub struct PredictionEngine {
    scorers: Vec<Box<dyn Scorer>>,
    rng: Box<dyn RngCore + Send>,
}

impl PredictionEngine {
    /// Built-in battery; seeded when `seed` is given, entropy-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::with_scorers(default_scorers(), Box::new(rng))
    }

    pub fn with_scorers(scorers: Vec<Box<dyn Scorer>>, rng: Box<dyn RngCore + Send>) -> Self {
        Self { scorers, rng }
    }

    pub fn scorer_names(&self) -> Vec<&str> {
        self.scorers.iter().map(|s| s.name()).collect()
    }

    /// Every scorer's output, in battery order. Empty below the window size.
    pub fn score_all(&mut self, recent: &[RoundResult]) -> Vec<(String, ScoredPrediction)> {
        let Some(ctx) = ScoringContext::new(recent) else {
            return Vec::new();
        };
        let rng: &mut dyn RngCore = self.rng.as_mut();
        self.scorers
            .iter()
            .map(|s| (s.name().to_string(), s.score(&ctx, &mut *rng)))
            .collect()
    }

    /// Predict the next round from `recent` (newest first).
    ///
    /// Returns the "Analyzing..." placeholder with confidence 0 when fewer
    /// than five rounds are available or the battery is empty.
    pub fn predict(&mut self, recent: &[RoundResult]) -> ScoredPrediction {
        if recent.len() < heuristics::WINDOW_SIZE {
            debug!(
                "Only {} rounds available; need {}",
                recent.len(),
                heuristics::WINDOW_SIZE
            );
            return ScoredPrediction::placeholder();
        }

        let scored = self.score_all(recent);
        for (name, p) in &scored {
            debug!(
                "{}: {} @ {}% ({})",
                name,
                p.prediction_label(),
                p.confidence,
                p.logic
            );
        }

        select_best(scored.into_iter().map(|(_, p)| p))
            .unwrap_or_else(ScoredPrediction::placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Colour, Pick};
    use rand::rngs::mock::StepRng;

    fn history(ns: &[u8]) -> Vec<RoundResult> {
        ns.iter()
            .enumerate()
            .map(|(i, &n)| RoundResult::new(format!("{}", 100 - i), n, Colour::Green))
            .collect()
    }

    fn fixed(name: &'static str, pick: Pick, confidence: u8, logic: &'static str) -> Box<dyn Scorer> {
        Box::new(FnScorer::new(
            name,
            move |_: &ScoringContext<'_>, _: &mut dyn RngCore| {
                ScoredPrediction::new(pick, confidence, logic)
            },
        ))
    }

    fn engine_with(scorers: Vec<Box<dyn Scorer>>) -> PredictionEngine {
        PredictionEngine::with_scorers(scorers, Box::new(StepRng::new(0, 1)))
    }

    #[test]
    fn test_select_best_max_confidence() {
        let picks = vec![
            ScoredPrediction::new(Pick::Big, 55, "a"),
            ScoredPrediction::new(Pick::Small, 72, "b"),
            ScoredPrediction::new(Pick::Red, 60, "c"),
        ];
        assert_eq!(select_best(picks).unwrap().logic, "b");
    }

    #[test]
    fn test_select_best_tie_keeps_first() {
        let picks = vec![
            ScoredPrediction::new(Pick::Big, 60, "first"),
            ScoredPrediction::new(Pick::Small, 70, "second"),
            ScoredPrediction::new(Pick::Red, 70, "third"),
        ];
        assert_eq!(select_best(picks).unwrap().logic, "second");
        assert!(select_best(Vec::new()).is_none());
    }

    #[test]
    fn test_engine_with_mock_scorers() {
        let mut engine = engine_with(vec![
            fixed("low", Pick::Big, 40, "low"),
            fixed("high", Pick::Small, 90, "high"),
            fixed("high_again", Pick::Green, 90, "high again"),
            fixed("mid", Pick::Red, 70, "mid"),
        ]);
        let p = engine.predict(&history(&[1, 2, 3, 4, 5]));
        assert_eq!(p, ScoredPrediction::new(Pick::Small, 90, "high"));
    }

    #[test]
    fn test_placeholder_below_window() {
        let mut engine = engine_with(vec![fixed("any", Pick::Big, 99, "any")]);
        for len in 0..5 {
            let ns: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let p = engine.predict(&history(&ns));
            assert!(p.is_placeholder());
            assert_eq!(p.confidence, 0);
            assert_eq!(p.prediction_label(), "Analyzing...");
            assert_eq!(p.logic, "Waiting for more data...");
        }
    }

    #[test]
    fn test_empty_battery_yields_placeholder() {
        let mut engine = engine_with(Vec::new());
        assert!(engine.predict(&history(&[1, 2, 3, 4, 5])).is_placeholder());
    }

    #[test]
    fn test_default_battery_order() {
        let engine = PredictionEngine::new(Some(7));
        assert_eq!(
            engine.scorer_names(),
            vec![
                "alternation",
                "color_streak",
                "size_streak",
                "pattern_recognition",
                "hot_number",
                "cold_number",
                "weighted_average",
                "fibonacci",
                "prime_number",
                "even_odd_balance",
            ]
        );
    }

    #[test]
    fn test_default_battery_colour_streak_wins() {
        // Five green rounds: colour streak reversal (75) beats everything.
        let mut engine = PredictionEngine::new(Some(7));
        let p = engine.predict(&history(&[1, 1, 1, 1, 1]));
        assert_eq!(p, ScoredPrediction::new(Pick::Red, 75, "Color Streak Reversal"));
    }

    #[test]
    fn test_default_battery_without_colour_streak() {
        // Alternating colours, no streaks; 6 > 3 > 1 is a descending run (68).
        let rounds = vec![
            RoundResult::new("5", 6, Colour::Red),
            RoundResult::new("4", 3, Colour::Green),
            RoundResult::new("3", 1, Colour::Red),
            RoundResult::new("2", 8, Colour::Green),
            RoundResult::new("1", 2, Colour::Red),
        ];
        let mut engine = PredictionEngine::new(Some(7));
        let p = engine.predict(&rounds);
        assert_eq!(p, ScoredPrediction::new(Pick::Big, 68, "Descending Pattern"));
    }

    #[test]
    fn test_score_all_reports_every_scorer() {
        let mut engine = PredictionEngine::new(Some(3));
        let all = engine.score_all(&history(&[1, 2, 3, 4, 5, 6]));
        assert_eq!(all.len(), 10);
        assert_eq!(all[0].0, "alternation");
        assert!(engine.score_all(&history(&[1])).is_empty());
    }
}
