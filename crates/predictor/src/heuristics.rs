//! Heuristic scorers.
//!
//! Every scorer takes the same [`ScoringContext`] and returns a
//! [`ScoredPrediction`] with a fixed confidence. Several fall back to
//! another scorer when their own pattern is absent; the fallback's
//! confidence and label are returned unchanged.

use common::{leading_run, Colour, Pick, RoundResult, ScoredPrediction, Size};
use rand::{Rng, RngCore};

/// Rounds in the short analysis window.
pub const WINDOW_SIZE: usize = 5;
/// Rounds considered by [`hot_number`].
pub const HOT_WINDOW: usize = 20;
/// Rounds considered by [`cold_number`].
pub const COLD_WINDOW: usize = 10;
/// Leading run length that counts as a streak.
pub const STREAK_THRESHOLD: usize = 3;

/// Input shared by all scorers.
///
/// `history` is newest first; `window` is its leading
/// [`WINDOW_SIZE`] rounds.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub window: &'a [RoundResult],
    pub history: &'a [RoundResult],
}

impl<'a> ScoringContext<'a> {
    /// Build a context, or `None` when fewer than [`WINDOW_SIZE`] rounds are known.
    pub fn new(history: &'a [RoundResult]) -> Option<Self> {
        if history.len() < WINDOW_SIZE {
            return None;
        }
        Some(Self {
            window: &history[..WINDOW_SIZE],
            history,
        })
    }

    fn newest(&self) -> &RoundResult {
        &self.window[0]
    }

    fn numbers(&self) -> impl Iterator<Item = i32> + '_ {
        self.window.iter().map(|r| i32::from(r.number))
    }
}

// ── Scorers ───────────────────────────────────────────────────────────

/// Bet on the opposite size of the newest round.
pub fn alternation(ctx: &ScoringContext<'_>) -> ScoredPrediction {
    let next = ctx.newest().size().opposite();
    ScoredPrediction::new(next.into(), 65, "Alternation Pattern")
}

/// Reverse a colour streak of three or more, else continue the newest colour.
pub fn color_streak(ctx: &ScoringContext<'_>) -> ScoredPrediction {
    let colours: Vec<Colour> = ctx.window.iter().map(|r| r.colour).collect();
    let last = colours[0];

    if leading_run(&colours) >= STREAK_THRESHOLD {
        let reversal = if last == Colour::Red {
            Pick::Green
        } else {
            Pick::Red
        };
        return ScoredPrediction::new(reversal, 75, "Color Streak Reversal");
    }

    ScoredPrediction::new(last.into(), 60, "Color Continuation")
}

/// Reverse a size streak of three or more, else continue the newest size.
pub fn size_streak(ctx: &ScoringContext<'_>) -> ScoredPrediction {
    let sizes: Vec<Size> = ctx.window.iter().map(RoundResult::size).collect();
    let last = sizes[0];

    if leading_run(&sizes) >= STREAK_THRESHOLD {
        return ScoredPrediction::new(last.opposite().into(), 70, "Size Streak Reversal");
    }

    ScoredPrediction::new(last.into(), 55, "Size Continuation")
}

/// Extend a strictly monotone run of the three newest numbers by one step.
///
/// Falls back to [`size_streak`].
pub fn pattern_recognition(ctx: &ScoringContext<'_>) -> ScoredPrediction {
    let n: Vec<i32> = ctx.numbers().take(3).collect();

    if n[0] > n[1] && n[1] > n[2] {
        return ScoredPrediction::new(Size::of(n[0] - 1).into(), 68, "Descending Pattern");
    }
    if n[0] < n[1] && n[1] < n[2] {
        return ScoredPrediction::new(Size::of(n[0] + 1).into(), 68, "Ascending Pattern");
    }

    size_streak(ctx)
}

/// Bet on the size of the most frequent number in the last [`HOT_WINDOW`] rounds.
///
/// Digits are scanned in ascending order and a later digit replaces the
/// current leader on a tie, so ties resolve to the larger digit.
pub fn hot_number(ctx: &ScoringContext<'_>) -> ScoredPrediction {
    let mut counts = [0u32; 10];
    for round in ctx.history.iter().take(HOT_WINDOW) {
        counts[usize::from(round.number)] += 1;
    }

    let mut hot: Option<usize> = None;
    for (digit, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        match hot {
            Some(leader) if counts[leader] > count => {}
            _ => hot = Some(digit),
        }
    }

    // The window guarantees at least one counted round.
    let hot = hot.unwrap_or(0) as i32;
    ScoredPrediction::new(Size::of(hot).into(), 62, "Hot Number Trend")
}

/// Bet on the size of a random digit absent from the last [`COLD_WINDOW`] rounds.
///
/// Falls back to [`alternation`] when every digit appeared.
pub fn cold_number(ctx: &ScoringContext<'_>, rng: &mut dyn RngCore) -> ScoredPrediction {
    let mut seen = [false; 10];
    for round in ctx.history.iter().take(COLD_WINDOW) {
        seen[usize::from(round.number)] = true;
    }
    let cold: Vec<i32> = (0..10).filter(|&d| !seen[d as usize]).collect();

    if cold.is_empty() {
        return alternation(ctx);
    }

    let digit = cold[rng.gen_range(0..cold.len())];
    ScoredPrediction::new(Size::of(digit).into(), 58, "Cold Number Return")
}

/// Linearly weighted mean of the window, newest heaviest, against 4.5.
pub fn weighted_average(ctx: &ScoringContext<'_>) -> ScoredPrediction {
    let len = ctx.window.len() as i32;
    let (weighted_sum, weight_sum) = ctx
        .numbers()
        .enumerate()
        .fold((0i32, 0i32), |(sum, weights), (i, n)| {
            let weight = len - i as i32;
            (sum + n * weight, weights + weight)
        });

    let average = f64::from(weighted_sum) / f64::from(weight_sum);
    let pick = if average <= 4.5 { Size::Small } else { Size::Big };
    ScoredPrediction::new(pick.into(), 63, "Weighted Average")
}

/// When the newest number is the sum of the next two, bet on the size of
/// `n1 - n0`.
///
/// Falls back to [`weighted_average`].
pub fn fibonacci(ctx: &ScoringContext<'_>) -> ScoredPrediction {
    let n: Vec<i32> = ctx.numbers().take(3).collect();

    if n[0] == n[1] + n[2] {
        return ScoredPrediction::new(Size::of(n[1] - n[0]).into(), 60, "Fibonacci Sequence");
    }

    weighted_average(ctx)
}

/// A prime newest number (2, 3, 5, 7) always predicts SMALL.
///
/// Falls back to [`alternation`].
pub fn prime_number(ctx: &ScoringContext<'_>) -> ScoredPrediction {
    if matches!(ctx.newest().number, 2 | 3 | 5 | 7) {
        return ScoredPrediction::new(Pick::Small, 55, "Prime Number Pattern");
    }

    alternation(ctx)
}

/// Four or more evens predict BIG; four or more odds predict SMALL.
///
/// Falls back to [`size_streak`].
pub fn even_odd_balance(ctx: &ScoringContext<'_>) -> ScoredPrediction {
    let even = ctx.numbers().filter(|n| n % 2 == 0).count();
    let odd = ctx.window.len() - even;

    if even >= 4 {
        return ScoredPrediction::new(Pick::Big, 60, "Even/Odd Balance");
    }
    if odd >= 4 {
        return ScoredPrediction::new(Pick::Small, 60, "Even/Odd Balance");
    }

    size_streak(ctx)
}
