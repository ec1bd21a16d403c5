//! Distributions, pattern detection and narrative analysis over recent rounds.

use common::{leading_run, Colour, Outcome, PredictionRecord, RoundResult, Size, StatsSnapshot};

/// Rounds used for pattern detection.
pub const PATTERN_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeDistribution {
    pub small: usize,
    pub big: usize,
}

impl SizeDistribution {
    pub fn of(rounds: &[RoundResult]) -> Self {
        let small = rounds.iter().filter(|r| r.size() == Size::Small).count();
        Self {
            small,
            big: rounds.len() - small,
        }
    }

    pub fn total(&self) -> usize {
        self.small + self.big
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColourDistribution {
    pub red: usize,
    pub green: usize,
    pub violet: usize,
}

impl ColourDistribution {
    /// Plain red and plain green rounds; any round that drew violet,
    /// compound ones included, counts as violet.
    pub fn of(rounds: &[RoundResult]) -> Self {
        let plain = |c: Colour| {
            rounds
                .iter()
                .filter(|r| !r.violet && r.colour == c)
                .count()
        };
        let (red, green) = (plain(Colour::Red), plain(Colour::Green));
        Self {
            red,
            green,
            violet: rounds.len() - red - green,
        }
    }

    pub fn total(&self) -> usize {
        self.red + self.green + self.violet
    }
}

/// One tile of the pattern-detection grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternItem {
    pub value: String,
    pub label: &'static str,
}

/// Per-logic accuracy over the settled history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicAccuracy {
    pub logic: String,
    pub wins: usize,
    pub total: usize,
}

impl LogicAccuracy {
    /// Rounded accuracy percentage.
    pub fn accuracy(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.wins as f64 / self.total as f64 * 100.0).round() as u32
    }
}

/// Percentage rounded to one decimal.
fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// Pattern grid for the newest [`PATTERN_WINDOW`] rounds.
pub fn detect_patterns(rounds: &[RoundResult]) -> Vec<PatternItem> {
    let window = &rounds[..rounds.len().min(PATTERN_WINDOW)];
    if window.is_empty() {
        return Vec::new();
    }

    let colours: Vec<Colour> = window.iter().map(|r| r.colour).collect();
    let sizes: Vec<Size> = window.iter().map(RoundResult::size).collect();

    let mut items = vec![
        PatternItem {
            value: join(window.iter().map(|r| r.number)),
            label: "Number Sequence",
        },
        PatternItem {
            value: join(window.iter().map(RoundResult::colour_label)),
            label: "Color Pattern",
        },
        PatternItem {
            value: join(sizes.iter().map(|s| s.initial())),
            label: "Size Pattern",
        },
    ];

    if sizes.len() >= 2 {
        let value = if sizes[0] == sizes[1] {
            "Repeating"
        } else {
            "Alternating"
        };
        items.push(PatternItem {
            value: value.into(),
            label: "Alternation",
        });
    }

    let colour_streak = leading_run(&colours);
    if colour_streak >= 3 {
        items.push(PatternItem {
            value: format!("{colour_streak}-Color Streak"),
            label: "Streak Detection",
        });
    }
    let size_streak = leading_run(&sizes);
    if size_streak >= 3 {
        items.push(PatternItem {
            value: format!("{size_streak}-Size Streak"),
            label: "Streak Detection",
        });
    }

    items
}

/// Accuracy per logic label, in order of first appearance.
pub fn logic_performance(history: &[PredictionRecord]) -> Vec<LogicAccuracy> {
    let mut stats: Vec<LogicAccuracy> = Vec::new();
    for record in history {
        let idx = match stats.iter().position(|s| s.logic == record.logic) {
            Some(idx) => idx,
            None => {
                stats.push(LogicAccuracy {
                    logic: record.logic.clone(),
                    wins: 0,
                    total: 0,
                });
                stats.len() - 1
            }
        };
        stats[idx].total += 1;
        if record.result == Outcome::Win {
            stats[idx].wins += 1;
        }
    }
    stats
}

/// Size bias paragraph; `None` without rounds.
pub fn size_analysis(rounds: &[RoundResult]) -> Option<String> {
    if rounds.is_empty() {
        return None;
    }
    let dist = SizeDistribution::of(rounds);
    let small_pct = pct(dist.small, dist.total());

    let verdict = if small_pct > 60.0 {
        "There's currently a strong bias towards SMALL numbers."
    } else if small_pct < 40.0 {
        "There's currently a strong bias towards BIG numbers."
    } else {
        "The distribution between SMALL and BIG numbers is relatively balanced."
    };

    Some(format!(
        "In the last {} rounds, {:.1}% were SMALL (0-4) and {:.1}% were BIG (5-9). {}",
        dist.total(),
        small_pct,
        100.0 - small_pct,
        verdict
    ))
}

/// Colour bias paragraph; `None` without rounds.
pub fn colour_analysis(rounds: &[RoundResult]) -> Option<String> {
    if rounds.is_empty() {
        return None;
    }
    let dist = ColourDistribution::of(rounds);
    let total = dist.total();
    let (red, green, violet) = (
        pct(dist.red, total),
        pct(dist.green, total),
        pct(dist.violet, total),
    );

    let verdict = if red > 50.0 {
        "RED is appearing more frequently than expected."
    } else if green > 50.0 {
        "GREEN is appearing more frequently than expected."
    } else {
        "Colors are appearing at expected frequencies."
    };

    Some(format!(
        "Color distribution in recent rounds: RED {red:.1}%, GREEN {green:.1}%, VIOLET {violet:.1}%. {verdict}"
    ))
}

/// Streak and alternation paragraph for the newest rounds; `None` without rounds.
pub fn pattern_analysis(rounds: &[RoundResult]) -> Option<String> {
    let window = &rounds[..rounds.len().min(PATTERN_WINDOW)];
    if window.is_empty() {
        return None;
    }
    let sizes: Vec<Size> = window.iter().map(RoundResult::size).collect();
    let colours: Vec<Colour> = window.iter().map(|r| r.colour).collect();
    let size_streak = leading_run(&sizes);
    let colour_streak = leading_run(&colours);

    let mut parts: Vec<String> = Vec::new();
    if size_streak >= 3 {
        parts.push(format!(
            "There's a {}-round {} size streak.",
            size_streak,
            sizes[0].initial()
        ));
    }
    if colour_streak >= 3 {
        parts.push(format!(
            "There's a {}-round {} color streak.",
            colour_streak, colours[0]
        ));
    }
    if size_streak < 3 && colour_streak < 3 {
        parts.push("No strong streaks detected in recent rounds.".into());
    }

    let alternations = sizes.windows(2).filter(|w| w[0] != w[1]).count();
    if alternations >= 3 {
        parts.push("Strong alternation pattern between SMALL and BIG detected.".into());
    }

    Some(format!("Recent patterns: {}", parts.join(" ")))
}

/// Overall accuracy paragraph; `None` until something has been settled.
pub fn logic_analysis(stats: &StatsSnapshot) -> Option<String> {
    let total = stats.win_count + stats.loss_count;
    if total == 0 {
        return None;
    }
    let rate = (stats.win_count as f64 / total as f64 * 1000.0).round() / 10.0;

    let verdict = if rate > 60.0 {
        "The prediction system is performing exceptionally well!"
    } else if rate > 50.0 {
        "The prediction system is performing above average."
    } else {
        "The prediction system is performing below expectations. Adjusting strategies..."
    };

    Some(format!(
        "Overall prediction accuracy: {:.1}% ({} wins, {} losses). {}",
        rate, stats.win_count, stats.loss_count, verdict
    ))
}
