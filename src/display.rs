//! Terminal rendering of computed dashboard results.

use std::fmt::Write as _;
use std::io::IsTerminal;
use std::time::Duration;

use common::{Outcome, RoundResult, ScoredPrediction, StatsSnapshot};
use ledger::analysis::{
    colour_analysis, detect_patterns, logic_analysis, logic_performance, pattern_analysis,
    size_analysis, ColourDistribution, SizeDistribution,
};
use ledger::{StatsTracker, Theme};

use crate::countdown::format_remaining;
use crate::state::AppState;

/// ANSI styling per theme; `plain` renders no escapes.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    accent: &'static str,
    win: &'static str,
    loss: &'static str,
    muted: &'static str,
}

const RESET: &str = "\x1b[0m";

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                accent: "\x1b[1;96m",
                win: "\x1b[92m",
                loss: "\x1b[91m",
                muted: "\x1b[90m",
            },
            Theme::Light => Self {
                accent: "\x1b[1;34m",
                win: "\x1b[32m",
                loss: "\x1b[31m",
                muted: "\x1b[2m",
            },
        }
    }

    /// Theme colours on a terminal; plain when piped or `NO_COLOR` is set.
    pub fn detect(theme: Theme) -> Self {
        if std::env::var_os("NO_COLOR").is_some() || !std::io::stdout().is_terminal() {
            Self::plain()
        } else {
            Self::for_theme(theme)
        }
    }

    pub fn plain() -> Self {
        Self {
            accent: "",
            win: "",
            loss: "",
            muted: "",
        }
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if style.is_empty() {
            text.to_string()
        } else {
            format!("{style}{text}{RESET}")
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint(self.accent, &format!("── {text} ──"))
    }

    fn outcome(&self, outcome: Outcome) -> String {
        let style = match outcome {
            Outcome::Win => self.win,
            Outcome::Loss => self.loss,
        };
        self.paint(style, outcome.label())
    }
}

pub fn render_prediction(period: &str, prediction: &ScoredPrediction, palette: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading("Next Prediction"));
    let period = if period.is_empty() { "-" } else { period };
    let _ = writeln!(out, "Period:      {period}");
    let _ = writeln!(
        out,
        "Prediction:  {}",
        palette.paint(palette.accent, prediction.prediction_label())
    );
    let _ = writeln!(out, "Confidence:  {}%", prediction.confidence);
    let _ = writeln!(out, "Logic:       {}", prediction.logic);
    out
}

/// Single-line countdown shown between redraws.
pub fn render_countdown(period: &str, remaining: Duration) -> String {
    format!("Period {period} closes in {}", format_remaining(remaining))
}

pub fn render_stats(tracker: &StatsTracker, palette: &Palette) -> String {
    let StatsSnapshot {
        win_count,
        loss_count,
        current_streak,
        highest_win_streak,
        highest_loss_streak,
    } = tracker.snapshot();

    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading("Statistics"));
    let _ = writeln!(
        out,
        "Wins: {}  Losses: {}  Win rate: {}%",
        palette.paint(palette.win, &win_count.to_string()),
        palette.paint(palette.loss, &loss_count.to_string()),
        tracker.win_rate()
    );
    let _ = writeln!(
        out,
        "Current streak: {current_streak:+}  Best win streak: {highest_win_streak}  Worst loss streak: {highest_loss_streak}"
    );
    out
}

/// Recent rounds with the settled result for periods that were predicted.
pub fn render_history(rounds: &[RoundResult], tracker: &StatsTracker, palette: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading("Recent Results"));
    if rounds.is_empty() {
        let _ = writeln!(out, "{}", palette.paint(palette.muted, "No rounds fetched yet."));
        return out;
    }
    let _ = writeln!(
        out,
        "{:<20} {:>6}  {:<6} {:<12} {}",
        "Period", "Number", "Size", "Color", "Result"
    );
    for round in rounds {
        let result = tracker
            .find(&round.issue_number)
            .map(|r| palette.outcome(r.result))
            .unwrap_or_else(|| palette.paint(palette.muted, "-"));
        let _ = writeln!(
            out,
            "{:<20} {:>6}  {:<6} {:<12} {}",
            round.issue_number,
            round.number,
            round.size().label(),
            round.colour_label(),
            result
        );
    }
    out
}

/// Settled predictions, newest first.
pub fn render_prediction_history(tracker: &StatsTracker, palette: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading("Prediction History"));
    if tracker.history().is_empty() {
        let _ = writeln!(out, "{}", palette.paint(palette.muted, "Nothing settled yet."));
        return out;
    }
    for record in tracker.history().iter().rev() {
        let _ = writeln!(
            out,
            "{:<20} {} {:<6} {:<7} {:<7} {}  {}",
            record.period,
            record.number,
            record.size().label(),
            record.color.label(),
            record.prediction.label(),
            palette.outcome(record.result),
            record.logic
        );
    }
    out
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

pub fn render_analysis(rounds: &[RoundResult], tracker: &StatsTracker, palette: &Palette) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", palette.heading("Distribution"));
    let sizes = SizeDistribution::of(rounds);
    let colours = ColourDistribution::of(rounds);
    let _ = writeln!(
        out,
        "SMALL {}%  BIG {}%",
        percent(sizes.small, sizes.total()),
        percent(sizes.big, sizes.total())
    );
    let _ = writeln!(
        out,
        "RED {}%  GREEN {}%  VIOLET {}%",
        percent(colours.red, colours.total()),
        percent(colours.green, colours.total()),
        percent(colours.violet, colours.total())
    );

    let _ = writeln!(out, "{}", palette.heading("Pattern Detection"));
    let patterns = detect_patterns(rounds);
    if patterns.is_empty() {
        let _ = writeln!(out, "{}", palette.paint(palette.muted, "No rounds fetched yet."));
    }
    for item in patterns {
        let _ = writeln!(out, "{:<18} {}", item.label, item.value);
    }

    let _ = writeln!(out, "{}", palette.heading("Logic Performance"));
    let performance = logic_performance(tracker.history());
    if performance.is_empty() {
        let _ = writeln!(out, "{}", palette.paint(palette.muted, "Nothing settled yet."));
    }
    for entry in performance {
        let _ = writeln!(
            out,
            "{:<24} {:>3}%  ({}/{})",
            entry.logic,
            entry.accuracy(),
            entry.wins,
            entry.total
        );
    }

    let _ = writeln!(out, "{}", palette.heading("Analysis"));
    let paragraphs = [
        size_analysis(rounds),
        colour_analysis(rounds),
        pattern_analysis(rounds),
        logic_analysis(&tracker.snapshot()),
    ];
    for paragraph in paragraphs.into_iter().flatten() {
        let _ = writeln!(out, "{}", paragraph.trim_end());
    }
    out
}

/// Full redraw after a cycle.
pub fn render_dashboard(state: &AppState) -> String {
    let palette = Palette::detect(state.theme);
    let mut out = String::new();
    out.push_str(&render_prediction(state.period(), &state.prediction, &palette));
    out.push('\n');
    out.push_str(&render_stats(&state.tracker, &palette));
    out.push('\n');
    out.push_str(&render_history(&state.rounds, &state.tracker, &palette));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Colour, Pick, PredictionRecord};

    fn tracker_with(results: &[(&str, Outcome)]) -> StatsTracker {
        let mut tracker = StatsTracker::new();
        for (period, result) in results {
            tracker.append(PredictionRecord {
                period: period.to_string(),
                number: 8,
                color: Colour::Green,
                prediction: Pick::Big,
                result: *result,
                logic: "Alternation Pattern".into(),
            });
        }
        tracker
    }

    #[test]
    fn test_prediction_panel() {
        let p = ScoredPrediction::new(Pick::Big, 70, "Alternation Pattern");
        let out = render_prediction("12345", &p, &Palette::plain());
        assert!(out.contains("Period:      12345"));
        assert!(out.contains("Prediction:  BIG"));
        assert!(out.contains("Confidence:  70%"));
        assert!(out.contains("Logic:       Alternation Pattern"));

        let out = render_prediction("", &ScoredPrediction::placeholder(), &Palette::plain());
        assert!(out.contains("Prediction:  Analyzing..."));
        assert!(out.contains("Logic:       Waiting for more data..."));
    }

    #[test]
    fn test_countdown_line() {
        assert_eq!(
            render_countdown("7", Duration::from_secs(42)),
            "Period 7 closes in 00:42"
        );
    }

    #[test]
    fn test_stats_panel() {
        let tracker = tracker_with(&[("1", Outcome::Win), ("2", Outcome::Win), ("3", Outcome::Loss)]);
        let out = render_stats(&tracker, &Palette::plain());
        assert!(out.contains("Wins: 2  Losses: 1  Win rate: 67%"));
        assert!(out.contains("Current streak: -1  Best win streak: 2  Worst loss streak: -1"));
    }

    #[test]
    fn test_history_marks_settled_rounds() {
        let tracker = tracker_with(&[("101", Outcome::Win)]);
        let rounds = vec![
            RoundResult::new("102", 3, Colour::Red),
            RoundResult::new("101", 8, Colour::Green),
        ];
        let out = render_history(&rounds, &tracker, &Palette::plain());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("102"));
        assert!(lines[2].trim_end().ends_with('-'));
        assert!(lines[3].contains("BIG"));
        assert!(lines[3].trim_end().ends_with("WIN"));
    }

    #[test]
    fn test_themes_style_output() {
        let p = ScoredPrediction::new(Pick::Red, 75, "Color Streak Reversal");
        let dark = render_prediction("1", &p, &Palette::for_theme(Theme::Dark));
        let light = render_prediction("1", &p, &Palette::for_theme(Theme::Light));
        assert!(dark.contains("\x1b[1;96m"));
        assert!(light.contains("\x1b[1;34m"));
        assert_ne!(dark, light);
    }

    #[test]
    fn test_analysis_sections() {
        let rounds: Vec<RoundResult> = (0..6u8)
            .map(|i| RoundResult::new(format!("{}", 10 - i), i, Colour::Red))
            .collect();
        let tracker = tracker_with(&[("1", Outcome::Win)]);
        let out = render_analysis(&rounds, &tracker, &Palette::plain());
        assert!(out.contains("SMALL 83%  BIG 17%"));
        assert!(out.contains("RED 100%  GREEN 0%  VIOLET 0%"));
        assert!(out.contains("Number Sequence    0-1-2-3-4"));
        assert!(out.contains("5-Color Streak"));
        assert!(out.contains("Alternation Pattern      100%  (1/1)"));
        assert!(out.contains("Overall prediction accuracy: 100.0%"));
    }
}
