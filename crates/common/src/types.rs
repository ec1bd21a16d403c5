//! Domain types shared across algopred.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Round data ────────────────────────────────────────────────────────

/// Primary colour of a drawn round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Colour {
    Red,
    Green,
    Violet,
}

impl Colour {
    pub fn as_str(self) -> &'static str {
        match self {
            Colour::Red => "red",
            Colour::Green => "green",
            Colour::Violet => "violet",
        }
    }

    /// Uppercase label used in tables and exports.
    pub fn label(self) -> &'static str {
        match self {
            Colour::Red => "RED",
            Colour::Green => "GREEN",
            Colour::Violet => "VIOLET",
        }
    }
}

impl FromStr for Colour {
    type Err = String;

    /// Accepts plain colours and compound ones such as `"red,violet"`;
    /// the first component is the primary colour.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let primary = raw.split(',').next().unwrap_or_default().trim();
        match primary.to_ascii_lowercase().as_str() {
            "red" => Ok(Colour::Red),
            "green" => Ok(Colour::Green),
            "violet" => Ok(Colour::Violet),
            _ => Err(format!("unknown colour: {raw:?}")),
        }
    }
}

impl TryFrom<String> for Colour {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// SMALL (0-4) or BIG (5-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Size {
    Small,
    Big,
}

impl Size {
    /// Size partition used everywhere: SMALL iff `n <= 4`.
    ///
    /// Takes a signed value because some heuristics classify derived
    /// numbers (`n - 1`, differences) that can leave the 0-9 range.
    pub fn of(n: i32) -> Self {
        if n <= 4 {
            Size::Small
        } else {
            Size::Big
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Size::Small => Size::Big,
            Size::Big => Size::Small,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Size::Small => "SMALL",
            Size::Big => "BIG",
        }
    }

    /// One-letter form used in pattern strings.
    pub fn initial(self) -> char {
        match self {
            Size::Small => 'S',
            Size::Big => 'B',
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A settled round as returned by the recent-rounds endpoint.
///
/// 0 and 5 also draw violet and arrive as `"red,violet"` and
/// `"green,violet"`. `colour` holds the primary colour, which streaks and
/// settlement use; `violet` records that violet was drawn too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireRound", into = "WireRound")]
pub struct RoundResult {
    pub issue_number: String,
    pub number: u8,
    pub colour: Colour,
    pub violet: bool,
}

impl RoundResult {
    pub fn new(issue_number: impl Into<String>, number: u8, colour: Colour) -> Self {
        Self {
            issue_number: issue_number.into(),
            number,
            colour,
            violet: colour == Colour::Violet,
        }
    }

    /// Mark the round as a compound draw, e.g. `"green,violet"`.
    pub fn with_violet(mut self) -> Self {
        self.violet = true;
        self
    }

    pub fn size(&self) -> Size {
        Size::of(i32::from(self.number))
    }

    /// Uppercase colour including the violet component, e.g. `RED/VIOLET`.
    pub fn colour_label(&self) -> &'static str {
        match (self.colour, self.violet) {
            (Colour::Red, true) => "RED/VIOLET",
            (Colour::Green, true) => "GREEN/VIOLET",
            (colour, _) => colour.label(),
        }
    }

    fn wire_colour(&self) -> String {
        if self.violet && self.colour != Colour::Violet {
            format!("{},violet", self.colour.as_str())
        } else {
            self.colour.as_str().to_string()
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRound {
    issue_number: String,
    #[serde(deserialize_with = "de_digit")]
    number: u8,
    colour: String,
}

impl TryFrom<WireRound> for RoundResult {
    type Error = String;

    fn try_from(wire: WireRound) -> Result<Self, Self::Error> {
        let colour: Colour = wire.colour.parse()?;
        let violet = colour == Colour::Violet
            || wire
                .colour
                .split(',')
                .skip(1)
                .any(|part| part.trim().eq_ignore_ascii_case("violet"));
        Ok(Self {
            issue_number: wire.issue_number,
            number: wire.number,
            colour,
            violet,
        })
    }
}

impl From<RoundResult> for WireRound {
    fn from(round: RoundResult) -> Self {
        Self {
            colour: round.wire_colour(),
            issue_number: round.issue_number,
            number: round.number,
        }
    }
}

/// Length of the run of items equal to the first one.
pub fn leading_run<T: PartialEq>(items: &[T]) -> usize {
    match items.first() {
        Some(first) => items.iter().take_while(|item| *item == first).count(),
        None => 0,
    }
}

/// The round currently open for play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundMetadata {
    pub issue_number: String,
    #[serde(deserialize_with = "de_end_time")]
    pub end_time: DateTime<Utc>,
}

// ── Predictions ───────────────────────────────────────────────────────

/// What a heuristic bets on for the next round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pick {
    Big,
    Small,
    Red,
    Green,
    Violet,
}

impl Pick {
    pub fn label(self) -> &'static str {
        match self {
            Pick::Big => "BIG",
            Pick::Small => "SMALL",
            Pick::Red => "RED",
            Pick::Green => "GREEN",
            Pick::Violet => "VIOLET",
        }
    }

    /// Whether this pick matches the realised round.
    pub fn wins_against(self, round: &RoundResult) -> bool {
        match self {
            Pick::Big => round.size() == Size::Big,
            Pick::Small => round.size() == Size::Small,
            Pick::Red => round.colour == Colour::Red,
            Pick::Green => round.colour == Colour::Green,
            Pick::Violet => round.violet,
        }
    }
}

impl From<Size> for Pick {
    fn from(size: Size) -> Self {
        match size {
            Size::Small => Pick::Small,
            Size::Big => Pick::Big,
        }
    }
}

impl From<Colour> for Pick {
    fn from(colour: Colour) -> Self {
        match colour {
            Colour::Red => Pick::Red,
            Colour::Green => Pick::Green,
            Colour::Violet => Pick::Violet,
        }
    }
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Text shown while fewer than the minimum number of rounds are known.
pub const PLACEHOLDER_PREDICTION: &str = "Analyzing...";
/// Logic label paired with [`PLACEHOLDER_PREDICTION`].
pub const PLACEHOLDER_LOGIC: &str = "Waiting for more data...";

/// Output of a single heuristic, or of the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredPrediction {
    /// `None` only for the "Analyzing..." placeholder.
    pub pick: Option<Pick>,
    pub confidence: u8,
    pub logic: &'static str,
}

impl ScoredPrediction {
    pub const fn new(pick: Pick, confidence: u8, logic: &'static str) -> Self {
        Self {
            pick: Some(pick),
            confidence,
            logic,
        }
    }

    pub const fn placeholder() -> Self {
        Self {
            pick: None,
            confidence: 0,
            logic: PLACEHOLDER_LOGIC,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.pick.is_none()
    }

    /// Prediction column text: the pick label or "Analyzing...".
    pub fn prediction_label(&self) -> &'static str {
        self.pick.map(Pick::label).unwrap_or(PLACEHOLDER_PREDICTION)
    }
}

/// Win/loss result of a settled prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "WIN",
            Outcome::Loss => "LOSS",
        }
    }
}

/// One settled prediction in the append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub period: String,
    pub number: u8,
    pub color: Colour,
    pub prediction: Pick,
    pub result: Outcome,
    pub logic: String,
}

impl PredictionRecord {
    pub fn size(&self) -> Size {
        Size::of(i32::from(self.number))
    }
}

/// Running win/loss counters and streaks.
///
/// `current_streak` is positive for a win run and negative for a loss run.
/// `highest_loss_streak` holds the most negative streak seen (<= 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsSnapshot {
    pub win_count: u64,
    pub loss_count: u64,
    pub current_streak: i64,
    pub highest_win_streak: i64,
    pub highest_loss_streak: i64,
}

// ── Wire helpers ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    Text(String),
}

fn de_digit<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    let value = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n,
        NumberOrString::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("number is not numeric: {s:?}")))?,
    };
    if !(0..=9).contains(&value) {
        return Err(D::Error::custom(format!("number out of range 0-9: {value}")));
    }
    Ok(value as u8)
}

fn de_end_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(ms) => Utc
            .timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| D::Error::custom(format!("endTime out of range: {ms}"))),
        NumberOrString::Text(s) => parse_end_time(&s).map_err(D::Error::custom),
    }
}

/// Parse an `endTime` string: epoch milliseconds, RFC 3339, or
/// `YYYY-MM-DD HH:MM:SS` taken as UTC.
pub fn parse_end_time(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(ms) = trimmed.parse::<i64>() {
        return Utc
            .timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| format!("endTime out of range: {ms}"));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| format!("unrecognised endTime: {raw:?}"))
}
