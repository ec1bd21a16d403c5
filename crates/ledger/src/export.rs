//! CSV export of the current prediction, recent rounds and full history.

use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use common::{Error, PredictionRecord, RoundResult, ScoredPrediction};
use tracing::info;

use crate::tracker::StatsTracker;

/// Rounds included in the recent-history export.
pub const RECENT_EXPORT_ROWS: usize = 10;

const ROW_END: &str = "\r\n";

/// Unquoted comma-joined rows with CRLF terminators.
#[derive(Debug, Default)]
struct Csv {
    out: String,
}

impl Csv {
    fn with_header(header: &[&str]) -> Self {
        let mut csv = Self::default();
        csv.row(header.iter().map(|h| h.to_string()));
        csv
    }

    fn row(&mut self, fields: impl IntoIterator<Item = String>) {
        let line = fields.into_iter().collect::<Vec<_>>().join(",");
        self.out.push_str(&line);
        self.out.push_str(ROW_END);
    }

    fn finish(self) -> String {
        self.out
    }
}

pub fn current_prediction_filename(period: &str) -> String {
    format!("AlgoPredX_Prediction_{period}.csv")
}

pub const RECENT_HISTORY_FILENAME: &str = "AlgoPredX_Recent_History.csv";
pub const FULL_HISTORY_FILENAME: &str = "AlgoPredX_Full_History.csv";

/// `Period,Prediction,Confidence,Logic` with a single data row.
pub fn current_prediction_csv(period: &str, prediction: &ScoredPrediction) -> String {
    let mut csv = Csv::with_header(&["Period", "Prediction", "Confidence", "Logic"]);
    csv.row([
        period.to_string(),
        prediction.prediction_label().to_string(),
        format!("{}%", prediction.confidence),
        prediction.logic.to_string(),
    ]);
    csv.finish()
}

/// The newest [`RECENT_EXPORT_ROWS`] rounds. `Result` is the settled
/// WIN/LOSS for that period, or empty when it was never predicted.
pub fn recent_history_csv(rounds: &[RoundResult], tracker: &StatsTracker) -> String {
    let mut csv = Csv::with_header(&["Period", "Number", "Size", "Color", "Result"]);
    for round in rounds.iter().take(RECENT_EXPORT_ROWS) {
        let result = tracker
            .find(&round.issue_number)
            .map(|r| r.result.label())
            .unwrap_or_default();
        csv.row([
            round.issue_number.clone(),
            round.number.to_string(),
            round.size().to_string(),
            round.colour_label().to_string(),
            result.to_string(),
        ]);
    }
    csv.finish()
}

/// Every settled prediction, newest first.
pub fn full_history_csv(history: &[PredictionRecord]) -> String {
    let mut csv = Csv::with_header(&[
        "Period",
        "Number",
        "Size",
        "Color",
        "Prediction",
        "Result",
        "Logic",
    ]);
    for record in history.iter().rev() {
        csv.row([
            record.period.clone(),
            record.number.to_string(),
            record.size().to_string(),
            record.color.to_string(),
            record.prediction.to_string(),
            record.result.label().to_string(),
            record.logic.clone(),
        ]);
    }
    csv.finish()
}

/// Write `contents` to `dir/filename`, creating `dir` if needed.
pub fn write_export(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf, Error> {
    create_dir_all(dir)?;
    let path = dir.join(filename);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    info!("Exported {} ({} bytes)", path.display(), contents.len());
    Ok(path)
}
