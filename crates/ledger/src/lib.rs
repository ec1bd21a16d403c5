//! Win/loss tracking, persistence, analysis and CSV export.

pub mod analysis;
pub mod export;
pub mod settle;
pub mod store;
pub mod theme;
pub mod tracker;

pub use settle::{load_pending, save_pending, PendingPrediction, MAX_PENDING};
pub use store::{clear_all, FileStore, KvStore, MemoryStore, PENDING_KEY, STATS_KEY, THEME_KEY};
pub use theme::Theme;
pub use tracker::StatsTracker;
