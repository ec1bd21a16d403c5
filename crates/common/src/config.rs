//! Application configuration types.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Game API endpoint and request signing fields.
    #[serde(default)]
    pub api: ApiConfig,

    /// Result feed parameters.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Timer and retry parameters (seconds).
    #[serde(default)]
    pub timing: TimingConfig,

    /// Local persistence and export locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Prediction engine settings.
    #[serde(default)]
    pub predictor: PredictorConfig,
}

/// A static nonce/signature pair sent verbatim with a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestSignature {
    pub random: String,
    pub signature: String,
}

/// Game API endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the "current round" endpoint.
    #[serde(default = "default_current_round_path")]
    pub current_round_path: String,

    /// Path of the "recent rounds list" endpoint.
    #[serde(default = "default_recent_rounds_path")]
    pub recent_rounds_path: String,

    /// Game type (1 = one-minute rounds).
    #[serde(default = "default_type_id")]
    pub type_id: u32,

    #[serde(default)]
    pub language: u32,

    #[serde(default = "default_current_round_signature")]
    pub current_round_signature: RequestSignature,

    #[serde(default = "default_recent_rounds_signature")]
    pub recent_rounds_signature: RequestSignature,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Client-side request ceiling.
    #[serde(default = "default_max_requests_per_sec")]
    pub max_requests_per_sec: u32,
}

/// Result feed parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Rounds requested from the recent-rounds endpoint (the long window).
    #[serde(default = "default_history_size")]
    pub history_size: u32,
}

/// Timer and retry configuration (all values in seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Countdown tick.
    #[serde(default = "default_tick")]
    pub tick_secs: u64,

    /// First delay before re-fetching the current round after a transport failure.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Backoff cap. Equal to `retry_delay_secs` gives a fixed delay.
    #[serde(default = "default_retry_delay")]
    pub retry_max_delay_secs: u64,
}

/// Local persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the key-value blobs.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory CSV exports are written to.
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

/// Prediction engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Fixed seed for the randomised heuristics; entropy-seeded when absent.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// Largest page the recent-rounds endpoint serves.
pub const MAX_HISTORY_SIZE: u32 = 50;

// ── Defaults ──────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://api.bdg88zf.com".into()
}
fn default_current_round_path() -> String {
    "/api/webapi/GetGameIssue".into()
}
fn default_recent_rounds_path() -> String {
    "/api/webapi/GetNoaverageEmerdList".into()
}
fn default_type_id() -> u32 {
    1
}
fn default_current_round_signature() -> RequestSignature {
    RequestSignature {
        random: "40079dcba93a48769c6ee9d4d4fae23f".into(),
        signature: "D12108C4F57C549D82B23A91E0FA20AE".into(),
    }
}
fn default_recent_rounds_signature() -> RequestSignature {
    RequestSignature {
        random: "c2505d9138da4e3780b2c2b34f2fb789".into(),
        signature: "7D637E060DA35C0C6E28DC6D23D71BED".into(),
    }
}
fn default_request_timeout() -> u64 {
    15
}
fn default_max_requests_per_sec() -> u32 {
    4
}

fn default_history_size() -> u32 {
    20
}

fn default_tick() -> u64 {
    1
}
fn default_retry_delay() -> u64 {
    5
}

fn default_data_dir() -> String {
    ".algopred".into()
}
fn default_export_dir() -> String {
    ".".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            current_round_path: default_current_round_path(),
            recent_rounds_path: default_recent_rounds_path(),
            type_id: default_type_id(),
            language: 0,
            current_round_signature: default_current_round_signature(),
            recent_rounds_signature: default_recent_rounds_signature(),
            request_timeout_secs: default_request_timeout(),
            max_requests_per_sec: default_max_requests_per_sec(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick(),
            retry_delay_secs: default_retry_delay(),
            retry_max_delay_secs: default_retry_delay(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            export_dir: default_export_dir(),
        }
    }
}
