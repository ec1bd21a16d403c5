//! Result feed client for the game API.
//!
//! Two signed JSON POST endpoints: the round currently open for play and
//! the list of recently settled rounds (newest first). Failures are
//! classified so the caller can retry transport errors and skip a cycle
//! on HTTP or application-level errors.

pub mod rate_limit;
pub mod retry;
pub mod wire;

use std::error::Error as StdError;
use std::time::Duration;

use chrono::Utc;
use common::config::{ApiConfig, MAX_HISTORY_SIZE};
use common::{Error, RoundMetadata, RoundResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
use wire::{CurrentRoundRequest, Envelope, RecentRoundsRequest, RoundList};

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn format_reqwest_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

fn summarize_response_body(raw: &str) -> String {
    const MAX_CHARS: usize = 500;
    let compact = raw.replace(['\n', '\r'], " ");
    match compact.char_indices().nth(MAX_CHARS) {
        Some((cut, _)) => format!("{}…", &compact[..cut]),
        None => compact,
    }
}

/// HTTP client for the game API.
#[derive(Debug, Clone)]
pub struct GameClient {
    client: reqwest::Client,
    config: ApiConfig,
    base_url: String,
    limiter: RateLimiter,
}

impl GameClient {
    pub fn new(config: ApiConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&config.base_url),
            limiter: RateLimiter::per_second(config.max_requests_per_sec),
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the round currently open for play.
    pub async fn fetch_current_round(&self) -> Result<RoundMetadata, Error> {
        let body = CurrentRoundRequest::new(
            self.config.type_id,
            self.config.language,
            &self.config.current_round_signature,
            Utc::now().timestamp(),
        );
        let meta: RoundMetadata = self.post(&self.config.current_round_path, &body).await?;
        debug!(
            "Current round {} ends at {}",
            meta.issue_number, meta.end_time
        );
        Ok(meta)
    }

    /// Fetch up to `count` settled rounds, newest first.
    pub async fn fetch_recent_rounds(&self, count: u32) -> Result<Vec<RoundResult>, Error> {
        let page_size = count.clamp(1, MAX_HISTORY_SIZE);
        let sig = &self.config.recent_rounds_signature;
        let body = RecentRoundsRequest {
            page_size,
            page_no: 1,
            type_id: self.config.type_id,
            language: self.config.language,
            random: &sig.random,
            signature: &sig.signature,
            timestamp: Utc::now().timestamp(),
        };
        let mut list: RoundList = self.post(&self.config.recent_rounds_path, &body).await?;
        if list.list.len() > page_size as usize {
            warn!(
                "Recent rounds returned {} entries for page size {}; truncating",
                list.list.len(),
                page_size
            );
            list.list.truncate(page_size as usize);
        }
        debug!("Fetched {} recent rounds", list.list.len());
        Ok(list.list)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.limiter.wait().await;

        let url = self.url(path);
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json;charset=UTF-8")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{}: {}", path, format_reqwest_error(&e))))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: summarize_response_body(&body),
            });
        }

        let envelope: Envelope<T> = resp.json().await.map_err(|e| {
            Error::Transport(format!("{}: undecodable body: {}", path, format_reqwest_error(&e)))
        })?;
        envelope.into_data()
    }
}
