//! Configuration loader: merges the .env file, config.toml and environment variables.

use common::config::{AppConfig, MAX_HISTORY_SIZE};
use common::Error;
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_history_size(raw: &str) -> Result<u32, Error> {
    let msg = || {
        Error::Config(format!(
            "ALGOPRED_HISTORY_SIZE must be an integer in 1..={MAX_HISTORY_SIZE}"
        ))
    };
    let parsed = raw.trim().parse::<u32>().map_err(|_| msg())?;
    if parsed == 0 || parsed > MAX_HISTORY_SIZE {
        return Err(msg());
    }
    Ok(parsed)
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    let base_url = config.api.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        issues.push("api.base_url must start with http:// or https://".into());
    }
    if !config.api.current_round_path.starts_with('/') {
        issues.push("api.current_round_path must start with '/'".into());
    }
    if !config.api.recent_rounds_path.starts_with('/') {
        issues.push("api.recent_rounds_path must start with '/'".into());
    }
    for (name, sig) in [
        ("current_round_signature", &config.api.current_round_signature),
        ("recent_rounds_signature", &config.api.recent_rounds_signature),
    ] {
        if sig.random.trim().is_empty() || sig.signature.trim().is_empty() {
            issues.push(format!("api.{name} needs both random and signature"));
        }
    }
    if config.api.request_timeout_secs == 0 {
        issues.push("api.request_timeout_secs must be > 0".into());
    }
    if config.api.max_requests_per_sec == 0 {
        issues.push("api.max_requests_per_sec must be > 0".into());
    }

    if config.feed.history_size == 0 || config.feed.history_size > MAX_HISTORY_SIZE {
        issues.push(format!(
            "feed.history_size must be in 1..={MAX_HISTORY_SIZE}"
        ));
    }

    if config.timing.tick_secs == 0 {
        issues.push("timing.tick_secs must be > 0".into());
    }
    if config.timing.retry_delay_secs == 0 {
        issues.push("timing.retry_delay_secs must be > 0".into());
    }
    if config.timing.retry_max_delay_secs < config.timing.retry_delay_secs {
        issues.push("timing.retry_max_delay_secs must be >= timing.retry_delay_secs".into());
    }

    if config.storage.data_dir.trim().is_empty() {
        issues.push("storage.data_dir must not be empty".into());
    }
    if config.storage.export_dir.trim().is_empty() {
        issues.push("storage.export_dir must not be empty".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply `ALGOPRED_*` overrides looked up through `var`.
fn apply_env_overrides<F>(config: &mut AppConfig, var: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = var("ALGOPRED_API_BASE_URL").and_then(non_empty) {
        config.api.base_url = url;
    }
    if let Some(dir) = var("ALGOPRED_DATA_DIR").and_then(non_empty) {
        config.storage.data_dir = dir;
    }
    if let Some(dir) = var("ALGOPRED_EXPORT_DIR").and_then(non_empty) {
        config.storage.export_dir = dir;
    }
    if let Some(raw) = var("ALGOPRED_HISTORY_SIZE") {
        config.feed.history_size = parse_history_size(&raw)?;
    }
    if let Some(raw) = var("ALGOPRED_RETRY_DELAY_SECS") {
        let delay = parse_positive_u64(&raw, "ALGOPRED_RETRY_DELAY_SECS")?;
        config.timing.retry_delay_secs = delay;
        // Keep the fixed-delay default unless a cap is given explicitly.
        if config.timing.retry_max_delay_secs < delay {
            config.timing.retry_max_delay_secs = delay;
        }
    }
    if let Some(raw) = var("ALGOPRED_RETRY_MAX_DELAY_SECS") {
        config.timing.retry_max_delay_secs =
            parse_positive_u64(&raw, "ALGOPRED_RETRY_MAX_DELAY_SECS")?;
    }
    if let Some(raw) = var("ALGOPRED_RNG_SEED").and_then(non_empty) {
        let seed = raw.parse::<u64>().map_err(|_| {
            Error::Config("ALGOPRED_RNG_SEED must be an unsigned integer".into())
        })?;
        config.predictor.rng_seed = Some(seed);
    }
    Ok(())
}

/// Load application configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
