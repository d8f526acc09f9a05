use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_USER_AGENTS: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "|Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "|Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/117.0",
    "|Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/117.0",
);

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but its value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, which is useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but its value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup; no `set_var`/`remove_var` needed.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let split_list = |raw: &str, sep: char| -> Vec<String> {
        raw.split(sep)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    };

    let env = parse_environment(&or_default("REVSCOPE_ENV", "development"))?;

    let mut bind_addr = or_default("REVSCOPE_BIND_ADDR", "0.0.0.0:8080")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("REVSCOPE_BIND_ADDR", e.to_string()))?;
    if let Ok(port) = lookup("PORT") {
        let port = port
            .parse::<u16>()
            .map_err(|e| invalid("PORT", e.to_string()))?;
        bind_addr.set_port(port);
    }

    let log_level = or_default("REVSCOPE_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("REVSCOPE_OUTPUT_DIR", "reviews"));
    let snapshot_dir = PathBuf::from(or_default("REVSCOPE_SNAPSHOT_DIR", "reviews/snapshots"));

    let allowed_url_prefixes = split_list(
        &or_default("REVSCOPE_ALLOWED_URL_PREFIXES", "https://www.amazon"),
        ',',
    );
    if allowed_url_prefixes.is_empty() {
        return Err(invalid(
            "REVSCOPE_ALLOWED_URL_PREFIXES",
            "at least one URL prefix is required".to_string(),
        ));
    }

    let reviews_base_url = or_default("REVSCOPE_REVIEWS_BASE_URL", "https://www.amazon.in")
        .trim_end_matches('/')
        .to_string();

    let user_agents = split_list(&or_default("REVSCOPE_USER_AGENTS", DEFAULT_USER_AGENTS), '|');
    if user_agents.is_empty() {
        return Err(invalid(
            "REVSCOPE_USER_AGENTS",
            "at least one user agent is required".to_string(),
        ));
    }

    let request_timeout_secs = parse_u64("REVSCOPE_REQUEST_TIMEOUT_SECS", "20")?;
    let nav_max_attempts = parse_u32("REVSCOPE_NAV_MAX_ATTEMPTS", "5")?;
    if nav_max_attempts == 0 {
        return Err(invalid(
            "REVSCOPE_NAV_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }

    let settle_min_ms = parse_u64("REVSCOPE_SETTLE_MIN_MS", "3000")?;
    let settle_max_ms = parse_u64("REVSCOPE_SETTLE_MAX_MS", "5000")?;
    let backoff_min_ms = parse_u64("REVSCOPE_BACKOFF_MIN_MS", "4000")?;
    let backoff_max_ms = parse_u64("REVSCOPE_BACKOFF_MAX_MS", "8000")?;
    let page_pause_min_ms = parse_u64("REVSCOPE_PAGE_PAUSE_MIN_MS", "2000")?;
    let page_pause_max_ms = parse_u64("REVSCOPE_PAGE_PAUSE_MAX_MS", "5000")?;
    for (var, min, max) in [
        ("REVSCOPE_SETTLE_MAX_MS", settle_min_ms, settle_max_ms),
        ("REVSCOPE_BACKOFF_MAX_MS", backoff_min_ms, backoff_max_ms),
        ("REVSCOPE_PAGE_PAUSE_MAX_MS", page_pause_min_ms, page_pause_max_ms),
    ] {
        if max < min {
            return Err(invalid(var, format!("{max} is below the minimum {min}")));
        }
    }

    let max_concurrent_runs = parse_usize("REVSCOPE_MAX_CONCURRENT_RUNS", "1")?;
    if max_concurrent_runs == 0 {
        return Err(invalid(
            "REVSCOPE_MAX_CONCURRENT_RUNS",
            "must be at least 1".to_string(),
        ));
    }

    let summary_api_url = or_default("REVSCOPE_SUMMARY_API_URL", "https://api.openai.com/v1");
    let summary_api_key = lookup("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
    let summary_model = or_default("REVSCOPE_SUMMARY_MODEL", "gpt-3.5-turbo");
    let summary_max_attempts = parse_u32("REVSCOPE_SUMMARY_MAX_ATTEMPTS", "3")?;
    let summary_retry_delay_secs = parse_u64("REVSCOPE_SUMMARY_RETRY_DELAY_SECS", "2")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        output_dir,
        snapshot_dir,
        allowed_url_prefixes,
        reviews_base_url,
        user_agents,
        request_timeout_secs,
        nav_max_attempts,
        settle_min_ms,
        settle_max_ms,
        backoff_min_ms,
        backoff_max_ms,
        page_pause_min_ms,
        page_pause_max_ms,
        max_concurrent_runs,
        summary_api_url,
        summary_api_key,
        summary_model,
        summary_max_attempts,
        summary_retry_delay_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVSCOPE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
