use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Directory that receives persisted JSON/CSV output.
    pub output_dir: PathBuf,
    /// Directory that receives diagnostic page snapshots.
    pub snapshot_dir: PathBuf,
    /// Product URLs must start with one of these prefixes.
    pub allowed_url_prefixes: Vec<String>,
    /// Origin used to build the reviews listing URL, e.g. `"https://www.amazon.in"`.
    pub reviews_base_url: String,
    /// Pool of user agents; one is picked at random per browser session.
    pub user_agents: Vec<String>,
    pub request_timeout_secs: u64,
    pub nav_max_attempts: u32,
    pub settle_min_ms: u64,
    pub settle_max_ms: u64,
    pub backoff_min_ms: u64,
    pub backoff_max_ms: u64,
    pub page_pause_min_ms: u64,
    pub page_pause_max_ms: u64,
    pub max_concurrent_runs: usize,
    pub summary_api_url: String,
    pub summary_api_key: Option<String>,
    pub summary_model: String,
    pub summary_max_attempts: u32,
    pub summary_retry_delay_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("output_dir", &self.output_dir)
            .field("snapshot_dir", &self.snapshot_dir)
            .field("allowed_url_prefixes", &self.allowed_url_prefixes)
            .field("reviews_base_url", &self.reviews_base_url)
            .field("user_agents", &self.user_agents.len())
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("nav_max_attempts", &self.nav_max_attempts)
            .field("settle_ms", &(self.settle_min_ms, self.settle_max_ms))
            .field("backoff_ms", &(self.backoff_min_ms, self.backoff_max_ms))
            .field(
                "page_pause_ms",
                &(self.page_pause_min_ms, self.page_pause_max_ms),
            )
            .field("max_concurrent_runs", &self.max_concurrent_runs)
            .field("summary_api_url", &self.summary_api_url)
            .field(
                "summary_api_key",
                &self.summary_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("summary_model", &self.summary_model)
            .field("summary_max_attempts", &self.summary_max_attempts)
            .field("summary_retry_delay_secs", &self.summary_retry_delay_secs)
            .finish()
    }
}
