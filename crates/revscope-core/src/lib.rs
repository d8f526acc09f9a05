//! Shared domain types and configuration for the review extraction workspace.

pub mod app_config;
pub mod config;
pub mod product;
pub mod report;
pub mod request;
pub mod retry;
pub mod review;
pub mod status;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use product::{extract_product_id, reviews_url, UNKNOWN_PRODUCT_ID};
pub use report::{
    fit_items, ExtractionReport, ReportMetadata, Summary, EXTRACTOR_VERSION, NO_CONS, NO_PROS,
    NO_SUMMARY, SOURCE_NAME, SUMMARY_ITEMS,
};
pub use request::{OutputFormat, RunRequest};
pub use retry::{with_retry, with_retry_if, Delay, RetryPolicy};
pub use review::{
    RawReview, Review, Sentiment, SentimentCounts, DEFAULT_REVIEWER_NAME, DEFAULT_TITLE,
};
pub use status::{RunHandle, RunStatus};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("product URL is required")]
    MissingProductUrl,

    #[error("invalid product URL \"{url}\": must start with one of {allowed}")]
    DisallowedUrl { url: String, allowed: String },

    #[error("invalid output format \"{0}\": choose 'json' or 'csv'")]
    InvalidOutputFormat(String),
}
