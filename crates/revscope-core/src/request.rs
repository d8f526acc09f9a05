use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Persisted output format selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(CoreError::InvalidOutputFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// One extraction request as received from the web form or the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub product_url: String,
    /// Page bound; `None` visits every available page.
    #[serde(default)]
    pub max_pages: Option<u32>,
    #[serde(default)]
    pub format: OutputFormat,
}

impl RunRequest {
    /// Checks the URL against `allowed_prefixes` and normalizes the page bound.
    ///
    /// A `max_pages` of `0` is read as "no bound".
    ///
    /// # Errors
    ///
    /// - [`CoreError::MissingProductUrl`] if the URL is blank.
    /// - [`CoreError::DisallowedUrl`] if it matches none of the prefixes.
    pub fn validate(mut self, allowed_prefixes: &[String]) -> Result<Self, CoreError> {
        self.product_url = self.product_url.trim().to_string();
        if self.product_url.is_empty() {
            return Err(CoreError::MissingProductUrl);
        }
        if !allowed_prefixes
            .iter()
            .any(|prefix| self.product_url.starts_with(prefix.as_str()))
        {
            return Err(CoreError::DisallowedUrl {
                url: self.product_url,
                allowed: allowed_prefixes.join(", "),
            });
        }
        self.max_pages = self.max_pages.filter(|&n| n > 0);
        Ok(self)
    }
}
