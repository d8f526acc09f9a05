//! Writes finalized reports as JSON or CSV and reads them back.
//!
//! JSON runs produce one `{stem}.json` holding the whole report. CSV runs
//! produce `{stem}.csv` (UTF-8 with BOM, one row per review) plus a
//! `{stem}_summary.json` with the summary payload.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use revscope_core::{
    ExtractionReport, OutputFormat, ReportMetadata, Review, Sentiment, SentimentCounts, Summary,
};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const IMAGE_SEPARATOR: &str = " | ";

/// Output files written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persisted {
    pub results: PathBuf,
    /// Separate summary file; only written for CSV output.
    pub summary: Option<PathBuf>,
}

/// `amazon_reviews_{product_id}_{YYYYmmdd_HHMMSS}`.
#[must_use]
pub fn output_stem(product_id: &str, at: DateTime<Utc>) -> String {
    format!("amazon_reviews_{product_id}_{}", at.format("%Y%m%d_%H%M%S"))
}

/// One CSV row, in the fixed column order.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    review_id: String,
    reviewer_name: String,
    rating: f64,
    title: String,
    body: String,
    date: String,
    country: String,
    verified_purchase: bool,
    product_variant: String,
    helpful_votes: u32,
    images: String,
    extracted_at: DateTime<Utc>,
}

impl From<&Review> for CsvRow {
    fn from(review: &Review) -> Self {
        Self {
            review_id: review.id.clone(),
            reviewer_name: review.reviewer_name.clone(),
            rating: review.rating,
            title: review.title.clone(),
            body: review.body.clone(),
            date: review.date.clone(),
            country: review.country.clone(),
            verified_purchase: review.verified_purchase,
            product_variant: review.product_variant.clone(),
            helpful_votes: review.helpful_votes,
            images: review.images.join(IMAGE_SEPARATOR),
            extracted_at: review.extracted_at,
        }
    }
}

impl From<CsvRow> for StoredReview {
    fn from(row: CsvRow) -> Self {
        let images = row
            .images
            .split(IMAGE_SEPARATOR)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            id: Some(row.review_id),
            reviewer_name: Some(row.reviewer_name),
            rating: Some(row.rating),
            title: Some(row.title),
            body: Some(row.body),
            date: Some(row.date),
            country: Some(row.country),
            verified_purchase: Some(row.verified_purchase),
            product_variant: Some(row.product_variant),
            helpful_votes: Some(row.helpful_votes),
            images,
            extracted_at: Some(row.extracted_at),
            sentiment: None,
        }
    }
}

/// A review as read back from disk; any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoredReview {
    #[serde(rename = "review_id")]
    pub id: Option<String>,
    pub reviewer_name: Option<String>,
    pub rating: Option<f64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub date: Option<String>,
    pub country: Option<String>,
    pub verified_purchase: Option<bool>,
    pub product_variant: Option<String>,
    pub helpful_votes: Option<u32>,
    pub images: Vec<String>,
    pub extracted_at: Option<DateTime<Utc>>,
    pub sentiment: Option<Sentiment>,
}

/// A persisted run as read back for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedReport {
    pub format: OutputFormat,
    /// Absent for CSV runs.
    pub metadata: Option<ReportMetadata>,
    pub reviews: Vec<StoredReview>,
    /// Extraction-time counts; JSON runs only.
    pub sentiment_analysis: Option<SentimentCounts>,
    pub summary: Option<Summary>,
}

#[derive(Deserialize)]
struct StoredReport {
    #[serde(default)]
    metadata: Option<ReportMetadata>,
    #[serde(default)]
    reviews: Vec<StoredReview>,
    #[serde(default)]
    sentiment_analysis: Option<SentimentCounts>,
    #[serde(default)]
    summary: Option<Summary>,
}

async fn write_file(path: &Path, bytes: Vec<u8>) -> Result<(), ReportError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| ReportError::io(path, e))
}

async fn read_file(path: &Path) -> Result<Vec<u8>, ReportError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| ReportError::io(path, e))
}

fn csv_bytes(reviews: &[Review]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    for review in reviews {
        writer.serialize(CsvRow::from(review))?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::io("<csv buffer>", e.into_error()))
}

/// Persists `report` under `dir` in `format`.
///
/// # Errors
///
/// Returns [`ReportError`] if the directory cannot be created or a file
/// cannot be serialized or written.
pub async fn persist(
    report: &ExtractionReport,
    format: OutputFormat,
    dir: &Path,
) -> Result<Persisted, ReportError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ReportError::io(dir, e))?;

    let stem = output_stem(&report.metadata.product_id, report.metadata.extraction_date);
    let persisted = match format {
        OutputFormat::Json => {
            let results = dir.join(format!("{stem}.json"));
            write_file(&results, serde_json::to_vec_pretty(report)?).await?;
            Persisted {
                results,
                summary: None,
            }
        }
        OutputFormat::Csv => {
            let results = dir.join(format!("{stem}.csv"));
            write_file(&results, csv_bytes(&report.reviews)?).await?;
            let summary = dir.join(format!("{stem}_summary.json"));
            write_file(&summary, serde_json::to_vec_pretty(&report.summary)?).await?;
            Persisted {
                results,
                summary: Some(summary),
            }
        }
    };

    tracing::info!(
        results = %persisted.results.display(),
        summary = ?persisted.summary,
        reviews = report.reviews.len(),
        %format,
        "results saved"
    );
    Ok(persisted)
}

/// Reads back a persisted run.
///
/// The format follows the file extension. For CSV results `summary_path`
/// names the companion summary file; a missing companion is not an error.
///
/// # Errors
///
/// Returns [`ReportError`] if the results file cannot be read or parsed, or
/// its extension is neither `.json` nor `.csv`.
pub async fn load_report(
    path: &Path,
    summary_path: Option<&Path>,
) -> Result<LoadedReport, ReportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => {
            let stored: StoredReport = serde_json::from_slice(&read_file(path).await?)?;
            Ok(LoadedReport {
                format: OutputFormat::Json,
                metadata: stored.metadata,
                reviews: stored.reviews,
                sentiment_analysis: stored.sentiment_analysis,
                summary: stored.summary,
            })
        }
        Some("csv") => {
            let bytes = read_file(path).await?;
            let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
            let mut reader = csv::Reader::from_reader(content);
            let reviews = reader
                .deserialize::<CsvRow>()
                .map(|row| row.map(StoredReview::from))
                .collect::<Result<Vec<_>, _>>()?;

            let summary = match summary_path {
                Some(summary_path) if summary_path.exists() => {
                    Some(serde_json::from_slice(&read_file(summary_path).await?)?)
                }
                Some(summary_path) => {
                    tracing::warn!(
                        path = %summary_path.display(),
                        "summary file not found — showing default summary"
                    );
                    None
                }
                None => None,
            };

            Ok(LoadedReport {
                format: OutputFormat::Csv,
                metadata: None,
                reviews,
                sentiment_analysis: None,
                summary,
            })
        }
        _ => Err(ReportError::UnsupportedFile(path.to_path_buf())),
    }
}

/// The `{stem}_summary.json` companion of a CSV results file.
#[must_use]
pub fn companion_summary_path(results: &Path) -> Option<PathBuf> {
    let stem = results.file_stem()?.to_str()?;
    Some(results.with_file_name(format!("{stem}_summary.json")))
}

#[cfg(test)]
#[path = "persist_test.rs"]
mod tests;
