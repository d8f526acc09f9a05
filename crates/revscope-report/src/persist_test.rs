use chrono::TimeZone;
use revscope_core::RawReview;

use super::*;

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
}

fn review(id: &str, body: &str, images: &[&str]) -> Review {
    let mut review = RawReview {
        reviewer_name: Some(format!("Reviewer {id}")),
        rating: Some(4.0),
        title: Some("Works, mostly".to_string()),
        body: Some(body.to_string()),
        date: Some("5 January 2024".to_string()),
        country: Some("India".to_string()),
        verified_purchase: Some(true),
        product_variant: Some("Colour: Blue".to_string()),
        helpful_votes: Some(3),
        images: images.iter().map(ToString::to_string).collect(),
        ..RawReview::default()
    }
    .into_review(id.to_string(), at());
    review.sentiment = Some(Sentiment::Neutral);
    review
}

fn report(reviews: Vec<Review>) -> ExtractionReport {
    let mut metadata =
        ReportMetadata::new("https://www.amazon.in/dp/B0C1234567", "B0C1234567", reviews.len());
    metadata.extraction_date = at();
    ExtractionReport {
        metadata,
        sentiment_analysis: SentimentCounts::new(0, 0, reviews.len()),
        reviews,
        summary: Summary::unavailable(),
    }
}

#[test]
fn stem_uses_product_id_and_timestamp() {
    assert_eq!(
        output_stem("B0C1234567", at()),
        "amazon_reviews_B0C1234567_20240309_140507"
    );
}

#[test]
fn companion_summary_sits_next_to_results() {
    assert_eq!(
        companion_summary_path(Path::new("out/amazon_reviews_X_1.csv")),
        Some(PathBuf::from("out/amazon_reviews_X_1_summary.json"))
    );
}

#[tokio::test]
async fn json_report_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let original = report(vec![review("R1", "Fine", &[]), review("R2", "Okay", &[])]);

    let persisted = persist(&original, OutputFormat::Json, dir.path())
        .await
        .expect("persist json");

    assert_eq!(
        persisted.results,
        dir.path().join("amazon_reviews_B0C1234567_20240309_140507.json")
    );
    assert!(persisted.summary.is_none());

    let loaded = load_report(&persisted.results, None).await.expect("load json");
    assert_eq!(loaded.format, OutputFormat::Json);
    assert_eq!(loaded.metadata, Some(original.metadata.clone()));
    assert_eq!(loaded.sentiment_analysis, Some(original.sentiment_analysis));
    assert_eq!(loaded.summary, Some(original.summary.clone()));
    assert_eq!(loaded.reviews.len(), 2);
    assert_eq!(loaded.reviews[0].id.as_deref(), Some("R1"));
    assert_eq!(loaded.reviews[1].sentiment, Some(Sentiment::Neutral));
}

#[tokio::test]
async fn persisted_json_uses_review_id_key_and_fixed_metadata() {
    let dir = tempfile::tempdir().expect("tempdir");
    let persisted = persist(&report(vec![review("R1", "Fine", &[])]), OutputFormat::Json, dir.path())
        .await
        .expect("persist json");

    let value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&persisted.results).unwrap()).unwrap();
    assert_eq!(value["metadata"]["source"], "Amazon");
    assert_eq!(value["metadata"]["extractor_version"], "1.1");
    assert_eq!(value["metadata"]["total_reviews"], 1);
    assert_eq!(value["reviews"][0]["review_id"], "R1");
    assert_eq!(value["sentiment_analysis"]["neutral"], 1);
    assert_eq!(value["summary"]["pros"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn csv_has_bom_fixed_header_and_joined_images() {
    let dir = tempfile::tempdir().expect("tempdir");
    let original = report(vec![review(
        "R1",
        "Good, \"really\" good",
        &["https://img.test/a.jpg", "https://img.test/b.jpg"],
    )]);

    let persisted = persist(&original, OutputFormat::Csv, dir.path())
        .await
        .expect("persist csv");

    let bytes = std::fs::read(&persisted.results).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(
        header,
        "review_id,reviewer_name,rating,title,body,date,country,verified_purchase,\
         product_variant,helpful_votes,images,extracted_at"
    );
    assert!(text.contains("https://img.test/a.jpg | https://img.test/b.jpg"));

    let summary_path = persisted.summary.expect("csv writes a summary file");
    assert_eq!(
        summary_path,
        dir.path().join("amazon_reviews_B0C1234567_20240309_140507_summary.json")
    );
    let summary: Summary = serde_json::from_slice(&std::fs::read(summary_path).unwrap()).unwrap();
    assert_eq!(summary, original.summary);
}

#[tokio::test]
async fn csv_reload_restores_every_column() {
    let dir = tempfile::tempdir().expect("tempdir");
    let original = report(vec![
        review("R1", "Line one\nline two, with comma", &["https://img.test/a.jpg", "https://img.test/b.jpg"]),
        review("R2", "", &[]),
    ]);

    let persisted = persist(&original, OutputFormat::Csv, dir.path())
        .await
        .expect("persist csv");
    let loaded = load_report(&persisted.results, persisted.summary.as_deref())
        .await
        .expect("load csv");

    assert_eq!(loaded.format, OutputFormat::Csv);
    assert!(loaded.metadata.is_none());
    assert_eq!(loaded.summary, Some(original.summary.clone()));
    for (stored, review) in loaded.reviews.iter().zip(&original.reviews) {
        assert_eq!(stored.id.as_deref(), Some(review.id.as_str()));
        assert_eq!(stored.reviewer_name.as_deref(), Some(review.reviewer_name.as_str()));
        assert_eq!(stored.rating, Some(review.rating));
        assert_eq!(stored.title.as_deref(), Some(review.title.as_str()));
        assert_eq!(stored.body.as_deref(), Some(review.body.as_str()));
        assert_eq!(stored.date.as_deref(), Some(review.date.as_str()));
        assert_eq!(stored.country.as_deref(), Some(review.country.as_str()));
        assert_eq!(stored.verified_purchase, Some(review.verified_purchase));
        assert_eq!(stored.product_variant.as_deref(), Some(review.product_variant.as_str()));
        assert_eq!(stored.helpful_votes, Some(review.helpful_votes));
        assert_eq!(stored.images, review.images);
        assert_eq!(stored.extracted_at, Some(review.extracted_at));
    }
    assert_eq!(loaded.reviews.len(), 2);
}

#[tokio::test]
async fn csv_reload_without_summary_file_has_no_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let persisted = persist(&report(vec![review("R1", "Fine", &[])]), OutputFormat::Csv, dir.path())
        .await
        .expect("persist csv");

    let missing = dir.path().join("nope_summary.json");
    let loaded = load_report(&persisted.results, Some(&missing)).await.expect("load csv");
    assert!(loaded.summary.is_none());
}

#[tokio::test]
async fn json_with_missing_fields_still_loads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{"reviews":[{"review_id":"R9","body":"ok"},{}]}"#).unwrap();

    let loaded = load_report(&path, None).await.expect("load partial json");
    assert!(loaded.metadata.is_none());
    assert!(loaded.sentiment_analysis.is_none());
    assert!(loaded.summary.is_none());
    assert_eq!(loaded.reviews[0].id.as_deref(), Some("R9"));
    assert_eq!(loaded.reviews[1], StoredReview::default());
}

#[tokio::test]
async fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("results.txt");
    std::fs::write(&path, "hello").unwrap();

    let err = load_report(&path, None).await.unwrap_err();
    assert!(matches!(err, ReportError::UnsupportedFile(_)));
}

#[tokio::test]
async fn missing_results_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_report(&dir.path().join("gone.json"), None).await.unwrap_err();
    assert!(matches!(err, ReportError::Io { .. }));
}
