//! `show`: the reconciled view of a saved run.

use std::fmt;
use std::path::Path;

use revscope_report::{build_view, companion_summary_path, load_report, ReportView};

/// Loads `path` and prints its reconciled view.
///
/// For CSV results without an explicit `summary`, the `_summary.json`
/// companion next to the results file is used when present.
///
/// # Errors
///
/// Returns an error if the results file cannot be read or parsed.
pub(crate) async fn run_show(
    path: &Path,
    summary: Option<&Path>,
    product_url: Option<&str>,
) -> anyhow::Result<()> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let summary_path = match summary {
        Some(explicit) => Some(explicit.to_path_buf()),
        None if is_csv => companion_summary_path(path),
        None => None,
    };

    let loaded = load_report(path, summary_path.as_deref())
        .await
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", path.display()))?;
    let view = build_view(loaded, product_url.unwrap_or_default());
    print!("{}", render_view(&view));
    Ok(())
}

/// Plain-text rendering of a [`ReportView`].
struct ViewText<'a>(&'a ReportView);

fn write_list(f: &mut fmt::Formatter<'_>, heading: &str, items: &[String]) -> fmt::Result {
    writeln!(f, "\n{heading}:")?;
    for item in items {
        writeln!(f, "  - {item}")?;
    }
    Ok(())
}

impl fmt::Display for ViewText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        let counts = view.summary.review_counts;
        writeln!(
            f,
            "Product: {} ({})",
            view.metadata.product_id, view.metadata.product_url
        )?;
        writeln!(f, "Reviews: {}", counts.total)?;
        writeln!(f, "Score: {}/100", view.summary.total_score)?;
        writeln!(
            f,
            "Sentiment: {} positive, {} negative, {} neutral",
            counts.positive, counts.negative, counts.neutral
        )?;
        write_list(f, "Pros", &view.summary.pros)?;
        write_list(f, "Cons", &view.summary.cons)?;
        write_list(f, "Summary", &view.summary.summary)
    }
}

pub(crate) fn render_view(view: &ReportView) -> String {
    ViewText(view).to_string()
}
