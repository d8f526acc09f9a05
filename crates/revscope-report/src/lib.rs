//! Summary generation, report assembly, persistence and the end-to-end run
//! pipeline.

pub mod assembler;
pub mod error;
pub mod generator;
pub mod persist;
pub mod pipeline;
pub mod summary;
pub mod view;

pub use assembler::{assemble, total_score};
pub use error::ReportError;
pub use generator::{ChatCompletionsClient, TextGenerator};
pub use persist::{
    companion_summary_path, load_report, output_stem, persist, LoadedReport, Persisted,
    StoredReview,
};
pub use pipeline::{
    HttpPipeline, Pipeline, PipelineSettings, RunOutcome, CANCELLED_MESSAGE, NO_REVIEWS_MESSAGE,
};
pub use summary::{build_prompt, parse_summary_response, summarize, SummaryDraft};
pub use view::{build_view, ReportView, UNKNOWN_DATE};
