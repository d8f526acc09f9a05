use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use revscope_core::{RunHandle, RunRequest, RunStatus};
use revscope_report::{build_view, load_report, ReportView, RunOutcome};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::middleware::RequestId;
use crate::registry::RunEntry;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

fn parse_run_id(rid: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::new(rid, "not_found", format!("run {raw} not found")))
}

async fn find_run(state: &AppState, rid: &str, raw: &str) -> Result<RunEntry, ApiError> {
    let run_id = parse_run_id(rid, raw)?;
    state
        .registry
        .get(run_id)
        .await
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("run {run_id} not found")))
}

/// POST /api/v1/runs: validate a request and start it in the background.
pub(super) async fn create_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RunRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RunStatus>>), ApiError> {
    let rid = &req_id.0;

    let request = body
        .validate(&state.pipeline.settings().allowed_url_prefixes)
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;

    let Some(permit) = state.registry.try_reserve() else {
        tracing::warn!(product_url = %request.product_url, "run rejected — all slots busy");
        return Err(ApiError::new(
            rid,
            "conflict",
            "an extraction is already in progress, try again when it finishes",
        ));
    };

    let handle = RunHandle::new(&request.product_url, request.max_pages);
    let run_id = handle.run_id().await;
    let cancel = CancellationToken::new();
    state
        .registry
        .insert(
            run_id,
            RunEntry {
                handle: handle.clone(),
                cancel: cancel.clone(),
            },
        )
        .await;

    tracing::info!(
        run_id = %run_id,
        product_url = %request.product_url,
        max_pages = ?request.max_pages,
        format = %request.format,
        "run accepted"
    );

    let pipeline = state.pipeline.clone();
    let worker_handle = handle.clone();
    state.registry.spawn(async move {
        let _permit = permit;
        match pipeline
            .run_extraction(request, &worker_handle, &cancel)
            .await
        {
            RunOutcome::Completed { files, reviews } => tracing::info!(
                run_id = %run_id,
                reviews,
                results = %files.results.display(),
                "run completed"
            ),
            RunOutcome::Failed {
                error,
                partial: Some(files),
                ..
            } => tracing::warn!(
                run_id = %run_id,
                error = %error,
                results = %files.results.display(),
                "run failed — partial results saved"
            ),
            RunOutcome::Failed { error, .. } => {
                tracing::warn!(run_id = %run_id, error = %error, "run failed");
            }
            RunOutcome::Cancelled => tracing::info!(run_id = %run_id, "run cancelled"),
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: handle.snapshot().await,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/runs/:run_id: current status.
pub(super) async fn get_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(run_id): Path<String>,
) -> Result<Json<ApiResponse<RunStatus>>, ApiError> {
    let entry = find_run(&state, &req_id.0, &run_id).await?;
    Ok(Json(ApiResponse {
        data: entry.handle.snapshot().await,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/runs/:run_id/cancel: request cancellation of a running run.
pub(super) async fn cancel_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(run_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<RunStatus>>), ApiError> {
    let rid = &req_id.0;
    let entry = find_run(&state, rid, &run_id).await?;
    let status = entry.handle.snapshot().await;
    if !status.running {
        return Err(ApiError::new(rid, "conflict", "run has already finished"));
    }

    entry.cancel.cancel();
    entry.handle.note("Cancelling...").await;
    tracing::info!(run_id = %status.run_id, "cancellation requested");

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: entry.handle.snapshot().await,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

fn finished_results(rid: &str, status: &RunStatus) -> Result<PathBuf, ApiError> {
    match (&status.results_file, status.running) {
        (Some(path), _) => Ok(path.clone()),
        (None, true) => Err(ApiError::new(rid, "conflict", "run is still in progress")),
        (None, false) => Err(ApiError::new(
            rid,
            "not_found",
            status
                .error
                .clone()
                .unwrap_or_else(|| "run produced no results".to_string()),
        )),
    }
}

/// GET /api/v1/runs/:run_id/results: reconciled view of the persisted run.
pub(super) async fn get_results(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(run_id): Path<String>,
) -> Result<Json<ApiResponse<ReportView>>, ApiError> {
    let rid = &req_id.0;
    let status = find_run(&state, rid, &run_id).await?.handle.snapshot().await;
    let results = finished_results(rid, &status)?;

    let loaded = load_report(&results, status.summary_file.as_deref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, path = %results.display(), "failed to load results");
            ApiError::new(rid, "internal_error", "failed to load results")
        })?;

    Ok(Json(ApiResponse {
        data: build_view(loaded, &status.product_url),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn content_type_for(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => "text/csv; charset=utf-8",
        _ => "application/json",
    }
}

/// GET /api/v1/runs/:run_id/download/:kind: raw bytes of a persisted file.
///
/// `kind` is `results` or `summary`; the latter exists only for CSV runs.
pub(super) async fn download(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((run_id, kind)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let rid = &req_id.0;
    let status = find_run(&state, rid, &run_id).await?.handle.snapshot().await;
    let results = finished_results(rid, &status)?;

    let path = match kind.as_str() {
        "results" => results,
        "summary" => status.summary_file.clone().ok_or_else(|| {
            ApiError::new(rid, "not_found", "run has no separate summary file")
        })?,
        other => {
            return Err(ApiError::new(
                rid,
                "bad_request",
                format!("unknown download \"{other}\": choose 'results' or 'summary'"),
            ))
        }
    };

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!(error = %e, path = %path.display(), "failed to read download");
        ApiError::new(rid, "not_found", "file is no longer available")
    })?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("download");
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&path)),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, bytes))
}
