//! REST handlers
//!
//! Thin wrappers over [`Refinery`](crate::service::Refinery): extract,
//! call, serialize.

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::analysis::{
    AcquisitionScore, AnalysisModule, EditQueue, EditQueueItem, ItemStatus, ModuleOptions,
};
use crate::config::AnalysisMode;
use crate::model::{AnalysisResult, AnnotationId, Manuscript, ManuscriptId, ManuscriptSummary, ResultId};
use crate::reports::{Report, ReportRequest};
use crate::service::{ImportRequest, NewAnnotation};
use crate::workflow::{Annotation, Decision, Outcome};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

// ── Health ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub mode: AnalysisMode,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        mode: state.refinery.mode(),
    })
}

// ── Manuscripts ────────────────────────────────────────────────────────────

/// GET /api/v1/manuscripts
pub async fn list_manuscripts(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ManuscriptSummary>>> {
    Ok(Json(state.refinery.list_manuscripts()?))
}

/// POST /api/v1/manuscripts
pub async fn import_manuscript(
    State(state): State<AppState>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ManuscriptSummary>)> {
    let Json(request) = payload?;
    let manuscript = state.refinery.import_text(request)?;
    Ok((StatusCode::CREATED, Json(ManuscriptSummary::from(&manuscript))))
}

/// GET /api/v1/manuscripts/:id
pub async fn get_manuscript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Manuscript>> {
    Ok(Json(
        state.refinery.get_manuscript(&ManuscriptId::from_string(id))?,
    ))
}

/// DELETE /api/v1/manuscripts/:id
pub async fn delete_manuscript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .refinery
        .delete_manuscript(&ManuscriptId::from_string(id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Analysis ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub manuscript_id: String,
    pub module: String,
    #[serde(default)]
    pub options: ModuleOptions,
}

#[derive(Debug, Deserialize)]
pub struct RunAllRequest {
    pub manuscript_id: String,
    #[serde(default)]
    pub options: ModuleOptions,
}

/// POST /api/v1/analysis/run
pub async fn run_module(
    State(state): State<AppState>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let Json(request) = payload?;
    let module: AnalysisModule = request
        .module
        .parse()
        .map_err(|e: crate::analysis::UnknownModule| ApiError::BadRequest(e.to_string()))?;
    let id = ManuscriptId::from_string(request.manuscript_id);
    Ok(Json(
        state
            .refinery
            .run_module(&id, module, &request.options)
            .await?,
    ))
}

/// POST /api/v1/analysis/run-all
pub async fn run_all(
    State(state): State<AppState>,
    payload: Result<Json<RunAllRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<AnalysisResult>>> {
    let Json(request) = payload?;
    let id = ManuscriptId::from_string(request.manuscript_id);
    Ok(Json(state.refinery.run_all(&id, &request.options).await?))
}

/// GET /api/v1/analysis/:manuscript_id
pub async fn list_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<AnalysisResult>>> {
    Ok(Json(
        state.refinery.list_results(&ManuscriptId::from_string(id))?,
    ))
}

/// GET /api/v1/analysis/result/:id
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AnalysisResult>> {
    Ok(Json(state.refinery.get_result(&ResultId::from_string(id))?))
}

// ── Edit queue ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ItemStatusUpdate {
    pub status: ItemStatus,
}

/// GET /api/v1/manuscripts/:id/queue?status=pending
pub async fn edit_queue(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Query<QueueQuery>, QueryRejection>,
) -> ApiResult<Json<EditQueue>> {
    let Query(query) = payload?;
    Ok(Json(
        state
            .refinery
            .edit_queue(&ManuscriptId::from_string(id), query.status)?,
    ))
}

/// PATCH /api/v1/manuscripts/:id/queue/:item_id
pub async fn set_item_status(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, u32)>,
    payload: Result<Json<ItemStatusUpdate>, JsonRejection>,
) -> ApiResult<Json<EditQueueItem>> {
    let Json(update) = payload?;
    Ok(Json(state.refinery.set_item_status(
        &ManuscriptId::from_string(id),
        item_id,
        update.status,
    )?))
}

// ── Scoring and reports ────────────────────────────────────────────────────

/// POST /api/v1/manuscripts/:id/score
pub async fn acquisition_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AcquisitionScore>> {
    Ok(Json(
        state
            .refinery
            .acquisition_score(&ManuscriptId::from_string(id))
            .await?,
    ))
}

/// POST /api/v1/manuscripts/:id/reports
pub async fn generate_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> ApiResult<Json<Report>> {
    let Json(request) = payload?;
    Ok(Json(
        state
            .refinery
            .generate_report(&ManuscriptId::from_string(id), &request)
            .await?,
    ))
}

// ── Workflow ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AdvanceRequest {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub outcome: Option<Outcome>,
}

/// GET /api/v1/manuscripts/:id/workflow
pub async fn get_decision(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Decision>> {
    Ok(Json(state.refinery.decision(&ManuscriptId::from_string(id))?))
}

/// POST /api/v1/manuscripts/:id/workflow/advance
pub async fn advance_decision(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AdvanceRequest>, JsonRejection>,
) -> ApiResult<Json<Decision>> {
    let Json(request) = payload?;
    Ok(Json(state.refinery.advance_decision(
        &ManuscriptId::from_string(id),
        request.notes,
        request.outcome,
    )?))
}

// ── Annotations ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnnotationUpdate {
    pub content: String,
}

/// GET /api/v1/manuscripts/:id/annotations
pub async fn list_annotations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Annotation>>> {
    Ok(Json(
        state
            .refinery
            .list_annotations(&ManuscriptId::from_string(id))?,
    ))
}

/// POST /api/v1/manuscripts/:id/annotations
pub async fn add_annotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewAnnotation>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Annotation>)> {
    let Json(new) = payload?;
    let annotation = state
        .refinery
        .add_annotation(&ManuscriptId::from_string(id), new)?;
    Ok((StatusCode::CREATED, Json(annotation)))
}

/// PATCH /api/v1/annotations/:id
pub async fn update_annotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AnnotationUpdate>, JsonRejection>,
) -> ApiResult<Json<Annotation>> {
    let Json(update) = payload?;
    Ok(Json(state.refinery.update_annotation(
        &AnnotationId::from_string(id),
        update.content,
    )?))
}

/// DELETE /api/v1/annotations/:id
pub async fn delete_annotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .refinery
        .delete_annotation(&AnnotationId::from_string(id))?;
    Ok(StatusCode::NO_CONTENT)
}
