//! # API Endpoint Handlers
//!
//! Each handler resolves the caller through `CurrentActor`, takes the
//! workspace lock for the duration of one core call, and maps the outcome
//! to JSON. Reads take the read lock, mutations the write lock, so every
//! mutation is serialized against the store.

use super::{
    AppState,
    auth::CurrentActor,
    extract::{ApiJson, ApiPath},
    types::{
        ApiError, AssessmentReportResponse, AssessmentResponse, AssessmentSummaryJson,
        CatalogResponse, DashboardResponse, HealthResponse, ItemRequest, ReviewReportResponse,
        ReviewResponse, ScoreJson, ScoreRequest, UserResponse,
    },
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use ssbj_core::{
    AssessmentDraft, AssessmentId, ItemRating, NewUser, ReviewConclusion, ReviewId,
};

type ApiResult<T> = Result<(StatusCode, Json<T>), ApiError>;

// =============================================================================
// HEALTH AND CATALOG
// =============================================================================

/// Health check endpoint. Never requires a key or a user.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// The fixed criteria catalog, assurance checklist and maturity scale.
pub async fn catalog_handler(CurrentActor(_): CurrentActor) -> impl IntoResponse {
    (StatusCode::OK, Json(CatalogResponse::build()))
}

// =============================================================================
// USERS
// =============================================================================

pub async fn list_users_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Vec<UserResponse>> {
    let workspace = state.workspace.read().await;
    let users = workspace.users(&actor)?;
    Ok((
        StatusCode::OK,
        Json(users.iter().map(UserResponse::from).collect()),
    ))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(request): ApiJson<NewUser>,
) -> ApiResult<UserResponse> {
    let mut workspace = state.workspace.write().await;
    let user = workspace.create_user(&actor, &request, Utc::now())?;
    tracing::info!(
        user = %user.username,
        role = %user.role,
        by = %actor.id,
        "User registered"
    );
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

// =============================================================================
// ASSESSMENTS
// =============================================================================

pub async fn list_assessments_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Vec<AssessmentSummaryJson>> {
    let workspace = state.workspace.read().await;
    let assessments = workspace.assessments(&actor)?;
    Ok((
        StatusCode::OK,
        Json(assessments.iter().map(AssessmentSummaryJson::from).collect()),
    ))
}

pub async fn create_assessment_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(request): ApiJson<AssessmentDraft>,
) -> ApiResult<AssessmentResponse> {
    let mut workspace = state.workspace.write().await;
    let assessment = workspace.create_assessment(&actor, &request, Utc::now())?;
    tracing::info!(assessment = %assessment.id, by = %actor.id, "Assessment created");
    Ok((StatusCode::CREATED, Json(AssessmentResponse::from(&assessment))))
}

pub async fn get_assessment_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<AssessmentResponse> {
    let workspace = state.workspace.read().await;
    let assessment = workspace.assessment(&actor, AssessmentId(id))?;
    Ok((StatusCode::OK, Json(AssessmentResponse::from(&assessment))))
}

/// Record or overwrite one criterion score on a draft.
pub async fn record_score_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath((id, code)): ApiPath<(u64, String)>,
    ApiJson(request): ApiJson<ScoreRequest>,
) -> ApiResult<ScoreJson> {
    let mut workspace = state.workspace.write().await;
    let score = workspace.record_score(
        &actor,
        AssessmentId(id),
        &code,
        request.score,
        &request.evidence,
        &request.notes,
        Utc::now(),
    )?;
    Ok((StatusCode::OK, Json(ScoreJson::from(&score))))
}

pub async fn complete_assessment_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<AssessmentResponse> {
    let mut workspace = state.workspace.write().await;
    let assessment = workspace.complete_assessment(&actor, AssessmentId(id), Utc::now())?;
    tracing::info!(assessment = %assessment.id, by = %actor.id, "Assessment completed");
    Ok((StatusCode::OK, Json(AssessmentResponse::from(&assessment))))
}

pub async fn assessment_report_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<AssessmentReportResponse> {
    let workspace = state.workspace.read().await;
    let report = workspace.assessment_report(&actor, AssessmentId(id))?;
    Ok((StatusCode::OK, Json(AssessmentReportResponse::from(&report))))
}

/// Open the review of a complete assessment.
pub async fn start_review_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<ReviewResponse> {
    let mut workspace = state.workspace.write().await;
    let review = workspace.start_review(&actor, AssessmentId(id), Utc::now())?;
    tracing::info!(
        review = %review.id,
        assessment = %review.assessment_id,
        by = %actor.id,
        "Review started"
    );
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(&review))))
}

/// The review of an assessment; 404 until one is started.
pub async fn assessment_review_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<ReviewResponse> {
    let workspace = state.workspace.read().await;
    let review = workspace
        .review_for_assessment(&actor, AssessmentId(id))?
        .ok_or(ssbj_core::SsbjError::NotFound {
            record: "Review of assessment",
            id,
        })?;
    Ok((StatusCode::OK, Json(ReviewResponse::from(&review))))
}

// =============================================================================
// REVIEWS
// =============================================================================

pub async fn get_review_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<ReviewResponse> {
    let workspace = state.workspace.read().await;
    let review = workspace.review(&actor, ReviewId(id))?;
    Ok((StatusCode::OK, Json(ReviewResponse::from(&review))))
}

/// Rate (or re-rate) one checklist item.
pub async fn rate_item_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath((id, code)): ApiPath<(u64, String)>,
    ApiJson(request): ApiJson<ItemRequest>,
) -> ApiResult<ssbj_core::AssuranceItemResult> {
    let input = ItemRating {
        rating: request.rating,
        notes: request.notes,
        recommendation: request.recommendation,
        evidence_adequate: request.evidence_adequate,
    };
    let mut workspace = state.workspace.write().await;
    let result = workspace.rate_item(&actor, ReviewId(id), &code, &input, Utc::now())?;
    Ok((StatusCode::OK, Json(result)))
}

/// Submit the review with its opinion, findings and recommendations.
pub async fn submit_review_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<u64>,
    ApiJson(request): ApiJson<ReviewConclusion>,
) -> ApiResult<ReviewResponse> {
    let mut workspace = state.workspace.write().await;
    let review = workspace.submit_review(&actor, ReviewId(id), &request, Utc::now())?;
    tracing::info!(
        review = %review.id,
        assessment = %review.assessment_id,
        opinion = ?review.opinion(),
        by = %actor.id,
        "Review submitted"
    );
    Ok((StatusCode::OK, Json(ReviewResponse::from(&review))))
}

pub async fn review_report_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<ReviewReportResponse> {
    let workspace = state.workspace.read().await;
    let report = workspace.review_report(&actor, ReviewId(id))?;
    Ok((StatusCode::OK, Json(ReviewReportResponse::from(&report))))
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// Aggregate statistics scoped to the caller's role.
pub async fn dashboard_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<DashboardResponse> {
    let workspace = state.workspace.read().await;
    let stats = workspace.dashboard(&actor)?;
    Ok((StatusCode::OK, Json(DashboardResponse::from(&stats))))
}
