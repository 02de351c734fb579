//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Percentages travel as integer tenths plus a display string
//! (`{"tenths": 600, "display": "60.0"}`), never as floats.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ssbj_core::{
    ASSURANCE_ITEMS, Assessment, AssessmentReport, AssessmentState, AssuranceItemResult,
    AssuranceRating, CRITERIA, CriterionScore, DashboardStats, LifecycleStatus, MATURITY_LEVELS,
    Opinion, Percentage, Pillar, Readiness, Review, ReviewReport, ReviewState, Role, SsbjError,
    Standard, User, catalog::maturity_label,
};

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error kind (`invalid_score`, `permission_denied`, ...).
    pub error: String,
    pub message: String,
    /// Unscored criteria or unrated items, for the incomplete-entry errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            missing: None,
        }
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// A core error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub SsbjError);

impl From<SsbjError> for ApiError {
    fn from(error: SsbjError) -> Self {
        Self(error)
    }
}

/// HTTP status for each error kind.
#[must_use]
pub fn status_for(error: &SsbjError) -> StatusCode {
    match error {
        SsbjError::InvalidScore(_)
        | SsbjError::UnknownCriterion(_)
        | SsbjError::UnknownItem(_)
        | SsbjError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SsbjError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        SsbjError::NotFound { .. } | SsbjError::UserNotFound(_) => StatusCode::NOT_FOUND,
        SsbjError::ImmutableState { .. }
        | SsbjError::AssessmentNotReady(_)
        | SsbjError::DuplicateReview { .. }
        | SsbjError::IncompleteAssessment { .. }
        | SsbjError::IncompleteReview { .. }
        | SsbjError::MissingOpinion(_)
        | SsbjError::DuplicateUser(_) => StatusCode::CONFLICT,
        SsbjError::IncompleteData(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SsbjError::StorageError(_)
        | SsbjError::SerializationError(_)
        | SsbjError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(kind = self.0.kind(), error = %self.0, "Request rejected");
        }
        let body = ErrorResponse {
            error: self.0.kind().to_string(),
            message: self.0.to_string(),
            missing: self
                .0
                .missing_codes()
                .map(|codes| codes.iter().map(|c| (*c).to_string()).collect()),
        };
        body.into_response_with(status)
    }
}

// =============================================================================
// SHARED PIECES
// =============================================================================

/// A percentage as integer tenths plus its one-decimal rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentageJson {
    pub tenths: u16,
    pub display: String,
}

impl From<Percentage> for PercentageJson {
    fn from(value: Percentage) -> Self {
        Self {
            tenths: value.tenths(),
            display: value.to_string(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionJson {
    pub code: String,
    pub pillar: Pillar,
    pub pillar_name: String,
    pub category: String,
    pub standard: Standard,
    pub description: String,
    pub guidance: String,
    pub assurance_focus: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssuranceItemJson {
    pub code: String,
    pub category: String,
    pub description: String,
    pub guidance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaturityLevelJson {
    pub value: u8,
    pub label: String,
    pub description: String,
}

/// The fixed reference data: criteria, checklist and maturity scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub criteria: Vec<CriterionJson>,
    pub assurance_items: Vec<AssuranceItemJson>,
    pub maturity_levels: Vec<MaturityLevelJson>,
}

impl CatalogResponse {
    #[must_use]
    pub fn build() -> Self {
        Self {
            criteria: CRITERIA
                .iter()
                .map(|c| CriterionJson {
                    code: c.code.to_string(),
                    pillar: c.pillar,
                    pillar_name: c.pillar.name().to_string(),
                    category: c.category.to_string(),
                    standard: c.standard,
                    description: c.description.to_string(),
                    guidance: c.guidance.to_string(),
                    assurance_focus: c.assurance_focus.to_string(),
                })
                .collect(),
            assurance_items: ASSURANCE_ITEMS
                .iter()
                .map(|i| AssuranceItemJson {
                    code: i.code.to_string(),
                    category: i.category.to_string(),
                    description: i.description.to_string(),
                    guidance: i.guidance.to_string(),
                })
                .collect(),
            maturity_levels: MATURITY_LEVELS
                .iter()
                .map(|m| MaturityLevelJson {
                    value: m.value,
                    label: m.label.to_string(),
                    description: m.description.to_string(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: u64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            department: user.department.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

// =============================================================================
// ASSESSMENTS
// =============================================================================

/// Body of `PUT /assessments/{id}/scores/{code}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub score: i64,
    #[serde(default)]
    pub evidence: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreJson {
    pub code: String,
    pub score: u8,
    pub maturity_label: String,
    pub evidence: String,
    pub notes: String,
    pub recorded_at: DateTime<Utc>,
}

impl From<&CriterionScore> for ScoreJson {
    fn from(score: &CriterionScore) -> Self {
        let value = score.score.value();
        Self {
            code: score.code.clone(),
            score: value,
            maturity_label: maturity_label(value).unwrap_or_default().to_string(),
            evidence: score.evidence.clone(),
            notes: score.notes.clone(),
            recorded_at: score.recorded_at,
        }
    }
}

/// Summary row for `GET /assessments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSummaryJson {
    pub id: u64,
    pub title: String,
    pub entity_name: String,
    pub fiscal_year: String,
    pub created_by: u64,
    pub state: AssessmentState,
    pub completion_percent: u8,
    pub updated_at: DateTime<Utc>,
}

impl From<&Assessment> for AssessmentSummaryJson {
    fn from(a: &Assessment) -> Self {
        Self {
            id: a.id.0,
            title: a.title.clone(),
            entity_name: a.entity_name.clone(),
            fiscal_year: a.fiscal_year.clone(),
            created_by: a.created_by.0,
            state: a.state(),
            completion_percent: a.completion_percent(),
            updated_at: a.updated_at,
        }
    }
}

/// Full assessment record with every recorded score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResponse {
    pub id: u64,
    pub title: String,
    pub entity_name: String,
    pub fiscal_year: String,
    pub created_by: u64,
    pub state: AssessmentState,
    pub completion_percent: u8,
    pub scores: Vec<ScoreJson>,
    pub missing: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Assessment> for AssessmentResponse {
    fn from(a: &Assessment) -> Self {
        Self {
            id: a.id.0,
            title: a.title.clone(),
            entity_name: a.entity_name.clone(),
            fiscal_year: a.fiscal_year.clone(),
            created_by: a.created_by.0,
            state: a.state(),
            completion_percent: a.completion_percent(),
            scores: a.scores().iter().map(ScoreJson::from).collect(),
            missing: a.missing_criteria().iter().map(|c| (*c).to_string()).collect(),
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PillarJson {
    pub pillar: Pillar,
    pub name: String,
    pub scored: usize,
    pub total: usize,
    pub percentage: Option<PercentageJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryJson {
    pub category: String,
    pub percentage: PercentageJson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapJson {
    pub code: String,
    pub pillar: Pillar,
    pub category: String,
    pub description: String,
    pub score: u8,
    pub maturity_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessJson {
    pub code: String,
    pub readiness: Readiness,
}

/// `GET /assessments/{id}/report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReportResponse {
    pub assessment_id: u64,
    pub title: String,
    pub entity_name: String,
    pub fiscal_year: String,
    pub status: LifecycleStatus,
    pub scored: usize,
    pub completion_percent: u8,
    pub overall: Option<PercentageJson>,
    pub pillars: Vec<PillarJson>,
    pub categories: Vec<CategoryJson>,
    pub gaps: Vec<GapJson>,
    pub missing: Vec<String>,
    pub readiness: Vec<ReadinessJson>,
    /// Keyed by `ready`, `borderline`, `at_risk`, `not_ready`, `not_assessed`.
    pub readiness_counts: BTreeMap<Readiness, usize>,
}

impl From<&AssessmentReport> for AssessmentReportResponse {
    fn from(report: &AssessmentReport) -> Self {
        Self {
            assessment_id: report.assessment_id.0,
            title: report.title.clone(),
            entity_name: report.entity_name.clone(),
            fiscal_year: report.fiscal_year.clone(),
            status: report.status,
            scored: report.scored,
            completion_percent: report.completion_percent,
            overall: report.overall.map(PercentageJson::from),
            pillars: report
                .pillars
                .iter()
                .map(|p| PillarJson {
                    pillar: p.pillar,
                    name: p.pillar.name().to_string(),
                    scored: p.scored,
                    total: p.total,
                    percentage: p.percentage.map(PercentageJson::from),
                })
                .collect(),
            categories: report
                .categories
                .iter()
                .map(|(category, value)| CategoryJson {
                    category: (*category).to_string(),
                    percentage: (*value).into(),
                })
                .collect(),
            gaps: report
                .gaps
                .iter()
                .map(|g| GapJson {
                    code: g.criterion.code.to_string(),
                    pillar: g.criterion.pillar,
                    category: g.criterion.category.to_string(),
                    description: g.criterion.description.to_string(),
                    score: g.score.value(),
                    maturity_label: maturity_label(g.score.value())
                        .unwrap_or_default()
                        .to_string(),
                })
                .collect(),
            missing: report.missing.iter().map(|c| (*c).to_string()).collect(),
            readiness: report
                .readiness
                .iter()
                .map(|r| ReadinessJson {
                    code: r.code.to_string(),
                    readiness: r.readiness,
                })
                .collect(),
            readiness_counts: report.readiness_counts.clone(),
        }
    }
}

// =============================================================================
// REVIEWS
// =============================================================================

/// Body of `PUT /reviews/{id}/items/{code}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRequest {
    pub rating: AssuranceRating,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub evidence_adequate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub id: u64,
    pub assessment_id: u64,
    pub reviewer: u64,
    pub state: ReviewState,
    pub opinion: Option<Opinion>,
    pub findings: String,
    pub recommendations: String,
    pub items: Vec<AssuranceItemResult>,
    pub missing: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<&Review> for ReviewResponse {
    fn from(r: &Review) -> Self {
        Self {
            id: r.id.0,
            assessment_id: r.assessment_id.0,
            reviewer: r.reviewer.0,
            state: r.state(),
            opinion: r.opinion(),
            findings: r.findings.clone(),
            recommendations: r.recommendations.clone(),
            items: r.items().to_vec(),
            missing: r.missing_items().iter().map(|c| (*c).to_string()).collect(),
            created_at: r.created_at,
            updated_at: r.updated_at,
            submitted_at: r.submitted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistJson {
    pub code: String,
    pub category: String,
    pub description: String,
    pub result: Option<AssuranceItemResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSummaryJson {
    pub total_items: usize,
    pub rated: usize,
    pub satisfactory: usize,
    pub needs_improvement: usize,
    pub unsatisfactory: usize,
    pub evidence_adequate: usize,
}

/// `GET /reviews/{id}/report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReportResponse {
    pub review_id: u64,
    pub assessment_id: u64,
    pub entity_name: String,
    pub fiscal_year: String,
    pub reviewer: u64,
    pub reviewer_name: Option<String>,
    pub state: ReviewState,
    pub opinion: Option<Opinion>,
    pub findings: String,
    pub recommendations: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub summary: ReviewSummaryJson,
    pub checklist: Vec<ChecklistJson>,
    pub missing: Vec<String>,
}

impl From<&ReviewReport> for ReviewReportResponse {
    fn from(report: &ReviewReport) -> Self {
        let count = |rating: AssuranceRating| {
            report
                .summary
                .by_rating
                .get(&rating)
                .copied()
                .unwrap_or(0)
        };
        Self {
            review_id: report.review_id.0,
            assessment_id: report.assessment_id.0,
            entity_name: report.entity_name.clone(),
            fiscal_year: report.fiscal_year.clone(),
            reviewer: report.reviewer.0,
            reviewer_name: report.reviewer_name.clone(),
            state: report.state,
            opinion: report.opinion,
            findings: report.findings.clone(),
            recommendations: report.recommendations.clone(),
            submitted_at: report.submitted_at,
            summary: ReviewSummaryJson {
                total_items: report.summary.total_items,
                rated: report.summary.rated,
                satisfactory: count(AssuranceRating::Satisfactory),
                needs_improvement: count(AssuranceRating::NeedsImprovement),
                unsatisfactory: count(AssuranceRating::Unsatisfactory),
                evidence_adequate: report.summary.evidence_adequate,
            },
            checklist: report
                .checklist
                .iter()
                .map(|line| ChecklistJson {
                    code: line.item.code.to_string(),
                    category: line.item.category.to_string(),
                    description: line.item.description.to_string(),
                    result: line.result.clone(),
                })
                .collect(),
            missing: report.missing.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PillarAverageJson {
    pub pillar: Pillar,
    pub name: String,
    pub percentage: PercentageJson,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCountsJson {
    pub draft: usize,
    pub complete: usize,
    pub under_review: usize,
    pub reviewed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpinionCountsJson {
    pub unqualified: usize,
    pub qualified: usize,
    pub adverse: usize,
    pub disclaimer: usize,
}

/// `GET /dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_assessments: usize,
    pub by_status: StatusCountsJson,
    pub average_overall: Option<PercentageJson>,
    pub average_pillars: Vec<PillarAverageJson>,
    pub total_reviews: usize,
    pub reviews_in_progress: usize,
    pub reviews_submitted: usize,
    pub opinions: OpinionCountsJson,
}

impl From<&DashboardStats> for DashboardResponse {
    fn from(stats: &DashboardStats) -> Self {
        let status = |s: LifecycleStatus| stats.by_status.get(&s).copied().unwrap_or(0);
        let opinion = |o: Opinion| stats.opinions.get(&o).copied().unwrap_or(0);
        let reviews = |s: ReviewState| stats.reviews_by_state.get(&s).copied().unwrap_or(0);
        Self {
            total_assessments: stats.total_assessments,
            by_status: StatusCountsJson {
                draft: status(LifecycleStatus::Draft),
                complete: status(LifecycleStatus::Complete),
                under_review: status(LifecycleStatus::UnderReview),
                reviewed: status(LifecycleStatus::Reviewed),
            },
            average_overall: stats.average_overall.map(PercentageJson::from),
            average_pillars: stats
                .average_pillars
                .iter()
                .map(|(pillar, value)| PillarAverageJson {
                    pillar: *pillar,
                    name: pillar.name().to_string(),
                    percentage: (*value).into(),
                })
                .collect(),
            total_reviews: stats.total_reviews,
            reviews_in_progress: reviews(ReviewState::InProgress),
            reviews_submitted: reviews(ReviewState::Submitted),
            opinions: OpinionCountsJson {
                unqualified: opinion(Opinion::Unqualified),
                qualified: opinion(Opinion::Qualified),
                adverse: opinion(Opinion::Adverse),
                disclaimer: opinion(Opinion::Disclaimer),
            },
        }
    }
}
