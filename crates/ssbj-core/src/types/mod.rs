//! # Core Type Definitions
//!
//! This module contains the value types shared by every part of the engine:
//! - Record identifiers (`UserId`, `AssessmentId`, `ReviewId`)
//! - Taxonomy enums (`Pillar`, `Standard`, `Role`)
//! - Validated scalar values (`MaturityScore`, `Percentage`)
//! - Review vocabulary (`AssuranceRating`, `Opinion`)
//! - Error types (`SsbjError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`

use crate::access::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// RECORD IDENTIFIERS
// =============================================================================

/// Identifier of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Identifier of a gap assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub u64);

/// Identifier of a limited-assurance review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user#{}", self.0)
    }
}

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "assessment#{}", self.0)
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "review#{}", self.0)
    }
}

// =============================================================================
// TAXONOMY
// =============================================================================

/// The four top-level SSBJ disclosure pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Governance,
    Strategy,
    RiskManagement,
    MetricsAndTargets,
}

impl Pillar {
    /// Every pillar, in catalog order.
    pub const ALL: [Pillar; 4] = [
        Pillar::Governance,
        Pillar::Strategy,
        Pillar::RiskManagement,
        Pillar::MetricsAndTargets,
    ];

    /// Human-readable pillar name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Pillar::Governance => "Governance",
            Pillar::Strategy => "Strategy",
            Pillar::RiskManagement => "Risk Management",
            Pillar::MetricsAndTargets => "Metrics & Targets",
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which SSBJ standard a criterion derives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standard {
    /// General disclosures, aligned with IFRS S1.
    General,
    /// Climate-related disclosures, aligned with IFRS S2.
    Climate,
}

impl Standard {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Standard::General => "General (S1)",
            Standard::Climate => "Climate (S2)",
        }
    }
}

/// Role supplied by the identity provider for every workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Assessor,
    Reviewer,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Assessor => "assessor",
            Role::Reviewer => "reviewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = SsbjError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "assessor" => Ok(Role::Assessor),
            "reviewer" => Ok(Role::Reviewer),
            other => Err(SsbjError::InvalidInput(format!("unknown role '{}'", other))),
        }
    }
}

/// The authenticated caller of a workflow operation.
///
/// The core trusts this value as given; resolving it is the identity
/// provider's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

// =============================================================================
// MATURITY SCORE
// =============================================================================

/// A validated maturity rating for one criterion, in `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MaturityScore(u8);

impl MaturityScore {
    /// Validate a raw value.
    ///
    /// Returns `SsbjError::InvalidScore` carrying the offending value when it
    /// falls outside `0..=MAX_MATURITY`.
    pub fn new(value: i64) -> Result<Self, SsbjError> {
        if (0..=i64::from(crate::primitives::MAX_MATURITY)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(SsbjError::InvalidScore(value))
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// True when the score is below the "Defined" maturity level.
    #[must_use]
    pub const fn is_gap(self) -> bool {
        self.0 < crate::primitives::GAP_THRESHOLD
    }
}

// =============================================================================
// PERCENTAGE
// =============================================================================

/// A percentage carried as integer tenths (`600` is `60.0%`).
///
/// All scaling rounds half-up to one decimal place.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Percentage(u16);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const FULL: Percentage = Percentage(1000);

    /// Build from tenths of a percent, clamped to 100.0%.
    #[must_use]
    pub fn from_tenths(tenths: u16) -> Self {
        Self(tenths.min(1000))
    }

    /// `numerator / denominator` expressed as a percentage.
    ///
    /// Returns `None` for a zero denominator.
    #[must_use]
    pub fn from_ratio(numerator: u64, denominator: u64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let doubled = numerator.saturating_mul(2000).saturating_add(denominator);
        let tenths = doubled / denominator.saturating_mul(2);
        Some(Self::from_tenths(tenths.min(1000) as u16))
    }

    /// Mean of several percentages, `None` when empty.
    #[must_use]
    pub fn mean(values: &[Percentage]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let total: u64 = values.iter().map(|p| u64::from(p.0)).sum();
        let count = values.len() as u64;
        let tenths = (total * 2 + count) / (count * 2);
        Some(Self::from_tenths(tenths as u16))
    }

    #[must_use]
    pub const fn tenths(self) -> u16 {
        self.0
    }

    /// Whole-percent value, rounded half-up.
    #[must_use]
    pub const fn rounded(self) -> u16 {
        (self.0 + 5) / 10
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

// =============================================================================
// REVIEW VOCABULARY
// =============================================================================

/// Reviewer rating of one assurance checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssuranceRating {
    Satisfactory,
    NeedsImprovement,
    Unsatisfactory,
}

/// The reviewer's overall conclusion on assurance readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opinion {
    Unqualified,
    Qualified,
    Adverse,
    Disclaimer,
}

impl Opinion {
    pub const ALL: [Opinion; 4] = [
        Opinion::Unqualified,
        Opinion::Qualified,
        Opinion::Adverse,
        Opinion::Disclaimer,
    ];
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the readiness engine.
///
/// Every variant is a local validation or precondition failure scoped to one
/// operation. None of them are transient, so none are retried.
#[derive(Debug, Error)]
pub enum SsbjError {
    /// A maturity value fell outside `0..=5`.
    #[error("Invalid maturity score {0}: must be an integer between 0 and 5")]
    InvalidScore(i64),

    /// Completion attempted while criteria are still unscored.
    #[error("Assessment incomplete: missing scores for {}", .missing.join(", "))]
    IncompleteAssessment { missing: Vec<&'static str> },

    /// Submission attempted while checklist items are still unrated.
    #[error("Review incomplete: missing ratings for {}", .missing.join(", "))]
    IncompleteReview { missing: Vec<&'static str> },

    /// Mutation attempted after the record reached its terminal state.
    #[error("{record} {id} is {state} and can no longer be modified")]
    ImmutableState {
        record: &'static str,
        id: u64,
        state: &'static str,
    },

    /// Review requested for an assessment that is not complete.
    #[error("{0} must be complete before a review can start")]
    AssessmentNotReady(AssessmentId),

    /// A review already exists for the assessment.
    #[error("{assessment} already has {existing}")]
    DuplicateReview {
        assessment: AssessmentId,
        existing: ReviewId,
    },

    /// Submission attempted without an overall opinion.
    #[error("{0} cannot be submitted without an overall opinion")]
    MissingOpinion(ReviewId),

    /// The scorer was given no data for a pillar (or no data at all).
    #[error("No scored criteria for {0}")]
    IncompleteData(&'static str),

    /// The actor's role or ownership does not allow the operation.
    #[error("Permission denied: {role} may not {operation}")]
    PermissionDenied { role: Role, operation: Operation },

    /// The requested record does not exist.
    #[error("{record} {id} not found")]
    NotFound { record: &'static str, id: u64 },

    /// No user with the given username.
    #[error("User '{0}' not found")]
    UserNotFound(String),

    /// A username is already taken.
    #[error("User '{0}' already exists")]
    DuplicateUser(String),

    /// A criterion code outside the catalog.
    #[error("Unknown criterion code '{0}'")]
    UnknownCriterion(String),

    /// An assurance item code outside the checklist.
    #[error("Unknown assurance item code '{0}'")]
    UnknownItem(String),

    /// A free-form input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The storage engine failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A file or socket operation failed outside the store.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl SsbjError {
    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SsbjError::InvalidScore(_) => "invalid_score",
            SsbjError::IncompleteAssessment { .. } => "incomplete_assessment",
            SsbjError::IncompleteReview { .. } => "incomplete_review",
            SsbjError::ImmutableState { .. } => "immutable_state",
            SsbjError::AssessmentNotReady(_) => "assessment_not_ready",
            SsbjError::DuplicateReview { .. } => "duplicate_review",
            SsbjError::MissingOpinion(_) => "missing_opinion",
            SsbjError::IncompleteData(_) => "incomplete_data",
            SsbjError::PermissionDenied { .. } => "permission_denied",
            SsbjError::NotFound { .. } | SsbjError::UserNotFound(_) => "not_found",
            SsbjError::DuplicateUser(_) => "duplicate_user",
            SsbjError::UnknownCriterion(_) => "unknown_criterion",
            SsbjError::UnknownItem(_) => "unknown_item",
            SsbjError::InvalidInput(_) => "invalid_input",
            SsbjError::StorageError(_) => "storage_error",
            SsbjError::SerializationError(_) => "serialization_error",
            SsbjError::IoError(_) => "io_error",
        }
    }

    /// The missing criterion or item codes, for the incomplete-entry errors.
    #[must_use]
    pub fn missing_codes(&self) -> Option<&[&'static str]> {
        match self {
            SsbjError::IncompleteAssessment { missing }
            | SsbjError::IncompleteReview { missing } => Some(missing),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
