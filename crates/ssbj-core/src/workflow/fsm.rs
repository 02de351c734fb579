//! # Lifecycle State Machines
//!
//! Transition tables for assessments and reviews. A `(state, event)` pair
//! that is not listed has no successor; the workflow reports it as
//! `SsbjError::ImmutableState`. Guards (coverage, ownership, opinion) are
//! evaluated by the workflow before `next` is consulted.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ASSESSMENT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentState {
    Draft,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssessmentEvent {
    RecordScore,
    Complete,
}

const ASSESSMENT_TRANSITIONS: &[(AssessmentState, AssessmentEvent, AssessmentState)] = &[
    (
        AssessmentState::Draft,
        AssessmentEvent::RecordScore,
        AssessmentState::Draft,
    ),
    (
        AssessmentState::Draft,
        AssessmentEvent::Complete,
        AssessmentState::Complete,
    ),
];

impl AssessmentState {
    /// Successor state for `event`, if the table allows it.
    #[must_use]
    pub fn next(self, event: AssessmentEvent) -> Option<AssessmentState> {
        ASSESSMENT_TRANSITIONS
            .iter()
            .find(|(from, on, _)| *from == self && *on == event)
            .map(|(_, _, to)| *to)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentState::Draft => "draft",
            AssessmentState::Complete => "complete",
        }
    }
}

impl fmt::Display for AssessmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// REVIEW
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    InProgress,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewEvent {
    RateItem,
    Submit,
}

const REVIEW_TRANSITIONS: &[(ReviewState, ReviewEvent, ReviewState)] = &[
    (
        ReviewState::InProgress,
        ReviewEvent::RateItem,
        ReviewState::InProgress,
    ),
    (
        ReviewState::InProgress,
        ReviewEvent::Submit,
        ReviewState::Submitted,
    ),
];

impl ReviewState {
    #[must_use]
    pub fn next(self, event: ReviewEvent) -> Option<ReviewState> {
        REVIEW_TRANSITIONS
            .iter()
            .find(|(from, on, _)| *from == self && *on == event)
            .map(|(_, _, to)| *to)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewState::InProgress => "in_progress",
            ReviewState::Submitted => "submitted",
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DERIVED LIFECYCLE
// =============================================================================

/// The combined lifecycle shown on dashboards. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Draft,
    Complete,
    UnderReview,
    Reviewed,
}

impl LifecycleStatus {
    pub const ALL: [LifecycleStatus; 4] = [
        LifecycleStatus::Draft,
        LifecycleStatus::Complete,
        LifecycleStatus::UnderReview,
        LifecycleStatus::Reviewed,
    ];

    #[must_use]
    pub fn derive(assessment: AssessmentState, review: Option<ReviewState>) -> Self {
        match (assessment, review) {
            (AssessmentState::Draft, _) => LifecycleStatus::Draft,
            (AssessmentState::Complete, None) => LifecycleStatus::Complete,
            (AssessmentState::Complete, Some(ReviewState::InProgress)) => {
                LifecycleStatus::UnderReview
            }
            (AssessmentState::Complete, Some(ReviewState::Submitted)) => LifecycleStatus::Reviewed,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Draft => "draft",
            LifecycleStatus::Complete => "complete",
            LifecycleStatus::UnderReview => "under_review",
            LifecycleStatus::Reviewed => "reviewed",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
