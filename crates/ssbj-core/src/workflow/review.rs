//! Limited-assurance reviews and their InProgress → Submitted lifecycle.

use super::assessment::Assessment;
use super::fsm::{ReviewEvent, ReviewState};
use super::free_text;
use crate::access::{Operation, authorize, ensure_owner};
use crate::catalog::{ASSURANCE_ITEMS, assurance_item_by_code};
use crate::types::{
    Actor, AssessmentId, AssuranceRating, Opinion, ReviewId, Role, SsbjError, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The reviewer's result for one checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssuranceItemResult {
    pub code: String,
    pub rating: AssuranceRating,
    pub notes: String,
    pub recommendation: String,
    pub evidence_adequate: bool,
}

/// The reviewer's overall conclusion and narrative, supplied at submission.
///
/// A conclusion without an opinion is rejected with
/// `SsbjError::MissingOpinion` once every item is rated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConclusion {
    pub opinion: Option<Opinion>,
    #[serde(default)]
    pub findings: String,
    #[serde(default)]
    pub recommendations: String,
}

/// One limited-assurance review of exactly one complete assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub assessment_id: AssessmentId,
    pub reviewer: UserId,
    state: ReviewState,
    /// At most one entry per checklist item, kept in checklist order.
    items: Vec<AssuranceItemResult>,
    /// Unset until submission.
    opinion: Option<Opinion>,
    pub findings: String,
    pub recommendations: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Open a review of `assessment` assigned to `actor`.
    ///
    /// `existing` is the review already recorded for this assessment, if any.
    pub fn start(
        id: ReviewId,
        assessment: &Assessment,
        existing: Option<&Review>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Self, SsbjError> {
        authorize(actor, Operation::StartReview)?;
        if !assessment.is_complete() {
            return Err(SsbjError::AssessmentNotReady(assessment.id));
        }
        if let Some(existing) = existing {
            return Err(SsbjError::DuplicateReview {
                assessment: assessment.id,
                existing: existing.id,
            });
        }
        Ok(Self {
            id,
            assessment_id: assessment.id,
            reviewer: actor.id,
            state: ReviewState::InProgress,
            items: Vec::new(),
            opinion: None,
            findings: String::new(),
            recommendations: String::new(),
            created_at: now,
            updated_at: now,
            submitted_at: None,
        })
    }

    #[must_use]
    pub fn state(&self) -> ReviewState {
        self.state
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.state == ReviewState::Submitted
    }

    /// The overall opinion; `None` while in progress.
    #[must_use]
    pub fn opinion(&self) -> Option<Opinion> {
        self.opinion
    }

    /// Item results in checklist order.
    #[must_use]
    pub fn items(&self) -> &[AssuranceItemResult] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, code: &str) -> Option<&AssuranceItemResult> {
        self.items.iter().find(|i| i.code == code)
    }

    fn transition(&self, event: ReviewEvent) -> Result<ReviewState, SsbjError> {
        self.state.next(event).ok_or(SsbjError::ImmutableState {
            record: "Review",
            id: self.id.0,
            state: self.state.as_str(),
        })
    }

    fn ensure_reviewer(&self, actor: &Actor) -> Result<(), SsbjError> {
        authorize(actor, Operation::EditReview)?;
        ensure_owner(actor, self.reviewer, Operation::EditReview)
    }

    /// Set or replace the rating of one checklist item.
    pub fn rate_item(
        &mut self,
        actor: &Actor,
        code: &str,
        rating: AssuranceRating,
        notes: &str,
        recommendation: &str,
        evidence_adequate: bool,
        now: DateTime<Utc>,
    ) -> Result<&AssuranceItemResult, SsbjError> {
        self.ensure_reviewer(actor)?;
        let next = self.transition(ReviewEvent::RateItem)?;

        let definition =
            assurance_item_by_code(code).ok_or_else(|| SsbjError::UnknownItem(code.to_string()))?;
        let entry = AssuranceItemResult {
            code: definition.code.to_string(),
            rating,
            notes: free_text("notes", notes)?,
            recommendation: free_text("recommendation", recommendation)?,
            evidence_adequate,
        };

        let position = checklist_position(definition.code);
        let index = match self
            .items
            .binary_search_by_key(&position, |i| checklist_position(&i.code))
        {
            Ok(i) => {
                self.items[i] = entry;
                i
            }
            Err(i) => {
                self.items.insert(i, entry);
                i
            }
        };
        self.state = next;
        self.updated_at = now;
        Ok(&self.items[index])
    }

    /// Checklist codes without a rating, in checklist order.
    #[must_use]
    pub fn missing_items(&self) -> Vec<&'static str> {
        ASSURANCE_ITEMS
            .iter()
            .map(|i| i.code)
            .filter(|code| self.item(code).is_none())
            .collect()
    }

    /// Move InProgress → Submitted, recording the conclusion.
    ///
    /// Item coverage is checked before the opinion. Nothing is written
    /// unless every check passes. The opinion is taken as given: it is not
    /// derived from, or constrained by, the item ratings.
    pub fn submit(
        &mut self,
        actor: &Actor,
        conclusion: &ReviewConclusion,
        now: DateTime<Utc>,
    ) -> Result<(), SsbjError> {
        self.ensure_reviewer(actor)?;
        let next = self.transition(ReviewEvent::Submit)?;

        let missing = self.missing_items();
        if !missing.is_empty() {
            return Err(SsbjError::IncompleteReview { missing });
        }
        let opinion = conclusion
            .opinion
            .ok_or(SsbjError::MissingOpinion(self.id))?;
        let findings = free_text("findings", &conclusion.findings)?;
        let recommendations = free_text("recommendations", &conclusion.recommendations)?;

        self.opinion = Some(opinion);
        self.findings = findings;
        self.recommendations = recommendations;
        self.state = next;
        self.updated_at = now;
        self.submitted_at = Some(now);
        Ok(())
    }

    /// Whether `actor` may read this review.
    ///
    /// `assessment_owner` is the creator of the reviewed assessment.
    pub fn ensure_visible_to(
        &self,
        actor: &Actor,
        assessment_owner: UserId,
    ) -> Result<(), SsbjError> {
        authorize(actor, Operation::ViewReview)?;
        match actor.role {
            Role::Admin => Ok(()),
            Role::Reviewer => ensure_owner(actor, self.reviewer, Operation::ViewReview),
            Role::Assessor => ensure_owner(actor, assessment_owner, Operation::ViewReview),
        }
    }
}

fn checklist_position(code: &str) -> usize {
    ASSURANCE_ITEMS
        .iter()
        .position(|i| i.code == code)
        .unwrap_or(usize::MAX)
}
