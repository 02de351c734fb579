//! Gap assessment records and their Draft → Complete lifecycle.

use super::fsm::{AssessmentEvent, AssessmentState};
use super::{free_text, required_name};
use crate::access::{Operation, authorize, ensure_owner};
use crate::catalog::{CRITERIA, criterion_by_code};
use crate::scorer::{self, Gap};
use crate::types::{
    Actor, AssessmentId, MaturityScore, Percentage, Pillar, Role, SsbjError, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields supplied when an assessment is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentDraft {
    pub title: String,
    pub entity_name: String,
    pub fiscal_year: String,
}

/// One maturity rating with its supporting evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub code: String,
    pub score: MaturityScore,
    pub evidence: String,
    pub notes: String,
    pub recorded_at: DateTime<Utc>,
}

/// One entity's gap assessment for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub title: String,
    pub entity_name: String,
    pub fiscal_year: String,
    pub created_by: UserId,
    state: AssessmentState,
    /// At most one entry per criterion, kept in catalog order.
    scores: Vec<CriterionScore>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    /// Open a new Draft assessment owned by `actor`.
    pub fn create(
        id: AssessmentId,
        actor: &Actor,
        draft: &AssessmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, SsbjError> {
        authorize(actor, Operation::CreateAssessment)?;
        Ok(Self {
            id,
            title: required_name("title", &draft.title)?,
            entity_name: required_name("entity_name", &draft.entity_name)?,
            fiscal_year: required_name("fiscal_year", &draft.fiscal_year)?,
            created_by: actor.id,
            state: AssessmentState::Draft,
            scores: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    #[must_use]
    pub fn state(&self) -> AssessmentState {
        self.state
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == AssessmentState::Complete
    }

    /// Scores in catalog order.
    #[must_use]
    pub fn scores(&self) -> &[CriterionScore] {
        &self.scores
    }

    #[must_use]
    pub fn score_for(&self, code: &str) -> Option<&CriterionScore> {
        self.scores.iter().find(|s| s.code == code)
    }

    fn transition(&self, event: AssessmentEvent) -> Result<AssessmentState, SsbjError> {
        self.state.next(event).ok_or(SsbjError::ImmutableState {
            record: "Assessment",
            id: self.id.0,
            state: self.state.as_str(),
        })
    }

    /// Add or replace the score for one criterion.
    ///
    /// Only the creator may score, and only while the assessment is Draft.
    pub fn record_score(
        &mut self,
        actor: &Actor,
        code: &str,
        value: i64,
        evidence: &str,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<&CriterionScore, SsbjError> {
        authorize(actor, Operation::EditAssessment)?;
        ensure_owner(actor, self.created_by, Operation::EditAssessment)?;
        let next = self.transition(AssessmentEvent::RecordScore)?;

        let criterion =
            criterion_by_code(code).ok_or_else(|| SsbjError::UnknownCriterion(code.to_string()))?;
        let entry = CriterionScore {
            code: criterion.code.to_string(),
            score: MaturityScore::new(value)?,
            evidence: free_text("evidence", evidence)?,
            notes: free_text("notes", notes)?,
            recorded_at: now,
        };

        let position = catalog_position(criterion.code);
        let index = match self
            .scores
            .binary_search_by_key(&position, |s| catalog_position(&s.code))
        {
            Ok(i) => {
                self.scores[i] = entry;
                i
            }
            Err(i) => {
                self.scores.insert(i, entry);
                i
            }
        };
        self.state = next;
        self.updated_at = now;
        Ok(&self.scores[index])
    }

    /// Criterion codes without a score, in catalog order.
    #[must_use]
    pub fn missing_criteria(&self) -> Vec<&'static str> {
        CRITERIA
            .iter()
            .map(|c| c.code)
            .filter(|code| self.score_for(code).is_none())
            .collect()
    }

    /// Move Draft → Complete. Requires the creator and full coverage.
    pub fn complete(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<(), SsbjError> {
        authorize(actor, Operation::EditAssessment)?;
        ensure_owner(actor, self.created_by, Operation::EditAssessment)?;
        let next = self.transition(AssessmentEvent::Complete)?;

        let missing = self.missing_criteria();
        if !missing.is_empty() {
            return Err(SsbjError::IncompleteAssessment { missing });
        }

        self.state = next;
        self.updated_at = now;
        Ok(())
    }

    /// Whether `actor` may read this assessment.
    ///
    /// Admins see everything, assessors their own work, reviewers only
    /// complete assessments.
    pub fn ensure_visible_to(&self, actor: &Actor) -> Result<(), SsbjError> {
        authorize(actor, Operation::ViewAssessment)?;
        match actor.role {
            Role::Admin => Ok(()),
            Role::Assessor => ensure_owner(actor, self.created_by, Operation::ViewAssessment),
            Role::Reviewer if self.is_complete() => Ok(()),
            Role::Reviewer => Err(SsbjError::PermissionDenied {
                role: actor.role,
                operation: Operation::ViewAssessment,
            }),
        }
    }

    // =========================================================================
    // SCORING VIEWS
    // =========================================================================

    fn pillar_inputs(&self) -> Vec<(Pillar, i64)> {
        self.scores
            .iter()
            .filter_map(|s| {
                criterion_by_code(&s.code).map(|c| (c.pillar, i64::from(s.score.value())))
            })
            .collect()
    }

    /// Scores keyed by their catalog code.
    #[must_use]
    pub fn scored_map(&self) -> BTreeMap<&'static str, MaturityScore> {
        self.scores
            .iter()
            .filter_map(|s| criterion_by_code(&s.code).map(|c| (c.code, s.score)))
            .collect()
    }

    pub fn pillar_scores(&self) -> Result<BTreeMap<Pillar, Percentage>, SsbjError> {
        scorer::compute_pillar_scores(&self.pillar_inputs())
    }

    pub fn overall_score(&self) -> Result<Percentage, SsbjError> {
        scorer::compute_overall_score(&self.pillar_inputs())
    }

    pub fn category_scores(&self) -> Result<BTreeMap<&'static str, Percentage>, SsbjError> {
        let inputs: Vec<(&'static str, i64)> = self
            .scores
            .iter()
            .filter_map(|s| {
                criterion_by_code(&s.code).map(|c| (c.category, i64::from(s.score.value())))
            })
            .collect();
        scorer::compute_category_scores(&inputs)
    }

    #[must_use]
    pub fn gaps(&self) -> Vec<Gap> {
        scorer::identify_gaps(&self.scored_map())
    }

    #[must_use]
    pub fn completion_percent(&self) -> u8 {
        scorer::completion_percent(self.scores.len())
    }
}

fn catalog_position(code: &str) -> usize {
    CRITERIA
        .iter()
        .position(|c| c.code == code)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn assessor() -> Actor {
        Actor::new(UserId(2), Role::Assessor)
    }

    fn draft() -> Assessment {
        let fields = AssessmentDraft {
            title: "FY2027 readiness".into(),
            entity_name: "Example KK".into(),
            fiscal_year: "FY2027".into(),
        };
        Assessment::create(AssessmentId(1), &assessor(), &fields, now()).expect("create")
    }

    fn score_all(assessment: &mut Assessment, value: i64) {
        for c in &CRITERIA {
            assessment
                .record_score(&assessor(), c.code, value, "", "", now())
                .expect("score");
        }
    }

    #[test]
    fn create_requires_fields() {
        let fields = AssessmentDraft {
            title: "  ".into(),
            entity_name: "Example KK".into(),
            fiscal_year: "FY2027".into(),
        };
        let err = Assessment::create(AssessmentId(1), &assessor(), &fields, now());
        assert!(matches!(err, Err(SsbjError::InvalidInput(_))));
    }

    #[test]
    fn reviewer_cannot_create() {
        let fields = AssessmentDraft {
            title: "t".into(),
            entity_name: "e".into(),
            fiscal_year: "2027".into(),
        };
        let reviewer = Actor::new(UserId(3), Role::Reviewer);
        let err = Assessment::create(AssessmentId(1), &reviewer, &fields, now());
        assert!(matches!(err, Err(SsbjError::PermissionDenied { .. })));
    }

    #[test]
    fn rescoring_replaces_entry() {
        let mut a = draft();
        a.record_score(&assessor(), "STR-02", 1, "old", "", now())
            .expect("first");
        a.record_score(&assessor(), "STR-02", 4, "new", "", now())
            .expect("second");
        assert_eq!(a.scores().len(), 1);
        let entry = a.score_for("STR-02").expect("entry");
        assert_eq!(entry.score.value(), 4);
        assert_eq!(entry.evidence, "new");
    }

    #[test]
    fn scores_kept_in_catalog_order() {
        let mut a = draft();
        for code in ["MET-06", "GOV-01", "RSK-03"] {
            a.record_score(&assessor(), code, 2, "", "", now())
                .expect("score");
        }
        let codes: Vec<_> = a.scores().iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["GOV-01", "RSK-03", "MET-06"]);
    }

    #[test]
    fn unknown_code_and_bad_score_rejected() {
        let mut a = draft();
        assert!(matches!(
            a.record_score(&assessor(), "GOV-99", 2, "", "", now()),
            Err(SsbjError::UnknownCriterion(_))
        ));
        assert!(matches!(
            a.record_score(&assessor(), "GOV-01", 9, "", "", now()),
            Err(SsbjError::InvalidScore(9))
        ));
        assert!(a.scores().is_empty());
    }

    #[test]
    fn only_creator_may_score() {
        let mut a = draft();
        let other = Actor::new(UserId(99), Role::Assessor);
        assert!(matches!(
            a.record_score(&other, "GOV-01", 2, "", "", now()),
            Err(SsbjError::PermissionDenied { .. })
        ));
        let admin = Actor::new(UserId(1), Role::Admin);
        assert!(matches!(
            a.complete(&admin, now()),
            Err(SsbjError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn completion_names_single_missing_code() {
        let mut a = draft();
        for c in CRITERIA.iter().filter(|c| c.code != "RSK-04") {
            a.record_score(&assessor(), c.code, 3, "", "", now())
                .expect("score");
        }
        match a.complete(&assessor(), now()) {
            Err(SsbjError::IncompleteAssessment { missing }) => {
                assert_eq!(missing, vec!["RSK-04"]);
            }
            other => unreachable!("expected IncompleteAssessment, got {:?}", other),
        }
        assert_eq!(a.state(), AssessmentState::Draft);
    }

    #[test]
    fn complete_is_terminal() {
        let mut a = draft();
        score_all(&mut a, 3);
        a.complete(&assessor(), now()).expect("complete");
        assert!(a.is_complete());

        assert!(matches!(
            a.record_score(&assessor(), "GOV-01", 5, "", "", now()),
            Err(SsbjError::ImmutableState { .. })
        ));
        assert!(matches!(
            a.complete(&assessor(), now()),
            Err(SsbjError::ImmutableState { .. })
        ));
        assert_eq!(a.score_for("GOV-01").map(|s| s.score.value()), Some(3));
    }

    #[test]
    fn scoring_views() {
        let mut a = draft();
        score_all(&mut a, 3);
        a.record_score(&assessor(), "GOV-01", 1, "", "", now())
            .expect("score");
        assert_eq!(a.completion_percent(), 100);
        assert_eq!(a.gaps().len(), 1);
        // (3*21 + 1) / 110 = 58.18..%
        assert_eq!(a.overall_score().expect("overall").to_string(), "58.2");
        let pillars = a.pillar_scores().expect("pillars");
        assert_eq!(pillars[&Pillar::Governance].to_string(), "52.0");
        assert_eq!(pillars[&Pillar::Strategy].to_string(), "60.0");
        let categories = a.category_scores().expect("categories");
        assert_eq!(categories["Board Oversight"].to_string(), "40.0");
    }

    #[test]
    fn visibility_rules() {
        let mut a = draft();
        let reviewer = Actor::new(UserId(5), Role::Reviewer);
        let stranger = Actor::new(UserId(6), Role::Assessor);
        assert!(a.ensure_visible_to(&assessor()).is_ok());
        assert!(a.ensure_visible_to(&stranger).is_err());
        assert!(a.ensure_visible_to(&reviewer).is_err());

        score_all(&mut a, 2);
        a.complete(&assessor(), now()).expect("complete");
        assert!(a.ensure_visible_to(&reviewer).is_ok());
    }
}
