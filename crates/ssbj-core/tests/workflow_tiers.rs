//! # Workflow Tier Tests (W0-W4)
//!
//! If ANY tier fails, the engine cannot be trusted with a readiness opinion.
//!
//! ## Tiers
//! - W0: Scoring Arithmetic
//! - W1: Assessment Lifecycle
//! - W2: Review Lifecycle
//! - W3: Access Control
//! - W4: Aggregation and Persistence

#![allow(clippy::panic)]

use chrono::{DateTime, TimeZone, Utc};
use ssbj_core::{
    ASSURANCE_ITEMS, Actor, AssessmentDraft, AssessmentId, AssuranceRating, CRITERIA, ItemRating,
    LifecycleStatus, NewUser, Opinion, Percentage, Pillar, ReviewConclusion, ReviewState, Role,
    SsbjError, Workspace,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn add_user(ws: &mut Workspace, username: &str, role: Role) -> Actor {
    let admin = ws.actor_for("admin").expect("admin");
    let fields = NewUser {
        username: username.to_string(),
        full_name: String::new(),
        email: String::new(),
        department: String::new(),
        role,
    };
    ws.create_user(&admin, &fields, now())
        .expect("create user")
        .actor()
}

fn fields() -> AssessmentDraft {
    AssessmentDraft {
        title: "FY2026 SSBJ readiness".into(),
        entity_name: "Example Railways KK".into(),
        fiscal_year: "FY2026".into(),
    }
}

fn satisfactory() -> ItemRating {
    ItemRating {
        rating: AssuranceRating::Satisfactory,
        notes: String::new(),
        recommendation: String::new(),
        evidence_adequate: true,
    }
}

/// A workspace with one assessor, one reviewer and one assessment scored
/// at `value` everywhere (completed when `complete` is set).
fn seeded(value: i64, complete: bool) -> (Workspace, Actor, Actor, AssessmentId) {
    let mut ws = Workspace::in_memory(now()).expect("workspace");
    let assessor = add_user(&mut ws, "assessor1", Role::Assessor);
    let reviewer = add_user(&mut ws, "reviewer1", Role::Reviewer);
    let a = ws
        .create_assessment(&assessor, &fields(), now())
        .expect("create");
    for c in &CRITERIA {
        ws.record_score(&assessor, a.id, c.code, value, "", "", now())
            .expect("score");
    }
    if complete {
        ws.complete_assessment(&assessor, a.id, now())
            .expect("complete");
    }
    (ws, assessor, reviewer, a.id)
}

// =============================================================================
// TIER W0: SCORING ARITHMETIC
// =============================================================================

mod w0_scoring {
    use super::*;
    use ssbj_core::{compute_overall_score, compute_pillar_scores};

    /// W0.1: All criteria at 3 give 60.0% overall and per pillar.
    #[test]
    fn uniform_three_is_sixty() {
        let scores: Vec<(Pillar, i64)> = CRITERIA.iter().map(|c| (c.pillar, 3)).collect();
        let overall = compute_overall_score(&scores).expect("overall");
        assert_eq!(overall.to_string(), "60.0");

        let pillars = compute_pillar_scores(&scores).expect("pillars");
        for pillar in Pillar::ALL {
            assert_eq!(pillars[&pillar].to_string(), "60.0");
        }
    }

    /// W0.2: All zeros give 0.0%.
    #[test]
    fn all_zero() {
        let scores: Vec<(Pillar, i64)> = CRITERIA.iter().map(|c| (c.pillar, 0)).collect();
        assert_eq!(
            compute_overall_score(&scores).expect("overall"),
            Percentage::ZERO
        );
    }

    /// W0.3: A value outside 0..=5 is reported with the offending value.
    #[test]
    fn out_of_range_rejected() {
        let scores = [(Pillar::Governance, 3), (Pillar::Strategy, 7)];
        assert!(matches!(
            compute_overall_score(&scores),
            Err(SsbjError::InvalidScore(7))
        ));
    }

    /// W0.4: An empty pillar is IncompleteData, never a division by zero.
    #[test]
    fn empty_pillar_incomplete() {
        let scores = [(Pillar::Governance, 3)];
        assert!(matches!(
            compute_pillar_scores(&scores),
            Err(SsbjError::IncompleteData(_))
        ));
    }
}

// =============================================================================
// TIER W1: ASSESSMENT LIFECYCLE
// =============================================================================

mod w1_assessment {
    use super::*;

    /// W1.1: Completing with 21 of 22 criteria names exactly the missing one.
    #[test]
    fn missing_one_criterion() {
        let mut ws = Workspace::in_memory(now()).expect("workspace");
        let assessor = add_user(&mut ws, "assessor1", Role::Assessor);
        let a = ws
            .create_assessment(&assessor, &fields(), now())
            .expect("create");
        for c in CRITERIA.iter().filter(|c| c.code != "RSK-03") {
            ws.record_score(&assessor, a.id, c.code, 4, "", "", now())
                .expect("score");
        }

        match ws.complete_assessment(&assessor, a.id, now()) {
            Err(SsbjError::IncompleteAssessment { missing }) => {
                assert_eq!(missing, vec!["RSK-03"]);
            }
            other => panic!("expected IncompleteAssessment, got {:?}", other),
        }

        // The rejected completion left the stored record in Draft.
        let stored = ws.assessment(&assessor, a.id).expect("load");
        assert!(!stored.is_complete());
        assert_eq!(stored.scores().len(), 21);
    }

    /// W1.2: Re-scoring replaces, never duplicates.
    #[test]
    fn rescore_replaces() {
        let (mut ws, assessor, _, id) = seeded(2, false);
        ws.record_score(&assessor, id, "GOV-01", 5, "board minutes", "", now())
            .expect("rescore");
        let a = ws.assessment(&assessor, id).expect("load");
        assert_eq!(a.scores().len(), CRITERIA.len());
        assert_eq!(
            a.score_for("GOV-01").map(|s| s.score.value()),
            Some(5)
        );
    }

    /// W1.3: Complete assessments are immutable.
    #[test]
    fn complete_is_terminal() {
        let (mut ws, assessor, _, id) = seeded(3, true);
        assert!(matches!(
            ws.record_score(&assessor, id, "GOV-01", 1, "", "", now()),
            Err(SsbjError::ImmutableState { .. })
        ));
        assert!(matches!(
            ws.complete_assessment(&assessor, id, now()),
            Err(SsbjError::ImmutableState { .. })
        ));
    }

    /// W1.4: Unknown codes and bad values are rejected.
    #[test]
    fn bad_inputs_rejected() {
        let (mut ws, assessor, _, id) = seeded(3, false);
        assert!(matches!(
            ws.record_score(&assessor, id, "MET-07", 3, "", "", now()),
            Err(SsbjError::UnknownCriterion(_))
        ));
        assert!(matches!(
            ws.record_score(&assessor, id, "MET-01", 6, "", "", now()),
            Err(SsbjError::InvalidScore(6))
        ));
        assert!(matches!(
            ws.record_score(&assessor, id, "MET-01", -1, "", "", now()),
            Err(SsbjError::InvalidScore(-1))
        ));
    }
}

// =============================================================================
// TIER W2: REVIEW LIFECYCLE
// =============================================================================

mod w2_review {
    use super::*;

    /// W2.1: A draft assessment cannot be reviewed.
    #[test]
    fn draft_not_ready() {
        let (mut ws, _, reviewer, id) = seeded(3, false);
        assert!(matches!(
            ws.start_review(&reviewer, id, now()),
            Err(SsbjError::AssessmentNotReady(_))
        ));
    }

    /// W2.2: A second review of the same assessment is a duplicate.
    #[test]
    fn second_review_duplicate() {
        let (mut ws, _, reviewer, id) = seeded(3, true);
        let first = ws.start_review(&reviewer, id, now()).expect("start");
        match ws.start_review(&reviewer, id, now()) {
            Err(SsbjError::DuplicateReview { existing, .. }) => assert_eq!(existing, first.id),
            other => panic!("expected DuplicateReview, got {:?}", other),
        }
    }

    /// W2.3: Full checklist without an opinion is MissingOpinion and stores
    /// nothing; with one it submits, and every later mutation is
    /// ImmutableState.
    #[test]
    fn opinion_gate_then_terminal() {
        let (mut ws, assessor, reviewer, id) = seeded(3, true);
        let review = ws.start_review(&reviewer, id, now()).expect("start");
        for item in &ASSURANCE_ITEMS {
            ws.rate_item(&reviewer, review.id, item.code, &satisfactory(), now())
                .expect("rate");
        }
        let unsigned = ReviewConclusion {
            opinion: None,
            findings: "Scope 3 data incomplete".into(),
            recommendations: String::new(),
        };
        assert!(matches!(
            ws.submit_review(&reviewer, review.id, &unsigned, now()),
            Err(SsbjError::MissingOpinion(_))
        ));
        let stored = ws.review(&assessor, review.id).expect("review");
        assert_eq!(stored.state(), ReviewState::InProgress);
        assert_eq!(stored.opinion(), None);
        assert!(stored.findings.is_empty());

        let conclusion = ReviewConclusion {
            opinion: Some(Opinion::Qualified),
            findings: "Scope 3 data incomplete".into(),
            recommendations: "Extend supplier survey".into(),
        };
        let submitted = ws
            .submit_review(&reviewer, review.id, &conclusion, now())
            .expect("submit");
        assert_eq!(submitted.state(), ReviewState::Submitted);
        assert_eq!(submitted.opinion(), Some(Opinion::Qualified));
        assert_eq!(submitted.submitted_at, Some(now()));

        assert!(matches!(
            ws.rate_item(&reviewer, review.id, "LA-01", &satisfactory(), now()),
            Err(SsbjError::ImmutableState { .. })
        ));
        assert!(matches!(
            ws.submit_review(&reviewer, review.id, &conclusion, now()),
            Err(SsbjError::ImmutableState { .. })
        ));
    }

    /// W2.4: Item coverage is checked before the opinion.
    #[test]
    fn coverage_before_opinion() {
        let (mut ws, _, reviewer, id) = seeded(3, true);
        let review = ws.start_review(&reviewer, id, now()).expect("start");
        ws.rate_item(&reviewer, review.id, "LA-05", &satisfactory(), now())
            .expect("rate");
        match ws.submit_review(&reviewer, review.id, &ReviewConclusion::default(), now()) {
            Err(SsbjError::IncompleteReview { missing }) => {
                assert_eq!(missing.len(), 9);
                assert!(!missing.contains(&"LA-05"));
            }
            other => panic!("expected IncompleteReview, got {:?}", other),
        }
    }
}

// =============================================================================
// TIER W3: ACCESS CONTROL
// =============================================================================

mod w3_access {
    use super::*;

    /// W3.1: Only the creator edits an assessment.
    #[test]
    fn non_creator_cannot_edit() {
        let (mut ws, _, _, id) = seeded(3, false);
        let other = add_user(&mut ws, "assessor2", Role::Assessor);
        assert!(matches!(
            ws.record_score(&other, id, "GOV-01", 1, "", "", now()),
            Err(SsbjError::PermissionDenied { .. })
        ));
        assert!(matches!(
            ws.complete_assessment(&other, id, now()),
            Err(SsbjError::PermissionDenied { .. })
        ));
    }

    /// W3.2: Reviewers cannot create assessments; assessors cannot review.
    #[test]
    fn roles_are_enforced() {
        let (mut ws, assessor, reviewer, id) = seeded(3, true);
        assert!(matches!(
            ws.create_assessment(&reviewer, &fields(), now()),
            Err(SsbjError::PermissionDenied { .. })
        ));
        assert!(matches!(
            ws.start_review(&assessor, id, now()),
            Err(SsbjError::PermissionDenied { .. })
        ));
    }

    /// W3.3: Only the assigned reviewer mutates a review.
    #[test]
    fn only_assigned_reviewer() {
        let (mut ws, _, reviewer, id) = seeded(3, true);
        let other = add_user(&mut ws, "reviewer2", Role::Reviewer);
        let review = ws.start_review(&reviewer, id, now()).expect("start");
        assert!(matches!(
            ws.rate_item(&other, review.id, "LA-01", &satisfactory(), now()),
            Err(SsbjError::PermissionDenied { .. })
        ));
        assert!(matches!(
            ws.review(&other, review.id),
            Err(SsbjError::PermissionDenied { .. })
        ));
    }

    /// W3.4: Ownership is checked before lifecycle state, so a stranger
    /// touching a closed record is denied rather than told it is closed.
    #[test]
    fn ownership_checked_before_state() {
        let (mut ws, assessor, reviewer, id) = seeded(3, true);
        let other_assessor = add_user(&mut ws, "assessor2", Role::Assessor);
        assert!(matches!(
            ws.record_score(&other_assessor, id, "GOV-01", 1, "", "", now()),
            Err(SsbjError::PermissionDenied { .. })
        ));
        assert!(matches!(
            ws.record_score(&assessor, id, "GOV-01", 1, "", "", now()),
            Err(SsbjError::ImmutableState { .. })
        ));

        let review = ws.start_review(&reviewer, id, now()).expect("start");
        for item in &ASSURANCE_ITEMS {
            ws.rate_item(&reviewer, review.id, item.code, &satisfactory(), now())
                .expect("rate");
        }
        let conclusion = ReviewConclusion {
            opinion: Some(Opinion::Unqualified),
            ..ReviewConclusion::default()
        };
        ws.submit_review(&reviewer, review.id, &conclusion, now())
            .expect("submit");

        let other_reviewer = add_user(&mut ws, "reviewer2", Role::Reviewer);
        assert!(matches!(
            ws.submit_review(&other_reviewer, review.id, &conclusion, now()),
            Err(SsbjError::PermissionDenied { .. })
        ));
        assert!(matches!(
            ws.rate_item(&reviewer, review.id, "LA-01", &satisfactory(), now()),
            Err(SsbjError::ImmutableState { .. })
        ));
    }

    /// W3.5: Reviewers do not see drafts.
    #[test]
    fn reviewer_cannot_see_drafts() {
        let (ws, _, reviewer, id) = seeded(3, false);
        assert!(ws.assessment(&reviewer, id).is_err());
        assert!(ws.assessments(&reviewer).expect("list").is_empty());
    }
}

// =============================================================================
// TIER W4: AGGREGATION AND PERSISTENCE
// =============================================================================

mod w4_aggregation {
    use super::*;

    /// W4.1: Two dashboard computations over unchanged records are identical.
    #[test]
    fn dashboard_idempotent() {
        let (mut ws, assessor, reviewer, id) = seeded(4, true);
        ws.create_assessment(&assessor, &fields(), now())
            .expect("second");
        ws.start_review(&reviewer, id, now()).expect("start");
        let admin = ws.actor_for("admin").expect("admin");

        let first = ws.dashboard(&admin).expect("first");
        let second = ws.dashboard(&admin).expect("second");
        assert_eq!(first, second);
        assert_eq!(first.by_status[&LifecycleStatus::Draft], 1);
        assert_eq!(first.by_status[&LifecycleStatus::UnderReview], 1);
        assert_eq!(first.average_overall, Some(Percentage::from_tenths(800)));
    }

    /// W4.2: The gap report lists criteria scored below "Defined".
    #[test]
    fn gap_report() {
        let (mut ws, assessor, _, id) = seeded(3, false);
        ws.record_score(&assessor, id, "STR-02", 1, "", "", now())
            .expect("score");
        ws.record_score(&assessor, id, "GOV-04", 2, "", "", now())
            .expect("score");
        let report = ws.assessment_report(&assessor, id).expect("report");
        let codes: Vec<&str> = report.gaps.iter().map(|g| g.criterion.code).collect();
        assert_eq!(codes, vec!["GOV-04", "STR-02"]);
        assert_eq!(report.completion_percent, 100);
        assert_eq!(report.status, LifecycleStatus::Draft);
    }

    /// W4.3: redb-backed state survives compaction and reopen, admin included.
    #[test]
    fn redb_survives_reopen() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("ssbj.db");

        let id = {
            let mut ws = Workspace::open(&path, now()).expect("open");
            let assessor = add_user(&mut ws, "assessor1", Role::Assessor);
            let a = ws
                .create_assessment(&assessor, &fields(), now())
                .expect("create");
            for c in &CRITERIA {
                ws.record_score(&assessor, a.id, c.code, 5, "", "", now())
                    .expect("score");
            }
            ws.complete_assessment(&assessor, a.id, now())
                .expect("complete");
            let admin = ws.actor_for("admin").expect("admin");
            ws.compact(&admin).expect("compact");
            a.id
        };

        let ws = Workspace::open(&path, now()).expect("reopen");
        assert!(ws.is_persistent());
        let admin = ws.actor_for("admin").expect("admin");
        assert_eq!(ws.users(&admin).expect("users").len(), 2);
        let a = ws.assessment(&admin, id).expect("load");
        assert!(a.is_complete());
        assert_eq!(a.overall_score().expect("overall"), Percentage::FULL);
    }
}
