//! # ssbj-core
//!
//! The deterministic readiness engine for SSBJ sustainability disclosures.
//!
//! This crate holds everything that decides an outcome:
//! - the fixed criteria catalog and assurance checklist
//! - maturity scoring per pillar, category and overall
//! - the assessment and review lifecycles as explicit state tables
//! - role-based access checks
//! - dashboard and report aggregation
//! - record storage (in-memory or redb)
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Integer arithmetic only; percentages are carried as tenths
//! - Clock-free: callers pass the timestamp of every mutation
//! - Trusts the `Actor` it is given; authentication lives in the app layer

// =============================================================================
// MODULES
// =============================================================================

pub mod access;
pub mod catalog;
pub mod primitives;
pub mod report;
pub mod scorer;
pub mod storage;
pub mod types;
pub mod users;
pub mod workflow;
pub mod workspace;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Actor, AssessmentId, AssuranceRating, MaturityScore, Opinion, Percentage, Pillar, ReviewId,
    Role, SsbjError, Standard, UserId,
};

// =============================================================================
// RE-EXPORTS: Catalog and Scoring
// =============================================================================

pub use catalog::{
    ASSURANCE_ITEMS, AssuranceItemDefinition, CRITERIA, CriterionDefinition, MATURITY_LEVELS,
    MaturityLevel,
};
pub use scorer::{Gap, Readiness, classify_readiness, compute_overall_score, compute_pillar_scores};

// =============================================================================
// RE-EXPORTS: Workflow
// =============================================================================

pub use access::Operation;
pub use report::{
    AssessmentReport, CriterionReadiness, DashboardStats, ReviewReport, ReviewSummary,
};
pub use storage::{MemoryStore, RecordStore, RedbStore};
pub use users::{NewUser, User};
pub use workflow::{
    Assessment, AssessmentDraft, AssessmentState, AssuranceItemResult, CriterionScore,
    LifecycleStatus, Review, ReviewConclusion, ReviewState,
};
pub use workspace::{ItemRating, StorageBackend, Workspace};
