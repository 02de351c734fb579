//! # Access Control
//!
//! Role-based permission checks, evaluated before every workflow transition.
//!
//! Roles do not get their own types. A single table maps `(role, operation)`
//! to allow/deny, and ownership (creator or assigned reviewer) is checked
//! separately by the workflow once the role check has passed.

use crate::types::{Actor, Role, SsbjError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operations subject to permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CreateAssessment,
    EditAssessment,
    ViewAssessment,
    StartReview,
    EditReview,
    ViewReview,
    ViewDashboard,
    ManageUsers,
    MaintainStorage,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::CreateAssessment => "create assessments",
            Operation::EditAssessment => "edit this assessment",
            Operation::ViewAssessment => "view this assessment",
            Operation::StartReview => "start reviews",
            Operation::EditReview => "edit this review",
            Operation::ViewReview => "view this review",
            Operation::ViewDashboard => "view the dashboard",
            Operation::ManageUsers => "manage users",
            Operation::MaintainStorage => "maintain storage",
        };
        f.write_str(text)
    }
}

/// Whether `role` may perform `operation` at all.
#[must_use]
pub fn is_allowed(role: Role, operation: Operation) -> bool {
    use Operation::*;
    match role {
        Role::Admin => true,
        Role::Assessor => matches!(
            operation,
            CreateAssessment | EditAssessment | ViewAssessment | ViewReview | ViewDashboard
        ),
        Role::Reviewer => matches!(
            operation,
            ViewAssessment | StartReview | EditReview | ViewReview | ViewDashboard
        ),
    }
}

/// Check the role table for `actor`.
pub fn authorize(actor: &Actor, operation: Operation) -> Result<(), SsbjError> {
    if is_allowed(actor.role, operation) {
        Ok(())
    } else {
        Err(SsbjError::PermissionDenied {
            role: actor.role,
            operation,
        })
    }
}

/// Check that `actor` owns the record (its creator or assigned reviewer).
pub fn ensure_owner(actor: &Actor, owner: UserId, operation: Operation) -> Result<(), SsbjError> {
    if actor.id == owner {
        Ok(())
    } else {
        Err(SsbjError::PermissionDenied {
            role: actor.role,
            operation,
        })
    }
}
