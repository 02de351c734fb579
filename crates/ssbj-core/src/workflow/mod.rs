//! # Workflow Module
//!
//! The assessment and review lifecycles.
//!
//! Every mutating method follows the same order: role check, ownership
//! check, state-table lookup, input validation, then mutation. A failed
//! check leaves the record untouched. A non-owner is therefore refused with
//! `PermissionDenied` even when the record is already closed.

mod assessment;
pub mod fsm;
mod review;

pub use assessment::{Assessment, AssessmentDraft, CriterionScore};
pub use fsm::{AssessmentEvent, AssessmentState, LifecycleStatus, ReviewEvent, ReviewState};
pub use review::{AssuranceItemResult, Review, ReviewConclusion};

use crate::primitives::{MAX_NAME_LENGTH, MAX_TEXT_LENGTH};
use crate::types::SsbjError;

/// Trim and bound a required short field (title, entity name, ...).
pub(crate) fn required_name(field: &str, value: &str) -> Result<String, SsbjError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SsbjError::InvalidInput(format!("{} is required", field)));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(SsbjError::InvalidInput(format!(
            "{} length {} exceeds maximum {} bytes",
            field,
            trimmed.len(),
            MAX_NAME_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

/// Bound an optional free-text field (evidence, notes, findings, ...).
pub(crate) fn free_text(field: &str, value: &str) -> Result<String, SsbjError> {
    if value.len() > MAX_TEXT_LENGTH {
        return Err(SsbjError::InvalidInput(format!(
            "{} length {} exceeds maximum {} bytes",
            field,
            value.len(),
            MAX_TEXT_LENGTH
        )));
    }
    Ok(value.to_string())
}
