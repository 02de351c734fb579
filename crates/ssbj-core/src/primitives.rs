//! # Fixed Constants
//!
//! Compiled-in limits and thresholds. These are immutable at runtime.

/// Highest maturity level ("Optimized").
pub const MAX_MATURITY: u8 = 5;

/// Scores strictly below this level ("Defined") are reported as gaps.
pub const GAP_THRESHOLD: u8 = 3;

/// Scores at or above this level ("Managed") are assurance-ready.
pub const READY_THRESHOLD: u8 = 4;

/// Number of gap-assessment criteria in the catalog.
pub const CRITERION_COUNT: usize = 22;

/// Number of limited-assurance checklist items.
pub const ASSURANCE_ITEM_COUNT: usize = 10;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for titles, entity names and fiscal-year labels.
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length for usernames.
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Maximum length for evidence, notes, findings and recommendations (64KB).
pub const MAX_TEXT_LENGTH: usize = 65536;

/// Username of the administrator seeded into a fresh store.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
