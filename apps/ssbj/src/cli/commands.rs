//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! JSON mode prints the same structures the HTTP API returns.

use crate::api::{
    self, AssessmentReportResponse, AssessmentSummaryJson, CatalogResponse, DashboardResponse,
    ReviewReportResponse, UserResponse,
};
use crate::config::ServerConfig;
use chrono::Utc;
use serde::Serialize;
use ssbj_core::{
    ASSURANCE_ITEMS, AssessmentId, CRITERIA, MATURITY_LEVELS, NewUser, Pillar, ReviewId, Role,
    SsbjError, Workspace,
};
use std::path::Path;

// =============================================================================
// HELPERS
// =============================================================================

/// Open (or create) the workspace at `db_path`.
pub fn open_workspace(db_path: &Path) -> Result<Workspace, SsbjError> {
    Workspace::open(db_path, Utc::now())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), SsbjError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| SsbjError::SerializationError(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn percent_or_dash(value: Option<&api::PercentageJson>) -> String {
    value.map_or_else(|| "-".to_string(), |p| format!("{}%", p.display))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: ServerConfig) -> Result<(), SsbjError> {
    let workspace = open_workspace(&config.database)?;

    println!("SSBJ Readiness Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:    {}", config.bind_address());
    println!("  Database:   {}", config.database.display());
    println!(
        "  Auth:       {}",
        if config.api_key.is_some() {
            "API key"
        } else {
            "disabled"
        }
    );
    println!(
        "  Rate limit: {}",
        match config.rate_limit {
            0 => "disabled".to_string(),
            n => format!("{}/s", n),
        }
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /catalog              - Criteria and checklist");
    println!("  POST /assessments          - Create an assessment");
    println!("  PUT  /assessments/:id/scores/:code");
    println!("  POST /assessments/:id/review");
    println!("  PUT  /reviews/:id/items/:code");
    println!("  GET  /dashboard            - Statistics");
    println!("  GET  /health               - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(workspace, config).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database holding only the default admin.
pub fn cmd_init(db_path: &Path, force: bool) -> Result<(), SsbjError> {
    if db_path.exists() {
        if !force {
            return Err(SsbjError::InvalidInput(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(db_path)
            .map_err(|e| SsbjError::IoError(format!("Cannot remove old database: {}", e)))?;
        tracing::warn!(path = %db_path.display(), "Removed existing database");
    }

    let _workspace = open_workspace(db_path)?;
    println!("Initialized new database at {}", db_path.display());
    println!("Default admin user: admin");
    Ok(())
}

// =============================================================================
// COMPACT COMMAND
// =============================================================================

/// Compact the database file (admin only).
pub fn cmd_compact(db_path: &Path, user: &str) -> Result<(), SsbjError> {
    let mut workspace = open_workspace(db_path)?;
    let actor = workspace.actor_for(user)?;
    let reclaimed = workspace.compact(&actor)?;
    tracing::info!(path = %db_path.display(), reclaimed, "Database compacted");
    if reclaimed {
        println!("Compacted {}", db_path.display());
    } else {
        println!("Nothing to reclaim in {}", db_path.display());
    }
    Ok(())
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

pub fn cmd_catalog(json_mode: bool) -> Result<(), SsbjError> {
    if json_mode {
        return print_json(&CatalogResponse::build());
    }

    println!("Disclosure Criteria ({})", CRITERIA.len());
    println!("=======================");
    for pillar in Pillar::ALL {
        println!();
        println!("{}", pillar.name());
        for c in CRITERIA.iter().filter(|c| c.pillar == pillar) {
            println!(
                "  {:<8} [{}] {} - {}",
                c.code,
                c.standard.name(),
                c.category,
                c.description
            );
        }
    }

    println!();
    println!("Assurance Checklist ({})", ASSURANCE_ITEMS.len());
    println!("=======================");
    for item in &ASSURANCE_ITEMS {
        println!("  {:<8} {} - {}", item.code, item.category, item.description);
    }

    println!();
    println!("Maturity Scale");
    println!("==============");
    for level in &MATURITY_LEVELS {
        println!("  {} {:<12} {}", level.value, level.label, level.description);
    }
    Ok(())
}

// =============================================================================
// DASHBOARD COMMAND
// =============================================================================

pub fn cmd_dashboard(db_path: &Path, user: &str, json_mode: bool) -> Result<(), SsbjError> {
    let workspace = open_workspace(db_path)?;
    let actor = workspace.actor_for(user)?;
    let stats = DashboardResponse::from(&workspace.dashboard(&actor)?);

    if json_mode {
        return print_json(&stats);
    }

    println!("SSBJ Readiness Dashboard ({})", user);
    println!("========================");
    println!("Database: {}", db_path.display());
    println!();
    println!("Assessments:     {}", stats.total_assessments);
    println!("  Draft:         {}", stats.by_status.draft);
    println!("  Complete:      {}", stats.by_status.complete);
    println!("  Under review:  {}", stats.by_status.under_review);
    println!("  Reviewed:      {}", stats.by_status.reviewed);
    println!(
        "Average maturity: {}",
        percent_or_dash(stats.average_overall.as_ref())
    );
    for pillar in &stats.average_pillars {
        println!("  {:<18} {}%", pillar.name, pillar.percentage.display);
    }
    println!();
    println!("Reviews:         {}", stats.total_reviews);
    println!("  In progress:   {}", stats.reviews_in_progress);
    println!("  Submitted:     {}", stats.reviews_submitted);
    println!("Opinions:");
    println!("  Unqualified:   {}", stats.opinions.unqualified);
    println!("  Qualified:     {}", stats.opinions.qualified);
    println!("  Adverse:       {}", stats.opinions.adverse);
    println!("  Disclaimer:    {}", stats.opinions.disclaimer);
    Ok(())
}

// =============================================================================
// USER COMMANDS
// =============================================================================

pub fn cmd_user_add(
    db_path: &Path,
    user: &str,
    json_mode: bool,
    username: &str,
    role: &str,
    full_name: &str,
    email: &str,
    department: &str,
) -> Result<(), SsbjError> {
    let mut workspace = open_workspace(db_path)?;
    let actor = workspace.actor_for(user)?;
    let fields = NewUser {
        username: username.to_string(),
        full_name: full_name.to_string(),
        email: email.to_string(),
        department: department.to_string(),
        role: role.parse::<Role>()?,
    };
    let created = workspace.create_user(&actor, &fields, Utc::now())?;
    tracing::info!(user = %created.username, role = %created.role, "User registered");

    if json_mode {
        return print_json(&UserResponse::from(&created));
    }
    println!(
        "Registered {} ({}) as {}",
        created.username, created.full_name, created.role
    );
    Ok(())
}

pub fn cmd_user_list(db_path: &Path, user: &str, json_mode: bool) -> Result<(), SsbjError> {
    let workspace = open_workspace(db_path)?;
    let actor = workspace.actor_for(user)?;
    let users: Vec<UserResponse> = workspace
        .users(&actor)?
        .iter()
        .map(UserResponse::from)
        .collect();

    if json_mode {
        return print_json(&users);
    }
    println!("ID     USERNAME             ROLE       NAME");
    for u in &users {
        println!(
            "{:<6} {:<20} {:<10} {}",
            u.id,
            u.username,
            u.role.as_str(),
            u.full_name
        );
    }
    Ok(())
}

// =============================================================================
// ASSESSMENT AND REVIEW COMMANDS
// =============================================================================

pub fn cmd_assessment_list(db_path: &Path, user: &str, json_mode: bool) -> Result<(), SsbjError> {
    let workspace = open_workspace(db_path)?;
    let actor = workspace.actor_for(user)?;
    let rows: Vec<AssessmentSummaryJson> = workspace
        .assessments(&actor)?
        .iter()
        .map(AssessmentSummaryJson::from)
        .collect();

    if json_mode {
        return print_json(&rows);
    }
    println!("ID     STATE        DONE  YEAR     ENTITY");
    for a in &rows {
        println!(
            "{:<6} {:<10} {:>5}%  {:<8} {}",
            a.id,
            a.state.as_str(),
            a.completion_percent,
            a.fiscal_year,
            a.entity_name
        );
    }
    Ok(())
}

pub fn cmd_assessment_show(
    db_path: &Path,
    user: &str,
    json_mode: bool,
    id: u64,
) -> Result<(), SsbjError> {
    let workspace = open_workspace(db_path)?;
    let actor = workspace.actor_for(user)?;
    let report =
        AssessmentReportResponse::from(&workspace.assessment_report(&actor, AssessmentId(id))?);

    if json_mode {
        return print_json(&report);
    }

    println!("{} - {} ({})", report.title, report.entity_name, report.fiscal_year);
    println!("Status:   {}", report.status);
    println!(
        "Scored:   {}/{} ({}%)",
        report.scored,
        CRITERIA.len(),
        report.completion_percent
    );
    println!("Overall:  {}", percent_or_dash(report.overall.as_ref()));
    println!();
    for pillar in &report.pillars {
        println!(
            "  {:<18} {:>2}/{:<2} {}",
            pillar.name,
            pillar.scored,
            pillar.total,
            percent_or_dash(pillar.percentage.as_ref())
        );
    }
    if !report.gaps.is_empty() {
        println!();
        println!("Gaps:");
        for gap in &report.gaps {
            println!(
                "  {:<8} {} ({}) {}",
                gap.code, gap.score, gap.maturity_label, gap.description
            );
        }
    }
    if !report.missing.is_empty() {
        println!();
        println!("Unscored: {}", report.missing.join(", "));
    }
    println!();
    println!(
        "Readiness: {}",
        report
            .readiness_counts
            .iter()
            .map(|(readiness, count)| format!("{} {}", readiness.as_str(), count))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

pub fn cmd_review_show(
    db_path: &Path,
    user: &str,
    json_mode: bool,
    id: u64,
) -> Result<(), SsbjError> {
    let workspace = open_workspace(db_path)?;
    let actor = workspace.actor_for(user)?;
    let report = ReviewReportResponse::from(&workspace.review_report(&actor, ReviewId(id))?);

    if json_mode {
        return print_json(&report);
    }

    println!(
        "Review #{} of assessment #{} - {} ({})",
        report.review_id, report.assessment_id, report.entity_name, report.fiscal_year
    );
    if let Some(name) = &report.reviewer_name {
        println!("Reviewer: {}", name);
    }
    println!("State:    {}", report.state);
    println!(
        "Opinion:  {}",
        report
            .opinion
            .map_or_else(|| "-".to_string(), |o| format!("{:?}", o))
    );
    println!(
        "Rated:    {}/{} (satisfactory {}, needs improvement {}, unsatisfactory {})",
        report.summary.rated,
        report.summary.total_items,
        report.summary.satisfactory,
        report.summary.needs_improvement,
        report.summary.unsatisfactory
    );
    println!();
    for line in &report.checklist {
        let rating = line
            .result
            .as_ref()
            .map_or_else(|| "unrated".to_string(), |r| format!("{:?}", r.rating));
        println!("  {:<8} {:<18} {}", line.code, rating, line.description);
    }
    Ok(())
}
