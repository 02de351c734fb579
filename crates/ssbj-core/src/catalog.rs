//! # Criteria Catalog
//!
//! The fixed SSBJ reference data: 22 gap-assessment criteria grouped into
//! four pillars, the 10-item limited-assurance checklist, and the maturity
//! scale labels.
//!
//! The tables are `static` and never mutated after the binary is built, so
//! they are shared across requests without synchronization.

use crate::types::{Pillar, Standard};
use serde::Serialize;

/// One gap-assessment criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriterionDefinition {
    pub code: &'static str,
    pub pillar: Pillar,
    pub category: &'static str,
    pub standard: Standard,
    pub description: &'static str,
    /// What good practice looks like when scoring this criterion.
    pub guidance: &'static str,
    /// What a limited-assurance reviewer looks for.
    pub assurance_focus: &'static str,
}

/// One limited-assurance checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssuranceItemDefinition {
    pub code: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub guidance: &'static str,
}

/// Label and meaning of one maturity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaturityLevel {
    pub value: u8,
    pub label: &'static str,
    pub description: &'static str,
}

const fn criterion(
    code: &'static str,
    pillar: Pillar,
    category: &'static str,
    standard: Standard,
    description: &'static str,
    guidance: &'static str,
    assurance_focus: &'static str,
) -> CriterionDefinition {
    CriterionDefinition {
        code,
        pillar,
        category,
        standard,
        description,
        guidance,
        assurance_focus,
    }
}

const fn item(
    code: &'static str,
    category: &'static str,
    description: &'static str,
    guidance: &'static str,
) -> AssuranceItemDefinition {
    AssuranceItemDefinition {
        code,
        category,
        description,
        guidance,
    }
}

// =============================================================================
// GAP-ASSESSMENT CRITERIA
// =============================================================================

/// All gap-assessment criteria, in catalog order.
pub static CRITERIA: [CriterionDefinition; crate::primitives::CRITERION_COUNT] = [
    // GOVERNANCE
    criterion(
        "GOV-01",
        Pillar::Governance,
        "Board Oversight",
        Standard::General,
        "Disclose the governance body(ies) or individual(s) responsible for oversight of sustainability-related risks and opportunities.",
        "Identify specific board committees or members with sustainability oversight responsibilities. Document their mandate, authority, and reporting lines.",
        "Evidence of formal board mandate, committee terms of reference, and documented oversight activities.",
    ),
    criterion(
        "GOV-02",
        Pillar::Governance,
        "Board Oversight",
        Standard::General,
        "Describe how the governance body's sustainability responsibilities are reflected in terms of reference, board mandates and related policies.",
        "Ensure board charters, committee mandates, and corporate governance policies explicitly reference sustainability oversight responsibilities.",
        "Documented policies and terms of reference that explicitly include sustainability. Evidence of regular review and updates.",
    ),
    criterion(
        "GOV-03",
        Pillar::Governance,
        "Board Competence",
        Standard::General,
        "Describe how the governance body ensures appropriate skills and competencies are available to oversee sustainability strategies.",
        "Document board member qualifications related to sustainability. Establish training programs for governance bodies on sustainability topics.",
        "Board skills matrix, training records, external advisor engagements related to sustainability.",
    ),
    criterion(
        "GOV-04",
        Pillar::Governance,
        "Management Role",
        Standard::General,
        "Describe management's role in the governance processes, controls and procedures used to monitor sustainability-related risks and opportunities.",
        "Define management roles with sustainability responsibilities. Establish internal sustainability committees or working groups with clear reporting to the board.",
        "Organizational charts, role descriptions, evidence of management reporting to the board on sustainability matters.",
    ),
    criterion(
        "GOV-05",
        Pillar::Governance,
        "Management Role",
        Standard::Climate,
        "Disclose how climate-related risks and opportunities are factored into management's decision-making, including dedicated climate roles or committees.",
        "Establish climate-specific roles or integrate climate considerations into existing management processes. Document how climate factors influence capital allocation and strategic decisions.",
        "Evidence of climate considerations in management meeting minutes, investment decisions, and strategic planning documents.",
    ),
    // STRATEGY
    criterion(
        "STR-01",
        Pillar::Strategy,
        "Risks & Opportunities Identification",
        Standard::General,
        "Disclose the sustainability-related risks and opportunities that could reasonably be expected to affect the entity's prospects.",
        "Conduct a comprehensive assessment of sustainability-related risks and opportunities across short, medium, and long-term horizons. Consider both financial and operational impacts.",
        "Documented risk and opportunity register, methodology for identification, and time horizons applied.",
    ),
    criterion(
        "STR-02",
        Pillar::Strategy,
        "Business Model Impact",
        Standard::General,
        "Describe the current and anticipated effects of sustainability-related risks and opportunities on the business model and value chain.",
        "Map sustainability risks and opportunities to specific elements of the business model (inputs, activities, outputs, outcomes). Assess value chain dependencies and impacts.",
        "Value chain mapping, documented business model impact assessment, evidence of stakeholder engagement in the assessment.",
    ),
    criterion(
        "STR-03",
        Pillar::Strategy,
        "Financial Impact",
        Standard::General,
        "Describe the current and anticipated effects of sustainability-related risks and opportunities on financial position, performance and cash flows.",
        "Quantify financial impacts where possible. Use scenario analysis to assess potential future impacts. Connect sustainability risks to financial statement line items.",
        "Financial impact quantification methodology, assumptions used, connection to financial planning processes.",
    ),
    criterion(
        "STR-04",
        Pillar::Strategy,
        "Climate Scenario Analysis",
        Standard::Climate,
        "Describe climate-related scenario analysis, including the scenarios used and the resilience of the entity's strategy.",
        "Use at least two scenarios including one consistent with 1.5°C. Document assumptions, time horizons, and analytical approach. Assess both physical and transition risks.",
        "Scenario selection rationale, methodology documentation, evidence of board/management review of scenario results.",
    ),
    criterion(
        "STR-05",
        Pillar::Strategy,
        "Transition Plan",
        Standard::Climate,
        "Disclose the climate-related transition plan, including targets and the actions to achieve them.",
        "Document a credible transition plan with specific milestones, capital expenditure plans, and timelines. Align with the entity's overall strategy and financial planning.",
        "Documented transition plan, evidence of board approval, integration with capital budgeting, progress tracking mechanisms.",
    ),
    criterion(
        "STR-06",
        Pillar::Strategy,
        "Strategy Resilience",
        Standard::General,
        "Describe the resilience of the strategy and business model to sustainability-related risks, considering the capacity to adapt.",
        "Assess the adaptability of the business model under different scenarios. Identify key dependencies and vulnerabilities. Document response strategies.",
        "Documented resilience assessment, evidence of strategic review incorporating sustainability scenarios.",
    ),
    // RISK MANAGEMENT
    criterion(
        "RSK-01",
        Pillar::RiskManagement,
        "Risk Identification Process",
        Standard::General,
        "Describe the processes used to identify sustainability-related risks and opportunities.",
        "Establish a formal process for identifying sustainability risks, including environmental scanning, stakeholder engagement, and materiality assessment. Define roles and frequencies.",
        "Documented risk identification methodology, evidence of regular execution, stakeholder engagement records.",
    ),
    criterion(
        "RSK-02",
        Pillar::RiskManagement,
        "Risk Assessment Process",
        Standard::General,
        "Describe the processes used to assess, prioritize and monitor sustainability-related risks.",
        "Use consistent criteria for assessing likelihood and impact. Prioritize risks based on severity. Establish monitoring and escalation procedures.",
        "Risk assessment criteria, risk registers with prioritization, evidence of monitoring activities and escalation.",
    ),
    criterion(
        "RSK-03",
        Pillar::RiskManagement,
        "Risk Integration",
        Standard::General,
        "Describe how sustainability-related risk management is integrated into the entity's overall risk management.",
        "Integrate sustainability risks into the enterprise risk management (ERM) framework. Ensure sustainability risks are considered alongside financial and operational risks.",
        "ERM framework documentation showing sustainability integration, evidence of combined risk reporting.",
    ),
    criterion(
        "RSK-04",
        Pillar::RiskManagement,
        "Climate Risk Process",
        Standard::Climate,
        "Describe how climate-related physical and transition risks are identified, assessed and managed.",
        "Conduct specific climate risk assessments covering both physical risks (acute and chronic) and transition risks (policy, technology, market, reputation). Use recognized frameworks.",
        "Climate-specific risk assessment documentation, physical and transition risk categorization, evidence of management response plans.",
    ),
    criterion(
        "RSK-05",
        Pillar::RiskManagement,
        "Internal Controls",
        Standard::General,
        "Establish internal controls over sustainability-related data collection, processing and reporting.",
        "Design and implement controls over sustainability data comparable to financial reporting controls. Include data validation, reconciliation, and review procedures.",
        "Documented control framework, evidence of control testing, data quality procedures, segregation of duties.",
    ),
    // METRICS & TARGETS
    criterion(
        "MET-01",
        Pillar::MetricsAndTargets,
        "GHG Emissions - Scope 1",
        Standard::Climate,
        "Disclose absolute gross Scope 1 greenhouse gas emissions.",
        "Measure and report Scope 1 emissions using GHG Protocol or equivalent methodology. Include all material emission sources. Use appropriate emission factors.",
        "Emission calculation methodology, source data, emission factors used, completeness of boundary, data quality checks.",
    ),
    criterion(
        "MET-02",
        Pillar::MetricsAndTargets,
        "GHG Emissions - Scope 2",
        Standard::Climate,
        "Disclose absolute gross Scope 2 greenhouse gas emissions (location-based and, if applicable, market-based).",
        "Report both location-based and market-based Scope 2 emissions. Use appropriate grid emission factors and contractual instruments.",
        "Location-based and market-based calculations, grid factors, evidence of energy consumption data, contractual instruments.",
    ),
    criterion(
        "MET-03",
        Pillar::MetricsAndTargets,
        "GHG Emissions - Scope 3",
        Standard::Climate,
        "Disclose absolute gross Scope 3 greenhouse gas emissions and the categories included.",
        "Identify material Scope 3 categories. Use recognized estimation methodologies. Disclose data sources, assumptions, and limitations for each category.",
        "Category relevance assessment, calculation methodologies by category, data sources, assumptions documentation, year-over-year consistency.",
    ),
    criterion(
        "MET-04",
        Pillar::MetricsAndTargets,
        "Climate Targets",
        Standard::Climate,
        "Disclose climate-related targets, including emission reduction targets, base year, target year and interim milestones.",
        "Set science-based or otherwise credible targets. Define clear base years, methodologies, and milestones. Report progress against targets annually.",
        "Target-setting methodology, base year data, progress tracking, evidence of board-approved targets.",
    ),
    criterion(
        "MET-05",
        Pillar::MetricsAndTargets,
        "Industry Metrics",
        Standard::Climate,
        "Disclose industry-specific metrics relevant to the entity's sector as applicable.",
        "Identify and report sector-specific sustainability metrics. Consider SASB industry standards as guidance for relevant metrics.",
        "Industry metric selection rationale, calculation methodology, data sources, comparability with peers.",
    ),
    criterion(
        "MET-06",
        Pillar::MetricsAndTargets,
        "Sustainability Metrics",
        Standard::General,
        "Disclose the metrics used to measure and monitor sustainability-related risks and opportunities and performance against targets.",
        "Define KPIs for material sustainability topics. Ensure metrics are measurable, comparable, and verifiable. Track and report on progress.",
        "KPI definitions, measurement methodology, data collection processes, trend analysis, target progress reporting.",
    ),
];

// =============================================================================
// LIMITED-ASSURANCE CHECKLIST
// =============================================================================

/// All assurance checklist items, in checklist order.
pub static ASSURANCE_ITEMS: [AssuranceItemDefinition; crate::primitives::ASSURANCE_ITEM_COUNT] = [
    item(
        "LA-01",
        "Engagement Planning",
        "Defined scope and subject matter for the limited assurance engagement.",
        "Clearly define what disclosures are subject to assurance, the criteria used (SSBJ standards), and the reporting period.",
    ),
    item(
        "LA-02",
        "Internal Controls",
        "Internal controls over sustainability reporting are designed and operating effectively.",
        "Document the control environment for sustainability data. Include entity-level controls and process-level controls over data collection and reporting.",
    ),
    item(
        "LA-03",
        "Data Collection",
        "Sustainability data collection processes are systematic, documented and repeatable.",
        "Establish clear data collection procedures, ownership, timelines, and quality checks at each stage of the data pipeline.",
    ),
    item(
        "LA-04",
        "Evidence & Documentation",
        "Sufficient and appropriate evidence exists to support sustainability disclosures.",
        "Maintain an audit trail for all reported data. Retain source documents, calculations, assumptions, and approvals for the assurance period.",
    ),
    item(
        "LA-05",
        "GHG Data Verification",
        "GHG emission calculations are accurate, complete and use appropriate methodologies and emission factors.",
        "Verify completeness of emission sources, accuracy of activity data, appropriateness of emission factors, and correctness of calculations.",
    ),
    item(
        "LA-06",
        "Consistency & Comparability",
        "Reporting methodologies are applied consistently across periods and disclosures are comparable.",
        "Document and consistently apply measurement methodologies. Disclose and explain any changes in methodology, boundary, or estimation techniques.",
    ),
    item(
        "LA-07",
        "Third-Party Data",
        "Third-party and estimated data used in disclosures is appropriately validated and disclosed.",
        "Identify all third-party data sources. Assess reliability, validate key data points, and disclose the extent of estimation and third-party reliance.",
    ),
    item(
        "LA-08",
        "Management Representations",
        "Management provides written representations on the completeness and accuracy of sustainability information.",
        "Obtain formal management representations covering responsibility for disclosures, completeness of information, and accuracy of data provided.",
    ),
    item(
        "LA-09",
        "Process Maturity",
        "Sustainability reporting processes demonstrate sufficient maturity for limited assurance.",
        "Assess whether processes are formalized, consistently applied, and subject to regular review. Limited assurance typically requires at least a 'Defined' maturity level.",
    ),
    item(
        "LA-10",
        "Disclosure Completeness",
        "All required SSBJ disclosures are addressed with sufficient detail and transparency.",
        "Cross-reference disclosures against the full SSBJ requirement checklist. Ensure all mandatory items are addressed with appropriate qualitative and quantitative information.",
    ),
];

// =============================================================================
// MATURITY SCALE
// =============================================================================

/// Labels for maturity levels `0..=5`.
pub static MATURITY_LEVELS: [MaturityLevel; 6] = [
    MaturityLevel {
        value: 0,
        label: "Not Started",
        description: "No action taken on this requirement.",
    },
    MaturityLevel {
        value: 1,
        label: "Initial / Ad-hoc",
        description: "Some awareness but no formal processes. Activities are ad-hoc and reactive.",
    },
    MaturityLevel {
        value: 2,
        label: "Developing",
        description: "Basic processes exist but are inconsistent. Some documentation in place.",
    },
    MaturityLevel {
        value: 3,
        label: "Defined",
        description: "Formal processes documented and consistently applied. Clear ownership assigned.",
    },
    MaturityLevel {
        value: 4,
        label: "Managed",
        description: "Processes are monitored and measured. Regular review and improvement cycles.",
    },
    MaturityLevel {
        value: 5,
        label: "Optimized",
        description: "Continuous improvement embedded. Leading practice with robust controls.",
    },
];

// =============================================================================
// LOOKUPS
// =============================================================================

/// Look up a criterion by code.
#[must_use]
pub fn criterion_by_code(code: &str) -> Option<&'static CriterionDefinition> {
    CRITERIA.iter().find(|c| c.code == code)
}

/// Look up an assurance item by code.
#[must_use]
pub fn assurance_item_by_code(code: &str) -> Option<&'static AssuranceItemDefinition> {
    ASSURANCE_ITEMS.iter().find(|i| i.code == code)
}

/// Criteria belonging to one pillar, in catalog order.
pub fn criteria_in(pillar: Pillar) -> impl Iterator<Item = &'static CriterionDefinition> {
    CRITERIA.iter().filter(move |c| c.pillar == pillar)
}

/// Label for a maturity value, if it is on the scale.
#[must_use]
pub fn maturity_label(value: u8) -> Option<&'static str> {
    MATURITY_LEVELS.get(value as usize).map(|l| l.label)
}
