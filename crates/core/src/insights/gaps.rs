//! Gap Analyzer: shortfalls against fixed geographic, categorical, and
//! demographic baselines.
//!
//! Runs its own aggregation pass over the raw records, independent of the
//! geographic analyzer; only the expected-services helper is shared. Gaps
//! keep insertion order (geographic, categorical, demographic); the
//! recommendation generator's stable ordering depends on it.

use indexmap::IndexMap;

use super::geographic::expected_services_for_state;
use super::types::{
    Distribution, Gap, GapAnalysis, GapKind, GapSeverityCounts, GapTypeCounts, GrowthOpportunity,
    OpportunityKind, Severity,
};
use super::AnalyzerResult;
use crate::domain::service::or_unknown;
use crate::domain::ServiceRecord;
use crate::errors::AnalyzerError;

/// The fixed jurisdictions checked for geographic gaps.
pub(crate) const AUSTRALIAN_STATES: &[&str] =
    &["QLD", "NSW", "VIC", "WA", "SA", "TAS", "NT", "ACT"];

/// Categories every directory must carry in meaningful volume.
pub(crate) const ESSENTIAL_CATEGORIES: &[&str] =
    &["legal_aid", "mental_health", "housing", "employment", "crisis_support", "family_support"];

/// Large-population states shortlisted for growth opportunities.
const HIGH_GROWTH_STATES: &[&str] = &["NSW", "VIC", "QLD"];

/// Expected share of the directory for each essential category.
const ESSENTIAL_COVERAGE_SHARE: f64 = 0.1;

/// Youth-specific coverage below this share of the directory is a gap.
const YOUTH_COVERAGE_FLOOR: f64 = 0.7;

/// Target youth-specific share used to size the demographic gap.
const YOUTH_COVERAGE_TARGET: f64 = 0.8;

const GAP_LIMIT: usize = 20;
const OPPORTUNITY_LIMIT: usize = 10;

pub fn analyze(services: &[ServiceRecord]) -> AnalyzerResult<GapAnalysis> {
    if services.is_empty() {
        return Err(AnalyzerError::Invariant("gap analysis requires services".to_owned()));
    }

    let total = services.len();
    let mut gaps = Vec::new();

    // Every record counts here, including unlocated ones under "Unknown";
    // the fixed state allowlist is what gets compared.
    let mut state_distribution: Distribution = IndexMap::new();
    for service in services {
        let state = or_unknown(
            service.primary_location().and_then(|location| location.state_province.as_deref()),
        );
        *state_distribution.entry(state.to_owned()).or_default() += 1;
    }

    for state in AUSTRALIAN_STATES {
        let current = state_distribution.get(*state).copied().unwrap_or(0);
        let expected = expected_services_for_state(state);

        if (current as f64) < expected as f64 * 0.5 {
            gaps.push(Gap {
                kind: GapKind::Geographic,
                severity: if current == 0 { Severity::Critical } else { Severity::High },
                description: format!("Underserved state: {state}"),
                current_services: current,
                expected_services: expected,
                gap_size: expected - current,
            });
        }
    }

    let mut category_distribution: Distribution = IndexMap::new();
    for service in services {
        for category in &service.categories {
            *category_distribution.entry(category.clone()).or_default() += 1;
        }
    }

    let expected_per_category = (total as f64 * ESSENTIAL_COVERAGE_SHARE).ceil() as usize;
    for category in ESSENTIAL_CATEGORIES {
        let current = category_distribution.get(*category).copied().unwrap_or(0);

        if current < expected_per_category {
            gaps.push(Gap {
                kind: GapKind::Categorical,
                severity: if current == 0 { Severity::Critical } else { Severity::Medium },
                description: format!("Limited {category} services"),
                current_services: current,
                expected_services: expected_per_category,
                gap_size: expected_per_category - current,
            });
        }
    }

    let youth_services = services.iter().filter(|service| service.youth_specific).count();
    if (youth_services as f64) < total as f64 * YOUTH_COVERAGE_FLOOR {
        let expected = (total as f64 * YOUTH_COVERAGE_TARGET).ceil() as usize;
        gaps.push(Gap {
            kind: GapKind::Demographic,
            severity: Severity::High,
            description: "Insufficient youth-specific services".to_owned(),
            current_services: youth_services,
            expected_services: expected,
            gap_size: expected - youth_services,
        });
    }

    let opportunities = identify_growth_opportunities(&state_distribution);

    let mut gaps_by_type = GapTypeCounts::default();
    let mut gaps_by_severity = GapSeverityCounts::default();
    for gap in &gaps {
        match gap.kind {
            GapKind::Geographic => gaps_by_type.geographic += 1,
            GapKind::Categorical => gaps_by_type.categorical += 1,
            GapKind::Demographic => gaps_by_type.demographic += 1,
        }
        match gap.severity {
            Severity::Critical => gaps_by_severity.critical += 1,
            Severity::High => gaps_by_severity.high += 1,
            Severity::Medium => gaps_by_severity.medium += 1,
            Severity::Low => {}
        }
    }

    let gap_analysis_insights = generate_gap_insights(&gaps, &gaps_by_type, &gaps_by_severity);

    let total_gaps = gaps.len();
    gaps.truncate(GAP_LIMIT);

    Ok(GapAnalysis {
        total_gaps,
        gaps_by_type,
        gaps_by_severity,
        gaps,
        opportunities,
        gap_analysis_insights,
    })
}

/// High-population states still short of their expected baseline.
fn identify_growth_opportunities(state_distribution: &Distribution) -> Vec<GrowthOpportunity> {
    let mut opportunities: Vec<GrowthOpportunity> = HIGH_GROWTH_STATES
        .iter()
        .filter(|state| {
            state_distribution.get(**state).copied().unwrap_or(0)
                < expected_services_for_state(state)
        })
        .map(|state| GrowthOpportunity {
            kind: OpportunityKind::MarketExpansion,
            description: format!("High potential for growth in {state}"),
            estimated_impact: "high".to_owned(),
            reasoning: "Large population with service gaps".to_owned(),
        })
        .collect();

    opportunities.truncate(OPPORTUNITY_LIMIT);
    opportunities
}

fn generate_gap_insights(
    gaps: &[Gap],
    gaps_by_type: &GapTypeCounts,
    gaps_by_severity: &GapSeverityCounts,
) -> Vec<String> {
    let mut insights = Vec::new();

    if gaps_by_severity.critical > 0 {
        insights.push(format!(
            "{} critical service gaps require immediate attention",
            gaps_by_severity.critical
        ));
    }
    if gaps_by_type.geographic > 0 {
        insights.push(format!("{} states/territories are underserved", gaps_by_type.geographic));
    }
    if gaps_by_type.categorical > 0 {
        insights.push(format!("{} service categories need expansion", gaps_by_type.categorical));
    }

    let total_gap_size: usize = gaps.iter().map(|gap| gap.gap_size).sum();
    insights.push(format!("Total gap size: {total_gap_size} additional services needed"));

    insights
}
