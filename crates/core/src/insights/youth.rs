//! Youth-Focus Analyzer: age-range coverage and youth-specific metrics.

use indexmap::IndexMap;

use super::types::{
    Distribution, YouthFocusAnalysis, YouthJusticeAlignment, YouthServiceMetrics,
};
use super::{round1, sort_and_limit, AnalyzerResult};
use crate::domain::ServiceRecord;
use crate::errors::AnalyzerError;

/// Default age bounds applied when a record carries none. A boundless
/// service therefore always counts as age-appropriate.
const DEFAULT_MINIMUM_AGE: u32 = 0;
const DEFAULT_MAXIMUM_AGE: u32 = 25;

/// Categories every youth directory needs in youth-specific form.
const CRITICAL_YOUTH_CATEGORIES: &[&str] =
    &["legal_aid", "mental_health", "housing", "employment"];

/// Categories that mark a youth-specific service as justice-aligned.
const ALIGNMENT_CATEGORIES: &[&str] = &["legal_aid", "youth_justice", "court_support"];

const AGE_RANGE_LIMIT: usize = 10;
const YOUTH_CATEGORY_LIMIT: usize = 15;

pub fn analyze(services: &[ServiceRecord]) -> AnalyzerResult<YouthFocusAnalysis> {
    if services.is_empty() {
        return Err(AnalyzerError::Invariant("youth focus analysis requires services".to_owned()));
    }

    let mut youth_specific = 0;
    let mut age_appropriate = 0;
    let mut universal_access = 0;
    let mut transitional_support = 0;
    let mut age_distribution: Distribution = IndexMap::new();
    let mut youth_categories: Distribution = IndexMap::new();

    for service in services {
        if service.youth_specific {
            youth_specific += 1;

            for category in &service.categories {
                *youth_categories.entry(category.clone()).or_default() += 1;
            }
        }

        let minimum = service.minimum_age.unwrap_or(DEFAULT_MINIMUM_AGE);
        let maximum = service.maximum_age.unwrap_or(DEFAULT_MAXIMUM_AGE);

        if maximum <= 25 {
            age_appropriate += 1;
        }
        if minimum <= 12 && maximum >= 24 {
            universal_access += 1;
        }
        if minimum <= 18 && maximum >= 21 {
            transitional_support += 1;
        }

        *age_distribution.entry(format!("{minimum}-{maximum}")).or_default() += 1;
    }

    let total = services.len();

    let youth_service_gaps =
        identify_youth_gaps(youth_specific, transitional_support, total, &youth_categories);
    let youth_justice_alignment = assess_justice_alignment(services);

    Ok(YouthFocusAnalysis {
        youth_service_metrics: YouthServiceMetrics {
            youth_specific_count: youth_specific,
            youth_specific_rate: round1(youth_specific as f64 / total as f64 * 100.0),
            age_appropriate_count: age_appropriate,
            universal_access_count: universal_access,
            transitional_support_count: transitional_support,
        },
        age_range_distribution: sort_and_limit(&age_distribution, AGE_RANGE_LIMIT),
        youth_category_distribution: sort_and_limit(&youth_categories, YOUTH_CATEGORY_LIMIT),
        youth_service_gaps,
        youth_justice_alignment,
    })
}

fn identify_youth_gaps(
    youth_specific: usize,
    transitional_support: usize,
    total: usize,
    youth_categories: &Distribution,
) -> Vec<String> {
    let mut gaps = Vec::new();

    if (youth_specific as f64) < total as f64 * 0.8 {
        gaps.push("Insufficient youth-specific service designation".to_owned());
    }

    if (transitional_support as f64) < youth_specific as f64 * 0.6 {
        gaps.push("Limited transitional support services (18-21 age group)".to_owned());
    }

    for category in CRITICAL_YOUTH_CATEGORIES {
        if youth_categories.get(*category).copied().unwrap_or(0) < 3 {
            gaps.push(format!("Limited youth-specific {category} services"));
        }
    }

    gaps
}

fn assess_justice_alignment(services: &[ServiceRecord]) -> YouthJusticeAlignment {
    let aligned_services = services
        .iter()
        .filter(|service| {
            service.youth_specific
                && service
                    .categories
                    .iter()
                    .any(|category| ALIGNMENT_CATEGORIES.contains(&category.as_str()))
        })
        .count();

    YouthJusticeAlignment {
        aligned_services,
        alignment_rate: round1(aligned_services as f64 / services.len() as f64 * 100.0),
        recommendation: if aligned_services < 10 {
            "Increase youth justice specific services".to_owned()
        } else {
            "Maintain current youth justice focus".to_owned()
        },
    }
}
