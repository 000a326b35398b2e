//! Category Analyzer: distribution, co-occurrence, and diversity.

use indexmap::IndexMap;

use super::types::{
    CategoryAnalysis, CategoryCooccurrence, CategoryGap, Distribution, Severity,
};
use super::{round1, sort_and_limit, top_entry, AnalyzerResult};
use crate::domain::ServiceRecord;
use crate::errors::AnalyzerError;

/// Categories a complete directory is expected to carry.
pub(crate) const EXPECTED_CATEGORIES: &[&str] = &[
    "legal_aid",
    "mental_health",
    "housing",
    "employment",
    "education_support",
    "drug_alcohol",
    "crisis_support",
    "family_support",
    "cultural_support",
    "disability_support",
];

/// An expected category with fewer occurrences than this is a gap.
const CATEGORY_GAP_MINIMUM: usize = 5;

const DISTRIBUTION_LIMIT: usize = 20;
const COOCCURRENCE_LIMIT: usize = 10;

pub fn analyze(services: &[ServiceRecord]) -> AnalyzerResult<CategoryAnalysis> {
    if services.is_empty() {
        return Err(AnalyzerError::Invariant("category analysis requires services".to_owned()));
    }

    let mut category_count: Distribution = IndexMap::new();
    let mut cooccurrence: IndexMap<(String, String), usize> = IndexMap::new();

    for service in services {
        for category in &service.categories {
            *category_count.entry(category.clone()).or_default() += 1;
        }

        // Every unordered pair within one service's category set counts
        // once; the key is sorted so (a, b) and (b, a) accumulate together.
        for (offset, category_a) in service.categories.iter().enumerate() {
            for category_b in &service.categories[offset + 1..] {
                let mut pair = [category_a.clone(), category_b.clone()];
                pair.sort();
                let [first, second] = pair;
                *cooccurrence.entry((first, second)).or_default() += 1;
            }
        }
    }

    let total_services = services.len();

    let mut cooccurrence_entries: Vec<(&(String, String), usize)> =
        cooccurrence.iter().map(|(pair, count)| (pair, *count)).collect();
    cooccurrence_entries.sort_by(|a, b| b.1.cmp(&a.1));
    let top_cooccurrences: Vec<CategoryCooccurrence> = cooccurrence_entries
        .iter()
        .take(COOCCURRENCE_LIMIT)
        .map(|((first, second), count)| CategoryCooccurrence {
            categories: vec![first.clone(), second.clone()],
            cooccurrence_count: *count,
            percentage: round1(*count as f64 / total_services as f64 * 100.0),
        })
        .collect();

    let category_gaps = identify_category_gaps(&category_count);
    let diversity_index = diversity_index(&category_count, total_services)?;

    let total_assignments: usize = category_count.values().sum();
    let category_insights = vec![
        match top_entry(&category_count) {
            Some((category, count)) => {
                format!("Most common category: {category} ({count} services)")
            }
            None => "Most common category: none (0 services)".to_owned(),
        },
        format!("{} category combinations found", cooccurrence.len()),
        format!(
            "Average categories per service: {:.1}",
            total_assignments as f64 / total_services as f64
        ),
    ];

    Ok(CategoryAnalysis {
        total_categories: category_count.len(),
        category_distribution: sort_and_limit(&category_count, DISTRIBUTION_LIMIT),
        top_cooccurrences,
        category_gaps,
        diversity_index,
        category_insights,
    })
}

/// Expected categories with fewer than five occurrences, critical at zero.
fn identify_category_gaps(category_count: &Distribution) -> Vec<CategoryGap> {
    let mut gaps = Vec::new();

    for category in EXPECTED_CATEGORIES {
        let current_count = category_count.get(*category).copied().unwrap_or(0);
        if current_count < CATEGORY_GAP_MINIMUM {
            gaps.push(CategoryGap {
                category: (*category).to_owned(),
                current_count,
                severity: if current_count == 0 { Severity::Critical } else { Severity::Low },
            });
        }
    }

    gaps
}

/// Shannon entropy `-Σ p·ln p` with proportions over the service count.
/// Proportions need not sum to 1: a service carrying several categories
/// contributes to several terms.
fn diversity_index(category_count: &Distribution, total_services: usize) -> AnalyzerResult<f64> {
    let index: f64 = category_count
        .values()
        .map(|count| {
            let proportion = *count as f64 / total_services as f64;
            -(proportion * proportion.ln())
        })
        .sum();

    if !index.is_finite() {
        return Err(AnalyzerError::Invariant("non-finite diversity index".to_owned()));
    }

    Ok(index)
}
