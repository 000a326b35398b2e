//! Service insights and connection mapping engine.
//!
//! A single-pass batch pipeline over an in-memory service directory: infers
//! a multi-relational connection graph, aggregates geographic/categorical
//! coverage and data quality, detects service gaps against fixed baselines,
//! derives network health, and emits a priority-ranked recommendation list.
//! Every analyzer is a pure function over the immutable input slice; the
//! orchestrator in [`engine`] sequences them and assembles the report.

pub mod categories;
pub mod connections;
pub mod engine;
pub mod gaps;
pub mod geographic;
pub mod network;
pub mod quality;
pub mod recommendations;
pub mod types;
pub mod youth;

pub use engine::InsightsEngine;
pub use types::*;

use indexmap::IndexMap;

use crate::errors::AnalyzerError;

/// Result type for individual analyzers.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Edge strength for two services run by the same organization.
pub const ORGANIZATIONAL_STRENGTH: f64 = 0.9;

/// Edge strength for two services whose first locations share an area.
pub const GEOGRAPHIC_STRENGTH: f64 = 0.6;

/// Minimum Jaccard similarity of category sets for a categorical edge.
/// Fixed; intentionally independent of `EngineConfig::similarity_threshold`
/// (see that field's documentation).
pub const CATEGORY_OVERLAP_THRESHOLD: f64 = 0.5;

/// Edges above this strength count as "strong" for the simplified
/// clustering coefficient.
pub const STRONG_CONNECTION_THRESHOLD: f64 = 0.7;

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Orders a distribution by descending count (stable, so equal counts keep
/// first-appearance order) and keeps the top `limit` entries.
pub(crate) fn sort_and_limit(
    distribution: &IndexMap<String, usize>,
    limit: usize,
) -> IndexMap<String, usize> {
    let mut entries: Vec<(String, usize)> =
        distribution.iter().map(|(key, count)| (key.clone(), *count)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.into_iter().take(limit).collect()
}

/// First strictly-greatest entry of a distribution, in insertion order.
pub(crate) fn top_entry(distribution: &IndexMap<String, usize>) -> Option<(&str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    for (key, count) in distribution {
        if best.map_or(true, |(_, best_count)| *count > best_count) {
            best = Some((key.as_str(), *count));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::{round1, round2, sort_and_limit, top_entry};

    fn distribution(entries: &[(&str, usize)]) -> IndexMap<String, usize> {
        entries.iter().map(|(key, count)| (key.to_string(), *count)).collect()
    }

    #[test]
    fn rounding_matches_report_precision() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round2(1.2), 1.2);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }

    #[test]
    fn sort_and_limit_is_stable_for_ties() {
        let distribution = distribution(&[("a", 2), ("b", 5), ("c", 2), ("d", 7)]);
        let limited = sort_and_limit(&distribution, 3);
        let top: Vec<&String> = limited.keys().collect::<Vec<_>>();
        assert_eq!(top, ["d", "b", "a"]);
    }

    #[test]
    fn top_entry_prefers_first_on_ties() {
        let distribution = distribution(&[("a", 3), ("b", 3), ("c", 1)]);
        assert_eq!(top_entry(&distribution), Some(("a", 3)));
        assert_eq!(top_entry(&IndexMap::new()), None);
    }
}
