//! Quality Analyzer: completeness/verification aggregation by source,
//! category, and state.

use indexmap::IndexMap;

use super::types::{
    CategoryQuality, CompletenessTrend, OverallQuality, QualityAnalysis, QualityDistribution,
    QualityTrends, SourceQuality, StateQuality, VerificationTrend,
};
use super::{round1, AnalyzerResult};
use crate::domain::service::or_unknown;
use crate::domain::ServiceRecord;
use crate::errors::AnalyzerError;

const SOURCE_LIMIT: usize = 10;
const PARTITION_LIMIT: usize = 10;

#[derive(Default)]
struct ScoreAccumulator {
    count: usize,
    total_completeness: f64,
    total_verification: f64,
}

impl ScoreAccumulator {
    fn add(&mut self, completeness: f64, verification: f64) {
        self.count += 1;
        self.total_completeness += completeness;
        self.total_verification += verification;
    }

    fn avg_completeness(&self) -> f64 {
        self.total_completeness / self.count as f64
    }

    fn avg_verification(&self) -> f64 {
        self.total_verification / self.count as f64
    }
}

pub fn analyze(services: &[ServiceRecord]) -> AnalyzerResult<QualityAnalysis> {
    if services.is_empty() {
        return Err(AnalyzerError::Invariant("quality analysis requires services".to_owned()));
    }

    let mut by_source: IndexMap<String, ScoreAccumulator> = IndexMap::new();
    let mut by_category: IndexMap<String, ScoreAccumulator> = IndexMap::new();
    let mut by_state: IndexMap<String, ScoreAccumulator> = IndexMap::new();

    let mut total_completeness = 0.0;
    let mut total_verification = 0.0;
    let mut verified = 0;
    let mut unverified = 0;
    let mut youth_specific = 0;
    let mut indigenous_specific = 0;
    let mut quality_distribution = QualityDistribution::default();
    let mut completeness_trend = CompletenessTrend::default();

    for service in services {
        let completeness = service.completeness_score;
        let verification = service.verification_score;

        total_completeness += completeness;
        total_verification += verification;

        if service.youth_specific {
            youth_specific += 1;
        }
        if service.indigenous_specific {
            indigenous_specific += 1;
        }
        if service.is_verified() {
            verified += 1;
        } else {
            unverified += 1;
        }

        if completeness >= 0.9 {
            quality_distribution.excellent += 1;
        } else if completeness >= 0.7 {
            quality_distribution.good += 1;
        } else if completeness >= 0.5 {
            quality_distribution.fair += 1;
        } else {
            quality_distribution.poor += 1;
        }

        if completeness > 0.8 {
            completeness_trend.high += 1;
        } else if completeness > 0.5 {
            completeness_trend.medium += 1;
        } else {
            completeness_trend.low += 1;
        }

        by_source
            .entry(service.source_name().to_owned())
            .or_default()
            .add(completeness, verification);

        for category in &service.categories {
            by_category.entry(category.clone()).or_default().add(completeness, verification);
        }

        let state = or_unknown(
            service.primary_location().and_then(|location| location.state_province.as_deref()),
        );
        by_state.entry(state.to_owned()).or_default().add(completeness, verification);
    }

    let total = services.len();

    let mut quality_by_source: Vec<SourceQuality> = by_source
        .iter()
        .map(|(source, accumulator)| SourceQuality {
            source: source.clone(),
            count: accumulator.count,
            avg_completeness: accumulator.avg_completeness(),
            avg_verification: accumulator.avg_verification(),
        })
        .collect();
    quality_by_source.sort_by(|a, b| {
        b.avg_completeness.partial_cmp(&a.avg_completeness).unwrap_or(std::cmp::Ordering::Equal)
    });
    quality_by_source.truncate(SOURCE_LIMIT);

    let mut quality_by_category: Vec<CategoryQuality> = by_category
        .iter()
        .map(|(category, accumulator)| CategoryQuality {
            category: category.clone(),
            count: accumulator.count,
            avg_completeness: accumulator.avg_completeness(),
        })
        .collect();
    quality_by_category.sort_by(|a, b| {
        b.avg_completeness.partial_cmp(&a.avg_completeness).unwrap_or(std::cmp::Ordering::Equal)
    });
    quality_by_category.truncate(PARTITION_LIMIT);

    let mut quality_by_state: Vec<StateQuality> = by_state
        .iter()
        .map(|(state, accumulator)| StateQuality {
            state: state.clone(),
            count: accumulator.count,
            avg_completeness: accumulator.avg_completeness(),
        })
        .collect();
    quality_by_state.sort_by(|a, b| {
        b.avg_completeness.partial_cmp(&a.avg_completeness).unwrap_or(std::cmp::Ordering::Equal)
    });
    quality_by_state.truncate(PARTITION_LIMIT);

    let quality_issues = identify_quality_issues(verified, total, &by_source);

    Ok(QualityAnalysis {
        overall_quality: OverallQuality {
            average_completeness: total_completeness / total as f64,
            average_verification: total_verification / total as f64,
            verification_rate: round1(verified as f64 / total as f64 * 100.0),
            youth_specific_rate: round1(youth_specific as f64 / total as f64 * 100.0),
            indigenous_specific_rate: round1(indigenous_specific as f64 / total as f64 * 100.0),
        },
        quality_distribution,
        quality_by_source,
        quality_by_category,
        quality_by_state,
        quality_trends: QualityTrends {
            completeness_distribution: completeness_trend,
            verification_trend: if verified > unverified {
                VerificationTrend::Positive
            } else {
                VerificationTrend::NeedsImprovement
            },
        },
        quality_issues,
    })
}

fn identify_quality_issues(
    verified: usize,
    total: usize,
    by_source: &IndexMap<String, ScoreAccumulator>,
) -> Vec<String> {
    let mut issues = Vec::new();

    if (verified as f64) < total as f64 * 0.7 {
        issues.push("Low verification rate across services".to_owned());
    }

    for (source, accumulator) in by_source {
        if accumulator.avg_completeness() < 0.6 {
            issues.push(format!("{source} has low data quality"));
        }
    }

    issues
}
