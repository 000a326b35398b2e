//! Recommendation Generator: deterministic gap-to-action mapping.

use super::types::{
    Effort, Gap, GapKind, Priority, Recommendation, RecommendationCategory, Severity,
};
use super::AnalyzerResult;

/// Maps gaps to recommendations and appends the three structural ones, then
/// orders by priority weight. The sort is stable: recommendations of equal
/// priority keep their insertion order, which follows the gap list order.
pub fn generate(gaps: &[Gap]) -> AnalyzerResult<Vec<Recommendation>> {
    let mut recommendations = Vec::new();

    for gap in gaps.iter().filter(|gap| gap.kind == GapKind::Geographic) {
        // "Underserved state: QLD" -> "QLD".
        let area = gap.description.split(": ").nth(1).unwrap_or(&gap.description);
        recommendations.push(Recommendation {
            category: RecommendationCategory::GeographicExpansion,
            priority: if gap.severity == Severity::Critical {
                Priority::High
            } else {
                Priority::Medium
            },
            title: format!("Expand services in {area}"),
            description: format!(
                "Establish {} new services in underserved areas",
                gap.gap_size
            ),
            estimated_impact: "Reach additional vulnerable youth population".to_owned(),
            implementation_effort: Effort::High,
            timeframe: "6-12 months".to_owned(),
        });
    }

    for gap in gaps.iter().filter(|gap| gap.kind == GapKind::Categorical) {
        // "Limited legal_aid services" -> "legal_aid".
        let category = gap.description.split_whitespace().nth(1).unwrap_or_default();
        recommendations.push(Recommendation {
            category: RecommendationCategory::ServiceDiversification,
            priority: Priority::Medium,
            title: format!("Expand {category} services"),
            description: format!("Add {} new services in this critical category", gap.gap_size),
            estimated_impact: "Improve service comprehensiveness".to_owned(),
            implementation_effort: Effort::Medium,
            timeframe: "3-6 months".to_owned(),
        });
    }

    recommendations.push(Recommendation {
        category: RecommendationCategory::NetworkStrengthening,
        priority: Priority::High,
        title: "Establish Service Partnerships".to_owned(),
        description: "Connect isolated services with major hubs for referral networks".to_owned(),
        estimated_impact: "Improve service coordination and outcomes".to_owned(),
        implementation_effort: Effort::Medium,
        timeframe: "3-6 months".to_owned(),
    });

    recommendations.push(Recommendation {
        category: RecommendationCategory::DataQuality,
        priority: Priority::High,
        title: "Implement Quality Assurance Program".to_owned(),
        description: "Systematic verification and enhancement of service data".to_owned(),
        estimated_impact: "Increase user trust and service utilization".to_owned(),
        implementation_effort: Effort::Low,
        timeframe: "1-3 months".to_owned(),
    });

    recommendations.push(Recommendation {
        category: RecommendationCategory::Technology,
        priority: Priority::Medium,
        title: "Develop Mobile Application".to_owned(),
        description: "Create youth-friendly mobile interface for service discovery".to_owned(),
        estimated_impact: "Increase youth engagement and accessibility".to_owned(),
        implementation_effort: Effort::High,
        timeframe: "6-12 months".to_owned(),
    });

    recommendations.sort_by(|a, b| b.priority.weight().cmp(&a.priority.weight()));

    Ok(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geographic_gap(state: &str, severity: Severity, gap_size: usize) -> Gap {
        Gap {
            kind: GapKind::Geographic,
            severity,
            description: format!("Underserved state: {state}"),
            current_services: 0,
            expected_services: gap_size,
            gap_size,
        }
    }

    fn categorical_gap(category: &str) -> Gap {
        Gap {
            kind: GapKind::Categorical,
            severity: Severity::Medium,
            description: format!("Limited {category} services"),
            current_services: 1,
            expected_services: 4,
            gap_size: 3,
        }
    }

    #[test]
    fn critical_geographic_gaps_become_high_priority() {
        let gaps = vec![
            geographic_gap("NT", Severity::Critical, 3),
            geographic_gap("TAS", Severity::High, 4),
        ];

        let recommendations = generate(&gaps).unwrap();

        let nt = recommendations
            .iter()
            .find(|recommendation| recommendation.title == "Expand services in NT")
            .unwrap();
        assert_eq!(nt.priority, Priority::High);
        assert_eq!(nt.description, "Establish 3 new services in underserved areas");

        let tas = recommendations
            .iter()
            .find(|recommendation| recommendation.title == "Expand services in TAS")
            .unwrap();
        assert_eq!(tas.priority, Priority::Medium);
    }

    #[test]
    fn categorical_gaps_extract_the_category_token() {
        let gaps = vec![categorical_gap("legal_aid")];

        let recommendations = generate(&gaps).unwrap();

        assert!(recommendations
            .iter()
            .any(|recommendation| recommendation.title == "Expand legal_aid services"
                && recommendation.priority == Priority::Medium));
    }

    #[test]
    fn structural_recommendations_are_always_present() {
        let recommendations = generate(&[]).unwrap();

        assert_eq!(recommendations.len(), 3);
        let titles: Vec<&str> =
            recommendations.iter().map(|recommendation| recommendation.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Establish Service Partnerships",
                "Implement Quality Assurance Program",
                "Develop Mobile Application"
            ]
        );
    }

    #[test]
    fn sort_is_stable_within_equal_priorities() {
        // Two equal-severity geographic gaps inserted in a known order must
        // keep that order after the priority sort.
        let gaps = vec![
            geographic_gap("TAS", Severity::High, 4),
            geographic_gap("SA", Severity::High, 9),
            categorical_gap("housing"),
        ];

        let recommendations = generate(&gaps).unwrap();

        let medium_titles: Vec<&str> = recommendations
            .iter()
            .filter(|recommendation| recommendation.priority == Priority::Medium)
            .map(|recommendation| recommendation.title.as_str())
            .collect();
        assert_eq!(
            medium_titles,
            [
                "Expand services in TAS",
                "Expand services in SA",
                "Expand housing services",
                "Develop Mobile Application"
            ]
        );

        // High-priority entries lead the list.
        assert!(recommendations
            .iter()
            .take_while(|recommendation| recommendation.priority == Priority::High)
            .count()
            >= 2);
    }
}
