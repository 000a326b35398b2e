//! Geographic Analyzer: coverage distributions and underserved detection.

use indexmap::IndexMap;

use super::types::{
    AreaScope, CoverageMetrics, Distribution, GeographicAnalysis, GeographicDistribution,
    Severity, UnderservedArea,
};
use super::{round1, sort_and_limit, top_entry, AnalyzerResult};
use crate::domain::service::or_unknown;
use crate::domain::ServiceRecord;
use crate::errors::AnalyzerError;

/// Population estimates for the eight Australian states and territories,
/// used for the one-service-per-100k expected baseline.
pub(crate) const STATE_POPULATIONS: &[(&str, u64)] = &[
    ("NSW", 8_200_000),
    ("QLD", 5_300_000),
    ("VIC", 6_800_000),
    ("WA", 2_800_000),
    ("SA", 1_800_000),
    ("TAS", 570_000),
    ("NT", 250_000),
    ("ACT", 440_000),
];

pub(crate) const DEFAULT_STATE_POPULATION: u64 = 500_000;
pub(crate) const RESIDENTS_PER_EXPECTED_SERVICE: u64 = 100_000;

/// City substrings that classify a service as remote.
const REMOTE_CITIES: &[&str] =
    &["Alice Springs", "Tennant Creek", "Katherine", "Darwin", "Broome", "Kalgoorlie"];

const STATE_LIMIT: usize = 10;
const REGION_LIMIT: usize = 15;
const CITY_LIMIT: usize = 20;

/// Expected service count for a state: one per 100 000 residents, rounded
/// up, with a default population for states outside the fixed table.
pub(crate) fn expected_services_for_state(state: &str) -> usize {
    let population = STATE_POPULATIONS
        .iter()
        .find(|(name, _)| *name == state)
        .map(|(_, population)| *population)
        .unwrap_or(DEFAULT_STATE_POPULATION);

    population.div_ceil(RESIDENTS_PER_EXPECTED_SERVICE) as usize
}

pub fn analyze(services: &[ServiceRecord]) -> AnalyzerResult<GeographicAnalysis> {
    if services.is_empty() {
        return Err(AnalyzerError::Invariant("geographic analysis requires services".to_owned()));
    }

    let mut state_distribution: Distribution = IndexMap::new();
    let mut region_distribution: Distribution = IndexMap::new();
    let mut city_distribution: Distribution = IndexMap::new();
    let mut remote_service_count = 0;

    for service in services {
        let Some(location) = service.primary_location() else {
            continue;
        };

        let state = or_unknown(location.state_province.as_deref());
        *state_distribution.entry(state.to_owned()).or_default() += 1;

        // Regions fall back to the city when no region is recorded.
        let region = or_unknown(
            location
                .region
                .as_deref()
                .filter(|region| !region.is_empty())
                .or(location.city.as_deref()),
        );
        *region_distribution.entry(region.to_owned()).or_default() += 1;

        let city = or_unknown(location.city.as_deref());
        *city_distribution.entry(city.to_owned()).or_default() += 1;

        if is_remote_location(location.city.as_deref()) {
            remote_service_count += 1;
        }
    }

    let services_with_location =
        services.iter().filter(|service| !service.locations.is_empty()).count();

    let underserved_areas = identify_underserved_areas(&state_distribution);

    let geographic_insights = vec![
        format!("{} states/territories covered", state_distribution.len()),
        format!(
            "Highest concentration in {}",
            top_entry(&state_distribution).map(|(state, _)| state).unwrap_or("unknown")
        ),
        format!(
            "{} underserved jurisdictions",
            state_distribution.values().filter(|count| **count < 5).count()
        ),
    ];

    Ok(GeographicAnalysis {
        coverage_metrics: CoverageMetrics {
            states_covered: state_distribution.len(),
            regions_covered: region_distribution.len(),
            services_with_location,
            location_coverage_rate: round1(
                services_with_location as f64 / services.len() as f64 * 100.0,
            ),
            remote_service_count,
        },
        distribution: GeographicDistribution {
            states: sort_and_limit(&state_distribution, STATE_LIMIT),
            regions: sort_and_limit(&region_distribution, REGION_LIMIT),
            cities: sort_and_limit(&city_distribution, CITY_LIMIT),
        },
        underserved_areas,
        remote_services: remote_service_count,
        geographic_insights,
    })
}

fn is_remote_location(city: Option<&str>) -> bool {
    let Some(city) = city else {
        return false;
    };
    REMOTE_CITIES.iter().any(|remote| city.contains(remote))
}

/// Flags observed states below 70% of their expected baseline; below 30% is
/// high severity.
fn identify_underserved_areas(state_distribution: &Distribution) -> Vec<UnderservedArea> {
    let mut underserved = Vec::new();

    for (state, count) in state_distribution {
        let expected = expected_services_for_state(state);
        if (*count as f64) < expected as f64 * 0.7 {
            underserved.push(UnderservedArea {
                area: state.clone(),
                scope: AreaScope::State,
                current_services: *count,
                expected_services: expected,
                severity: if (*count as f64) < expected as f64 * 0.3 {
                    Severity::High
                } else {
                    Severity::Medium
                },
            });
        }
    }

    underserved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, ServiceRecord};

    fn located(id: &str, city: Option<&str>, region: Option<&str>, state: Option<&str>) -> ServiceRecord {
        ServiceRecord {
            id: id.to_string(),
            name: format!("Service {id}"),
            locations: vec![Location {
                city: city.map(str::to_string),
                region: region.map(str::to_string),
                state_province: state.map(str::to_string),
            }],
            ..ServiceRecord::default()
        }
    }

    fn unlocated(id: &str) -> ServiceRecord {
        ServiceRecord { id: id.to_string(), ..ServiceRecord::default() }
    }

    #[test]
    fn expected_services_follow_the_population_table() {
        assert_eq!(expected_services_for_state("NSW"), 82);
        assert_eq!(expected_services_for_state("NT"), 3);
        assert_eq!(expected_services_for_state("TAS"), 6);
        // Unknown states fall back to the default population.
        assert_eq!(expected_services_for_state("ZZZ"), 5);
    }

    #[test]
    fn distributions_skip_services_without_locations() {
        let services = vec![
            located("a", Some("Brisbane"), None, Some("QLD")),
            located("b", Some("Cairns"), Some("Far North"), Some("QLD")),
            unlocated("c"),
        ];

        let analysis = analyze(&services).unwrap();

        assert_eq!(analysis.coverage_metrics.services_with_location, 2);
        assert_eq!(analysis.coverage_metrics.location_coverage_rate, 66.7);
        assert_eq!(analysis.distribution.states.get("QLD"), Some(&2));
        // Region falls back to the city when absent.
        assert_eq!(analysis.distribution.regions.get("Brisbane"), Some(&1));
        assert_eq!(analysis.distribution.regions.get("Far North"), Some(&1));
        assert_eq!(analysis.coverage_metrics.states_covered, 1);
    }

    #[test]
    fn missing_state_counts_under_unknown() {
        let services = vec![located("a", Some("Somewhere"), None, None)];

        let analysis = analyze(&services).unwrap();

        assert_eq!(analysis.distribution.states.get("Unknown"), Some(&1));
    }

    #[test]
    fn remote_detection_matches_city_substrings() {
        let services = vec![
            located("a", Some("Alice Springs Town Camp"), None, Some("NT")),
            located("b", Some("Brisbane"), None, Some("QLD")),
        ];

        let analysis = analyze(&services).unwrap();

        assert_eq!(analysis.coverage_metrics.remote_service_count, 1);
        assert_eq!(analysis.remote_services, 1);
    }

    #[test]
    fn underserved_severity_tracks_the_expected_share() {
        // NT expects 3 services. 2 observed is between 30% and 70%:
        // medium. A single ACT service out of 5 expected is below 30%:
        // high.
        let mut services: Vec<ServiceRecord> = (0..2)
            .map(|i| located(&format!("nt{i}"), Some("Darwin"), None, Some("NT")))
            .collect();
        services.push(located("act0", Some("Canberra"), None, Some("ACT")));

        let analysis = analyze(&services).unwrap();

        let nt = analysis.underserved_areas.iter().find(|area| area.area == "NT").unwrap();
        assert_eq!(nt.severity, Severity::Medium);
        assert_eq!(nt.expected_services, 3);

        let act = analysis.underserved_areas.iter().find(|area| area.area == "ACT").unwrap();
        assert_eq!(act.severity, Severity::High);
        assert_eq!(act.expected_services, 5);
    }

    #[test]
    fn insights_name_the_densest_state() {
        let services = vec![
            located("a", Some("Sydney"), None, Some("NSW")),
            located("b", Some("Newcastle"), None, Some("NSW")),
            located("c", Some("Melbourne"), None, Some("VIC")),
        ];

        let analysis = analyze(&services).unwrap();

        assert!(analysis
            .geographic_insights
            .iter()
            .any(|insight| insight == "Highest concentration in NSW"));
    }
}
