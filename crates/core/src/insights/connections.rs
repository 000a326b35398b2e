//! Connection Mapper: infers the multi-relational service graph.
//!
//! Three rules are evaluated independently over every unordered pair, so a
//! pair can carry up to three simultaneous edges. The pairwise passes are
//! O(n²) and dominate the cost of the whole pipeline for large directories.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::types::{
    Connection, ConnectionAnalysis, ConnectionKind, ConnectionTypeCounts, OrganizationCount,
};
use super::{round2, AnalyzerResult, CATEGORY_OVERLAP_THRESHOLD, GEOGRAPHIC_STRENGTH, ORGANIZATIONAL_STRENGTH};
use crate::domain::ServiceRecord;
use crate::errors::AnalyzerError;

const TOP_ORGANIZATION_LIMIT: usize = 10;

/// Builds the full connection list and its summary statistics.
pub fn map_connections(services: &[ServiceRecord]) -> AnalyzerResult<ConnectionAnalysis> {
    if services.is_empty() {
        return Err(AnalyzerError::Invariant("connection mapping requires services".to_owned()));
    }

    let mut connections = Vec::new();

    // Organization groups in first-appearance order. Services normalized to
    // "Unknown" still form a group and connect to each other.
    let mut organization_groups: IndexMap<&str, Vec<&ServiceRecord>> = IndexMap::new();
    for service in services {
        organization_groups.entry(service.organization_name()).or_default().push(service);
    }

    for (organization, members) in &organization_groups {
        if members.len() < 2 {
            continue;
        }
        for (offset, service_a) in members.iter().enumerate() {
            for service_b in &members[offset + 1..] {
                connections.push(Connection {
                    kind: ConnectionKind::Organizational,
                    service_a: service_a.id.clone(),
                    service_b: service_b.id.clone(),
                    strength: ORGANIZATIONAL_STRENGTH,
                    reason: format!("Both operated by {organization}"),
                    organization: Some((*organization).to_owned()),
                    location: None,
                    shared_categories: None,
                });
            }
        }
    }

    for (offset, service_a) in services.iter().enumerate() {
        for service_b in &services[offset + 1..] {
            if let Some(shared_area) = common_location(service_a, service_b) {
                connections.push(Connection {
                    kind: ConnectionKind::Geographic,
                    service_a: service_a.id.clone(),
                    service_b: service_b.id.clone(),
                    strength: GEOGRAPHIC_STRENGTH,
                    reason: "Services located in same area".to_owned(),
                    organization: None,
                    location: Some(shared_area),
                    shared_categories: None,
                });
            }
        }
    }

    for (offset, service_a) in services.iter().enumerate() {
        for service_b in &services[offset + 1..] {
            let overlap = category_overlap(service_a, service_b);
            if overlap > CATEGORY_OVERLAP_THRESHOLD {
                connections.push(Connection {
                    kind: ConnectionKind::Categorical,
                    service_a: service_a.id.clone(),
                    service_b: service_b.id.clone(),
                    strength: overlap,
                    reason: "Similar service categories".to_owned(),
                    organization: None,
                    location: None,
                    shared_categories: Some(shared_categories(service_a, service_b)),
                });
            }
        }
    }

    let mut connection_types = ConnectionTypeCounts::default();
    for connection in &connections {
        match connection.kind {
            ConnectionKind::Organizational => connection_types.organizational += 1,
            ConnectionKind::Geographic => connection_types.geographic += 1,
            ConnectionKind::Categorical => connection_types.categorical += 1,
        }
    }

    let mut top_connected_organizations: Vec<OrganizationCount> = organization_groups
        .iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(organization, members)| OrganizationCount {
            organization: (*organization).to_owned(),
            service_count: members.len(),
        })
        .collect();
    top_connected_organizations.sort_by(|a, b| b.service_count.cmp(&a.service_count));
    top_connected_organizations.truncate(TOP_ORGANIZATION_LIMIT);

    Ok(ConnectionAnalysis {
        total_connections: connections.len(),
        connection_types,
        organization_groups: organization_groups.len(),
        average_connections_per_service: round2(
            connections.len() as f64 * 2.0 / services.len() as f64,
        ),
        top_connected_organizations,
        connections,
    })
}

/// First shared area of the two records' primary locations, checked in
/// city → region → state order. A field absent on either side never
/// matches.
fn common_location(service_a: &ServiceRecord, service_b: &ServiceRecord) -> Option<String> {
    let location_a = service_a.primary_location()?;
    let location_b = service_b.primary_location()?;

    for (field_a, field_b) in [
        (&location_a.city, &location_b.city),
        (&location_a.region, &location_b.region),
        (&location_a.state_province, &location_b.state_province),
    ] {
        if let (Some(a), Some(b)) = (field_a, field_b) {
            if a == b {
                return Some(a.clone());
            }
        }
    }

    None
}

/// Jaccard similarity of the two records' category sets, in `[0, 1]`.
fn category_overlap(service_a: &ServiceRecord, service_b: &ServiceRecord) -> f64 {
    let categories_a: HashSet<&str> = service_a.categories.iter().map(String::as_str).collect();
    let categories_b: HashSet<&str> = service_b.categories.iter().map(String::as_str).collect();

    let union = categories_a.union(&categories_b).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = categories_a.intersection(&categories_b).count();
    intersection as f64 / union as f64
}

/// Categories common to both records, in the first record's order, deduped.
fn shared_categories(service_a: &ServiceRecord, service_b: &ServiceRecord) -> Vec<String> {
    let categories_b: HashSet<&str> = service_b.categories.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut shared = Vec::new();

    for category in &service_a.categories {
        if categories_b.contains(category.as_str()) && seen.insert(category.as_str()) {
            shared.push(category.clone());
        }
    }

    shared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Organization, ServiceRecord};

    fn service(id: &str, organization: Option<&str>) -> ServiceRecord {
        ServiceRecord {
            id: id.to_string(),
            name: format!("Service {id}"),
            organization: organization
                .map(|name| Organization { name: Some(name.to_string()) }),
            ..ServiceRecord::default()
        }
    }

    fn located(id: &str, organization: &str, city: &str, state: &str) -> ServiceRecord {
        ServiceRecord {
            locations: vec![Location {
                city: Some(city.to_string()),
                region: None,
                state_province: Some(state.to_string()),
            }],
            ..service(id, Some(organization))
        }
    }

    fn categorized(id: &str, organization: &str, categories: &[&str]) -> ServiceRecord {
        ServiceRecord {
            categories: categories.iter().map(|category| category.to_string()).collect(),
            ..service(id, Some(organization))
        }
    }

    #[test]
    fn same_organization_connects_every_pair() {
        let services: Vec<ServiceRecord> =
            (0..4).map(|i| service(&format!("s{i}"), Some("Org A"))).collect();

        let analysis = map_connections(&services).unwrap();

        // 4 services in one organization: C(4,2) = 6 edges.
        assert_eq!(analysis.connection_types.organizational, 6);
        assert_eq!(analysis.total_connections, 6);
        assert!(analysis
            .connections
            .iter()
            .all(|connection| connection.strength == ORGANIZATIONAL_STRENGTH));
        assert_eq!(analysis.connections[0].reason, "Both operated by Org A");
    }

    #[test]
    fn unknown_organizations_group_together() {
        let services = vec![service("a", None), service("b", None)];

        let analysis = map_connections(&services).unwrap();

        assert_eq!(analysis.connection_types.organizational, 1);
        assert_eq!(analysis.connections[0].organization.as_deref(), Some("Unknown"));
        assert_eq!(analysis.organization_groups, 1);
    }

    #[test]
    fn geographic_match_prefers_city_over_state() {
        let a = located("a", "Org A", "Brisbane", "QLD");
        let b = located("b", "Org B", "Brisbane", "QLD");
        let c = located("c", "Org C", "Cairns", "QLD");

        let analysis = map_connections(&[a, b, c]).unwrap();

        assert_eq!(analysis.connection_types.geographic, 3);
        let ab = analysis
            .connections
            .iter()
            .find(|connection| connection.service_a == "a" && connection.service_b == "b")
            .unwrap();
        assert_eq!(ab.location.as_deref(), Some("Brisbane"));
        let ac = analysis
            .connections
            .iter()
            .find(|connection| connection.service_a == "a" && connection.service_b == "c")
            .unwrap();
        assert_eq!(ac.location.as_deref(), Some("QLD"));
    }

    #[test]
    fn missing_location_fields_never_match() {
        let mut a = service("a", Some("Org A"));
        a.locations = vec![Location::default()];
        let mut b = service("b", Some("Org B"));
        b.locations = vec![Location::default()];

        let analysis = map_connections(&[a, b]).unwrap();

        assert_eq!(analysis.connection_types.geographic, 0);
    }

    #[test]
    fn identical_category_sets_always_connect() {
        let a = categorized("a", "Org A", &["legal_aid", "housing"]);
        let b = categorized("b", "Org B", &["legal_aid", "housing"]);

        let analysis = map_connections(&[a, b]).unwrap();

        assert_eq!(analysis.connection_types.categorical, 1);
        let edge = &analysis.connections[0];
        assert_eq!(edge.strength, 1.0);
        assert_eq!(
            edge.shared_categories.as_deref(),
            Some(["legal_aid".to_string(), "housing".to_string()].as_slice())
        );
    }

    #[test]
    fn disjoint_category_sets_never_connect() {
        let a = categorized("a", "Org A", &["legal_aid"]);
        let b = categorized("b", "Org B", &["housing"]);

        let analysis = map_connections(&[a, b]).unwrap();

        assert_eq!(analysis.connection_types.categorical, 0);
    }

    #[test]
    fn half_overlap_is_below_the_threshold() {
        // |{legal_aid}| / |{legal_aid, housing, employment}| = 1/3; and a
        // 2-of-4 Jaccard of exactly 0.5 must not connect either.
        let a = categorized("a", "Org A", &["legal_aid", "housing"]);
        let b = categorized("b", "Org B", &["legal_aid", "employment"]);
        let analysis = map_connections(&[a, b]).unwrap();
        assert_eq!(analysis.connection_types.categorical, 0);

        let c = categorized("c", "Org C", &["legal_aid", "housing", "employment"]);
        let d = categorized("d", "Org D", &["legal_aid", "housing"]);
        let analysis = map_connections(&[c, d]).unwrap();
        // 2/3 > 0.5: connected, with the similarity as the strength.
        assert_eq!(analysis.connection_types.categorical, 1);
        assert!((analysis.connections[0].strength - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn pair_can_carry_all_three_edge_kinds() {
        let mut a = located("a", "Org A", "Darwin", "NT");
        a.categories = vec!["legal_aid".to_string()];
        let mut b = located("b", "Org A", "Darwin", "NT");
        b.categories = vec!["legal_aid".to_string()];

        let analysis = map_connections(&[a, b]).unwrap();

        assert_eq!(analysis.total_connections, 3);
        assert_eq!(analysis.connection_types.organizational, 1);
        assert_eq!(analysis.connection_types.geographic, 1);
        assert_eq!(analysis.connection_types.categorical, 1);
        // 3 edges over 2 services.
        assert_eq!(analysis.average_connections_per_service, 3.0);
    }

    #[test]
    fn top_organizations_exclude_singletons_and_sort_by_size() {
        let mut services = vec![
            service("a1", Some("Alpha")),
            service("a2", Some("Alpha")),
            service("a3", Some("Alpha")),
            service("b1", Some("Beta")),
            service("b2", Some("Beta")),
            service("solo", Some("Gamma")),
        ];
        services.rotate_left(3);

        let analysis = map_connections(&services).unwrap();

        let names: Vec<&str> = analysis
            .top_connected_organizations
            .iter()
            .map(|entry| entry.organization.as_str())
            .collect();
        assert_eq!(names, ["Alpha", "Beta"]);
        assert_eq!(analysis.top_connected_organizations[0].service_count, 3);
        assert_eq!(analysis.organization_groups, 3);
    }
}
