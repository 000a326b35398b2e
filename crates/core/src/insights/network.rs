//! Network Analyzer: hubs, isolated services, and ecosystem health derived
//! from the mapped connection graph.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use super::types::{
    Connection, EcosystemHealth, EcosystemStatus, Hub, HubKind, IsolatedService, NetworkAnalysis,
    NetworkMetrics, NetworkOpportunity, NetworkOpportunityKind,
};
use super::{round1, AnalyzerResult, STRONG_CONNECTION_THRESHOLD};
use crate::domain::ServiceRecord;
use crate::errors::AnalyzerError;

/// Organizations below this service count are not hub candidates.
const HUB_MINIMUM_SERVICES: usize = 3;
const REGIONAL_HUB_SERVICES: usize = 5;
const MAJOR_HUB_SERVICES: usize = 10;

const HUB_LIMIT: usize = 10;
const ISOLATED_LIMIT: usize = 20;

pub fn analyze(
    services: &[ServiceRecord],
    connections: &[Connection],
) -> AnalyzerResult<NetworkAnalysis> {
    if services.is_empty() {
        return Err(AnalyzerError::Invariant("network analysis requires services".to_owned()));
    }

    let mut organization_services: IndexMap<&str, Vec<&ServiceRecord>> = IndexMap::new();
    for service in services {
        organization_services.entry(service.organization_name()).or_default().push(service);
    }

    // Incident-edge counts per service, over all three edge kinds.
    let mut incident_edges: HashMap<&str, usize> = HashMap::new();
    for connection in connections {
        *incident_edges.entry(connection.service_a.as_str()).or_default() += 1;
        *incident_edges.entry(connection.service_b.as_str()).or_default() += 1;
    }

    let mut hubs: Vec<Hub> = organization_services
        .iter()
        .filter(|(_, members)| members.len() >= HUB_MINIMUM_SERVICES)
        .map(|(organization, members)| Hub {
            organization: (*organization).to_owned(),
            service_count: members.len(),
            influence: network_influence(members, connections),
            kind: hub_kind(members.len()),
        })
        .collect();

    let isolated_services: Vec<IsolatedService> = services
        .iter()
        .filter(|service| !incident_edges.contains_key(service.id.as_str()))
        .map(|service| IsolatedService {
            id: service.id.clone(),
            name: service.name.clone(),
            organization: service
                .organization
                .as_ref()
                .and_then(|organization| organization.name.clone()),
            location: service
                .primary_location()
                .and_then(|location| location.city.clone()),
            categories: service.categories.clone(),
        })
        .collect();

    let total = services.len();
    let max_connections = total * (total - 1) / 2;
    let network_density = if max_connections > 0 {
        connections.len() as f64 / max_connections as f64
    } else {
        0.0
    };

    let clustering_coefficient = if connections.is_empty() {
        0.0
    } else {
        let strong = connections
            .iter()
            .filter(|connection| connection.strength > STRONG_CONNECTION_THRESHOLD)
            .count();
        strong as f64 / connections.len() as f64
    };

    let average_hub_size = if hubs.is_empty() {
        0.0
    } else {
        round1(hubs.iter().map(|hub| hub.service_count).sum::<usize>() as f64 / hubs.len() as f64)
    };

    let network_metrics = NetworkMetrics {
        total_hubs: hubs.len(),
        average_hub_size,
        isolated_services: isolated_services.len(),
        network_density,
        clustering_coefficient,
    };

    let network_opportunities = vec![
        NetworkOpportunity {
            kind: NetworkOpportunityKind::HubExpansion,
            description: "Connect isolated services to existing hubs".to_owned(),
            potential_connections: Some(isolated_services.len()),
            potential_partnerships: None,
            estimated_impact: "Improved service coordination".to_owned(),
        },
        NetworkOpportunity {
            kind: NetworkOpportunityKind::PartnershipDevelopment,
            description: "Facilitate partnerships between complementary organizations".to_owned(),
            potential_connections: None,
            potential_partnerships: Some(hubs.len() / 2),
            estimated_impact: "Enhanced service delivery".to_owned(),
        },
    ];

    let ecosystem_health = assess_ecosystem_health(total, isolated_services.len());

    hubs.sort_by(|a, b| b.service_count.cmp(&a.service_count));
    hubs.truncate(HUB_LIMIT);

    let mut network_gaps = isolated_services;
    network_gaps.truncate(ISOLATED_LIMIT);

    Ok(NetworkAnalysis {
        network_metrics,
        major_hubs: hubs,
        network_gaps,
        network_opportunities,
        ecosystem_health,
    })
}

/// Connections incident to any of the organization's services, per service.
fn network_influence(members: &[&ServiceRecord], connections: &[Connection]) -> f64 {
    let member_ids: HashSet<&str> = members.iter().map(|service| service.id.as_str()).collect();
    let incident = connections
        .iter()
        .filter(|connection| {
            member_ids.contains(connection.service_a.as_str())
                || member_ids.contains(connection.service_b.as_str())
        })
        .count();

    incident as f64 / members.len().max(1) as f64
}

fn hub_kind(service_count: usize) -> HubKind {
    if service_count >= MAJOR_HUB_SERVICES {
        HubKind::MajorHub
    } else if service_count >= REGIONAL_HUB_SERVICES {
        HubKind::RegionalHub
    } else {
        HubKind::LocalHub
    }
}

fn assess_ecosystem_health(total: usize, isolated: usize) -> EcosystemHealth {
    let connected = total - isolated;
    let health_score = connected as f64 / total as f64 * 100.0;

    let status = if health_score < 50.0 {
        EcosystemStatus::Fragmented
    } else if health_score < 70.0 {
        EcosystemStatus::Developing
    } else {
        EcosystemStatus::Healthy
    };

    let recommendations = if status == EcosystemStatus::Fragmented {
        vec![
            "Focus on connecting isolated services".to_owned(),
            "Develop regional hubs".to_owned(),
        ]
    } else {
        vec![
            "Maintain existing connections".to_owned(),
            "Expand successful partnerships".to_owned(),
        ]
    };

    EcosystemHealth { status, health_score: round1(health_score), recommendations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Organization, ServiceRecord};
    use crate::insights::types::ConnectionKind;

    fn service(id: &str, organization: &str) -> ServiceRecord {
        ServiceRecord {
            id: id.to_string(),
            name: format!("Service {id}"),
            organization: Some(Organization { name: Some(organization.to_string()) }),
            ..ServiceRecord::default()
        }
    }

    fn org_services(organization: &str, count: usize) -> Vec<ServiceRecord> {
        (0..count).map(|i| service(&format!("{organization}-{i}"), organization)).collect()
    }

    fn edge(a: &str, b: &str, strength: f64) -> Connection {
        Connection {
            kind: ConnectionKind::Geographic,
            service_a: a.to_string(),
            service_b: b.to_string(),
            strength,
            reason: "Services located in same area".to_string(),
            organization: None,
            location: None,
            shared_categories: None,
        }
    }

    #[test]
    fn hub_classification_boundaries() {
        let mut services = org_services("Two", 2);
        services.extend(org_services("Three", 3));
        services.extend(org_services("Five", 5));
        services.extend(org_services("Ten", 10));

        let analysis = analyze(&services, &[]).unwrap();

        // Two services never qualify as a hub.
        assert!(analysis.major_hubs.iter().all(|hub| hub.organization != "Two"));

        let kind_of = |name: &str| {
            analysis.major_hubs.iter().find(|hub| hub.organization == name).map(|hub| hub.kind)
        };
        assert_eq!(kind_of("Three"), Some(HubKind::LocalHub));
        assert_eq!(kind_of("Five"), Some(HubKind::RegionalHub));
        assert_eq!(kind_of("Ten"), Some(HubKind::MajorHub));
        assert_eq!(analysis.network_metrics.total_hubs, 3);
    }

    #[test]
    fn isolated_services_have_no_incident_edges() {
        let services =
            vec![service("a", "Org A"), service("b", "Org B"), service("c", "Org C")];
        let connections = vec![edge("a", "b", 0.6)];

        let analysis = analyze(&services, &connections).unwrap();

        assert_eq!(analysis.network_metrics.isolated_services, 1);
        assert_eq!(analysis.network_gaps.len(), 1);
        assert_eq!(analysis.network_gaps[0].id, "c");
        assert_eq!(analysis.network_gaps[0].organization.as_deref(), Some("Org C"));
    }

    #[test]
    fn density_is_edges_over_possible_pairs() {
        let services =
            vec![service("a", "Org A"), service("b", "Org B"), service("c", "Org C")];
        let connections = vec![edge("a", "b", 0.6)];

        let analysis = analyze(&services, &connections).unwrap();

        // 1 edge of C(3,2) = 3 possible.
        assert!((analysis.network_metrics.network_density - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn clustering_counts_strong_edges_only() {
        let services = vec![service("a", "Org A"), service("b", "Org B")];
        let connections = vec![edge("a", "b", 0.9), edge("a", "b", 0.6), edge("a", "b", 0.71)];

        let analysis = analyze(&services, &connections).unwrap();

        // 0.9 and 0.71 clear the 0.7 threshold; 0.6 does not.
        assert!((analysis.network_metrics.clustering_coefficient - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn influence_divides_incident_edges_by_org_size() {
        let mut services = org_services("Alpha", 3);
        services.push(service("x", "Other"));
        let connections =
            vec![edge("Alpha-0", "x", 0.6), edge("Alpha-1", "x", 0.6), edge("Alpha-0", "Alpha-1", 0.9)];

        let analysis = analyze(&services, &connections).unwrap();

        let alpha = analysis.major_hubs.iter().find(|hub| hub.organization == "Alpha").unwrap();
        // Three incident edges over three services.
        assert!((alpha.influence - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ecosystem_status_thresholds() {
        // 2 of 5 connected: 40% fragmented.
        let fragmented = assess_ecosystem_health(5, 3);
        assert_eq!(fragmented.status, EcosystemStatus::Fragmented);
        assert_eq!(fragmented.health_score, 40.0);
        assert_eq!(fragmented.recommendations[0], "Focus on connecting isolated services");

        // 3 of 5 connected: 60% developing, with the maintenance guidance.
        let developing = assess_ecosystem_health(5, 2);
        assert_eq!(developing.status, EcosystemStatus::Developing);
        assert_eq!(developing.recommendations[0], "Maintain existing connections");

        // 4 of 5 connected: 80% healthy.
        let healthy = assess_ecosystem_health(5, 1);
        assert_eq!(healthy.status, EcosystemStatus::Healthy);
    }
}
