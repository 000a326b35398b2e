//! Report model for the insights pipeline.
//!
//! The report is serialized with camelCase keys: it is consumed by an
//! external dashboard that predates this engine. Distribution objects use
//! insertion-ordered maps so the serialized JSON keeps descending-count
//! order.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// String-keyed count distribution, ordered for serialization.
pub type Distribution = IndexMap<String, usize>;

/// Relationship kind between two services. A pair of services may carry up
/// to one edge of each kind simultaneously; edges are never deduplicated
/// across kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Organizational,
    Geographic,
    Categorical,
}

/// A weighted edge in the service connection graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(rename = "type")]
    pub kind: ConnectionKind,
    pub service_a: String,
    pub service_b: String,
    /// Edge weight in `(0, 1]`.
    pub strength: f64,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_categories: Option<Vec<String>>,
}

impl Connection {
    /// Whether the edge touches the given service.
    pub fn involves(&self, service_id: &str) -> bool {
        self.service_a == service_id || self.service_b == service_id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTypeCounts {
    pub organizational: usize,
    pub geographic: usize,
    pub categorical: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationCount {
    pub organization: String,
    pub service_count: usize,
}

/// Connection Mapper output: the full edge list plus summary statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionAnalysis {
    pub total_connections: usize,
    pub connection_types: ConnectionTypeCounts,
    /// Number of distinct organization names observed (including groups of
    /// one and the `"Unknown"` group).
    pub organization_groups: usize,
    /// `2 * |connections| / n`, two decimals.
    pub average_connections_per_service: f64,
    pub top_connected_organizations: Vec<OrganizationCount>,
    pub connections: Vec<Connection>,
}

/// Severity scale shared by gaps and underserved-area findings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaScope {
    State,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderservedArea {
    pub area: String,
    #[serde(rename = "type")]
    pub scope: AreaScope,
    pub current_services: usize,
    pub expected_services: usize,
    pub severity: Severity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMetrics {
    pub states_covered: usize,
    pub regions_covered: usize,
    pub services_with_location: usize,
    /// Percentage, one decimal.
    pub location_coverage_rate: f64,
    pub remote_service_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicDistribution {
    pub states: Distribution,
    pub regions: Distribution,
    pub cities: Distribution,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicAnalysis {
    pub coverage_metrics: CoverageMetrics,
    pub distribution: GeographicDistribution,
    pub underserved_areas: Vec<UnderservedArea>,
    pub remote_services: usize,
    pub geographic_insights: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCooccurrence {
    pub categories: Vec<String>,
    pub cooccurrence_count: usize,
    /// Share of all services carrying both categories, one decimal.
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGap {
    pub category: String,
    pub current_count: usize,
    pub severity: Severity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalysis {
    pub total_categories: usize,
    pub category_distribution: Distribution,
    pub top_cooccurrences: Vec<CategoryCooccurrence>,
    pub category_gaps: Vec<CategoryGap>,
    /// Shannon entropy over category proportions of the service count.
    /// Proportions need not sum to 1 because a service can carry several
    /// categories.
    pub diversity_index: f64,
    pub category_insights: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallQuality {
    pub average_completeness: f64,
    pub average_verification: f64,
    /// Percentage of records with `verification_status == "verified"`.
    pub verification_rate: f64,
    pub youth_specific_rate: f64,
    pub indigenous_specific_rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceQuality {
    pub source: String,
    pub count: usize,
    pub avg_completeness: f64,
    pub avg_verification: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuality {
    pub category: String,
    pub count: usize,
    pub avg_completeness: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateQuality {
    pub state: String,
    pub count: usize,
    pub avg_completeness: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationTrend {
    Positive,
    NeedsImprovement,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessTrend {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityTrends {
    pub completeness_distribution: CompletenessTrend,
    pub verification_trend: VerificationTrend,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAnalysis {
    pub overall_quality: OverallQuality,
    pub quality_distribution: QualityDistribution,
    pub quality_by_source: Vec<SourceQuality>,
    pub quality_by_category: Vec<CategoryQuality>,
    pub quality_by_state: Vec<StateQuality>,
    pub quality_trends: QualityTrends,
    pub quality_issues: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapKind {
    Geographic,
    Categorical,
    Demographic,
}

/// A detected shortfall against an expected service baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    #[serde(rename = "type")]
    pub kind: GapKind,
    pub severity: Severity,
    pub description: String,
    pub current_services: usize,
    pub expected_services: usize,
    pub gap_size: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapTypeCounts {
    pub geographic: usize,
    pub categorical: usize,
    pub demographic: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapSeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    MarketExpansion,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthOpportunity {
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    pub description: String,
    pub estimated_impact: String,
    pub reasoning: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysis {
    pub total_gaps: usize,
    pub gaps_by_type: GapTypeCounts,
    pub gaps_by_severity: GapSeverityCounts,
    /// Insertion-ordered (geographic, then categorical, then demographic);
    /// the recommendation generator's stable ordering depends on this.
    pub gaps: Vec<Gap>,
    pub opportunities: Vec<GrowthOpportunity>,
    pub gap_analysis_insights: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubKind {
    MajorHub,
    RegionalHub,
    LocalHub,
}

/// An organization operating enough services to anchor a referral network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hub {
    pub organization: String,
    pub service_count: usize,
    /// Incident connections per service of the organization.
    pub influence: f64,
    #[serde(rename = "type")]
    pub kind: HubKind,
}

/// A service with no incident edge of any kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsolatedService {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetrics {
    pub total_hubs: usize,
    /// Mean services per hub, one decimal; 0 with no hubs.
    pub average_hub_size: f64,
    pub isolated_services: usize,
    /// `|edges| / (n(n-1)/2)`.
    pub network_density: f64,
    /// Simplified: fraction of edges with strength above
    /// [`super::STRONG_CONNECTION_THRESHOLD`], not the graph-theoretic
    /// definition.
    pub clustering_coefficient: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkOpportunityKind {
    HubExpansion,
    PartnershipDevelopment,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkOpportunity {
    #[serde(rename = "type")]
    pub kind: NetworkOpportunityKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_connections: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_partnerships: Option<usize>,
    pub estimated_impact: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcosystemStatus {
    Healthy,
    Developing,
    Fragmented,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemHealth {
    pub status: EcosystemStatus,
    /// Percentage of services with at least one connection, one decimal.
    pub health_score: f64,
    pub recommendations: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAnalysis {
    pub network_metrics: NetworkMetrics,
    pub major_hubs: Vec<Hub>,
    pub network_gaps: Vec<IsolatedService>,
    pub network_opportunities: Vec<NetworkOpportunity>,
    pub ecosystem_health: EcosystemHealth,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouthServiceMetrics {
    pub youth_specific_count: usize,
    pub youth_specific_rate: f64,
    pub age_appropriate_count: usize,
    pub universal_access_count: usize,
    pub transitional_support_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouthJusticeAlignment {
    pub aligned_services: usize,
    pub alignment_rate: f64,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouthFocusAnalysis {
    pub youth_service_metrics: YouthServiceMetrics,
    pub age_range_distribution: Distribution,
    pub youth_category_distribution: Distribution,
    pub youth_service_gaps: Vec<String>,
    pub youth_justice_alignment: YouthJusticeAlignment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Numeric weight used for the final stable ordering.
    pub fn weight(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    GeographicExpansion,
    ServiceDiversification,
    NetworkStrengthening,
    DataQuality,
    Technology,
}

/// An actionable recommendation derived from the analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub estimated_impact: String,
    pub implementation_effort: Effort,
    pub timeframe: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub timestamp: DateTime<Utc>,
    pub total_services: usize,
    pub analysis_version: String,
}

/// The terminal aggregate of one engine invocation. Built once, never
/// mutated, serialized verbatim for the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub metadata: ReportMetadata,
    pub connections: ConnectionAnalysis,
    pub geographic: GeographicAnalysis,
    pub categories: CategoryAnalysis,
    pub quality: QualityAnalysis,
    pub gaps: GapAnalysis,
    pub networks: NetworkAnalysis,
    pub youth_focus: YouthFocusAnalysis,
    pub recommendations: Vec<Recommendation>,
}
