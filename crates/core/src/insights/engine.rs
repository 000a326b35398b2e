//! Insights orchestrator: sequences the analyzers and assembles the report.

use chrono::Utc;
use tracing::info;

use super::types::{InsightsReport, ReportMetadata};
use super::{categories, connections, gaps, geographic, network, quality, recommendations, youth};
use crate::config::EngineConfig;
use crate::domain::ServiceRecord;
use crate::errors::{AnalysisStage, AnalyzerError, EngineError};

/// The Service Insights and Connection Mapping engine.
///
/// One `generate` call runs the full pipeline over the supplied records and
/// returns a fresh report; the engine holds no state between invocations.
/// Analyzers are pure functions over the immutable input slice; the only
/// sequencing constraints are that network analysis needs the mapped
/// connections and recommendations need the gap list.
#[derive(Clone, Debug)]
pub struct InsightsEngine {
    config: EngineConfig,
}

impl InsightsEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the analysis pipeline.
    ///
    /// Fails fast with [`EngineError::EmptyDataset`] before any analyzer
    /// runs when no records are supplied; zero-valued sections (for example
    /// no youth-specific records) are normal results, not errors. The
    /// pairwise connection pass is O(n²) and dominates for large inputs.
    pub fn generate(&self, services: &[ServiceRecord]) -> Result<InsightsReport, EngineError> {
        if services.is_empty() {
            return Err(EngineError::EmptyDataset);
        }

        info!(
            event_name = "insights.generate.start",
            total_services = services.len(),
            "generating service insights"
        );

        let connections =
            connections::map_connections(services).map_err(at_stage(AnalysisStage::Connections))?;
        info!(
            event_name = "insights.connections.complete",
            total_connections = connections.total_connections,
            "mapped service connections"
        );

        let geographic =
            geographic::analyze(services).map_err(at_stage(AnalysisStage::Geographic))?;
        info!(
            event_name = "insights.geographic.complete",
            states_covered = geographic.coverage_metrics.states_covered,
            regions_covered = geographic.coverage_metrics.regions_covered,
            "analyzed geographic distribution"
        );

        let categories =
            categories::analyze(services).map_err(at_stage(AnalysisStage::Categories))?;
        info!(
            event_name = "insights.categories.complete",
            total_categories = categories.total_categories,
            "analyzed category distribution"
        );

        let quality = quality::analyze(services).map_err(at_stage(AnalysisStage::Quality))?;
        info!(
            event_name = "insights.quality.complete",
            average_completeness = quality.overall_quality.average_completeness,
            "analyzed service quality"
        );

        let gaps = gaps::analyze(services).map_err(at_stage(AnalysisStage::Gaps))?;
        info!(
            event_name = "insights.gaps.complete",
            total_gaps = gaps.total_gaps,
            "identified service gaps"
        );

        let networks = network::analyze(services, &connections.connections)
            .map_err(at_stage(AnalysisStage::Network))?;
        info!(
            event_name = "insights.network.complete",
            total_hubs = networks.network_metrics.total_hubs,
            isolated_services = networks.network_metrics.isolated_services,
            "analyzed service networks"
        );

        let youth_focus = youth::analyze(services).map_err(at_stage(AnalysisStage::YouthFocus))?;
        info!(
            event_name = "insights.youth_focus.complete",
            youth_specific = youth_focus.youth_service_metrics.youth_specific_count,
            "analyzed youth service focus"
        );

        let recommendations = recommendations::generate(&gaps.gaps)
            .map_err(at_stage(AnalysisStage::Recommendations))?;
        info!(
            event_name = "insights.generate.complete",
            recommendations = recommendations.len(),
            "insights report assembled"
        );

        Ok(InsightsReport {
            metadata: ReportMetadata {
                timestamp: Utc::now(),
                total_services: services.len(),
                analysis_version: env!("CARGO_PKG_VERSION").to_owned(),
            },
            connections,
            geographic,
            categories,
            quality,
            gaps,
            networks,
            youth_focus,
            recommendations,
        })
    }
}

impl Default for InsightsEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn at_stage(stage: AnalysisStage) -> impl FnOnce(AnalyzerError) -> EngineError {
    move |source| EngineError::Analyzer { stage, source }
}
