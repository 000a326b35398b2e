pub mod config;
pub mod domain;
pub mod errors;
pub mod insights;

pub use config::{AppConfig, ConfigError, EngineConfig, LoadOptions, LogFormat, LoggingConfig};
pub use domain::{parse_services, Location, Organization, ServiceRecord};
pub use errors::{AnalysisStage, AnalyzerError, EngineError};
pub use insights::engine::InsightsEngine;
pub use insights::types::{
    Connection, ConnectionKind, Gap, GapKind, Hub, HubKind, InsightsReport, Priority,
    Recommendation, Severity,
};
