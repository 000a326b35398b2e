use std::fmt;

use thiserror::Error;

/// Pipeline stages, used to attribute a failure to the analyzer that
/// produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisStage {
    Connections,
    Geographic,
    Categories,
    Quality,
    Gaps,
    Network,
    YouthFocus,
    Recommendations,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connections => "connection mapping",
            Self::Geographic => "geographic",
            Self::Categories => "category",
            Self::Quality => "quality",
            Self::Gaps => "gap",
            Self::Network => "network",
            Self::YouthFocus => "youth focus",
            Self::Recommendations => "recommendation",
        };
        f.write_str(name)
    }
}

/// Failures internal to a single analyzer.
///
/// Analyzers never panic on well-formed-enough input: missing record fields
/// are resolved by defaulting before they reach any arithmetic. The variants
/// here cover the arithmetic guards that remain (empty partitions,
/// non-finite intermediate values).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("invariant violation: {0}")]
    Invariant(String),
}

/// Errors surfaced by `InsightsEngine::generate`.
///
/// `EmptyDataset` is a caller error: the engine refuses to run before any
/// analyzer executes. `Analyzer` wraps an internal failure with the stage it
/// occurred in; it should not occur on any input that deserialized.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no service records provided for analysis")]
    EmptyDataset,
    #[error("{stage} analysis failed: {source}")]
    Analyzer {
        stage: AnalysisStage,
        #[source]
        source: AnalyzerError,
    },
}

#[cfg(test)]
mod tests {
    use super::{AnalysisStage, AnalyzerError, EngineError};

    #[test]
    fn analyzer_failures_name_their_stage() {
        let error = EngineError::Analyzer {
            stage: AnalysisStage::Quality,
            source: AnalyzerError::Invariant("empty completeness partition".to_owned()),
        };

        let rendered = error.to_string();
        assert!(rendered.starts_with("quality analysis failed"), "got: {rendered}");
    }

    #[test]
    fn empty_dataset_is_distinguishable_from_analyzer_failures() {
        assert!(matches!(EngineError::EmptyDataset, EngineError::EmptyDataset));
        assert_ne!(
            EngineError::EmptyDataset,
            EngineError::Analyzer {
                stage: AnalysisStage::Connections,
                source: AnalyzerError::Invariant("x".to_owned()),
            }
        );
    }
}
