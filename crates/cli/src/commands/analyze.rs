use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use servicemap_core::{parse_services, AppConfig, EngineError, InsightsEngine, LoadOptions};
use tracing::info;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct AnalyzeReport {
    command: &'static str,
    status: &'static str,
    report_path: String,
    total_services: usize,
    total_connections: usize,
    total_gaps: usize,
    recommendations: usize,
}

pub fn run(input: &Path, output: Option<&Path>, pretty: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("analyze", "config_validation", error.to_string(), 2)
        }
    };

    let raw = match fs::read_to_string(input) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "analyze",
                "input_read",
                format!("could not read `{}`: {error}", input.display()),
                2,
            )
        }
    };

    let services = match parse_services(&raw) {
        Ok(services) => services,
        Err(error) => {
            return CommandResult::failure(
                "analyze",
                "input_parse",
                format!("could not parse `{}`: {error}", input.display()),
                2,
            )
        }
    };

    let engine = InsightsEngine::new(config.engine.clone());
    let report = match engine.generate(&services) {
        Ok(report) => report,
        Err(EngineError::EmptyDataset) => {
            return CommandResult::failure(
                "analyze",
                "empty_dataset",
                "no service records provided for analysis",
                2,
            )
        }
        Err(error) => return CommandResult::failure("analyze", "analysis", error.to_string(), 1),
    };

    let payload = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    let payload = match payload {
        Ok(payload) => payload,
        Err(error) => {
            return CommandResult::failure("analyze", "serialization", error.to_string(), 1)
        }
    };

    let report_path = output.map(Path::to_path_buf).unwrap_or_else(default_report_path);
    if let Err(error) = fs::write(&report_path, payload) {
        return CommandResult::failure(
            "analyze",
            "report_write",
            format!("could not write `{}`: {error}", report_path.display()),
            1,
        );
    }

    info!(
        event_name = "cli.analyze.report_written",
        path = %report_path.display(),
        total_services = report.metadata.total_services,
        "insights report saved"
    );

    CommandResult::report(AnalyzeReport {
        command: "analyze",
        status: "ok",
        report_path: report_path.display().to_string(),
        total_services: report.metadata.total_services,
        total_connections: report.connections.total_connections,
        total_gaps: report.gaps.total_gaps,
        recommendations: report.recommendations.len(),
    })
}

fn default_report_path() -> PathBuf {
    PathBuf::from(format!("service-insights-report-{}.json", Utc::now().format("%Y-%m-%d")))
}
