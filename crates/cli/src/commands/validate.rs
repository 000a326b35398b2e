use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Serialize;
use servicemap_core::parse_services;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct ValidateReport {
    command: &'static str,
    status: &'static str,
    total_services: usize,
    services_with_location: usize,
    youth_specific: usize,
    distinct_sources: usize,
}

/// Parse-only check: confirms the export loads and reports headline counts
/// without running any analysis.
pub fn run(input: &Path) -> CommandResult {
    let raw = match fs::read_to_string(input) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "validate",
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
                "validate",
                "input_parse",
                format!("could not parse `{}`: {error}", input.display()),
                2,
            )
        }
    };

    if services.is_empty() {
        return CommandResult::failure(
            "validate",
            "empty_dataset",
            "export contains no service records",
            2,
        );
    }

    let distinct_sources: HashSet<&str> =
        services.iter().map(|service| service.source_name()).collect();

    CommandResult::report(ValidateReport {
        command: "validate",
        status: "ok",
        total_services: services.len(),
        services_with_location: services
            .iter()
            .filter(|service| !service.locations.is_empty())
            .count(),
        youth_specific: services.iter().filter(|service| service.youth_specific).count(),
        distinct_sources: distinct_sources.len(),
    })
}
