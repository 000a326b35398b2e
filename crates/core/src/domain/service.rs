//! Input data model for the insights pipeline.
//!
//! Records arrive from an external ingestion subsystem and are read-only
//! here. Deserialization is deliberately tolerant: every optional field has
//! a documented fallback, so a sparse or partially malformed record never
//! fails to load.

use serde::{Deserialize, Serialize};

/// Placeholder for absent organization and data-source names.
pub const UNKNOWN: &str = "Unknown";

/// Operating organization attached to a service record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub name: Option<String>,
}

/// A physical location for a service. All fields are optional; the pipeline
/// only ever consults the first location of a record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub city: Option<String>,
    pub region: Option<String>,
    pub state_province: Option<String>,
}

/// A single social-service record as supplied by the ingestion subsystem.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRecord {
    /// Opaque unique identifier, assigned upstream.
    pub id: String,
    pub name: String,
    pub organization: Option<Organization>,
    /// Ordered locations; only `locations[0]` participates in geographic
    /// rules.
    pub locations: Vec<Location>,
    pub categories: Vec<String>,
    /// Completeness of the record's fields, in `[0, 1]`. Missing scores as 0.
    pub completeness_score: f64,
    /// Verification confidence, in `[0, 1]`. Missing scores as 0.
    pub verification_score: f64,
    /// Compared against the literal `"verified"`.
    pub verification_status: Option<String>,
    pub youth_specific: bool,
    pub indigenous_specific: bool,
    pub minimum_age: Option<u32>,
    pub maximum_age: Option<u32>,
    /// Ingestion origin of the record.
    pub data_source: Option<String>,
}

impl ServiceRecord {
    /// Organization name with the `"Unknown"` fallback for absent or empty
    /// names. Records normalized to `"Unknown"` still group together in the
    /// organizational connection rule and hub detection.
    pub fn organization_name(&self) -> &str {
        self.organization
            .as_ref()
            .and_then(|organization| organization.name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN)
    }

    /// Data-source name with the `"Unknown"` fallback.
    pub fn source_name(&self) -> &str {
        self.data_source.as_deref().filter(|source| !source.is_empty()).unwrap_or(UNKNOWN)
    }

    /// The record's first location, if it has any.
    pub fn primary_location(&self) -> Option<&Location> {
        self.locations.first()
    }

    pub fn is_verified(&self) -> bool {
        self.verification_status.as_deref() == Some("verified")
    }
}

/// Fills in `"Unknown"` for an absent or empty location field.
pub(crate) fn or_unknown(value: Option<&str>) -> &str {
    value.filter(|value| !value.is_empty()).unwrap_or(UNKNOWN)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ServicesDocument {
    List(Vec<ServiceRecord>),
    Wrapped { services: Vec<ServiceRecord> },
}

/// Parses a services export: either a bare JSON array of records or an
/// object wrapping the array under a `services` key.
pub fn parse_services(raw: &str) -> Result<Vec<ServiceRecord>, serde_json::Error> {
    serde_json::from_str::<ServicesDocument>(raw).map(|document| match document {
        ServicesDocument::List(services) => services,
        ServicesDocument::Wrapped { services } => services,
    })
}
