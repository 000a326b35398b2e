pub mod service;

pub use service::{parse_services, Location, Organization, ServiceRecord, UNKNOWN};
