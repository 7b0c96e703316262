//! Upstream FHIR server access

mod client;

pub use client::{FhirClient, FhirResponse};
