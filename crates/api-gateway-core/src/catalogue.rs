// crates/api-gateway-core/src/catalogue.rs
// ============================================================================
// Module: Catalogue Export
// Description: Machine-readable export of every registered capability.
// Purpose: Let tool-calling clients discover capabilities and their inputs.
// Dependencies: serde, serde_json, crate::{registry, schema}
// ============================================================================

//! ## Overview
//! The catalogue is a JSON array with one entry per capability, ordered by
//! name so the document is byte-stable for a given registry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::registry::CapabilityRegistry;
use crate::schema::ParameterSchema;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Catalogue entry for a single capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    /// Capability name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Parameter schema.
    pub parameters: ParameterSchema,
}

// ============================================================================
// SECTION: Export
// ============================================================================

/// Exports every capability in `registry`, ordered by name.
#[must_use]
pub fn export_catalogue(registry: &CapabilityRegistry) -> Vec<CatalogueEntry> {
    registry
        .list_all()
        .map(|descriptor| CatalogueEntry {
            name: descriptor.name().to_string(),
            description: descriptor.description().to_string(),
            parameters: descriptor.schema().clone(),
        })
        .collect()
}

/// Serializes the catalogue to compact JSON.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when serialization fails.
pub fn export_catalogue_json(registry: &CapabilityRegistry) -> Result<String, serde_json::Error> {
    serde_json::to_string(&export_catalogue(registry))
}
