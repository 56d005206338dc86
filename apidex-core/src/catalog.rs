// apidex-core/src/catalog.rs
//! Attribute catalog and fixed enumeration tables.
//!
//! The attribute catalog maps the human field names accepted by the search
//! language onto document paths, and records which paths live inside the
//! Environment array (and therefore need per-element matching). The
//! platform/environment/status enumerations are the single source of truth
//! shared by deployment validation and the search layer, so "valid platform
//! IDs" and "searchable platform IDs" can never drift apart.
//!
//! All tables are immutable constants built once at startup.

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashSet;

/// Platforms an API can be deployed to.
pub const VALID_PLATFORMS: &[&str] = &[
    "IP2",
    "IP3",
    "IP4",
    "IP5",
    "IP6",
    "IP7",
    "OpenShift",
    "Kubernetes",
    "Docker",
    "AWS",
    "Azure",
    "GCP",
];

/// Environments within a platform.
pub const VALID_ENVIRONMENTS: &[&str] = &[
    "dev",
    "tst",
    "acc",
    "stg",
    "prd",
    "prd-uitwijk",
    "dr",
    "uat",
    "qa",
];

/// Deployment statuses.
pub const VALID_STATUSES: &[&str] = &[
    "RUNNING",
    "STOPPED",
    "PENDING",
    "FAILED",
    "DEPLOYING",
    "DEPLOYED",
    "UNKNOWN",
    "ERROR",
    "MAINTENANCE",
];

lazy_static! {
    static ref PLATFORM_SET: HashSet<&'static str> = VALID_PLATFORMS.iter().copied().collect();
    static ref ENVIRONMENT_SET: HashSet<&'static str> =
        VALID_ENVIRONMENTS.iter().copied().collect();
    static ref STATUS_SET: HashSet<&'static str> = VALID_STATUSES.iter().copied().collect();
}

pub fn is_valid_platform(platform_id: &str) -> bool {
    PLATFORM_SET.contains(platform_id)
}

pub fn is_valid_environment(environment_id: &str) -> bool {
    ENVIRONMENT_SET.contains(environment_id)
}

pub fn is_valid_status(status: &str) -> bool {
    STATUS_SET.contains(status)
}

/// A searchable document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    ApiName,
    PlatformId,
    EnvironmentId,
    Status,
    Version,
    UpdatedBy,
}

/// Where a field lives in the nested record structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldScope {
    /// Top level of the record (`API Name`).
    Root,
    /// Inside the Platform array.
    PlatformArray,
    /// Inside the Environment array - comparisons must be scoped to a
    /// single array element (see `Predicate::matches_row`).
    EnvironmentArray,
}

/// Resolved document path for an attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldPath {
    pub field: Field,
    pub scope: FieldScope,
}

impl FieldPath {
    /// True when comparisons on this field must all look at the same
    /// Environment element within one condition group.
    pub fn per_environment_element(&self) -> bool {
        matches!(self.scope, FieldScope::EnvironmentArray)
    }

    /// The store-native dotted path, for executor translation and logs.
    pub fn store_path(&self) -> &'static str {
        match self.field {
            Field::ApiName => "API Name",
            Field::PlatformId => "Platform.PlatformID",
            Field::EnvironmentId => "Platform.Environment.environmentID",
            Field::Status => "Platform.Environment.status",
            Field::Version => "Platform.Environment.version",
            Field::UpdatedBy => "Platform.Environment.updatedBy",
        }
    }
}

const fn path(field: Field, scope: FieldScope) -> FieldPath {
    FieldPath { field, scope }
}

/// Fields scanned by free-text search, in display order.
pub const FREE_TEXT_FIELDS: [FieldPath; 5] = [
    path(Field::ApiName, FieldScope::Root),
    path(Field::PlatformId, FieldScope::PlatformArray),
    path(Field::EnvironmentId, FieldScope::EnvironmentArray),
    path(Field::Status, FieldScope::EnvironmentArray),
    path(Field::UpdatedBy, FieldScope::EnvironmentArray),
];

/// Resolve a human attribute name to its document path.
///
/// Case-insensitive exact match against a fixed table. Unknown names return
/// `None`, signaling the caller to fall back to free-text handling.
pub fn resolve(name: &str) -> Option<FieldPath> {
    match name.trim().to_uppercase().as_str() {
        "API NAME" => Some(path(Field::ApiName, FieldScope::Root)),
        "PLATFORM" | "PLATFORMID" => Some(path(Field::PlatformId, FieldScope::PlatformArray)),
        "ENVIRONMENT" | "ENVIRONMENTID" => {
            Some(path(Field::EnvironmentId, FieldScope::EnvironmentArray))
        }
        "STATUS" => Some(path(Field::Status, FieldScope::EnvironmentArray)),
        "VERSION" => Some(path(Field::Version, FieldScope::EnvironmentArray)),
        "UPDATEDBY" => Some(path(Field::UpdatedBy, FieldScope::EnvironmentArray)),
        _ => None,
    }
}
