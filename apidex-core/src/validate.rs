// apidex-core/src/validate.rs
//! Request validation for deploy and update operations.
//!
//! Field rules:
//! - api_name: 3-100 chars, alphanumeric plus inner hyphen/underscore,
//!   cannot start or end with a special character
//! - platform_id / environment_id / status: strictly from the catalog tables
//! - version: digits separated by dots, optional `v` prefix (1.0.0, v2.1)
//! - updated_by: 2-100 chars, any printable text, no control characters
//! - properties: at most 100 entries, key 1-100 chars, value up to 1000 chars

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog;
use crate::error::{ApidexError, Result};
use crate::registry::{DeployRequest, UpdateRequest};

pub const MAX_API_NAME_LENGTH: usize = 100;
pub const MIN_API_NAME_LENGTH: usize = 3;
pub const MAX_PROPERTY_KEY_LENGTH: usize = 100;
pub const MAX_PROPERTY_VALUE_LENGTH: usize = 1000;
pub const MAX_PROPERTIES_PER_DEPLOYMENT: usize = 100;

lazy_static! {
    static ref API_NAME_RE: Regex =
        Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9_-]*[A-Za-z0-9])?$").unwrap();
    static ref VERSION_RE: Regex = Regex::new(r"^v?\d+(\.\d+){0,3}$").unwrap();
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All failures for one request, collected rather than first-error-wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

struct Collector(Vec<FieldError>);

impl Collector {
    fn new() -> Self {
        Collector(Vec::new())
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn finish(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApidexError::Validation(ValidationErrors(self.0)))
        }
    }
}

pub fn is_valid_api_name(api_name: &str) -> bool {
    api_name.len() >= MIN_API_NAME_LENGTH
        && api_name.len() <= MAX_API_NAME_LENGTH
        && API_NAME_RE.is_match(api_name)
}

pub fn is_valid_version(version: &str) -> bool {
    VERSION_RE.is_match(version)
}

pub fn is_valid_updated_by(updated_by: &str) -> bool {
    let len = updated_by.chars().count();
    (2..=100).contains(&len) && !updated_by.chars().any(|c| c.is_control())
}

fn check_properties(collector: &mut Collector, properties: &BTreeMap<String, String>) {
    if properties.len() > MAX_PROPERTIES_PER_DEPLOYMENT {
        collector.push(
            "properties",
            format!(
                "at most {} properties allowed per deployment",
                MAX_PROPERTIES_PER_DEPLOYMENT
            ),
        );
        return;
    }
    for (key, value) in properties {
        if key.trim().is_empty() {
            collector.push("properties", "property key cannot be empty");
        } else if key.len() > MAX_PROPERTY_KEY_LENGTH {
            collector.push(
                "properties",
                format!("property key too long (max {} chars): {}", MAX_PROPERTY_KEY_LENGTH, key),
            );
        }
        if value.len() > MAX_PROPERTY_VALUE_LENGTH {
            collector.push(
                "properties",
                format!(
                    "property value too long (max {} chars): {}",
                    MAX_PROPERTY_VALUE_LENGTH, key
                ),
            );
        }
    }
}

/// Validate a full deploy request. Collects every violation so the caller
/// can report them all at once.
pub fn validate_deploy_request(req: &DeployRequest) -> Result<()> {
    let mut collector = Collector::new();

    if !is_valid_api_name(&req.api_name) {
        collector.push(
            "api_name",
            "must be 3-100 characters, alphanumeric with inner hyphens/underscores",
        );
    }
    if !catalog::is_valid_platform(&req.platform_id) {
        collector.push(
            "platform_id",
            format!(
                "'{}' is not a configured platform ({})",
                req.platform_id,
                catalog::VALID_PLATFORMS.join(", ")
            ),
        );
    }
    if !catalog::is_valid_environment(&req.environment_id) {
        collector.push(
            "environment_id",
            format!(
                "'{}' is not a configured environment ({})",
                req.environment_id,
                catalog::VALID_ENVIRONMENTS.join(", ")
            ),
        );
    }
    if !catalog::is_valid_status(&req.status) {
        collector.push(
            "status",
            format!(
                "'{}' is not a configured status ({})",
                req.status,
                catalog::VALID_STATUSES.join(", ")
            ),
        );
    }
    if let Some(version) = &req.version {
        if !is_valid_version(version) {
            collector.push("version", "must be digits separated by dots (e.g. 1.0.0, v2.1.3)");
        }
    }
    if !is_valid_updated_by(&req.updated_by) {
        collector.push(
            "updated_by",
            "must be 2-100 characters without control characters",
        );
    }
    check_properties(&mut collector, &req.properties);

    collector.finish()
}

/// Validate a partial update. At least one field must be present.
pub fn validate_update_request(patch: &UpdateRequest) -> Result<()> {
    let mut collector = Collector::new();

    if patch.version.is_none()
        && patch.status.is_none()
        && patch.updated_by.is_none()
        && patch.properties.is_none()
    {
        collector.push("patch", "at least one field must be provided");
    }
    if let Some(version) = &patch.version {
        if !is_valid_version(version) {
            collector.push("version", "must be digits separated by dots (e.g. 1.0.0, v2.1.3)");
        }
    }
    if let Some(status) = &patch.status {
        if !catalog::is_valid_status(status) {
            collector.push(
                "status",
                format!(
                    "'{}' is not a configured status ({})",
                    status,
                    catalog::VALID_STATUSES.join(", ")
                ),
            );
        }
    }
    if let Some(updated_by) = &patch.updated_by {
        if !is_valid_updated_by(updated_by) {
            collector.push(
                "updated_by",
                "must be 2-100 characters without control characters",
            );
        }
    }
    if let Some(properties) = &patch.properties {
        check_properties(&mut collector, properties);
    }

    collector.finish()
}
