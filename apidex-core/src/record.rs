// apidex-core/src/record.rs
// Nested deployment record model and its flattened row projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Field;

/// One API's full deployment footprint across platforms/environments.
///
/// The API name is the natural unique key. Serde field names mirror the
/// store's wire format so snapshots stay interchangeable with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    #[serde(rename = "API Name")]
    pub api_name: String,

    /// Invariant: `platform_id` values are unique within one record.
    #[serde(rename = "Platform", default)]
    pub platforms: Vec<Platform>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(rename = "PlatformID")]
    pub platform_id: String,

    /// Invariant: `environment_id` values are unique within one platform.
    #[serde(rename = "Environment", default)]
    pub environments: Vec<Environment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(rename = "environmentID")]
    pub environment_id: String,

    /// Semantic-version-like, but stored as an opaque string.
    #[serde(default)]
    pub version: String,

    pub status: String,

    /// Set once, on the first deploy of this (platform, environment) pair.
    #[serde(rename = "deploymentDate")]
    pub deployment_date: DateTime<Utc>,

    /// Refreshed on every update.
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,

    #[serde(rename = "updatedBy")]
    pub updated_by: String,

    /// Free-form key/value pairs. BTreeMap keeps serialization and
    /// iteration order deterministic.
    #[serde(rename = "Properties", default)]
    pub properties: BTreeMap<String, String>,
}

/// Flattened one-row-per-(platform, environment) projection.
///
/// This is both the table-display shape and the unit of predicate
/// evaluation: evaluating a whole condition group against a single row is
/// what gives Environment-array comparisons their per-element semantics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentRow {
    #[serde(rename = "API Name")]
    pub api_name: String,
    #[serde(rename = "PlatformID")]
    pub platform_id: String,
    #[serde(rename = "Environment")]
    pub environment_id: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "DeploymentDate")]
    pub deployment_date: DateTime<Utc>,
    #[serde(rename = "LastUpdated")]
    pub last_updated: DateTime<Utc>,
    #[serde(rename = "UpdatedBy")]
    pub updated_by: String,
    #[serde(rename = "Properties")]
    pub properties: BTreeMap<String, String>,
}

impl DeploymentRecord {
    pub fn new(api_name: impl Into<String>) -> Self {
        DeploymentRecord {
            api_name: api_name.into(),
            platforms: Vec::new(),
        }
    }

    pub fn platform(&self, platform_id: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.platform_id == platform_id)
    }

    pub fn platform_mut(&mut self, platform_id: &str) -> Option<&mut Platform> {
        self.platforms
            .iter_mut()
            .find(|p| p.platform_id == platform_id)
    }

    /// Total number of (platform, environment) deployments in this record.
    pub fn deployment_count(&self) -> usize {
        self.platforms.iter().map(|p| p.environments.len()).sum()
    }

    /// Flatten into rows, preserving platform and environment order.
    pub fn rows(&self) -> Vec<DeploymentRow> {
        let mut rows = Vec::with_capacity(self.deployment_count());
        for platform in &self.platforms {
            for env in &platform.environments {
                rows.push(DeploymentRow {
                    api_name: self.api_name.clone(),
                    platform_id: platform.platform_id.clone(),
                    environment_id: env.environment_id.clone(),
                    version: env.version.clone(),
                    status: env.status.clone(),
                    deployment_date: env.deployment_date,
                    last_updated: env.last_updated,
                    updated_by: env.updated_by.clone(),
                    properties: env.properties.clone(),
                });
            }
        }
        rows
    }
}

impl Platform {
    pub fn environment(&self, environment_id: &str) -> Option<&Environment> {
        self.environments
            .iter()
            .find(|e| e.environment_id == environment_id)
    }

    pub fn environment_mut(&mut self, environment_id: &str) -> Option<&mut Environment> {
        self.environments
            .iter_mut()
            .find(|e| e.environment_id == environment_id)
    }
}

impl DeploymentRow {
    /// String value of a searchable field on this row.
    pub fn field_str(&self, field: Field) -> &str {
        match field {
            Field::ApiName => &self.api_name,
            Field::PlatformId => &self.platform_id,
            Field::EnvironmentId => &self.environment_id,
            Field::Status => &self.status,
            Field::Version => &self.version,
            Field::UpdatedBy => &self.updated_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn sample_record() -> DeploymentRecord {
        DeploymentRecord {
            api_name: "payments-api".to_string(),
            platforms: vec![Platform {
                platform_id: "IP4".to_string(),
                environments: vec![
                    Environment {
                        environment_id: "dev".to_string(),
                        version: "1.0.0".to_string(),
                        status: "STOPPED".to_string(),
                        deployment_date: ts(),
                        last_updated: ts(),
                        updated_by: "alice".to_string(),
                        properties: BTreeMap::new(),
                    },
                    Environment {
                        environment_id: "tst".to_string(),
                        version: "1.1.0".to_string(),
                        status: "RUNNING".to_string(),
                        deployment_date: ts(),
                        last_updated: ts(),
                        updated_by: "bob".to_string(),
                        properties: BTreeMap::from([(
                            "debug.logging".to_string(),
                            "false".to_string(),
                        )]),
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_rows_flattening() {
        let record = sample_record();
        let rows = record.rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].api_name, "payments-api");
        assert_eq!(rows[0].platform_id, "IP4");
        assert_eq!(rows[0].environment_id, "dev");
        assert_eq!(rows[1].environment_id, "tst");
        assert_eq!(rows[1].properties.get("debug.logging").unwrap(), "false");
    }

    #[test]
    fn test_deployment_count() {
        assert_eq!(sample_record().deployment_count(), 2);
        assert_eq!(DeploymentRecord::new("empty").deployment_count(), 0);
    }

    #[test]
    fn test_platform_and_environment_lookup() {
        let record = sample_record();
        let platform = record.platform("IP4").unwrap();
        assert!(platform.environment("tst").is_some());
        assert!(platform.environment("prd").is_none());
        assert!(record.platform("AWS").is_none());
    }

    #[test]
    fn test_wire_format_round_trip() {
        let record = sample_record();
        let json = serde_json::to_value(&record).unwrap();

        // Wire names follow the store format
        assert_eq!(json["API Name"], "payments-api");
        assert_eq!(json["Platform"][0]["PlatformID"], "IP4");
        assert_eq!(
            json["Platform"][0]["Environment"][1]["environmentID"],
            "tst"
        );
        assert_eq!(
            json["Platform"][0]["Environment"][1]["Properties"]["debug.logging"],
            "false"
        );

        let restored: DeploymentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let record: DeploymentRecord =
            serde_json::from_str(r#"{"API Name": "bare-api"}"#).unwrap();
        assert_eq!(record.api_name, "bare-api");
        assert!(record.platforms.is_empty());
    }

    #[test]
    fn test_row_field_str() {
        let rows = sample_record().rows();
        let row = &rows[1];
        assert_eq!(row.field_str(Field::ApiName), "payments-api");
        assert_eq!(row.field_str(Field::PlatformId), "IP4");
        assert_eq!(row.field_str(Field::EnvironmentId), "tst");
        assert_eq!(row.field_str(Field::Status), "RUNNING");
        assert_eq!(row.field_str(Field::Version), "1.1.0");
        assert_eq!(row.field_str(Field::UpdatedBy), "bob");
    }
}
