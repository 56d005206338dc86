// apidex-core/src/registry.rs
//! In-memory deployment registry: upsert-style deploys, partial updates,
//! cached search.

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ApidexError, Result};
use crate::executor::{self, SearchPage};
use crate::query;
use crate::record::{DeploymentRecord, DeploymentRow, Environment, Platform};
use crate::search_cache::{CacheStats, SearchCache, SearchKey};
use crate::validate::{self, FieldError, ValidationErrors, MAX_PROPERTIES_PER_DEPLOYMENT};
use crate::{log_debug, log_info};

/// Full deploy request for one (api, platform, environment) target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRequest {
    pub api_name: String,
    pub platform_id: String,
    pub environment_id: String,
    #[serde(default)]
    pub version: Option<String>,
    pub status: String,
    pub updated_by: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Partial update of an existing deployment. `None` fields are untouched;
/// `properties` entries are merged over the existing map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub properties: Option<BTreeMap<String, String>>,
}

/// What a deploy actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeployOutcome {
    /// First deployment of this API anywhere.
    Created,
    /// Known API, first deployment on this platform.
    PlatformAdded,
    /// Known platform, first deployment in this environment.
    EnvironmentAdded,
    /// Re-deploy of an existing (platform, environment) pair.
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total_apis: usize,
    /// Total (platform, environment) pairs across all records.
    pub total_deployments: usize,
}

/// Thread-safe registry of deployment records keyed by API name.
///
/// Every mutation invalidates the search cache wholesale; with at most a
/// few thousand records a full re-scan on the next search is cheaper than
/// tracking which queries a mutation could affect.
pub struct DeploymentRegistry {
    records: RwLock<BTreeMap<String, DeploymentRecord>>,
    cache: SearchCache,
}

impl DeploymentRegistry {
    pub fn new() -> Self {
        DeploymentRegistry {
            records: RwLock::new(BTreeMap::new()),
            cache: SearchCache::default(),
        }
    }

    /// Upsert one deployment. Creates the record, platform, or environment
    /// as needed; on re-deploy refreshes everything except
    /// `deployment_date`, which is set exactly once.
    pub fn deploy(&self, request: DeployRequest) -> Result<DeployOutcome> {
        validate::validate_deploy_request(&request)?;

        let now = Utc::now();
        let version = request.version.unwrap_or_default();
        let mut records = self.records.write();

        let outcome = match records.get_mut(&request.api_name) {
            None => {
                let mut record = DeploymentRecord::new(request.api_name.clone());
                record.platforms.push(Platform {
                    platform_id: request.platform_id.clone(),
                    environments: vec![Environment {
                        environment_id: request.environment_id.clone(),
                        version,
                        status: request.status,
                        deployment_date: now,
                        last_updated: now,
                        updated_by: request.updated_by,
                        properties: request.properties,
                    }],
                });
                records.insert(request.api_name.clone(), record);
                DeployOutcome::Created
            }
            Some(record) => match record.platform_mut(&request.platform_id) {
                None => {
                    record.platforms.push(Platform {
                        platform_id: request.platform_id.clone(),
                        environments: vec![Environment {
                            environment_id: request.environment_id.clone(),
                            version,
                            status: request.status,
                            deployment_date: now,
                            last_updated: now,
                            updated_by: request.updated_by,
                            properties: request.properties,
                        }],
                    });
                    DeployOutcome::PlatformAdded
                }
                Some(platform) => match platform.environment_mut(&request.environment_id) {
                    None => {
                        platform.environments.push(Environment {
                            environment_id: request.environment_id.clone(),
                            version,
                            status: request.status,
                            deployment_date: now,
                            last_updated: now,
                            updated_by: request.updated_by,
                            properties: request.properties,
                        });
                        DeployOutcome::EnvironmentAdded
                    }
                    Some(env) => {
                        env.version = version;
                        env.status = request.status;
                        env.updated_by = request.updated_by;
                        env.properties = request.properties;
                        env.last_updated = now;
                        DeployOutcome::Updated
                    }
                },
            },
        };
        drop(records);

        self.cache.invalidate_all();
        log_info!(
            "deploy {}/{}/{}: {:?}",
            request.api_name,
            request.platform_id,
            request.environment_id,
            outcome
        );
        Ok(outcome)
    }

    /// Partial update of one existing deployment.
    pub fn update(
        &self,
        api_name: &str,
        platform_id: &str,
        environment_id: &str,
        patch: UpdateRequest,
    ) -> Result<()> {
        validate::validate_update_request(&patch)?;

        let mut records = self.records.write();
        let record = records
            .get_mut(api_name)
            .ok_or_else(|| ApidexError::ApiNotFound(api_name.to_string()))?;
        let env = record
            .platform_mut(platform_id)
            .and_then(|p| p.environment_mut(environment_id))
            .ok_or_else(|| ApidexError::DeploymentNotFound {
                api_name: api_name.to_string(),
                platform_id: platform_id.to_string(),
                environment_id: environment_id.to_string(),
            })?;

        if let Some(version) = patch.version {
            env.version = version;
        }
        if let Some(status) = patch.status {
            env.status = status;
        }
        if let Some(updated_by) = patch.updated_by {
            env.updated_by = updated_by;
        }
        if let Some(properties) = patch.properties {
            env.properties.extend(properties);
            if env.properties.len() > MAX_PROPERTIES_PER_DEPLOYMENT {
                return Err(ApidexError::Validation(ValidationErrors(vec![FieldError {
                    field: "properties",
                    message: format!(
                        "merged property count exceeds {}",
                        MAX_PROPERTIES_PER_DEPLOYMENT
                    ),
                }])));
            }
        }
        env.last_updated = Utc::now();
        drop(records);

        self.cache.invalidate_all();
        log_info!("update {}/{}/{}", api_name, platform_id, environment_id);
        Ok(())
    }

    pub fn get(&self, api_name: &str) -> Result<DeploymentRecord> {
        self.records
            .read()
            .get(api_name)
            .cloned()
            .ok_or_else(|| ApidexError::ApiNotFound(api_name.to_string()))
    }

    /// Remove an API's whole record; returns it.
    pub fn delete(&self, api_name: &str) -> Result<DeploymentRecord> {
        let removed = self
            .records
            .write()
            .remove(api_name)
            .ok_or_else(|| ApidexError::ApiNotFound(api_name.to_string()))?;
        self.cache.invalidate_all();
        log_info!("delete {}", api_name);
        Ok(removed)
    }

    pub fn stats(&self) -> RegistryStats {
        let records = self.records.read();
        RegistryStats {
            total_apis: records.len(),
            total_deployments: records.values().map(|r| r.deployment_count()).sum(),
        }
    }

    /// Compile and run a search, read-through the result cache.
    pub fn search(
        &self,
        query: &str,
        case_sensitive: bool,
        regex_mode: bool,
        page: usize,
        per_page: usize,
    ) -> Result<SearchPage> {
        let predicate = query::compile(query, case_sensitive, regex_mode)?;
        let key = SearchKey::new(
            &query::normalize_query(query),
            case_sensitive,
            regex_mode,
            page,
            per_page,
        );
        if let Some(hit) = self.cache.get(&key) {
            log_debug!("search cache hit for '{}'", query);
            return Ok(hit);
        }

        let records = self.records.read();
        let result = executor::execute(records.values(), &predicate, page, per_page);
        drop(records);
        log_debug!("search '{}' matched {} rows", query, result.total_rows);

        self.cache.insert(key, result.clone());
        Ok(result)
    }

    /// Exact property lookup without going through the query language.
    pub fn search_by_property(&self, key: &str, value: &str) -> Vec<DeploymentRow> {
        let records = self.records.read();
        records
            .values()
            .flat_map(|r| r.rows())
            .filter(|row| row.properties.get(key).map_or(false, |v| v == value))
            .collect()
    }

    /// Replace the registry contents with a snapshot. Returns the number of
    /// records imported. Later duplicates of an api_name win.
    pub fn import_records(&self, snapshot: Vec<DeploymentRecord>) -> usize {
        let mut records = self.records.write();
        records.clear();
        for record in snapshot {
            records.insert(record.api_name.clone(), record);
        }
        let count = records.len();
        drop(records);
        self.cache.invalidate_all();
        log_info!("imported {} records", count);
        count
    }

    /// Snapshot of every record, ordered by API name.
    pub fn export_records(&self) -> Vec<DeploymentRecord> {
        self.records.read().values().cloned().collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for DeploymentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
