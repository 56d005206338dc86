// apidex-core/src/lib.rs
// Deployment tracking with a compiled search mini-language

pub mod catalog;
pub mod error;
pub mod executor;
pub mod logging;
pub mod query;
pub mod record;
pub mod registry;
pub mod search_cache;
pub mod validate;

// Public exports
pub use catalog::{Field, FieldPath, FieldScope};
pub use error::{ApidexError, Result};
pub use executor::{execute, SearchPage, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use logging::{get_log_level, set_log_level, LogLevel};
pub use query::{compile, normalize_query, CombineOp, CompareOp, Predicate, TextMode, TypedValue};
pub use record::{DeploymentRecord, DeploymentRow, Environment, Platform};
pub use registry::{
    DeployOutcome, DeployRequest, DeploymentRegistry, RegistryStats, UpdateRequest,
};
pub use search_cache::{CacheStats, SearchCache, SearchKey};
pub use validate::ValidationErrors;
