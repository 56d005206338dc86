use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use apidex_core::{
    set_log_level, DeployRequest, DeploymentRecord, DeploymentRegistry, LogLevel, SearchPage,
    UpdateRequest, DEFAULT_PAGE_SIZE,
};

#[derive(Parser)]
#[command(name = "apidex")]
#[command(about = "apidex CLI - track and search API deployments")]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Deployment snapshot file
    #[arg(long, global = true, default_value = "apidex.json")]
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search deployments with the query language
    Search {
        /// Query string, e.g. 'Platform = IP4 AND Status = RUNNING'.
        /// Empty matches everything.
        #[arg(default_value = "")]
        query: String,
        /// Match values case-sensitively
        #[arg(long)]
        case_sensitive: bool,
        /// Treat the query as a regular expression
        #[arg(long)]
        regex: bool,
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Rows per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        per_page: usize,
    },
    /// Compile a query and print the resulting predicate
    Explain {
        query: String,
        #[arg(long)]
        case_sensitive: bool,
        #[arg(long)]
        regex: bool,
    },
    /// Record a deployment (upsert)
    Deploy {
        api_name: String,
        platform: String,
        environment: String,
        #[arg(long)]
        version: Option<String>,
        #[arg(long, default_value = "DEPLOYED")]
        status: String,
        #[arg(long)]
        updated_by: String,
        /// Property as key=value, repeatable
        #[arg(long = "prop")]
        properties: Vec<String>,
    },
    /// Update fields of an existing deployment
    Update {
        api_name: String,
        platform: String,
        environment: String,
        #[arg(long)]
        version: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        updated_by: Option<String>,
        /// Property as key=value, repeatable; merged over existing entries
        #[arg(long = "prop")]
        properties: Vec<String>,
    },
    /// Print one API's full record as JSON
    Get { api_name: String },
    /// Remove an API's record entirely
    Delete { api_name: String },
    /// Registry totals
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = LogLevel::from_str(&cli.log_level)
        .with_context(|| format!("Unknown log level: {}", cli.log_level))?;
    set_log_level(level);

    match cli.command {
        Commands::Search {
            query,
            case_sensitive,
            regex,
            page,
            per_page,
        } => {
            let registry = load_registry(&cli.snapshot)?;
            let result = registry.search(&query, case_sensitive, regex, page, per_page)?;
            print_page(&result);
        }
        Commands::Explain {
            query,
            case_sensitive,
            regex,
        } => {
            let predicate = apidex_core::compile(&query, case_sensitive, regex)?;
            println!("normalized: {}", apidex_core::normalize_query(&query));
            println!("{}", serde_json::to_string_pretty(&predicate)?);
        }
        Commands::Deploy {
            api_name,
            platform,
            environment,
            version,
            status,
            updated_by,
            properties,
        } => {
            let registry = load_registry(&cli.snapshot)?;
            let outcome = registry.deploy(DeployRequest {
                api_name: api_name.clone(),
                platform_id: platform.clone(),
                environment_id: environment.clone(),
                version,
                status,
                updated_by,
                properties: parse_properties(&properties)?,
            })?;
            save_registry(&registry, &cli.snapshot)?;
            println!("{}/{}/{}: {:?}", api_name, platform, environment, outcome);
        }
        Commands::Update {
            api_name,
            platform,
            environment,
            version,
            status,
            updated_by,
            properties,
        } => {
            let registry = load_registry(&cli.snapshot)?;
            let patch = UpdateRequest {
                version,
                status,
                updated_by,
                properties: if properties.is_empty() {
                    None
                } else {
                    Some(parse_properties(&properties)?)
                },
            };
            registry.update(&api_name, &platform, &environment, patch)?;
            save_registry(&registry, &cli.snapshot)?;
            println!("updated {}/{}/{}", api_name, platform, environment);
        }
        Commands::Get { api_name } => {
            let registry = load_registry(&cli.snapshot)?;
            let record = registry.get(&api_name)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Delete { api_name } => {
            let registry = load_registry(&cli.snapshot)?;
            let removed = registry.delete(&api_name)?;
            save_registry(&registry, &cli.snapshot)?;
            println!("deleted {} ({} deployments)", api_name, removed.deployment_count());
        }
        Commands::Stats => {
            let registry = load_registry(&cli.snapshot)?;
            let stats = registry.stats();
            println!("APIs:        {}", stats.total_apis);
            println!("Deployments: {}", stats.total_deployments);
        }
    }

    Ok(())
}

/// Load the snapshot into a fresh registry. A missing file is an empty
/// registry, so the first `deploy` bootstraps the snapshot.
fn load_registry(path: &Path) -> Result<DeploymentRegistry> {
    let registry = DeploymentRegistry::new();
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let records: Vec<DeploymentRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in snapshot: {}", path.display()))?;
        registry.import_records(records);
    }
    Ok(registry)
}

fn save_registry(registry: &DeploymentRegistry, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&registry.export_records())
        .context("Failed to serialize snapshot")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
    Ok(())
}

fn parse_properties(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Property must be key=value, got: {}", pair);
        };
        properties.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(properties)
}

fn print_page(page: &SearchPage) {
    for row in &page.rows {
        println!(
            "{:<30} {:<12} {:<12} {:<10} {:<12} {}",
            row.api_name, row.platform_id, row.environment_id, row.version, row.status, row.updated_by
        );
    }
    println!(
        "{} rows (page {}/{}, {} total)",
        page.rows.len(),
        page.page,
        page.total_pages,
        page.total_rows
    );
}
