//! CLI command implementations
//!
//! Commands are read-only with respect to the container: they open it,
//! load one catalog object, and report as JSON on stdout.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::manager::ConditionsManager;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::persistency::{CatalogKind, ConditionsPersistency, ImportReport};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name of the catalog object in the container
    #[serde(default = "default_object_name")]
    pub object_name: String,

    /// Expected catalog title; empty accepts any
    #[serde(default)]
    pub title: String,

    /// Import filter on entry identifiers
    #[serde(default = "default_wildcard")]
    pub identifier: String,

    /// Import filter on IOV type names
    #[serde(default = "default_wildcard")]
    pub iov_type: String,

    /// Minimum log severity: trace, info, warn, error, fatal
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_object_name() -> String {
    "Conditions".to_string()
}
fn default_wildcard() -> String {
    "*".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            object_name: default_object_name(),
            title: String::new(),
            identifier: default_wildcard(),
            iov_type: default_wildcard(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let display = path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("object_name", config.object_name.as_str()), ("path", display.as_str())],
        );
        Ok(config)
    }

    /// Loads `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.object_name.trim().is_empty() {
            return Err(CliError::config_error("object_name must not be empty"));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse::<Severity>().map_err(|_| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn, error or fatal.",
                self.log_level
            ))
        })
    }
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a parsed command
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match cmd {
        Command::Inspect { file, config } => inspect(&file, config.as_deref()),
        Command::Verify { file, config } => verify(&file, config.as_deref()),
        Command::Objects { file } => objects(&file),
    };

    if let Err(e) = &result {
        write_error(e.code_str(), e.message())?;
    }
    result
}

/// Load the configured catalog and print its summary
pub fn inspect(file: &Path, config_path: Option<&Path>) -> CliResult<()> {
    let config = Config::load_or_default(config_path)?;
    Logger::set_min_severity(config.severity()?);

    let catalog = load_catalog(file, &config)?;
    write_response(inspect_report(&catalog)?)
}

/// Import every collection of the configured catalog into a fresh manager
pub fn verify(file: &Path, config_path: Option<&Path>) -> CliResult<()> {
    let config = Config::load_or_default(config_path)?;
    Logger::set_min_severity(config.severity()?);

    let catalog = load_catalog(file, &config)?;
    let mut manager = ConditionsManager::new();
    write_response(verify_report(&catalog, &config, &mut manager)?)
}

/// List the objects of a container
pub fn objects(file: &Path) -> CliResult<()> {
    let storage = ConditionsPersistency::open_storage(file)?;
    write_response(json!({
        "path": file.display().to_string(),
        "objects": storage.object_names(),
    }))
}

fn load_catalog(file: &Path, config: &Config) -> CliResult<ConditionsPersistency> {
    let storage = ConditionsPersistency::open_storage(file)?;
    let catalog = ConditionsPersistency::load(&storage, &config.object_name)?;

    if !config.title.is_empty() && catalog.title() != config.title {
        return Err(CliError::config_error(format!(
            "Catalog title mismatch: expected '{}', found '{}'",
            config.title,
            catalog.title()
        )));
    }
    Ok(catalog)
}

fn inspect_report(catalog: &ConditionsPersistency) -> CliResult<Value> {
    Ok(serde_json::to_value(catalog.summary())?)
}

fn verify_report(
    catalog: &ConditionsPersistency,
    config: &Config,
    manager: &mut ConditionsManager,
) -> CliResult<Value> {
    let mut total = ImportReport::default();
    let mut collections = serde_json::Map::new();

    for kind in CatalogKind::ALL {
        let report = catalog.import(kind, &config.identifier, &config.iov_type, manager);
        total.merge(report);
        collections.insert(kind.as_str().to_string(), serde_json::to_value(report)?);
    }

    let iov_types: Vec<String> = manager.iov_types().map(|t| t.to_string()).collect();
    Ok(json!({
        "object": catalog.name(),
        "identifier": config.identifier,
        "iov_type": config.iov_type,
        "collections": collections,
        "total": total,
        "iov_types": iov_types,
        "conditions": manager.condition_count(),
        "metrics": catalog.metrics().snapshot(),
    }))
}
