//! # Employee DAO
//!
//! Entry point that wires the layers together and runs the employee
//! lifecycle against the selected backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  main.rs (this file) - Dependency Injection & Wiring           │
//! │    │                                                            │
//! │    ├── Loads: EngineConfig (file + DAO_ENGINE_* overrides)     │
//! │    ├── Creates: HttpDocumentStore or InMemoryDocumentStore     │
//! │    ├── Creates: EmployeeService (use case)                     │
//! │    └── Runs: the employee lifecycle scenario                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage:
//!   employee-dao                          - Run against an in-memory engine
//!   employee-dao --backend http           - Run against the configured engine
//!   employee-dao -b http -c engine.json   - Same, with a config file

mod scenario;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use dao_adapter::{HttpDocumentStore, InMemoryDocumentStore};
use shared::EngineConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Process-local engine, nothing leaves the process
    Memory,
    /// Elasticsearch-compatible engine over HTTP
    Http,
}

#[derive(Parser)]
#[command(name = "employee-dao")]
#[command(about = "Employee repository over a document-search engine")]
#[command(version)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage backend
    #[arg(short, long, value_enum, default_value_t = Backend::Memory)]
    backend: Backend,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let config = config.with_env_overrides()?;
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    info!(backend = ?cli.backend, index = %config.index, "Employee DAO starting");

    let report = match cli.backend {
        Backend::Memory => {
            let store = Arc::new(InMemoryDocumentStore::new());
            scenario::run(&config.index, store)?
        }
        Backend::Http => {
            // Refuse to start with a client that cannot reach the engine
            let store = Arc::new(
                HttpDocumentStore::connect(&config).context("Failed to build engine client")?,
            );
            let engine = store
                .ping()
                .with_context(|| format!("Engine at {} is unreachable", config.base_url()))?;
            info!(
                cluster = %engine.cluster_name,
                version = %engine.version.number,
                "Connected to engine"
            );

            let report = scenario::run(&config.index, Arc::clone(&store));

            if let Ok(store) = Arc::try_unwrap(store) {
                store.close();
            }
            report?
        }
    };

    info!(
        employees_before = report.count_before,
        employees_after = report.count_after,
        "Employee DAO finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["employee-dao"]).unwrap();
        assert_eq!(cli.backend, Backend::Memory);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_http_backend() {
        let cli =
            Cli::try_parse_from(["employee-dao", "--backend", "http", "-c", "engine.json"]).unwrap();
        assert_eq!(cli.backend, Backend::Http);
        assert_eq!(cli.config, Some(PathBuf::from("engine.json")));
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 0}}"#).unwrap();

        assert!(load_config(Some(file.path())).is_err());
    }
}
