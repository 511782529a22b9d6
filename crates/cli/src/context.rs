//! Connection context shared by the table commands

use anyhow::Context as _;
use clap::Args;
use service::{HttpGateway, ServiceConfig, TableService};
use shared::{RestConfig, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Connection options accepted by every subcommand
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Config file (JSON or YAML); defaults to ./restdb.json when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Endpoint URL, overrides config and RESTDB_URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// API key, overrides config and RESTDB_API_KEY
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Database schema (Accept-Profile / Content-Profile)
    #[arg(long, global = true)]
    pub schema: Option<String>,
}

impl ConnectionArgs {
    /// Resolve defaults <- config file <- environment <- flags
    pub fn resolve<F>(&self, lookup: F) -> anyhow::Result<RestConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config {
            Some(path) => load_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    load_file(default)?
                } else {
                    RestConfig::default()
                }
            }
        };

        config.apply_env(lookup);

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(key) = &self.api_key {
            config.api_key = key.clone();
        }
        if let Some(schema) = &self.schema {
            config.schema = Some(schema.clone());
        }

        config.validate()?;
        debug!(?config, "resolved configuration");
        Ok(config)
    }
}

fn load_file(path: &Path) -> anyhow::Result<RestConfig> {
    RestConfig::from_file(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Everything a table command needs to run
pub struct Context {
    pub service: TableService<HttpGateway>,
    /// Print raw JSON instead of human-readable lines
    pub json: bool,
}

impl Context {
    /// Build a context from the command line and process environment
    pub fn from_args(args: &ConnectionArgs, json: bool) -> anyhow::Result<Self> {
        let config = args.resolve(|name| std::env::var(name).ok())?;
        let gateway = HttpGateway::new(config)?;

        Ok(Self {
            service: TableService::new(gateway, ServiceConfig::default()),
            json,
        })
    }
}
