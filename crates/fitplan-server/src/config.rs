//! Server configuration.
//!
//! Resolution chain: CLI flag > env var > config file > default. Clap merges
//! the first two; the optional TOML file named by `--config` fills whatever
//! is still unset. Everything is read once at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;

use fitplan_core::generation::GeminiConfig;
use fitplan_core::generation::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use fitplan_db::config::DbConfig;

// -----------------------------------------------------------------------
// CLI
// -----------------------------------------------------------------------

#[derive(Debug, Default, Parser)]
#[command(name = "fitplan", about = "AI workout plan API server")]
pub struct ServerArgs {
    /// Path to a TOML config file
    #[arg(long, env = "FITPLAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// PostgreSQL connection URL for the exercise catalog
    #[arg(long, env = "NEON_CONNECTION_STRING", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Shared secret expected in the x-api-key header
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Google Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL")]
    pub gemini_model: Option<String>,

    /// Gemini REST base URL
    #[arg(long, env = "GEMINI_BASE_URL")]
    pub gemini_base_url: Option<String>,

    /// Gemini request timeout in seconds
    #[arg(long, env = "GEMINI_TIMEOUT_SECS")]
    pub gemini_timeout_secs: Option<u64>,

    /// Address to bind
    #[arg(long, env = "BIND_ADDRESS")]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,
}

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub auth: AuthSection,
    pub gemini: GeminiSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthSection {
    pub api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeminiSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Load and parse a config file.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub db_config: DbConfig,
    pub api_key: String,
    pub gemini: GeminiConfig,
}

impl ServerConfig {
    pub const DEFAULT_BIND: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 3000;

    /// Resolve from parsed arguments, reading `args.config` if set.
    pub fn resolve(args: ServerArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => load_config(path)?,
            None => ConfigFile::default(),
        };
        Self::merge(args, file)
    }

    /// Merge CLI/env values over config-file values over defaults.
    ///
    /// The shared secret and the Gemini key have no default; a missing one
    /// is an error.
    pub fn merge(args: ServerArgs, file: ConfigFile) -> Result<Self> {
        let database_url = args
            .database_url
            .or(file.database.url)
            .unwrap_or_else(|| DbConfig::DEFAULT_URL.to_owned());
        let mut db_config = DbConfig::new(database_url);
        if let Some(max) = file.database.max_connections {
            db_config = db_config.with_max_connections(max);
        }

        let api_key = match non_empty(args.api_key.or(file.auth.api_key)) {
            Some(key) => key,
            None => bail!("shared API key not set; pass --api-key, set API_KEY, or add [auth] api_key to the config file"),
        };

        let gemini_key = match non_empty(args.gemini_api_key.or(file.gemini.api_key)) {
            Some(key) => key,
            None => bail!("Gemini API key not set; pass --gemini-api-key, set GEMINI_API_KEY, or add [gemini] api_key to the config file"),
        };

        let timeout = args
            .gemini_timeout_secs
            .or(file.gemini.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(GeminiConfig::DEFAULT_TIMEOUT);
        let gemini = GeminiConfig::new(gemini_key)
            .with_model(
                args.gemini_model
                    .or(file.gemini.model)
                    .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            )
            .with_base_url(
                args.gemini_base_url
                    .or(file.gemini.base_url)
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            )
            .with_timeout(timeout);

        Ok(Self {
            bind: args
                .bind
                .or(file.server.bind)
                .unwrap_or_else(|| Self::DEFAULT_BIND.to_owned()),
            port: args.port.or(file.server.port).unwrap_or(Self::DEFAULT_PORT),
            db_config,
            api_key,
            gemini,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
