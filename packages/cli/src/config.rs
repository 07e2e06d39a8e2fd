use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Deserialize;

/// Connection arguments shared by subcommands that talk to the server.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Server base URL, e.g. https://stash.example.org.
    #[arg(short, long, env = "STASH_SERVER")]
    pub server: Option<String>,

    /// API token sent as a bearer credential.
    #[arg(long, env = "STASH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

/// On-disk configuration at `<config dir>/stash/config.toml`.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

impl FileConfig {
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stash").join("config.toml"))
    }

    fn load() -> Result<Self> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Resolved connection settings: flags and environment first, then the
/// config file.
#[derive(Debug)]
pub struct ConnectionSettings {
    pub server: String,
    pub token: Option<String>,
}

impl ConnectionSettings {
    pub fn resolve(args: &ConnectionArgs) -> Result<Self> {
        let file = FileConfig::load()?;

        let Some(server) = args.server.clone().or(file.server) else {
            bail!(
                "no server configured; pass --server, set STASH_SERVER, \
                 or add `server` to the config file"
            );
        };

        Ok(Self {
            server,
            token: args.token.clone().or(file.token),
        })
    }
}
