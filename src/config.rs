//! Startup configuration: an optional JSON file merged under CLI flags.

use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::extractor::{IpResolver, ResolvePolicy};

/// Config file read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "ipecho.json";

/// Port used when neither the CLI nor the config file names one.
pub const DEFAULT_PORT: u16 = 8080;

/// On-disk JSON config. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub policy: Option<ResolvePolicy>,
    pub trusted_proxies: Option<Vec<IpAddr>>,
}

impl FileConfig {
    /// Load and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the explicit path, or the default path when it exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<Self>> {
        match explicit {
            Some(path) => Self::load(path).map(Some),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.is_file() {
                    Self::load(&path).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/// Fully resolved service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub listen: SocketAddr,
    pub policy: ResolvePolicy,
    pub trusted_proxies: Option<Vec<IpAddr>>,
}

impl ServiceConfig {
    /// Merge CLI flags over the config file over defaults.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let port = cli.port.or(file.port).unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(Error::InvalidPort(port));
        }

        let host = match cli.host.as_deref().or(file.host.as_deref()) {
            None | Some("") => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Some(host) => parse_host(host)?,
        };

        let trusted_proxies = if cli.trusted_proxies.is_empty() {
            file.trusted_proxies
        } else {
            Some(cli.trusted_proxies.clone())
        };

        Ok(Self {
            listen: SocketAddr::new(host, port),
            policy: cli.policy.or(file.policy).unwrap_or_default(),
            trusted_proxies,
        })
    }

    /// Load whichever config file applies and merge it with `cli`.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let file = FileConfig::discover(cli.config.as_deref())?.unwrap_or_default();
        Self::resolve(cli, file)
    }

    /// Resolver matching this configuration.
    pub fn resolver(&self) -> IpResolver {
        let resolver = IpResolver::new().with_policy(self.policy);
        match &self.trusted_proxies {
            Some(proxies) => resolver.with_trusted_proxies(proxies.clone()),
            None => resolver,
        }
    }
}

/// Accepts `1.2.3.4`, `::1` and bracketed `[::1]`.
fn parse_host(host: &str) -> Result<IpAddr> {
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    bare.parse()
        .map_err(|_| Error::InvalidHost(host.to_string()))
}
