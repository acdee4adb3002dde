//! Command-line interface.

use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::extractor::ResolvePolicy;

#[derive(Parser, Debug, Default)]
#[command(name = "ipecho")]
#[command(version)]
#[command(about = "Report the caller's IP address as seen through proxy headers or the raw connection")]
pub struct Cli {
    /// Port to listen on (default 8080)
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Interface address to bind (default 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// JSON config file path (defaults to ./ipecho.json if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// How proxy headers and the remote address combine in the response
    #[arg(long, value_enum)]
    pub policy: Option<ResolvePolicy>,

    /// Only honor proxy headers from this peer (repeatable)
    #[arg(long = "trusted-proxy", value_name = "IP")]
    pub trusted_proxies: Vec<IpAddr>,
}
