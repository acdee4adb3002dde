use std::collections::HashMap;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// Type alias for header maps. Keys are expected in lowercase.
pub type HeaderMap = HashMap<String, String>;

/// Header set by most proxies and load balancers.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Non-standard single-value header, still common enough to honor.
pub const X_REAL_IP: &str = "x-real-ip";

/// How the resolved sources combine into an [`IpResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "axum", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ResolvePolicy {
    /// Report only the first source that yields a value.
    #[default]
    FirstMatch,
    /// Always report the remote address, plus any proxy headers present.
    AllSources,
}

/// The address a request was resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IpResult {
    /// A single winning address.
    Single { ip: String },
    /// Every source reported separately. `ip` is the remote address.
    #[serde(rename_all = "camelCase")]
    AllSources {
        ip: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        forwarded_for: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        real_ip: Option<String>,
    },
}

impl IpResult {
    /// The primary address: the winner, or the remote address.
    pub fn ip(&self) -> &str {
        match self {
            Self::Single { ip } | Self::AllSources { ip, .. } => ip,
        }
    }

    /// Line-oriented plain text rendering, one line per populated field.
    pub fn to_text(&self) -> String {
        match self {
            Self::Single { ip } => format!("{ip}\n"),
            Self::AllSources {
                ip,
                forwarded_for,
                real_ip,
            } => {
                let mut text = format!("IP: {ip}\n");
                if let Some(forwarded_for) = forwarded_for {
                    text.push_str(&format!("Forwarded for: {forwarded_for}\n"));
                }
                if let Some(real_ip) = real_ip {
                    text.push_str(&format!("Real IP: {real_ip}\n"));
                }
                text
            }
        }
    }
}

type HeaderSource = fn(&HeaderMap) -> Option<&str>;

/// Proxy header sources, in order of preference.
const HEADER_SOURCES: [HeaderSource; 2] = [forwarded_for, real_ip];

/// First entry of `X-Forwarded-For`, exactly as split.
fn forwarded_for(headers: &HeaderMap) -> Option<&str> {
    non_empty(headers, X_FORWARDED_FOR)
        .and_then(|value| value.split(',').next())
        .filter(|first| !first.is_empty())
}

fn real_ip(headers: &HeaderMap) -> Option<&str> {
    non_empty(headers, X_REAL_IP)
}

fn non_empty<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Configuration for IP resolution behavior.
#[derive(Debug, Clone, Default)]
pub struct IpResolver {
    /// How sources combine into the result.
    pub policy: ResolvePolicy,
    /// Peers allowed to set proxy headers. `None` trusts every peer.
    pub trusted_proxies: Option<Vec<IpAddr>>,
}

impl IpResolver {
    /// Create a resolver with the first-match policy that trusts every peer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output policy.
    pub fn with_policy(mut self, policy: ResolvePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Only honor proxy headers when the remote peer is one of `proxies`.
    pub fn with_trusted_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = Some(proxies);
        self
    }

    /// Resolve the client address from headers and the transport remote address.
    ///
    /// `remote_addr` may carry a port (`1.2.3.4:5678`, `[::1]:5678`).
    /// Never fails: unparseable values come back verbatim.
    pub fn resolve(&self, headers: &HeaderMap, remote_addr: &str) -> IpResult {
        let remote = normalize(remote_addr);
        let headers_trusted = self.peer_trusted(&remote);

        match self.policy {
            ResolvePolicy::FirstMatch => {
                let ip = headers_trusted
                    .then(|| {
                        HEADER_SOURCES
                            .iter()
                            .filter_map(|source| source(headers))
                            .map(normalize)
                            .next()
                    })
                    .flatten()
                    .unwrap_or(remote);
                IpResult::Single { ip }
            }
            ResolvePolicy::AllSources => {
                let (forwarded_for, real_ip) = if headers_trusted {
                    (
                        forwarded_for(headers).map(normalize),
                        real_ip(headers).map(normalize),
                    )
                } else {
                    (None, None)
                };
                IpResult::AllSources {
                    ip: remote,
                    forwarded_for,
                    real_ip,
                }
            }
        }
    }

    /// Check whether proxy headers from the peer at `remote` may be used.
    ///
    /// `remote` is already normalized, so allow-list entries are compared in
    /// their normalized form too (`::1` matches a `127.0.0.1` peer).
    fn peer_trusted(&self, remote: &str) -> bool {
        let Some(allowed) = &self.trusted_proxies else {
            return true;
        };

        let trusted = allowed
            .iter()
            .any(|proxy| normalize(&proxy.to_string()) == remote);
        if !trusted {
            tracing::debug!(peer = %remote, "ignoring proxy headers from untrusted peer");
        }
        trusted
    }
}

/// Resolve with the default first-match resolver that trusts every peer.
///
/// # Examples
///
/// ```rust
/// use ipecho::{resolve_ip, HeaderMap, IpResult};
/// use std::collections::HashMap;
///
/// let mut headers: HeaderMap = HashMap::new();
/// headers.insert("x-forwarded-for".to_string(), "9.9.9.9, 1.1.1.1".to_string());
///
/// let result = resolve_ip(&headers, "203.0.113.5:54321");
/// assert_eq!(result, IpResult::Single { ip: "9.9.9.9".to_string() });
/// ```
pub fn resolve_ip(headers: &HeaderMap, remote_addr: &str) -> IpResult {
    IpResolver::default().resolve(headers, remote_addr)
}
