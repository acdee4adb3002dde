//! # ipecho
//!
//! A minimal HTTP service that reports the caller's IP address, as seen
//! through `X-Forwarded-For`, `X-Real-IP` or the remote socket address.
//!
//! ## Features
//!
//! - Address normalization: ports stripped, IPv4-mapped and loopback IPv6
//!   folded to their IPv4 forms, unparseable input passed through verbatim
//! - Two output policies: first match wins, or every source reported
//! - Optional allow-list of proxies whose headers are honored
//! - Axum layer, extractor and the `ipecho` server binary via the `axum` feature
//!
//! ## Examples
//!
//! ```rust
//! use ipecho::{HeaderMap, IpResolver, IpResult, ResolvePolicy};
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("x-real-ip".to_string(), "192.0.2.10".to_string());
//!
//! let resolver = IpResolver::new().with_policy(ResolvePolicy::AllSources);
//! let result = resolver.resolve(&headers, "[::1]:54321");
//! assert_eq!(
//!     result,
//!     IpResult::AllSources {
//!         ip: "127.0.0.1".to_string(),
//!         forwarded_for: None,
//!         real_ip: Some("192.0.2.10".to_string()),
//!     }
//! );
//! ```

pub mod error;
pub mod extractor;
pub mod normalize;

#[cfg(feature = "axum")]
pub mod cli;
#[cfg(feature = "axum")]
pub mod config;
#[cfg(feature = "axum")]
pub mod middleware;
#[cfg(feature = "axum")]
pub mod server;

pub use error::{Error, Result};
pub use extractor::{HeaderMap, IpResolver, IpResult, ResolvePolicy, resolve_ip};
pub use normalize::normalize;

#[cfg(feature = "axum")]
pub use middleware::{ClientIpLayer, ClientIpService};
