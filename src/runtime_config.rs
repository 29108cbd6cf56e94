//! # Runtime Configuration Module
//!
//! Routing behavior that is chosen per deployment rather than per handler:
//! where the requested API version is read from, and whether internal error
//! messages reach clients.
//!
//! ## Environment Variables
//!
//! ### `DECLR_VERSION_HEADER`
//!
//! Header carrying the requested API version. Default: `X-API-Version`.
//!
//! ### `DECLR_VERSION_QUERY`
//!
//! Query key carrying the requested API version. When set it takes
//! precedence over `DECLR_VERSION_HEADER`.
//!
//! ### `DECLR_EXPOSE_INTERNAL_ERRORS`
//!
//! `true`/`1`/`yes` to include messages of 5xx failures in fallback
//! responses. Default: `false`.
//!
//! ## File Configuration
//!
//! ```toml
//! expose_internal_errors = false
//!
//! [version]
//! from = "query"
//! key = "api-version"
//! ```
//!
//! ```rust
//! use declarouter::runtime_config::RoutingConfig;
//! use declarouter::router::VersionSource;
//!
//! let config = RoutingConfig::from_toml_str(
//!     "[version]\nfrom = \"query\"\nkey = \"api-version\"\n",
//! ).expect("valid config");
//! assert_eq!(config.version, VersionSource::Query("api-version".into()));
//! assert!(!config.expose_internal_errors);
//! ```

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::router::VersionSource;

/// Deployment-level routing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Where the requested API version is read from.
    pub version: VersionSource,
    /// Include messages of 5xx failures in fallback responses.
    pub expose_internal_errors: bool,
}

impl RoutingConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Like [`RoutingConfig::from_env`], reading variables through `lookup`.
    #[must_use]
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::default().with_env_overrides(lookup)
    }

    /// Apply `DECLR_*` variables on top of this configuration.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(header) = non_empty("DECLR_VERSION_HEADER") {
            self.version = VersionSource::Header(header.trim().to_string());
        }
        if let Some(key) = non_empty("DECLR_VERSION_QUERY") {
            self.version = VersionSource::Query(key.trim().to_string());
        }
        if let Some(flag) = non_empty("DECLR_EXPOSE_INTERNAL_ERRORS") {
            self.expose_internal_errors = parse_flag(&flag);
        }
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("invalid routing configuration")
    }

    /// Read a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("failed to parse {}", path.display()))
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_read_the_version_header() {
        let config = RoutingConfig::from_env_with(lookup(&[]));
        assert_eq!(config, RoutingConfig::default());
        assert_eq!(config.version, VersionSource::Header("X-API-Version".into()));
    }

    #[test]
    fn query_key_takes_precedence() {
        let config = RoutingConfig::from_env_with(lookup(&[
            ("DECLR_VERSION_HEADER", "Accept-Version"),
            ("DECLR_VERSION_QUERY", "v"),
            ("DECLR_EXPOSE_INTERNAL_ERRORS", "YES"),
        ]));
        assert_eq!(config.version, VersionSource::Query("v".into()));
        assert!(config.expose_internal_errors);
    }

    #[test]
    fn blank_variables_are_ignored() {
        let config = RoutingConfig::from_env_with(lookup(&[("DECLR_VERSION_HEADER", "  ")]));
        assert_eq!(config.version, VersionSource::default());
    }

    #[test]
    fn toml_rejects_unknown_source() {
        assert!(RoutingConfig::from_toml_str("[version]\nfrom = \"cookie\"\nkey = \"v\"\n").is_err());
        assert_eq!(
            RoutingConfig::from_toml_str("").ok(),
            Some(RoutingConfig::default())
        );
    }
}
