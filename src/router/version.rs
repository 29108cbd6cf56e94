//! Version resolution.
//!
//! Every `(method, template)` route owns a [`VersionSet`]: the descriptors
//! registered under that route, indexed by each of their version aliases.
//! A request's version comes from a [`VersionSource`]; resolution picks the
//! exact alias first and falls back to the [`DEFAULT_VERSION`] descriptor.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::error::ConfigurationError;
use crate::meta::{EndpointDescriptor, DEFAULT_VERSION};

/// Header checked for the requested version unless configured otherwise.
pub const DEFAULT_VERSION_HEADER: &str = "X-API-Version";

/// Where the requested API version is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", content = "key", rename_all = "lowercase")]
pub enum VersionSource {
    Header(String),
    Query(String),
}

impl Default for VersionSource {
    fn default() -> Self {
        VersionSource::Header(DEFAULT_VERSION_HEADER.to_string())
    }
}

impl VersionSource {
    /// The requested version; empty values count as absent.
    #[must_use]
    pub fn read<'a>(&self, ctx: &'a RequestContext) -> Option<&'a str> {
        let raw = match self {
            VersionSource::Header(name) => ctx.header(name),
            VersionSource::Query(key) => ctx.query(key),
        }?;
        let raw = raw.trim();
        (!raw.is_empty()).then_some(raw)
    }
}

/// Descriptors of one route keyed by version alias.
#[derive(Debug, Default)]
pub struct VersionSet {
    by_alias: HashMap<String, Arc<EndpointDescriptor>>,
    descriptors: Vec<Arc<EndpointDescriptor>>,
}

impl VersionSet {
    /// Index every alias of `descriptor`; an alias already taken is a duplicate route.
    pub fn insert(&mut self, descriptor: Arc<EndpointDescriptor>) -> Result<(), ConfigurationError> {
        if let Some(alias) = descriptor
            .versions
            .iter()
            .find(|alias| self.by_alias.contains_key(alias.as_str()))
        {
            return Err(ConfigurationError::DuplicateRoute {
                method: descriptor.method.clone(),
                path: descriptor.path_template.clone(),
                version: alias.clone(),
            });
        }
        for alias in &descriptor.versions {
            self.by_alias.insert(alias.clone(), Arc::clone(&descriptor));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Exact alias, else the default descriptor.
    ///
    /// Returns the descriptor with the alias that selected it.
    #[must_use]
    pub fn resolve(&self, requested: Option<&str>) -> Option<(&Arc<EndpointDescriptor>, &str)> {
        requested
            .and_then(|version| self.by_alias.get_key_value(version))
            .or_else(|| self.by_alias.get_key_value(DEFAULT_VERSION))
            .map(|(alias, descriptor)| (descriptor, alias.as_str()))
    }

    /// Registered aliases, sorted.
    #[must_use]
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.by_alias.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    #[must_use]
    pub fn descriptors(&self) -> &[Arc<EndpointDescriptor>] {
        &self.descriptors
    }

    #[must_use]
    pub fn has_default(&self) -> bool {
        self.by_alias.contains_key(DEFAULT_VERSION)
    }
}
