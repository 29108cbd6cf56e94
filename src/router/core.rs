//! Router core module - hot path for request routing.

use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::error::{ConfigurationError, RequestError};
use crate::meta::EndpointDescriptor;

use super::radix::RadixRouter;
use super::version::VersionSet;

/// Maximum number of path/query parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the route tree built at
/// startup; values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// All versions of one `(method, template)` route.
#[derive(Debug)]
pub struct RouteEntry {
    method: Method,
    template: String,
    versions: VersionSet,
}

impl RouteEntry {
    pub(crate) fn new(method: Method, template: String) -> Self {
        Self {
            method,
            template,
            versions: VersionSet::default(),
        }
    }

    pub(crate) fn insert(
        &mut self,
        descriptor: Arc<EndpointDescriptor>,
    ) -> Result<(), ConfigurationError> {
        self.versions.insert(descriptor)
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn versions(&self) -> &VersionSet {
        &self.versions
    }

    /// Pick the descriptor for `requested`, or fail with `VersionNotFound`.
    pub fn resolve(
        &self,
        requested: Option<&str>,
    ) -> Result<(&Arc<EndpointDescriptor>, &str), RequestError> {
        self.versions
            .resolve(requested)
            .ok_or_else(|| RequestError::VersionNotFound {
                method: self.method.clone(),
                template: self.template.clone(),
                requested: requested.map(str::to_string),
            })
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub entry: Arc<RouteEntry>,
    /// Path parameters extracted from the URL (e.g., `{id}` → `("id", "123")`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics if a name repeats.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Immutable path matcher over all route entries.
#[derive(Default)]
pub struct Router {
    radix_router: RadixRouter<RouteEntry>,
    entries: Vec<Arc<RouteEntry>>,
}

impl Router {
    /// Build the tree. Entries keep their registration order for listing.
    pub(crate) fn new(entries: Vec<RouteEntry>) -> Self {
        let mut radix_router = RadixRouter::new();
        let entries: Vec<Arc<RouteEntry>> = entries.into_iter().map(Arc::new).collect();
        for entry in &entries {
            radix_router.insert(&entry.template, entry.method.clone(), Arc::clone(entry));
        }
        Self {
            radix_router,
            entries,
        }
    }

    /// Match a request to a route entry.
    ///
    /// `None` means no template matches the path for this method (404).
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let (entry, path_params) = self.radix_router.route(method, path)?;
        debug!(
            method = %method,
            path = %path,
            route_pattern = %entry.template,
            path_params = ?path_params,
            "Route matched"
        );
        Some(RouteMatch { entry, path_params })
    }

    /// Methods registered at any template matching `path`.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        self.radix_router.allowed_methods(path)
    }

    #[must_use]
    pub fn entries(&self) -> &[Arc<RouteEntry>] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Log every registered route and version.
    pub fn dump_routes(&self) {
        info!(count = self.entries.len(), "Registered routes");
        for entry in &self.entries {
            for descriptor in entry.versions.descriptors() {
                info!(
                    method = %entry.method,
                    path = %entry.template,
                    versions = ?descriptor.versions,
                    handler = %descriptor.site(),
                    "Route"
                );
            }
        }
    }
}
