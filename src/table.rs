//! The immutable result of registration.

use tracing::info;

use crate::exception::ExceptionDispatcher;
use crate::interceptor::InterceptorChain;
use crate::meta::GroupId;
use crate::router::Router;

/// A registered endpoint group as it appears in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub id: GroupId,
    pub prefix: String,
    /// Handler type names in registration order.
    pub handlers: Vec<&'static str>,
}

/// Routes, interceptors and exception handlers of every registered group.
///
/// Built once by [`Registrar::build`](crate::registrar::Registrar::build) and
/// shared read-only between request threads.
#[derive(Default)]
pub struct RouteTable {
    router: Router,
    interceptors: InterceptorChain,
    exceptions: ExceptionDispatcher,
    groups: Vec<GroupInfo>,
}

impl RouteTable {
    pub(crate) fn new(
        router: Router,
        interceptors: InterceptorChain,
        exceptions: ExceptionDispatcher,
        groups: Vec<GroupInfo>,
    ) -> Self {
        Self {
            router,
            interceptors,
            exceptions,
            groups,
        }
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    #[must_use]
    pub fn exceptions(&self) -> &ExceptionDispatcher {
        &self.exceptions
    }

    #[must_use]
    pub fn groups(&self) -> &[GroupInfo] {
        &self.groups
    }

    /// Number of endpoint descriptors across all routes and versions.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.router
            .entries()
            .iter()
            .map(|entry| entry.versions().descriptors().len())
            .sum()
    }

    pub fn dump_routes(&self) {
        for group in &self.groups {
            info!(group = %group.id, prefix = %group.prefix, handlers = ?group.handlers, "Endpoint group");
        }
        self.router.dump_routes();
    }
}
