use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::{debug, info};

use crate::error::ConfigurationError;
use crate::exception::ExceptionDispatcher;
use crate::interceptor::InterceptorChain;
use crate::meta::{handler, Endpoints, GroupId, HandlerObject};
use crate::router::{shape, RouteEntry, Router};
use crate::table::{GroupInfo, RouteTable};

/// A path prefix and the handler instances registered under it.
pub struct EndpointGroup {
    prefix: String,
    handlers: Vec<Box<dyn HandlerObject>>,
}

impl EndpointGroup {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            handlers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with<T: Endpoints>(mut self, instance: T) -> Self {
        self.handlers.push(handler(instance));
        self
    }

    /// Register an instance that is also used elsewhere.
    #[must_use]
    pub fn with_shared<T: Endpoints>(mut self, instance: Arc<T>) -> Self {
        self.handlers.push(Box::new(instance));
        self
    }

    pub fn push(&mut self, handler: Box<dyn HandlerObject>) {
        self.handlers.push(handler);
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Collects endpoint groups and builds the [`RouteTable`] once.
///
/// ```rust
/// use declarouter::meta::{Description, Endpoints};
/// use declarouter::registrar::{EndpointGroup, Registrar};
/// use declarouter::Reply;
///
/// struct Health;
///
/// impl Endpoints for Health {
///     fn describe(d: &mut Description<Self>) {
///         d.method("health")
///             .get("/health")
///             .handle(|_: &Health, _ctx, _args| Ok(Reply::text("ok")));
///     }
/// }
///
/// let mut registrar = Registrar::new();
/// registrar.add_group(EndpointGroup::new("api").with(Health));
/// let table = registrar.build().expect("valid registration");
/// assert_eq!(table.router().entries()[0].template(), "/api/health");
/// ```
#[derive(Default)]
pub struct Registrar {
    groups: Vec<EndpointGroup>,
}

impl Registrar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register handler instances under a shared prefix.
    pub fn register_group(
        &mut self,
        prefix: &str,
        handlers: Vec<Box<dyn HandlerObject>>,
    ) -> &mut Self {
        self.groups.push(EndpointGroup {
            prefix: prefix.to_string(),
            handlers,
        });
        self
    }

    pub fn add_group(&mut self, group: EndpointGroup) -> &mut Self {
        self.groups.push(group);
        self
    }

    /// Register one instance in its own group with an empty prefix.
    pub fn register<T: Endpoints>(&mut self, instance: T) -> &mut Self {
        self.add_group(EndpointGroup::new("").with(instance))
    }

    /// Scan every instance and assemble the route table.
    ///
    /// Fails on the first inconsistent description, a version alias used
    /// twice on one route, or two templates of one method that differ only
    /// in placeholder names.
    pub fn build(self) -> Result<RouteTable, ConfigurationError> {
        let mut entries: Vec<RouteEntry> = Vec::new();
        let mut entry_index: HashMap<(Method, String), usize> = HashMap::new();
        let mut shapes: HashMap<(Method, String), String> = HashMap::new();
        let mut interceptors = Vec::new();
        let mut exception_handlers = Vec::new();
        let mut groups = Vec::with_capacity(self.groups.len());

        for (ordinal, group) in self.groups.into_iter().enumerate() {
            let id = GroupId(ordinal);
            let mut handler_names = Vec::with_capacity(group.handlers.len());

            for instance in &group.handlers {
                handler_names.push(instance.type_name());
                let scanned = instance.scan(&group.prefix, id)?;
                debug!(
                    group = %id,
                    handler = instance.type_name(),
                    endpoints = scanned.endpoints.len(),
                    interceptors = scanned.interceptors.len(),
                    exception_handlers = scanned.exception_handlers.len(),
                    "Handler scanned"
                );

                for descriptor in scanned.endpoints {
                    let method = descriptor.method.clone();
                    let template = descriptor.path_template.clone();

                    let shape_key = (method.clone(), shape(&template));
                    match shapes.get(&shape_key) {
                        Some(existing) if *existing != template => {
                            return Err(ConfigurationError::AmbiguousTemplate {
                                method,
                                first: existing.clone(),
                                second: template,
                            });
                        }
                        Some(_) => {}
                        None => {
                            shapes.insert(shape_key, template.clone());
                        }
                    }

                    let index = *entry_index
                        .entry((method.clone(), template.clone()))
                        .or_insert_with(|| {
                            entries.push(RouteEntry::new(method, template));
                            entries.len() - 1
                        });
                    entries[index].insert(Arc::new(descriptor))?;
                }
                interceptors.extend(scanned.interceptors);
                exception_handlers.extend(scanned.exception_handlers);
            }

            groups.push(GroupInfo {
                id,
                prefix: group.prefix,
                handlers: handler_names,
            });
        }

        let router = Router::new(entries);
        let interceptors = InterceptorChain::new(interceptors);
        let exceptions = ExceptionDispatcher::new(exception_handlers);

        let routes_summary: Vec<String> = router
            .entries()
            .iter()
            .take(10)
            .map(|entry| format!("{} {}", entry.method(), entry.template()))
            .collect();
        info!(
            groups = groups.len(),
            routes_count = router.len(),
            interceptors = interceptors.len(),
            exception_handlers = exceptions.len(),
            routes_summary = ?routes_summary,
            "Route table built"
        );

        Ok(RouteTable::new(router, interceptors, exceptions, groups))
    }
}
