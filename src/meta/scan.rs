use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use http::Method;
use tracing::debug;

use crate::binder::Arguments;
use crate::context::RequestContext;
use crate::error::{ConfigurationError, Failure, Site};
use crate::exception::{ExceptionHandlerSpec, FailureKind, RecoveryFn};
use crate::interceptor::{Flow, InterceptorFn, InterceptorSpec, Phase};
use crate::router::template;

use super::describe::{Callable, Description, Endpoints, MethodMeta};
use super::types::{
    EndpointDescriptor, EndpointFn, GroupId, ParamSource, ParameterSpec, DEFAULT_VERSION,
};

/// Everything one handler instance contributes to the route table.
#[derive(Default)]
pub struct ScanOutput {
    pub endpoints: Vec<EndpointDescriptor>,
    pub interceptors: Vec<InterceptorSpec>,
    pub exception_handlers: Vec<ExceptionHandlerSpec>,
}

/// Object-safe view of a handler instance, so groups can mix handler types.
pub trait HandlerObject: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn prefix(&self) -> &str;

    fn scan(&self, group_prefix: &str, group: GroupId) -> Result<ScanOutput, ConfigurationError>;
}

impl<T: Endpoints> HandlerObject for Arc<T> {
    fn type_name(&self) -> &'static str {
        short_type_name::<T>()
    }

    fn prefix(&self) -> &str {
        Endpoints::prefix(self.as_ref())
    }

    fn scan(&self, group_prefix: &str, group: GroupId) -> Result<ScanOutput, ConfigurationError> {
        scan(self, group_prefix, group)
    }
}

/// Box a handler instance for [`Registrar::register_group`](crate::registrar::Registrar::register_group).
pub fn handler<T: Endpoints>(instance: T) -> Box<dyn HandlerObject> {
    Box::new(Arc::new(instance))
}

/// Type name without its module path.
#[must_use]
pub fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base_end = full.find('<').unwrap_or(full.len());
    let start = full[..base_end].rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}

/// Produce the descriptors of one handler instance.
///
/// Pure: describing the same instance twice yields equal descriptors.
pub fn scan<T: Endpoints>(
    instance: &Arc<T>,
    group_prefix: &str,
    group: GroupId,
) -> Result<ScanOutput, ConfigurationError> {
    let handler = short_type_name::<T>();
    let description = Description::<T>::collect();
    let mut seen: HashSet<&'static str> = HashSet::new();
    let mut out = ScanOutput::default();

    for meta in description.methods {
        let site = Site {
            handler,
            method: meta.name,
        };
        if !seen.insert(meta.name) {
            return Err(ConfigurationError::DuplicateMethod { site });
        }
        if !meta.is_tagged() {
            debug!(handler, method = meta.name, "Untagged method ignored");
            continue;
        }
        check_tags(&meta, site)?;

        let MethodMeta {
            routes,
            versions,
            params,
            phases,
            exceptions,
            success_status,
            error_status,
            mut callables,
            ..
        } = meta;

        if callables.len() > 1 {
            return Err(ConfigurationError::MultipleCallables { site });
        }
        let Some(callable) = callables.pop() else {
            return Err(ConfigurationError::MissingCallable { site });
        };

        if let Some((method, local)) = routes.into_iter().next() {
            let Callable::Endpoint(f) = callable else {
                return Err(ConfigurationError::CallableMismatch {
                    site,
                    expected: "handle",
                });
            };
            let type_prefix = Endpoints::prefix(instance.as_ref());
            let path_template = template::compose(group_prefix, type_prefix, &local);
            check_params(&params, &path_template, site)?;
            let versions = check_versions(versions, site)?;

            let target = Arc::clone(instance);
            let callable: EndpointFn =
                Arc::new(move |ctx: &mut RequestContext, args: &Arguments| {
                    f(target.as_ref(), ctx, args)
                });

            debug!(
                handler,
                method = site.method,
                http_method = %method,
                path = %path_template,
                versions = ?versions,
                group = %group,
                "Endpoint described"
            );
            out.endpoints.push(EndpointDescriptor {
                method,
                path_template,
                versions,
                params,
                handler,
                method_name: site.method,
                group,
                success_status,
                error_status,
                callable,
            });
            continue;
        }

        if versions.is_some() {
            return Err(misplaced(site, "version"));
        }
        if !params.is_empty() {
            return Err(misplaced(site, "param"));
        }
        if success_status.is_some() {
            return Err(misplaced(site, "status"));
        }
        if error_status.is_some() {
            return Err(misplaced(site, "error_status"));
        }

        if let Some(phase) = phases.first().copied() {
            let Callable::Interceptor(f) = callable else {
                return Err(ConfigurationError::CallableMismatch {
                    site,
                    expected: "intercept",
                });
            };
            let target = Arc::clone(instance);
            let callable: InterceptorFn =
                Arc::new(move |ctx: &mut RequestContext| -> Result<Flow, Failure> {
                    f(target.as_ref(), ctx)
                });
            debug!(handler, method = site.method, %phase, group = %group, "Interceptor described");
            out.interceptors.push(InterceptorSpec {
                phase,
                group,
                handler,
                method_name: site.method,
                callable,
            });
            continue;
        }

        let Callable::Recovery(f) = callable else {
            return Err(ConfigurationError::CallableMismatch {
                site,
                expected: "recover",
            });
        };
        for kind in exceptions {
            let target = Arc::clone(instance);
            let f = Arc::clone(&f);
            let callable: RecoveryFn = Arc::new(
                move |ctx: &mut RequestContext, failure: &Failure| -> Result<(), Failure> {
                    f(target.as_ref(), ctx, failure)
                },
            );
            debug!(handler, method = site.method, kind = %kind, group = %group, "Exception handler described");
            out.exception_handlers.push(ExceptionHandlerSpec {
                kind,
                group,
                handler,
                method_name: site.method,
                callable,
            });
        }
    }

    Ok(out)
}

fn check_tags<T: Endpoints>(meta: &MethodMeta<T>, site: Site) -> Result<(), ConfigurationError> {
    if let [first, second, ..] = meta.routes.as_slice() {
        return Err(ConfigurationError::MultipleRoutes {
            site,
            first: route_label(first),
            second: route_label(second),
        });
    }
    let conflict = |reason: &str| ConfigurationError::ConflictingTags {
        site,
        reason: reason.to_string(),
    };
    let routed = !meta.routes.is_empty();
    if routed && !meta.phases.is_empty() {
        return Err(conflict("route and interceptor phase"));
    }
    if routed && !meta.exceptions.is_empty() {
        return Err(conflict("route and exception handler"));
    }
    if !meta.phases.is_empty() && !meta.exceptions.is_empty() {
        return Err(conflict("interceptor phase and exception handler"));
    }
    if meta.phases.len() > 1 {
        return Err(conflict("more than one interceptor phase"));
    }
    let mut kinds: Vec<&'static FailureKind> = Vec::with_capacity(meta.exceptions.len());
    for kind in &meta.exceptions {
        if kinds.contains(kind) {
            return Err(conflict(&format!("exception kind {kind} listed twice")));
        }
        kinds.push(*kind);
    }
    Ok(())
}

fn check_params(
    params: &[ParameterSpec],
    path_template: &str,
    site: Site,
) -> Result<(), ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidParameter { site, reason };

    // Arguments are looked up by key, so keys are unique across sources.
    let mut keys: HashMap<&str, ParamSource> = HashMap::new();
    for (index, spec) in params.iter().enumerate() {
        match (&spec.name, spec.source.is_named()) {
            (None, true) => {
                return Err(invalid(format!(
                    "{} parameter #{index} needs a name",
                    spec.source
                )))
            }
            (Some(name), true) if name.trim().is_empty() => {
                return Err(invalid(format!(
                    "{} parameter #{index} has a blank name",
                    spec.source
                )))
            }
            (Some(name), false) => {
                return Err(invalid(format!(
                    "{} parameter cannot be named ('{name}')",
                    spec.source
                )))
            }
            _ => {}
        }
        if let Some(previous) = keys.insert(spec.key(), spec.source) {
            let key = spec.key();
            return Err(invalid(if previous == spec.source {
                format!("{} parameter '{key}' declared twice", spec.source)
            } else {
                format!(
                    "parameter '{key}' declared for both {previous} and {}",
                    spec.source
                )
            }));
        }
    }

    let placeholders = template::placeholders(path_template)?;
    let mut path_params: Vec<String> = params
        .iter()
        .filter(|spec| spec.source == ParamSource::Path)
        .filter_map(|spec| spec.name.clone())
        .collect();
    let mut expected = placeholders.clone();
    expected.sort();
    path_params.sort();
    if expected != path_params {
        return Err(ConfigurationError::PlaceholderMismatch {
            site,
            placeholders,
            params: path_params,
        });
    }
    Ok(())
}

fn check_versions(
    versions: Option<Vec<String>>,
    site: Site,
) -> Result<Vec<String>, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidVersion { site, reason };
    let Some(versions) = versions else {
        return Ok(vec![DEFAULT_VERSION.to_string()]);
    };
    if versions.is_empty() {
        return Err(invalid("empty version list".to_string()));
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for alias in &versions {
        if alias.trim().is_empty() {
            return Err(invalid("blank version alias".to_string()));
        }
        if !seen.insert(alias.as_str()) {
            return Err(invalid(format!("alias '{alias}' listed twice")));
        }
    }
    Ok(versions)
}

fn misplaced(site: Site, attribute: &'static str) -> ConfigurationError {
    ConfigurationError::MisplacedAttribute { site, attribute }
}

fn route_label((method, path): &(Method, String)) -> String {
    format!("{method} {path}")
}
