use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::binder::Arguments;
use crate::context::{Reply, RequestContext};
use crate::error::{Failure, Site};

/// Reserved version alias used when a route declares no version.
pub const DEFAULT_VERSION: &str = "default";

/// Type-erased endpoint callable, bound to its handler instance.
pub type EndpointFn =
    Arc<dyn Fn(&mut RequestContext, &Arguments) -> Result<Reply, Failure> + Send + Sync>;

/// Registration ordinal of an endpoint group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Where a parameter value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    Path,
    Query,
    Header,
    Cookie,
    Body,
    Context,
}

impl ParamSource {
    /// Path, query, header and cookie parameters are looked up by name.
    #[must_use]
    pub fn is_named(self) -> bool {
        matches!(
            self,
            ParamSource::Path | ParamSource::Query | ParamSource::Header | ParamSource::Cookie
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParamSource::Path => "path",
            ParamSource::Query => "query",
            ParamSource::Header => "header",
            ParamSource::Cookie => "cookie",
            ParamSource::Body => "body",
            ParamSource::Context => "context",
        }
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of conversion targets for bound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetType {
    #[default]
    Text,
    Integer,
    Float,
    Boolean,
    /// Any JSON value; raw text that is not valid JSON binds as a JSON string.
    Json,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetType::Text => "text",
            TargetType::Integer => "integer",
            TargetType::Float => "float",
            TargetType::Boolean => "boolean",
            TargetType::Json => "json",
        };
        f.write_str(name)
    }
}

/// One formal parameter of an endpoint.
///
/// ```rust
/// use declarouter::meta::{ParameterSpec, ParamSource, TargetType};
///
/// let limit = ParameterSpec::query("limit").of(TargetType::Integer).nullable();
/// assert_eq!(limit.source, ParamSource::Query);
/// assert_eq!(limit.key(), "limit");
/// assert!(limit.nullable);
///
/// let body = ParameterSpec::body().of(TargetType::Json);
/// assert_eq!(body.key(), "body");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub source: ParamSource,
    pub name: Option<String>,
    pub target: TargetType,
    pub nullable: bool,
}

impl ParameterSpec {
    #[must_use]
    pub fn new(source: ParamSource, name: Option<&str>) -> Self {
        Self {
            source,
            name: name.map(str::to_string),
            target: TargetType::Text,
            nullable: false,
        }
    }

    #[must_use]
    pub fn path(name: &str) -> Self {
        Self::new(ParamSource::Path, Some(name))
    }

    #[must_use]
    pub fn query(name: &str) -> Self {
        Self::new(ParamSource::Query, Some(name))
    }

    #[must_use]
    pub fn header(name: &str) -> Self {
        Self::new(ParamSource::Header, Some(name))
    }

    #[must_use]
    pub fn cookie(name: &str) -> Self {
        Self::new(ParamSource::Cookie, Some(name))
    }

    #[must_use]
    pub fn body() -> Self {
        Self::new(ParamSource::Body, None)
    }

    #[must_use]
    pub fn context() -> Self {
        Self::new(ParamSource::Context, None)
    }

    #[must_use]
    pub fn of(mut self, target: TargetType) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Lookup key in [`Arguments`]: the name, or the source for unnamed parameters.
    #[must_use]
    pub fn key(&self) -> &str {
        self.name.as_deref().unwrap_or(self.source.as_str())
    }
}

/// A fully resolved route: one handler method bound to its instance.
pub struct EndpointDescriptor {
    pub method: Method,
    /// Sanitized template, e.g. `/api/users/{id}`.
    pub path_template: String,
    /// Version aliases, never empty; [`DEFAULT_VERSION`] when none were declared.
    pub versions: Vec<String>,
    pub params: Vec<ParameterSpec>,
    pub handler: &'static str,
    pub method_name: &'static str,
    pub group: GroupId,
    pub success_status: Option<u16>,
    pub error_status: Option<u16>,
    pub(crate) callable: EndpointFn,
}

impl EndpointDescriptor {
    #[must_use]
    pub fn site(&self) -> Site {
        Site {
            handler: self.handler,
            method: self.method_name,
        }
    }

    /// Run the bound handler method.
    pub fn invoke(&self, ctx: &mut RequestContext, args: &Arguments) -> Result<Reply, Failure> {
        (self.callable)(ctx, args)
    }
}

impl fmt::Debug for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointDescriptor")
            .field("method", &self.method)
            .field("path_template", &self.path_template)
            .field("versions", &self.versions)
            .field("params", &self.params)
            .field("handler", &self.handler)
            .field("method_name", &self.method_name)
            .field("group", &self.group)
            .field("success_status", &self.success_status)
            .field("error_status", &self.error_status)
            .finish_non_exhaustive()
    }
}
