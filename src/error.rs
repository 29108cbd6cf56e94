//! Error taxonomy.
//!
//! - [`ConfigurationError`]: detected while building the route table; fatal.
//! - [`RequestError`]: routing and binding failures of a single request.
//! - [`Failure`]: anything raised while handling a request (handler bodies,
//!   interceptors, the binder). Carries a [`FailureKind`] so the exception
//!   dispatcher can pick the most specific recovery handler.

use std::fmt;

use http::Method;

use crate::exception::{
    FailureKind, INTERNAL, MISSING_PARAMETER, PARAMETER_BINDING, ROUTE_NOT_FOUND,
};
use crate::meta::ParamSource;

/// Location of a described method, used in configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub handler: &'static str,
    pub method: &'static str,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.handler, self.method)
    }
}

/// Registration-time error. The route table is never built when one occurs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{site}: method is described more than once")]
    DuplicateMethod { site: Site },

    #[error("{site}: more than one route declared ({first} and {second})")]
    MultipleRoutes {
        site: Site,
        first: String,
        second: String,
    },

    #[error("{site}: conflicting tags ({reason})")]
    ConflictingTags { site: Site, reason: String },

    #[error("{site}: tagged method has no callable")]
    MissingCallable { site: Site },

    #[error("{site}: more than one callable attached")]
    MultipleCallables { site: Site },

    #[error("{site}: callable does not match tags, expected {expected}")]
    CallableMismatch { site: Site, expected: &'static str },

    #[error("{site}: attribute only valid on routes ({attribute})")]
    MisplacedAttribute {
        site: Site,
        attribute: &'static str,
    },

    #[error("{site}: invalid parameter ({reason})")]
    InvalidParameter { site: Site, reason: String },

    #[error("{site}: invalid version list ({reason})")]
    InvalidVersion { site: Site, reason: String },

    #[error("invalid path template '{template}': {reason}")]
    InvalidPath { template: String, reason: String },

    #[error("{site}: path placeholders {placeholders:?} do not match path parameters {params:?}")]
    PlaceholderMismatch {
        site: Site,
        placeholders: Vec<String>,
        params: Vec<String>,
    },

    #[error("duplicated version '{version}' for route {method} {path}")]
    DuplicateRoute {
        method: Method,
        path: String,
        version: String,
    },

    #[error("ambiguous templates for {method}: '{first}' and '{second}' match the same paths")]
    AmbiguousTemplate {
        method: Method,
        first: String,
        second: String,
    },
}

/// Request-scoped routing and binding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("no route for {method} {path}")]
    RouteNotFound { method: Method, path: String },

    #[error(
        "{method} {template} does not support the requested API version ({})",
        .requested.as_deref().unwrap_or("none")
    )]
    VersionNotFound {
        method: Method,
        template: String,
        requested: Option<String>,
    },

    #[error("missing required {location} parameter '{name}'")]
    MissingParameter { name: String, location: ParamSource },

    #[error("cannot bind {location} parameter '{name}': {reason}")]
    ParameterBinding {
        name: String,
        location: ParamSource,
        reason: String,
    },
}

impl RequestError {
    #[must_use]
    pub fn kind(&self) -> &'static FailureKind {
        match self {
            RequestError::RouteNotFound { .. } | RequestError::VersionNotFound { .. } => {
                &ROUTE_NOT_FOUND
            }
            RequestError::MissingParameter { .. } => &MISSING_PARAMETER,
            RequestError::ParameterBinding { .. } => &PARAMETER_BINDING,
        }
    }

    /// Name of the offending parameter, for binder errors.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        match self {
            RequestError::MissingParameter { name, .. }
            | RequestError::ParameterBinding { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A failure raised while handling a request.
///
/// Handler bodies return `Result<_, Failure>`; `?` converts
/// [`anyhow::Error`] (as [`INTERNAL`]) and [`RequestError`] automatically.
#[derive(Debug)]
pub struct Failure {
    kind: &'static FailureKind,
    message: String,
    request: Option<RequestError>,
    cause: Option<anyhow::Error>,
}

impl Failure {
    pub fn new(kind: &'static FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            request: None,
            cause: None,
        }
    }

    /// Wrap an opaque error as an [`INTERNAL`] failure.
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        let err = err.into();
        Self {
            kind: &INTERNAL,
            message: err.to_string(),
            request: None,
            cause: Some(err),
        }
    }

    #[must_use]
    pub fn with_cause(mut self, err: impl Into<anyhow::Error>) -> Self {
        self.cause = Some(err.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> &'static FailureKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The routing/binding error this failure was raised from, if any.
    #[must_use]
    pub fn request_error(&self) -> Option<&RequestError> {
        self.request.as_ref()
    }

    #[must_use]
    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }

    /// Default response status for this failure.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    #[must_use]
    pub fn is_a(&self, kind: &FailureKind) -> bool {
        self.kind.is_a(kind)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Some(request) = &self.request {
            return Some(request);
        }
        self.cause
            .as_ref()
            .map(|cause| &**cause as &(dyn std::error::Error + 'static))
    }
}

impl From<RequestError> for Failure {
    fn from(err: RequestError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            request: Some(err),
            cause: None,
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::internal(err)
    }
}
