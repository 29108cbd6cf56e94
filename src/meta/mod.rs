//! # Metadata Model and Scanner
//!
//! Handler types describe their endpoints, interceptors and exception
//! handlers through [`Endpoints::describe`]. [`scan`] turns one handler
//! instance into [`EndpointDescriptor`]s, interceptor specs and exception
//! handler specs, rejecting inconsistent descriptions with a
//! [`ConfigurationError`](crate::ConfigurationError).
//!
//! ## Rules
//!
//! - A method without tags is ignored.
//! - A route method has exactly one route tag and no interceptor or
//!   exception tag; interceptor and exception tags exclude each other.
//! - The callable must fit the tags: `handle` for routes, `intercept` for
//!   phases, `recover` for exception handlers.
//! - `{name}` placeholders of the full template must equal the set of path
//!   parameters.
//! - Routes without a declared version answer to [`DEFAULT_VERSION`].

mod describe;
mod scan;
mod types;

pub use describe::{Description, Endpoints, MethodMeta};
pub use scan::{handler, scan, short_type_name, HandlerObject, ScanOutput};
pub use types::{
    EndpointDescriptor, EndpointFn, GroupId, ParamSource, ParameterSpec, TargetType,
    DEFAULT_VERSION,
};
