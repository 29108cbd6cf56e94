//! # Parameter Binder
//!
//! Converts the request into the ordered [`Arguments`] of an endpoint.
//! Every declared [`ParameterSpec`](crate::meta::ParameterSpec) reads one
//! source (path, query, header, cookie, body or context) and converts the
//! raw value to its target type. Missing non-nullable parameters and failed
//! conversions become [`RequestError`](crate::RequestError)s, which the
//! dispatcher routes through the exception handlers like any other failure.
//!
//! Body parameters go through an injected [`BodyDeserializer`];
//! [`JsonBodyDeserializer`] is the default.

mod core;

pub use core::{bind, Arguments, BodyDeserializer, BoundValue, FromBound, JsonBodyDeserializer};
