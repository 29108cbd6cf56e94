//! # Exception Dispatcher
//!
//! Failures carry a [`FailureKind`]; handler types register recovery methods
//! for kinds with `exception_handler(kind)`. When a request fails, the
//! [`ExceptionDispatcher`] picks the registered handler whose kind is the
//! nearest ancestor of the failure's kind, preferring the matched endpoint's
//! group. Failures nobody recovers are answered by a [`FallbackResponder`].

mod core;
mod kinds;

pub use core::{
    ExceptionDispatcher, ExceptionHandlerSpec, FallbackResponder, JsonFallback, RecoveryFn,
};
pub use kinds::{
    FailureKind, BAD_REQUEST, FAILURE, FORBIDDEN, INTERNAL, MISSING_PARAMETER, NOT_FOUND,
    PARAMETER_BINDING, ROUTE_NOT_FOUND, UNAUTHORIZED,
};
