//! # Interceptor Chain
//!
//! Lifecycle hooks declared on handler types. `before_each` and `after_each`
//! interceptors run for every request in registration order, across all
//! groups. `before_matched` and `after_matched` interceptors only run for
//! requests whose endpoint belongs to the same group. Returning
//! [`Flow::Halt`] ends processing with whatever response the interceptor
//! wrote. After-phases run only when the handler completed normally.

mod core;

pub use core::{Flow, InterceptorChain, InterceptorFn, InterceptorSpec, Phase};
