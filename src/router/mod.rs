//! # Router Module
//!
//! Path matching and version resolution.
//!
//! Registered templates such as `/api/users/{id}` are compiled into a radix
//! tree at build time. Each `(method, template)` pair owns a
//! [`VersionSet`] holding the descriptors registered under it, keyed by
//! version alias.
//!
//! Matching a request happens in two steps:
//!
//! 1. [`Router::route`] walks the tree segment by segment and captures
//!    `{name}` segments into a [`ParamVec`].
//! 2. [`RouteEntry::resolve`] picks a descriptor for the version the
//!    request asked for (read through a [`VersionSource`]), falling back
//!    to the `"default"` alias.
//!
//! A path that matches no template and a route that has no usable version
//! are both reported as route-not-found, with different
//! [`RequestError`](crate::RequestError) variants.

mod core;
mod radix;
pub(crate) mod template;
#[cfg(test)]
mod tests;
mod version;

pub use core::{ParamVec, RouteEntry, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use radix::RadixRouter;
pub use template::{compose, placeholders, sanitize, shape};
pub use version::{VersionSet, VersionSource, DEFAULT_VERSION_HEADER};
