//! # Registrar
//!
//! Entry point of registration: collect [`EndpointGroup`]s, then call
//! [`Registrar::build`] once at startup to scan every handler instance and
//! produce the immutable [`RouteTable`](crate::RouteTable).
//!
//! Groups get ordinals in registration order. Group ordinals scope
//! `before_matched`/`after_matched` interceptors and the first pass of
//! exception handler lookup.

mod core;

pub use core::{EndpointGroup, Registrar};
