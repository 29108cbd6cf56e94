//! # Dispatcher Module
//!
//! Runs a [`RequestContext`](crate::RequestContext) through the route table:
//! interceptors, route matching, version resolution, parameter binding, the
//! handler and, on failure, the exception handlers.
//!
//! The dispatcher does no I/O. A transport builds the context from the wire
//! request, calls [`Dispatcher::dispatch`], and writes the status, headers
//! and body left in the context back to the client.
//!
//! ```rust
//! use declarouter::meta::{Description, Endpoints, ParameterSpec};
//! use declarouter::{Dispatcher, Outcome, Registrar, Reply, RequestContext, RoutingConfig};
//! use http::Method;
//!
//! struct Echo;
//!
//! impl Endpoints for Echo {
//!     fn describe(d: &mut Description<Self>) {
//!         d.method("echo")
//!             .get("/echo/{word}")
//!             .param(ParameterSpec::path("word"))
//!             .handle(|_: &Echo, _ctx, args| Ok(Reply::text(args.text("word").unwrap_or_default())));
//!     }
//! }
//!
//! let mut registrar = Registrar::new();
//! registrar.register(Echo);
//! let dispatcher = Dispatcher::new(registrar.build().expect("valid"), RoutingConfig::default());
//!
//! let mut ctx = RequestContext::new(Method::GET, "/echo/hi");
//! assert_eq!(dispatcher.dispatch(&mut ctx), Outcome::Completed);
//! assert_eq!(ctx.response_body(), &Reply::text("hi"));
//! ```

mod core;

pub use core::{Dispatcher, Outcome};
