//! # declarouter
//!
//! **declarouter** is a declarative endpoint registration and dispatch engine.
//! Handler types describe their own endpoints (routes, API versions,
//! parameters, interceptors and exception handlers) next to the code that
//! serves them; a [`Registrar`] scans the descriptions once at startup into an
//! immutable [`RouteTable`], and a [`Dispatcher`] runs requests through it.
//!
//! ## Architecture
//!
//! - **[`meta`]** - the [`Endpoints`] description builder and the scanner
//!   that validates descriptions into endpoint, interceptor and exception
//!   handler descriptors
//! - **[`router`]** - path templates, the radix tree and per-route version sets
//! - **[`binder`]** - converts request data into typed handler [`Arguments`]
//! - **[`interceptor`]** - `before_each`/`before_matched`/`after_matched`/`after_each` hooks
//! - **[`exception`]** - failure kinds, nearest-ancestor recovery lookup and
//!   the fallback responder
//! - **[`registrar`]** - groups, prefixes and table construction
//! - **[`dispatcher`]** - the per-request pipeline
//! - **[`context`]** - the mutable request/response exchange
//! - **[`runtime_config`]** and **[`logging`]** - deployment configuration
//!
//! The engine does no network I/O. A transport adapter builds a
//! [`RequestContext`] from the wire request, calls [`Dispatcher::dispatch`],
//! and writes the status, headers and body left in the context back out.
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant T as Transport
//!     participant D as Dispatcher
//!     participant I as Interceptors
//!     participant R as Router
//!     participant B as Binder
//!     participant H as Handler
//!     participant E as Exception handlers
//!
//!     T->>D: dispatch(&mut ctx)
//!     D->>I: before_each
//!     D->>R: route(method, path)
//!     R-->>D: RouteEntry + path params
//!     D->>R: resolve(requested version)
//!     D->>I: before_matched (owning group)
//!     D->>B: bind(params, ctx)
//!     D->>H: invoke(ctx, args)
//!     D->>I: after_matched, after_each
//!     Note over D,E: any failure skips the remaining steps
//!     D->>E: resolve(kind, group) and recover
//!     D-->>T: Outcome
//! ```
//!
//! ## Example
//!
//! ```rust
//! use declarouter::meta::{Description, Endpoints, ParameterSpec};
//! use declarouter::{
//!     Dispatcher, EndpointGroup, Outcome, Registrar, Reply, RequestContext, RoutingConfig,
//! };
//! use http::Method;
//!
//! struct Greeter;
//!
//! impl Endpoints for Greeter {
//!     fn describe(d: &mut Description<Self>) {
//!         d.method("hello")
//!             .get("/hello")
//!             .param(ParameterSpec::query("name").nullable())
//!             .handle(|_: &Greeter, _ctx, args| {
//!                 Ok(format!("hello {}", args.text("name").unwrap_or("world")))
//!             });
//!     }
//! }
//!
//! let mut registrar = Registrar::new();
//! registrar.add_group(EndpointGroup::new("api").with(Greeter));
//! let dispatcher = Dispatcher::new(registrar.build().expect("valid"), RoutingConfig::default());
//!
//! let mut ctx = RequestContext::new(Method::GET, "/api/hello?name=ada");
//! assert_eq!(dispatcher.dispatch(&mut ctx), Outcome::Completed);
//! assert_eq!(ctx.response_body(), &Reply::text("hello ada"));
//! ```

pub mod binder;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod exception;
pub mod ids;
pub mod interceptor;
pub mod logging;
pub mod meta;
pub mod registrar;
pub mod router;
pub mod runtime_config;
pub mod table;

pub use binder::Arguments;
pub use context::{MatchedEndpoint, Reply, RequestContext};
pub use dispatcher::{Dispatcher, Outcome};
pub use error::{ConfigurationError, Failure, RequestError, Site};
pub use exception::FailureKind;
pub use ids::RequestId;
pub use interceptor::{Flow, Phase};
pub use meta::{handler, Description, Endpoints, ParameterSpec};
pub use registrar::{EndpointGroup, Registrar};
pub use runtime_config::RoutingConfig;
pub use table::RouteTable;
