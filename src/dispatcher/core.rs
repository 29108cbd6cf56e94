//! Dispatcher core module - hot path for request dispatch.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use tracing::{debug, error, info, info_span, warn};

use crate::binder::{bind, BodyDeserializer, JsonBodyDeserializer};
use crate::context::{MatchedEndpoint, RequestContext};
use crate::error::{Failure, RequestError};
use crate::exception::{FallbackResponder, JsonFallback, INTERNAL};
use crate::interceptor::{Flow, Phase};
use crate::meta::EndpointDescriptor;
use crate::runtime_config::RoutingConfig;
use crate::table::RouteTable;

/// How a dispatched request ended. Every outcome leaves a response in the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler ran and every interceptor continued.
    Completed,
    /// An interceptor returned [`Flow::Halt`].
    Halted,
    /// A failure was handled by a registered exception handler.
    Recovered,
    /// No exception handler recovered the failure; the fallback responder answered.
    Fallback,
}

/// Runs requests against the current [`RouteTable`].
///
/// The table sits behind an [`ArcSwap`] so a rebuilt table can be installed
/// while requests are in flight; each request keeps the table it started with.
pub struct Dispatcher {
    table: ArcSwap<RouteTable>,
    config: RoutingConfig,
    deserializer: Arc<dyn BodyDeserializer>,
    fallback: Arc<dyn FallbackResponder>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(table: RouteTable, config: RoutingConfig) -> Self {
        let fallback = JsonFallback {
            expose_internal_errors: config.expose_internal_errors,
        };
        Self {
            table: ArcSwap::from_pointee(table),
            config,
            deserializer: Arc::new(JsonBodyDeserializer),
            fallback: Arc::new(fallback),
        }
    }

    #[must_use]
    pub fn with_deserializer(mut self, deserializer: Arc<dyn BodyDeserializer>) -> Self {
        self.deserializer = deserializer;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackResponder>) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Snapshot of the current table.
    #[must_use]
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Install a newly built table; in-flight requests finish on the old one.
    pub fn replace_table(&self, table: RouteTable) {
        let routes_count = table.router().len();
        self.table.store(Arc::new(table));
        info!(routes_count, "Route table replaced");
    }

    /// Process one request to completion.
    ///
    /// Order: `before_each` interceptors, route and version resolution,
    /// `before_matched` interceptors of the owning group, parameter binding,
    /// the handler, then `after_matched` and `after_each`. Any failure goes
    /// to the exception handlers, skipping the remaining steps. A panic in a
    /// handler, interceptor or exception handler becomes an `Internal`
    /// failure and is recovered the same way.
    pub fn dispatch(&self, ctx: &mut RequestContext) -> Outcome {
        let table = self.table.load_full();
        let span = info_span!(
            "dispatch",
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path()
        );
        let _entered = span.enter();
        let start = Instant::now();

        let mut matched: Option<Arc<EndpointDescriptor>> = None;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run(&table, ctx, &mut matched)
        }))
        .unwrap_or_else(|payload| Err(panic_failure(payload)));
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(failure) => self.recover(&table, ctx, &failure, matched.as_deref()),
        };

        info!(
            status = ctx.status(),
            outcome = ?outcome,
            duration_us = start.elapsed().as_micros(),
            "Request dispatched"
        );
        outcome
    }

    fn run(
        &self,
        table: &RouteTable,
        ctx: &mut RequestContext,
        matched: &mut Option<Arc<EndpointDescriptor>>,
    ) -> Result<Outcome, Failure> {
        let interceptors = table.interceptors();
        if interceptors.run(Phase::BeforeEach, None, ctx)? == Flow::Halt {
            return Ok(Outcome::Halted);
        }

        let Some(route_match) = table.router().route(ctx.method(), ctx.path()) else {
            debug!(
                allowed_methods = ?table.router().allowed_methods(ctx.path()),
                "No route matched"
            );
            return Err(RequestError::RouteNotFound {
                method: ctx.method().clone(),
                path: ctx.path().to_string(),
            }
            .into());
        };

        let (descriptor, version) = {
            let requested = self.config.version.read(ctx);
            let (descriptor, version) = route_match.entry.resolve(requested)?;
            debug!(
                requested_version = ?requested,
                version,
                handler = %descriptor.site(),
                "Version resolved"
            );
            (Arc::clone(descriptor), version.to_string())
        };
        *matched = Some(Arc::clone(&descriptor));
        ctx.set_matched(
            MatchedEndpoint::new(Arc::clone(&descriptor), version),
            route_match.path_params,
        );

        let group = Some(descriptor.group);
        if interceptors.run(Phase::BeforeMatched, group, ctx)? == Flow::Halt {
            return Ok(Outcome::Halted);
        }

        let args = bind(&descriptor.params, ctx, self.deserializer.as_ref())?;
        let reply = descriptor.invoke(ctx, &args)?;
        if let Some(status) = descriptor.success_status {
            ctx.set_status(status);
        }
        ctx.reply(reply);

        if interceptors.run(Phase::AfterMatched, group, ctx)? == Flow::Halt {
            return Ok(Outcome::Halted);
        }
        if interceptors.run(Phase::AfterEach, None, ctx)? == Flow::Halt {
            return Ok(Outcome::Halted);
        }
        Ok(Outcome::Completed)
    }

    fn recover(
        &self,
        table: &RouteTable,
        ctx: &mut RequestContext,
        failure: &Failure,
        matched: Option<&EndpointDescriptor>,
    ) -> Outcome {
        let group = matched.map(|d| d.group);
        let status = matched
            .and_then(|d| d.error_status)
            .unwrap_or_else(|| failure.status());
        ctx.set_status(status);

        let Some(handler) = table.exceptions().resolve(failure.kind(), group) else {
            warn!(
                kind = %failure.kind(),
                error = %failure.message(),
                status,
                "Unhandled failure"
            );
            self.fallback.respond(ctx, failure);
            return Outcome::Fallback;
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(ctx, failure)))
            .unwrap_or_else(|payload| Err(panic_failure(payload)));
        match result {
            Ok(()) => {
                info!(
                    kind = %failure.kind(),
                    handler = %handler.site(),
                    status = ctx.status(),
                    "Failure recovered"
                );
                Outcome::Recovered
            }
            Err(secondary) => {
                warn!(
                    kind = %failure.kind(),
                    handler = %handler.site(),
                    error = %secondary,
                    "Exception handler failed"
                );
                ctx.set_status(secondary.status());
                self.fallback.respond(ctx, &secondary);
                Outcome::Fallback
            }
        }
    }
}

fn panic_failure(payload: Box<dyn Any + Send>) -> Failure {
    let panic_message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    error!(panic_message = %panic_message, "Handler panicked - CRITICAL");
    Failure::new(&INTERNAL, format!("handler panicked: {panic_message}"))
}
