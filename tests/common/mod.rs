#![allow(dead_code)]

use std::sync::Arc;

use declarouter::exception::{FAILURE, MISSING_PARAMETER};
use declarouter::meta::{Description, Endpoints, ParameterSpec};
use declarouter::{Dispatcher, Flow, Registrar, Reply, RequestContext, RoutingConfig};
use http::Method;
use parking_lot::Mutex;
use serde_json::json;

/// Shared log of interceptor and handler calls, in call order.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// `POST /hello` requiring an `Authorization` header.
pub struct HelloApi;

impl Endpoints for HelloApi {
    fn describe(d: &mut Description<Self>) {
        d.method("hello")
            .post("/hello")
            .param(ParameterSpec::header("Authorization"))
            .handle(|_: &HelloApi, _ctx, args| {
                Ok(format!("hello {}", args.text("Authorization").unwrap_or_default()))
            });
    }
}

/// Turns missing parameters into 401 and anything else into a JSON 500.
pub struct AuthErrors;

impl Endpoints for AuthErrors {
    fn describe(d: &mut Description<Self>) {
        d.method("missing")
            .exception_handler(&MISSING_PARAMETER)
            .recover(|_: &AuthErrors, ctx, failure| {
                ctx.set_status(401)
                    .json(json!({ "error": "unauthorized", "detail": failure.message() }));
                Ok(())
            });
        d.method("anything")
            .exception_handler(&FAILURE)
            .recover(|_: &AuthErrors, ctx, _failure| {
                ctx.set_status(500).result("boom");
                Ok(())
            });
    }
}

/// Interceptors for every phase, each logging `<name>:<phase>`.
pub struct Tracer {
    pub name: &'static str,
    pub recorder: Recorder,
}

impl Endpoints for Tracer {
    fn describe(d: &mut Description<Self>) {
        d.method("before_each")
            .before_each()
            .intercept(|t: &Tracer, _ctx| {
                t.recorder.push(format!("{}:before_each", t.name));
                Ok(Flow::Continue)
            });
        d.method("before_matched")
            .before_matched()
            .intercept(|t: &Tracer, _ctx| {
                t.recorder.push(format!("{}:before_matched", t.name));
                Ok(Flow::Continue)
            });
        d.method("after_matched")
            .after_matched()
            .intercept(|t: &Tracer, _ctx| {
                t.recorder.push(format!("{}:after_matched", t.name));
                Ok(Flow::Continue)
            });
        d.method("after_each")
            .after_each()
            .intercept(|t: &Tracer, _ctx| {
                t.recorder.push(format!("{}:after_each", t.name));
                Ok(Flow::Continue)
            });
    }
}

/// `GET /ping` that records its invocation.
pub struct Ping {
    pub recorder: Recorder,
}

impl Endpoints for Ping {
    fn describe(d: &mut Description<Self>) {
        d.method("ping").get("/ping").handle(|p: &Ping, _ctx, _args| {
            p.recorder.push("ping");
            Ok(Reply::text("pong"))
        });
    }
}

pub fn dispatcher(registrar: Registrar) -> Dispatcher {
    let table = registrar.build().expect("registration succeeds");
    Dispatcher::new(table, RoutingConfig::default())
}

pub fn get(path: &str) -> RequestContext {
    RequestContext::new(Method::GET, path)
}

pub fn post(path: &str) -> RequestContext {
    RequestContext::new(Method::POST, path)
}
