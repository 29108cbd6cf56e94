//! Description builder.
//!
//! Handler types implement [`Endpoints`] and declare their methods in
//! [`Endpoints::describe`]. Each method gets tags (a route, versions,
//! parameters, an interceptor phase or exception kinds) plus exactly one
//! callable. The scanner validates the combination.
//!
//! ```rust
//! use declarouter::meta::{Description, Endpoints, ParameterSpec};
//! use declarouter::Reply;
//!
//! struct Users;
//!
//! impl Endpoints for Users {
//!     fn prefix(&self) -> &str {
//!         "users"
//!     }
//!
//!     fn describe(d: &mut Description<Self>) {
//!         d.method("show")
//!             .get("/{id}")
//!             .versions(["v1", "default"])
//!             .param(ParameterSpec::path("id"))
//!             .handle(|_users: &Users, _ctx, args| {
//!                 Ok(Reply::text(format!("user {}", args.text("id").unwrap_or_default())))
//!             });
//!     }
//! }
//! ```

use std::sync::Arc;

use http::Method;

use crate::binder::Arguments;
use crate::context::{Reply, RequestContext};
use crate::error::Failure;
use crate::exception::FailureKind;
use crate::interceptor::{Flow, Phase};

use super::types::ParameterSpec;

/// A handler type that describes its own endpoints.
pub trait Endpoints: Send + Sync + Sized + 'static {
    /// Path prefix shared by every route of this type.
    fn prefix(&self) -> &str {
        ""
    }

    fn describe(d: &mut Description<Self>);
}

pub(crate) type DescribedEndpoint<T> =
    Arc<dyn Fn(&T, &mut RequestContext, &Arguments) -> Result<Reply, Failure> + Send + Sync>;
pub(crate) type DescribedInterceptor<T> =
    Arc<dyn Fn(&T, &mut RequestContext) -> Result<Flow, Failure> + Send + Sync>;
pub(crate) type DescribedRecovery<T> =
    Arc<dyn Fn(&T, &mut RequestContext, &Failure) -> Result<(), Failure> + Send + Sync>;

pub(crate) enum Callable<T> {
    Endpoint(DescribedEndpoint<T>),
    Interceptor(DescribedInterceptor<T>),
    Recovery(DescribedRecovery<T>),
}

impl<T> Callable<T> {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Callable::Endpoint(_) => "handle",
            Callable::Interceptor(_) => "intercept",
            Callable::Recovery(_) => "recover",
        }
    }
}

/// Collected method descriptions of one handler type.
pub struct Description<T> {
    pub(crate) methods: Vec<MethodMeta<T>>,
}

impl<T: Endpoints> Description<T> {
    pub(crate) fn collect() -> Self {
        let mut d = Self {
            methods: Vec::new(),
        };
        T::describe(&mut d);
        d
    }

    /// Start describing a method. Names must be unique within the type.
    pub fn method(&mut self, name: &'static str) -> &mut MethodMeta<T> {
        let index = self.methods.len();
        self.methods.push(MethodMeta::new(name));
        &mut self.methods[index]
    }
}

/// Tags and callable of one described method.
pub struct MethodMeta<T> {
    pub(crate) name: &'static str,
    pub(crate) routes: Vec<(Method, String)>,
    pub(crate) versions: Option<Vec<String>>,
    pub(crate) params: Vec<ParameterSpec>,
    pub(crate) phases: Vec<Phase>,
    pub(crate) exceptions: Vec<&'static FailureKind>,
    pub(crate) success_status: Option<u16>,
    pub(crate) error_status: Option<u16>,
    pub(crate) callables: Vec<Callable<T>>,
}

impl<T: Endpoints> MethodMeta<T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            routes: Vec::new(),
            versions: None,
            params: Vec::new(),
            phases: Vec::new(),
            exceptions: Vec::new(),
            success_status: None,
            error_status: None,
            callables: Vec::new(),
        }
    }

    /// Route tag with an arbitrary HTTP method.
    pub fn route(&mut self, method: Method, path: &str) -> &mut Self {
        self.routes.push((method, path.to_string()));
        self
    }

    pub fn get(&mut self, path: &str) -> &mut Self {
        self.route(Method::GET, path)
    }

    pub fn post(&mut self, path: &str) -> &mut Self {
        self.route(Method::POST, path)
    }

    pub fn put(&mut self, path: &str) -> &mut Self {
        self.route(Method::PUT, path)
    }

    pub fn patch(&mut self, path: &str) -> &mut Self {
        self.route(Method::PATCH, path)
    }

    pub fn delete(&mut self, path: &str) -> &mut Self {
        self.route(Method::DELETE, path)
    }

    pub fn head(&mut self, path: &str) -> &mut Self {
        self.route(Method::HEAD, path)
    }

    pub fn options(&mut self, path: &str) -> &mut Self {
        self.route(Method::OPTIONS, path)
    }

    pub fn version(&mut self, alias: &str) -> &mut Self {
        self.versions
            .get_or_insert_with(Vec::new)
            .push(alias.to_string());
        self
    }

    /// Declare every alias this route answers to. An empty list is rejected at scan time.
    pub fn versions<I, S>(&mut self, aliases: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = self.versions.get_or_insert_with(Vec::new);
        list.extend(aliases.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    pub fn param(&mut self, spec: ParameterSpec) -> &mut Self {
        self.params.push(spec);
        self
    }

    pub fn params<I>(&mut self, specs: I) -> &mut Self
    where
        I: IntoIterator<Item = ParameterSpec>,
    {
        self.params.extend(specs);
        self
    }

    pub fn phase(&mut self, phase: Phase) -> &mut Self {
        self.phases.push(phase);
        self
    }

    pub fn before_each(&mut self) -> &mut Self {
        self.phase(Phase::BeforeEach)
    }

    pub fn before_matched(&mut self) -> &mut Self {
        self.phase(Phase::BeforeMatched)
    }

    pub fn after_matched(&mut self) -> &mut Self {
        self.phase(Phase::AfterMatched)
    }

    pub fn after_each(&mut self) -> &mut Self {
        self.phase(Phase::AfterEach)
    }

    /// Recover failures of `kind` and of every kind descending from it.
    pub fn exception_handler(&mut self, kind: &'static FailureKind) -> &mut Self {
        self.exceptions.push(kind);
        self
    }

    /// Status written after the handler succeeds.
    pub fn status(&mut self, status: u16) -> &mut Self {
        self.success_status = Some(status);
        self
    }

    /// Status written before a handler failure is dispatched.
    pub fn error_status(&mut self, status: u16) -> &mut Self {
        self.error_status = Some(status);
        self
    }

    /// Endpoint callable for route methods.
    pub fn handle<F, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&T, &mut RequestContext, &Arguments) -> Result<R, Failure> + Send + Sync + 'static,
        R: Into<Reply>,
    {
        self.callables.push(Callable::Endpoint(Arc::new(
            move |target: &T, ctx: &mut RequestContext, args: &Arguments| {
                f(target, ctx, args).map(Into::into)
            },
        )));
        self
    }

    /// Interceptor callable for phase-tagged methods.
    pub fn intercept<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&T, &mut RequestContext) -> Result<Flow, Failure> + Send + Sync + 'static,
    {
        self.callables.push(Callable::Interceptor(Arc::new(f)));
        self
    }

    /// Recovery callable for exception handler methods.
    pub fn recover<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&T, &mut RequestContext, &Failure) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.callables.push(Callable::Recovery(Arc::new(f)));
        self
    }

    pub(crate) fn is_tagged(&self) -> bool {
        !self.routes.is_empty() || !self.phases.is_empty() || !self.exceptions.is_empty()
    }
}
