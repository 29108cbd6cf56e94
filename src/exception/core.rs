use std::fmt;
use std::sync::Arc;

use serde_json::json;

use crate::context::RequestContext;
use crate::error::{Failure, RequestError, Site};
use crate::meta::GroupId;

use super::kinds::FailureKind;

/// Type-erased recovery callable, bound to its handler instance.
pub type RecoveryFn =
    Arc<dyn Fn(&mut RequestContext, &Failure) -> Result<(), Failure> + Send + Sync>;

pub struct ExceptionHandlerSpec {
    pub kind: &'static FailureKind,
    pub group: GroupId,
    pub handler: &'static str,
    pub method_name: &'static str,
    pub(crate) callable: RecoveryFn,
}

impl ExceptionHandlerSpec {
    #[must_use]
    pub fn site(&self) -> Site {
        Site {
            handler: self.handler,
            method: self.method_name,
        }
    }

    pub fn invoke(&self, ctx: &mut RequestContext, failure: &Failure) -> Result<(), Failure> {
        (self.callable)(ctx, failure)
    }
}

impl fmt::Debug for ExceptionHandlerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionHandlerSpec")
            .field("kind", &self.kind.name())
            .field("group", &self.group)
            .field("handler", &self.handler)
            .field("method_name", &self.method_name)
            .finish_non_exhaustive()
    }
}

/// Registered exception handlers in registration order.
#[derive(Default)]
pub struct ExceptionDispatcher {
    handlers: Vec<Arc<ExceptionHandlerSpec>>,
}

impl ExceptionDispatcher {
    pub(crate) fn new(handlers: Vec<ExceptionHandlerSpec>) -> Self {
        Self {
            handlers: handlers.into_iter().map(Arc::new).collect(),
        }
    }

    /// Most specific handler for `kind`.
    ///
    /// Handlers of the matched group are searched first, then every
    /// registered handler. Within each pass the smallest ancestor distance
    /// wins and ties go to the earliest registration.
    #[must_use]
    pub fn resolve(
        &self,
        kind: &FailureKind,
        group: Option<GroupId>,
    ) -> Option<&Arc<ExceptionHandlerSpec>> {
        if let Some(group) = group {
            let scoped = closest(self.handlers.iter().filter(|h| h.group == group), kind);
            if scoped.is_some() {
                return scoped;
            }
        }
        closest(self.handlers.iter(), kind)
    }

    #[must_use]
    pub fn handlers(&self) -> &[Arc<ExceptionHandlerSpec>] {
        &self.handlers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn closest<'a>(
    candidates: impl Iterator<Item = &'a Arc<ExceptionHandlerSpec>>,
    kind: &FailureKind,
) -> Option<&'a Arc<ExceptionHandlerSpec>> {
    candidates
        .filter_map(|handler| kind.distance_to(handler.kind).map(|d| (d, handler)))
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, handler)| handler)
}

/// Writes the response for failures no exception handler recovered.
///
/// The dispatcher has already set the status when this runs.
pub trait FallbackResponder: Send + Sync {
    fn respond(&self, ctx: &mut RequestContext, failure: &Failure);
}

/// Default fallback: `{"error": message, "kind": name}` as JSON.
///
/// Messages of 5xx failures are replaced unless `expose_internal_errors` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFallback {
    pub expose_internal_errors: bool,
}

impl FallbackResponder for JsonFallback {
    fn respond(&self, ctx: &mut RequestContext, failure: &Failure) {
        let message = if failure.status() >= 500 && !self.expose_internal_errors {
            "internal server error"
        } else {
            failure.message()
        };
        let mut body = json!({
            "error": message,
            "kind": failure.kind().name(),
        });
        if let Some(name) = failure.request_error().and_then(RequestError::parameter) {
            body["parameter"] = json!(name);
        }
        ctx.json(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Reply;
    use crate::exception::{BAD_REQUEST, FAILURE, INTERNAL, MISSING_PARAMETER};
    use http::Method;

    fn spec(kind: &'static FailureKind, group: usize, name: &'static str) -> ExceptionHandlerSpec {
        ExceptionHandlerSpec {
            kind,
            group: GroupId(group),
            handler: "Test",
            method_name: name,
            callable: Arc::new(|_ctx: &mut RequestContext, _failure: &Failure| Ok(())),
        }
    }

    #[test]
    fn nearest_ancestor_wins() {
        let dispatcher = ExceptionDispatcher::new(vec![
            spec(&FAILURE, 0, "any"),
            spec(&BAD_REQUEST, 0, "bad_request"),
        ]);
        let found = dispatcher.resolve(&MISSING_PARAMETER, None).map(|h| h.method_name);
        assert_eq!(found, Some("bad_request"));
    }

    #[test]
    fn ties_go_to_first_registration() {
        let dispatcher = ExceptionDispatcher::new(vec![
            spec(&BAD_REQUEST, 0, "first"),
            spec(&BAD_REQUEST, 1, "second"),
        ]);
        let found = dispatcher.resolve(&MISSING_PARAMETER, None).map(|h| h.method_name);
        assert_eq!(found, Some("first"));
    }

    #[test]
    fn matched_group_is_searched_first() {
        let dispatcher = ExceptionDispatcher::new(vec![
            spec(&MISSING_PARAMETER, 0, "global_exact"),
            spec(&FAILURE, 1, "group_catch_all"),
        ]);
        let found = dispatcher
            .resolve(&MISSING_PARAMETER, Some(GroupId(1)))
            .map(|h| h.method_name);
        assert_eq!(found, Some("group_catch_all"));
    }

    #[test]
    fn unrelated_kinds_are_not_matched() {
        let dispatcher = ExceptionDispatcher::new(vec![spec(&BAD_REQUEST, 0, "bad_request")]);
        assert!(dispatcher.resolve(&INTERNAL, Some(GroupId(0))).is_none());
    }

    #[test]
    fn json_fallback_hides_internal_messages() {
        let mut ctx = RequestContext::new(Method::GET, "/");
        let failure = Failure::new(&INTERNAL, "connection string leaked");
        JsonFallback::default().respond(&mut ctx, &failure);
        assert_eq!(
            ctx.response_body(),
            &Reply::Json(json!({"error": "internal server error", "kind": "Internal"}))
        );

        let mut ctx = RequestContext::new(Method::GET, "/");
        JsonFallback {
            expose_internal_errors: true,
        }
        .respond(&mut ctx, &failure);
        assert_eq!(
            ctx.response_body(),
            &Reply::Json(json!({"error": "connection string leaked", "kind": "Internal"}))
        );
    }
}
