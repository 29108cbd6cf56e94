use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::context::RequestContext;
use crate::error::{Failure, Site};
use crate::meta::GroupId;

/// Type-erased interceptor callable, bound to its handler instance.
pub type InterceptorFn = Arc<dyn Fn(&mut RequestContext) -> Result<Flow, Failure> + Send + Sync>;

/// Lifecycle point an interceptor runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Every request, before routing.
    BeforeEach,
    /// After route and version resolution, owning group only.
    BeforeMatched,
    /// After the handler completed normally, owning group only.
    AfterMatched,
    /// Every normally completed request, last.
    AfterEach,
}

impl Phase {
    /// Scoped phases only run interceptors of the matched endpoint's group.
    #[must_use]
    pub fn is_scoped(self) -> bool {
        matches!(self, Phase::BeforeMatched | Phase::AfterMatched)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::BeforeEach => "before_each",
            Phase::BeforeMatched => "before_matched",
            Phase::AfterMatched => "after_matched",
            Phase::AfterEach => "after_each",
        };
        f.write_str(name)
    }
}

/// Interceptor verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop processing; the response in the context is final.
    Halt,
}

pub struct InterceptorSpec {
    pub phase: Phase,
    pub group: GroupId,
    pub handler: &'static str,
    pub method_name: &'static str,
    pub(crate) callable: InterceptorFn,
}

impl InterceptorSpec {
    #[must_use]
    pub fn site(&self) -> Site {
        Site {
            handler: self.handler,
            method: self.method_name,
        }
    }

    pub fn invoke(&self, ctx: &mut RequestContext) -> Result<Flow, Failure> {
        (self.callable)(ctx)
    }
}

impl fmt::Debug for InterceptorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorSpec")
            .field("phase", &self.phase)
            .field("group", &self.group)
            .field("handler", &self.handler)
            .field("method_name", &self.method_name)
            .finish_non_exhaustive()
    }
}

/// Interceptors indexed by phase, in registration order.
#[derive(Default)]
pub struct InterceptorChain {
    before_each: Vec<Arc<InterceptorSpec>>,
    after_each: Vec<Arc<InterceptorSpec>>,
    before_matched: HashMap<GroupId, Vec<Arc<InterceptorSpec>>>,
    after_matched: HashMap<GroupId, Vec<Arc<InterceptorSpec>>>,
}

impl InterceptorChain {
    pub(crate) fn new(specs: Vec<InterceptorSpec>) -> Self {
        let mut chain = Self::default();
        for spec in specs {
            let group = spec.group;
            let spec = Arc::new(spec);
            match spec.phase {
                Phase::BeforeEach => chain.before_each.push(spec),
                Phase::AfterEach => chain.after_each.push(spec),
                Phase::BeforeMatched => chain.before_matched.entry(group).or_default().push(spec),
                Phase::AfterMatched => chain.after_matched.entry(group).or_default().push(spec),
            }
        }
        chain
    }

    /// Interceptors that run for `phase`; scoped phases need the matched group.
    #[must_use]
    pub fn interceptors(&self, phase: Phase, group: Option<GroupId>) -> &[Arc<InterceptorSpec>] {
        let scoped = match phase {
            Phase::BeforeEach => return &self.before_each,
            Phase::AfterEach => return &self.after_each,
            Phase::BeforeMatched => &self.before_matched,
            Phase::AfterMatched => &self.after_matched,
        };
        group
            .and_then(|group| scoped.get(&group))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Run one phase. Stops at the first [`Flow::Halt`] or failure.
    pub fn run(
        &self,
        phase: Phase,
        group: Option<GroupId>,
        ctx: &mut RequestContext,
    ) -> Result<Flow, Failure> {
        for spec in self.interceptors(phase, group) {
            if spec.invoke(ctx)? == Flow::Halt {
                debug!(
                    request_id = %ctx.request_id(),
                    %phase,
                    interceptor = %spec.site(),
                    status = ctx.status(),
                    "Interceptor halted request"
                );
                return Ok(Flow::Halt);
            }
        }
        Ok(Flow::Continue)
    }

    /// Number of registered interceptors across all phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.before_each.len()
            + self.after_each.len()
            + self.before_matched.values().map(Vec::len).sum::<usize>()
            + self.after_matched.values().map(Vec::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
