use crate::concurrency::ConcurrencyInterface;
use crate::control_flow::ControlFlowExecutor;
use crate::executor_value::ExecutorValue;
use crate::scope::Scope;
use arcstr::ArcStr;
use async_trait::async_trait;
use fxhash::FxHashMap;
use genc_value::{ErrorKind, GencError, Value};
use parking_lot::Mutex;
use std::sync::Arc;

/// Which of the two executor layers a handler's `create-call` is invoked
/// from, and therefore which signature its entry point has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// Receives a materialized argument, returns a materialized result.
    /// Run by the inline executor.
    Inline,
    /// Receives an executor-value argument and a context for re-entering
    /// the control-flow executor; returns an executor-value result. Run
    /// by the control-flow executor.
    ControlFlow,
}

/// Context handed to an inline handler: the scheduler it may fan out work
/// onto, plus the static parameter it was registered against.
pub struct InlineContext<'a> {
    pub scheduler: &'a dyn ConcurrencyInterface,
}

/// Context handed to a control-flow handler: back-access to the same
/// control-flow executor the call came from, plus the scope active at the
/// call site (so e.g. `fallback` can re-evaluate each candidate in the
/// caller's scope).
pub struct ControlFlowContext<'a> {
    pub executor: &'a ControlFlowExecutor,
    pub scope: &'a Scope,
}

#[async_trait]
pub trait InlineHandler: Send + Sync {
    /// Validates the static parameter shape at registration/lookup time;
    /// a malformed static parameter is `InvalidArgument`, never a panic
    /// deep inside `execute`.
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()>;

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Value,
        ctx: &InlineContext<'_>,
    ) -> genc_value::Result<Value>;
}

#[async_trait]
pub trait ControlFlowHandler: Send + Sync {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()>;

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Option<ExecutorValue>,
        ctx: &ControlFlowContext<'_>,
    ) -> genc_value::Result<ExecutorValue>;
}

pub enum Handler {
    Inline(Arc<dyn InlineHandler>),
    ControlFlow(Arc<dyn ControlFlowHandler>),
}

impl Handler {
    pub fn discipline(&self) -> Discipline {
        match self {
            Handler::Inline(_) => Discipline::Inline,
            Handler::ControlFlow(_) => Discipline::ControlFlow,
        }
    }

    pub fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        match self {
            Handler::Inline(h) => h.check_well_formed(static_parameter),
            Handler::ControlFlow(h) => h.check_well_formed(static_parameter),
        }
    }

    pub fn as_inline(&self) -> Option<&Arc<dyn InlineHandler>> {
        match self {
            Handler::Inline(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_control_flow(&self) -> Option<&Arc<dyn ControlFlowHandler>> {
        match self {
            Handler::ControlFlow(h) => Some(h),
            _ => None,
        }
    }
}

/// Append-only, mutex-guarded mapping from intrinsic URI to its handler.
/// Handlers are registered at startup (see `genc-intrinsics`) and read
/// freely thereafter by both executor layers.
#[derive(Default)]
pub struct HandlerSet {
    handlers: Mutex<FxHashMap<ArcStr, Handler>>,
}

impl HandlerSet {
    pub fn new() -> Self {
        HandlerSet { handlers: Mutex::new(FxHashMap::default()) }
    }

    /// Registers a handler under `uri`. Returns `InvalidArgument` if the
    /// URI is already taken, so a construction-time registration conflict
    /// surfaces as an error rather than silently shadowing a prior
    /// handler or panicking.
    pub fn register(&self, uri: impl Into<ArcStr>, handler: Handler) -> genc_value::Result<()> {
        let uri = uri.into();
        let mut handlers = self.handlers.lock();
        if handlers.contains_key(&uri) {
            return Err(GencError::invalid_argument(format!(
                "a handler is already registered for intrinsic uri '{uri}'"
            )));
        }
        handlers.insert(uri, handler);
        Ok(())
    }

    pub fn discipline_of(&self, uri: &str) -> genc_value::Result<Discipline> {
        self.handlers
            .lock()
            .get(uri)
            .map(|h| h.discipline())
            .ok_or_else(|| GencError::not_found(format!("no handler registered for uri '{uri}'")))
    }

    pub fn check_well_formed(&self, uri: &str, static_parameter: &Value) -> genc_value::Result<()> {
        let handlers = self.handlers.lock();
        let handler = handlers
            .get(uri)
            .ok_or_else(|| GencError::not_found(format!("no handler registered for uri '{uri}'")))?;
        handler.check_well_formed(static_parameter)
    }

    pub fn inline_handler(&self, uri: &str) -> genc_value::Result<Arc<dyn InlineHandler>> {
        let handlers = self.handlers.lock();
        let handler = handlers
            .get(uri)
            .ok_or_else(|| GencError::not_found(format!("no handler registered for uri '{uri}'")))?;
        handler
            .as_inline()
            .cloned()
            .ok_or_else(|| GencError::new(ErrorKind::Internal, format!("uri '{uri}' is not an inline handler")))
    }

    pub fn control_flow_handler(&self, uri: &str) -> genc_value::Result<Arc<dyn ControlFlowHandler>> {
        let handlers = self.handlers.lock();
        let handler = handlers
            .get(uri)
            .ok_or_else(|| GencError::not_found(format!("no handler registered for uri '{uri}'")))?;
        handler.as_control_flow().cloned().ok_or_else(|| {
            GencError::new(ErrorKind::Internal, format!("uri '{uri}' is not a control-flow handler"))
        })
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.handlers.lock().contains_key(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl InlineHandler for Echo {
        fn check_well_formed(&self, _static_parameter: &Value) -> genc_value::Result<()> {
            Ok(())
        }

        async fn execute(
            &self,
            _static_parameter: &Value,
            argument: Value,
            _ctx: &InlineContext<'_>,
        ) -> genc_value::Result<Value> {
            Ok(argument)
        }
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let set = HandlerSet::new();
        set.register("echo", Handler::Inline(Arc::new(Echo))).unwrap();
        let err = set.register("echo", Handler::Inline(Arc::new(Echo))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn unknown_uri_is_not_found() {
        let set = HandlerSet::new();
        let err = set.discipline_of("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn discipline_matches_registration() {
        let set = HandlerSet::new();
        set.register("echo", Handler::Inline(Arc::new(Echo))).unwrap();
        assert_eq!(set.discipline_of("echo").unwrap(), Discipline::Inline);
    }
}
