use crate::handle::OwnedHandle;
use crate::scope::Scope;
use genc_value::Value;
use triomphe::Arc;

/// The control-flow layer's richer handle to an evaluated (or deferred)
/// value. Unlike the child inline executor's plain `Value` handles, an
/// `ExecutorValue` can also hold an unevaluated lambda or a deferred
/// control-flow intrinsic call together with the scope it closed over.
#[derive(Clone)]
pub enum ExecutorValue {
    /// A value owned by the child inline executor; `Embedded` is the only
    /// variant that actually crosses the inline/control-flow boundary.
    Embedded(Arc<OwnedHandle<Value>>),
    /// An aggregate of further executor values, built directly at the
    /// control-flow layer without embedding each field into the child
    /// until something forces it (e.g. a `Call` or `materialize`).
    Structure(Vec<ExecutorValue>),
    /// An unevaluated lambda together with the scope active when the
    /// `Lambda` node was evaluated. The body is not touched until the
    /// lambda is called.
    Lambda { parameter_name: arcstr::ArcStr, body: Arc<Value>, captured: Scope },
    /// A deferred control-flow-discipline intrinsic call: the `Intrinsic`
    /// node plus its evaluation-site scope, captured but not yet invoked.
    Intrinsic { uri: arcstr::ArcStr, static_parameter: Arc<Value>, captured: Scope },
}

impl ExecutorValue {
    pub fn is_embedded(&self) -> bool {
        matches!(self, ExecutorValue::Embedded(_))
    }

    pub fn is_structure(&self) -> bool {
        matches!(self, ExecutorValue::Structure(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, ExecutorValue::Embedded(_) | ExecutorValue::Lambda { .. } | ExecutorValue::Intrinsic { .. })
    }
}
