use crate::concurrency::ConcurrencyInterface;
use crate::executor::Executor;
use crate::handle::{ExecutorId, OwnedHandle};
use crate::handler::{ControlFlowContext, Discipline, HandlerSet};
use crate::inline_executor::InlineExecutor;
use crate::executor_value::ExecutorValue;
use crate::scope::Scope;
use async_trait::async_trait;
use futures::future::{join_all, try_join, BoxFuture, FutureExt};
use genc_value::{GencError, StructField, Value};
use std::sync::Arc as StdArc;
use triomphe::Arc;

/// Interprets the structural node kinds of the computation graph
/// (`Block`, `Reference`, `Struct`, `Selection`, `Lambda`, `Call`,
/// `Intrinsic`) and forwards everything it doesn't interpret — literals and
/// inline-discipline intrinsic calls — to a child [`InlineExecutor`].
///
/// Owns its own handler set and scheduler rather than reaching for process-
/// wide singletons, so a host can run as many independently configured
/// stacks as it likes.
pub struct ControlFlowExecutor {
    id: ExecutorId,
    child: StdArc<InlineExecutor>,
    handlers: StdArc<HandlerSet>,
    #[allow(dead_code)]
    scheduler: StdArc<dyn ConcurrencyInterface>,
}

impl ControlFlowExecutor {
    pub fn new(handlers: StdArc<HandlerSet>, scheduler: StdArc<dyn ConcurrencyInterface>) -> Self {
        let child = StdArc::new(InlineExecutor::new(handlers.clone(), scheduler.clone()));
        ControlFlowExecutor { id: ExecutorId::fresh(), child, handlers, scheduler }
    }

    pub fn id(&self) -> ExecutorId {
        self.id
    }

    /// The child inline executor this layer delegates leaf work to.
    /// Exposed so collaborators (e.g. the `delegate` intrinsic) can embed a
    /// value directly when they already hold a child-layer handle.
    pub fn child(&self) -> &StdArc<InlineExecutor> {
        &self.child
    }

    /// `Evaluate(value, scope)` from the component design: dispatches on
    /// node kind, descending recursively and delegating anything it does
    /// not interpret to the child inline executor.
    pub fn evaluate<'a>(
        &'a self,
        value: &'a Value,
        scope: &'a Scope,
    ) -> BoxFuture<'a, genc_value::Result<ExecutorValue>> {
        async move {
            match value {
                Value::Literal(lit) => {
                    let h = self.child.create_value(Value::Literal(lit.clone())).await?;
                    Ok(ExecutorValue::Embedded(Arc::new(h)))
                }
                Value::Block { locals, result } => {
                    let mut scope = scope.clone();
                    for local in locals {
                        let v = self
                            .evaluate(&local.value, &scope)
                            .await
                            .map_err(|e| e.annotate(format!("while evaluating local '{}' in block", local.name)))?;
                        scope = scope.bind(local.name.clone(), v);
                    }
                    self.evaluate(result, &scope).await
                }
                Value::Reference(name) => scope.lookup(name).cloned().ok_or_else(|| {
                    GencError::not_found(format!(
                        "reference '{name}' not found while searching scope (bound names innermost-first: {:?})",
                        scope.bound_names()
                    ))
                }),
                Value::Struct(fields) => {
                    let results = join_all(fields.iter().map(|f| self.evaluate(&f.value, scope))).await;
                    let mut out = Vec::with_capacity(results.len());
                    for r in results {
                        out.push(r?);
                    }
                    Ok(ExecutorValue::Structure(out))
                }
                Value::Selection { source, index } => {
                    let src = self.evaluate(source, scope).await?;
                    self.select(src, *index).await
                }
                Value::Lambda { parameter_name, body } => Ok(ExecutorValue::Lambda {
                    parameter_name: parameter_name.clone(),
                    body: body.clone(),
                    captured: scope.clone(),
                }),
                Value::Intrinsic { uri, static_parameter } => match self.handlers.discipline_of(uri)? {
                    Discipline::ControlFlow => Ok(ExecutorValue::Intrinsic {
                        uri: uri.clone(),
                        static_parameter: static_parameter.clone(),
                        captured: scope.clone(),
                    }),
                    Discipline::Inline => {
                        let h = self
                            .child
                            .create_value(Value::Intrinsic { uri: uri.clone(), static_parameter: static_parameter.clone() })
                            .await?;
                        Ok(ExecutorValue::Embedded(Arc::new(h)))
                    }
                },
                Value::Call { function, argument } => {
                    let arg_fut = async {
                        match argument {
                            Some(a) => Ok(Some(self.evaluate(a, scope).await?)),
                            None => Ok(None),
                        }
                    };
                    let (func_v, arg_v) = try_join(self.evaluate(function, scope), arg_fut).await?;
                    self.apply(func_v, arg_v, scope).await
                }
            }
        }
        .boxed()
    }

    async fn select(&self, source: ExecutorValue, index: u32) -> genc_value::Result<ExecutorValue> {
        match source {
            ExecutorValue::Structure(fields) => fields
                .into_iter()
                .nth(index as usize)
                .ok_or_else(|| GencError::invalid_argument(format!("selection index {index} out of range"))),
            ExecutorValue::Embedded(h) => {
                let selected = self.child.create_selection(&h, index).await?;
                Ok(ExecutorValue::Embedded(Arc::new(selected)))
            }
            other => Err(GencError::invalid_argument(format!(
                "selection source must evaluate to a struct, got a {}",
                other.describe()
            ))),
        }
    }

    /// Dispatches a `Call` once both the function and (optional) argument
    /// have been evaluated, by the function's executor-value kind.
    pub fn apply<'a>(
        &'a self,
        function: ExecutorValue,
        argument: Option<ExecutorValue>,
        scope: &'a Scope,
    ) -> BoxFuture<'a, genc_value::Result<ExecutorValue>> {
        async move {
            match function {
                ExecutorValue::Embedded(fh) => {
                    let arg_h = match argument {
                        Some(a) => Some(self.embed(a).await?),
                        None => None,
                    };
                    let result = self.child.create_call(&fh, arg_h.as_ref()).await?;
                    Ok(ExecutorValue::Embedded(Arc::new(result)))
                }
                ExecutorValue::Lambda { parameter_name, body, captured } => {
                    let arg = argument.unwrap_or_else(|| ExecutorValue::Structure(Vec::new()));
                    let call_scope = captured.bind(parameter_name, arg);
                    self.evaluate(&body, &call_scope).await
                }
                ExecutorValue::Intrinsic { uri, static_parameter, captured } => {
                    let handler = self.handlers.control_flow_handler(&uri)?;
                    handler.check_well_formed(&static_parameter)?;
                    let ctx = ControlFlowContext { executor: self, scope: &captured };
                    handler.execute(&static_parameter, argument, &ctx).await
                }
                ExecutorValue::Structure(_) => {
                    let _ = scope;
                    Err(GencError::invalid_argument("cannot call a structure-shaped value; Call.function must be a lambda, embedded function, or intrinsic"))
                }
            }
        }
        .boxed()
    }

    /// Lowers a control-flow-layer value into a handle the child inline
    /// executor can consume. `Embedded` values pass through; `Structure`
    /// recurses field-by-field. Lambdas and deferred intrinsic calls have
    /// no representation the inline executor accepts — none of this
    /// library's inline-discipline handlers take a function-shaped
    /// argument, so reaching this case is an internal error rather than a
    /// silent downgrade (see DESIGN.md).
    fn embed<'a>(&'a self, value: ExecutorValue) -> BoxFuture<'a, genc_value::Result<OwnedHandle<Value>>> {
        async move {
            match value {
                ExecutorValue::Embedded(h) => Ok(h.clone_handle()),
                ExecutorValue::Structure(fields) => {
                    let mut handles = Vec::with_capacity(fields.len());
                    for f in fields {
                        handles.push(self.embed(f).await?);
                    }
                    self.child.create_struct(&handles).await
                }
                ExecutorValue::Lambda { .. } => Err(GencError::internal(
                    "cannot embed an unevaluated lambda into the inline executor; lambdas are only callable at the control-flow layer",
                )),
                ExecutorValue::Intrinsic { .. } => {
                    Err(GencError::internal("cannot embed a deferred control-flow intrinsic call into the inline executor"))
                }
            }
        }
        .boxed()
    }

    fn serialize<'a>(&'a self, value: &'a ExecutorValue) -> BoxFuture<'a, genc_value::Result<Value>> {
        async move {
            match value {
                ExecutorValue::Embedded(h) => self.child.materialize(h).await,
                ExecutorValue::Structure(fields) => {
                    let mut out = Vec::with_capacity(fields.len());
                    for f in fields {
                        out.push(StructField::unlabeled(self.serialize(f).await?));
                    }
                    Ok(Value::Struct(out))
                }
                ExecutorValue::Lambda { .. } => {
                    Err(GencError::internal("cannot materialize an unevaluated lambda value"))
                }
                ExecutorValue::Intrinsic { .. } => {
                    Err(GencError::internal("cannot materialize a deferred control-flow intrinsic call"))
                }
            }
        }
        .boxed()
    }

    fn release<'a>(&'a self, value: ExecutorValue) -> BoxFuture<'a, ()> {
        async move {
            match value {
                ExecutorValue::Embedded(h) => match Arc::try_unwrap(h) {
                    Ok(owned) => owned.dispose().await,
                    Err(_shared) => { /* other owners remain; they'll dispose on their own drop */ }
                },
                ExecutorValue::Structure(fields) => {
                    for f in fields {
                        self.release(f).await;
                    }
                }
                ExecutorValue::Lambda { .. } | ExecutorValue::Intrinsic { .. } => {}
            }
        }
        .boxed()
    }
}

impl ExecutorValue {
    fn describe(&self) -> &'static str {
        match self {
            ExecutorValue::Embedded(_) => "embedded value",
            ExecutorValue::Structure(_) => "structure",
            ExecutorValue::Lambda { .. } => "lambda",
            ExecutorValue::Intrinsic { .. } => "deferred intrinsic call",
        }
    }
}

#[async_trait]
impl Executor for ControlFlowExecutor {
    type Handle = ExecutorValue;

    async fn create_value(&self, value: Value) -> genc_value::Result<Self::Handle> {
        self.evaluate(&value, &Scope::empty()).await
    }

    async fn create_call(
        &self,
        function: &Self::Handle,
        argument: Option<&Self::Handle>,
    ) -> genc_value::Result<Self::Handle> {
        self.apply(function.clone(), argument.cloned(), &Scope::empty()).await
    }

    async fn create_struct(&self, children: &[Self::Handle]) -> genc_value::Result<Self::Handle> {
        Ok(ExecutorValue::Structure(children.to_vec()))
    }

    async fn create_selection(&self, source: &Self::Handle, index: u32) -> genc_value::Result<Self::Handle> {
        self.select(source.clone(), index).await
    }

    async fn materialize(&self, handle: &Self::Handle) -> genc_value::Result<Value> {
        self.serialize(handle).await
    }

    async fn dispose(&self, handle: Self::Handle) {
        self.release(handle).await
    }
}
