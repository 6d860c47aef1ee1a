use crate::collaborators::DelegateRunner;
use crate::static_params::labeled;
use arcstr::ArcStr;
use async_trait::async_trait;
use fxhash::FxHashMap;
use genc_runtime::{ControlFlowContext, ControlFlowHandler, Executor, ExecutorValue};
use genc_value::{GencError, Value};
use std::sync::Arc;

/// `delegate`: static parameter is `(environment_name, computation)`;
/// runs `computation` against the dynamic argument in the named foreign
/// environment, via a runner looked up by name, then re-ingests the
/// produced value back into the local executor.
///
/// Only closed-form computations (no unresolved references) may cross
/// this boundary — scope closures don't survive serialization to a
/// foreign environment, so a computation with free references is
/// rejected up front rather than failing confusingly on the other side.
pub struct Delegate {
    runners: FxHashMap<ArcStr, Arc<dyn DelegateRunner>>,
}

impl Delegate {
    pub fn new(runners: FxHashMap<ArcStr, Arc<dyn DelegateRunner>>) -> Self {
        Delegate { runners }
    }
}

#[async_trait]
impl ControlFlowHandler for Delegate {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        labeled(static_parameter, "environment_name")?
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("delegate 'environment_name' must be a string"))?;
        labeled(static_parameter, "computation")?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Option<ExecutorValue>,
        ctx: &ControlFlowContext<'_>,
    ) -> genc_value::Result<ExecutorValue> {
        let environment = labeled(static_parameter, "environment_name")?.as_str().expect("checked well-formed");
        let computation = labeled(static_parameter, "computation")?.clone();
        let unresolved = computation.unresolved_references();
        if !unresolved.is_empty() {
            return Err(GencError::invalid_argument(format!(
                "delegate computation has unresolved references crossing the environment boundary: {unresolved:?}"
            )));
        }
        let runner = self
            .runners
            .get(environment)
            .cloned()
            .ok_or_else(|| GencError::not_found(format!("no delegate runner registered for environment '{environment}'")))?;
        let materialized_argument = match argument {
            Some(a) => Some(ctx.executor.materialize(&a).await?),
            None => None,
        };
        let produced = runner.run(computation, materialized_argument).await?;
        ctx.executor.create_value(produced).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genc_runtime::{ControlFlowExecutor, Handler, HandlerSet, ThreadPerTask};
    use genc_value::{ErrorKind, StructField};

    struct Uppercase;
    #[async_trait]
    impl DelegateRunner for Uppercase {
        async fn run(&self, _computation: Value, argument: Option<Value>) -> genc_value::Result<Value> {
            let s = argument.and_then(|a| a.as_str().map(str::to_string)).unwrap_or_default();
            Ok(Value::str(s.to_uppercase()))
        }
    }

    fn stack_with_runner() -> ControlFlowExecutor {
        let mut runners: FxHashMap<ArcStr, Arc<dyn DelegateRunner>> = FxHashMap::default();
        runners.insert(ArcStr::from("sandbox"), Arc::new(Uppercase));
        let handlers = HandlerSet::new();
        handlers.register("delegate", Handler::ControlFlow(Arc::new(Delegate::new(runners)))).unwrap();
        ControlFlowExecutor::new(Arc::new(handlers), Arc::new(ThreadPerTask))
    }

    #[tokio::test]
    async fn runs_in_the_named_environment_and_reingests_the_result() {
        let exec = stack_with_runner();
        let f = exec
            .create_value(Value::intrinsic(
                "delegate",
                Value::struct_of(vec![
                    StructField::labeled("environment_name", Value::str("sandbox")),
                    StructField::labeled("computation", Value::str("unused-by-this-test-runner")),
                ]),
            ))
            .await
            .unwrap();
        let arg = exec.create_value(Value::str("hello")).await.unwrap();
        let result = exec.create_call(&f, Some(&arg)).await.unwrap();
        assert_eq!(exec.materialize(&result).await.unwrap(), Value::str("HELLO"));
    }

    #[tokio::test]
    async fn open_computation_is_rejected_before_crossing() {
        let exec = stack_with_runner();
        let f = exec
            .create_value(Value::intrinsic(
                "delegate",
                Value::struct_of(vec![
                    StructField::labeled("environment_name", Value::str("sandbox")),
                    StructField::labeled("computation", Value::reference("not_bound_anywhere")),
                ]),
            ))
            .await
            .unwrap();
        let arg = exec.create_value(Value::str("hello")).await.unwrap();
        let err = exec.create_call(&f, Some(&arg)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn unknown_environment_is_not_found() {
        let exec = stack_with_runner();
        let f = exec
            .create_value(Value::intrinsic(
                "delegate",
                Value::struct_of(vec![
                    StructField::labeled("environment_name", Value::str("no-such-env")),
                    StructField::labeled("computation", Value::str("x")),
                ]),
            ))
            .await
            .unwrap();
        let arg = exec.create_value(Value::str("hello")).await.unwrap();
        let err = exec.create_call(&f, Some(&arg)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
