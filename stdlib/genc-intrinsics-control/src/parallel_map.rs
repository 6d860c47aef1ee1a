use async_trait::async_trait;
use futures::future::join_all;
use genc_runtime::{ControlFlowContext, ControlFlowHandler, Executor, ExecutorValue};
use genc_value::{GencError, Value};

/// `parallel_map`: static parameter is a function; the argument must be a
/// struct. Applies the function to every element; elements may run
/// concurrently (each call is an independent future awaited together via
/// `join_all`), but the result struct always preserves input order
/// regardless of completion order.
pub struct ParallelMap;

#[async_trait]
impl ControlFlowHandler for ParallelMap {
    fn check_well_formed(&self, _static_parameter: &Value) -> genc_value::Result<()> {
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Option<ExecutorValue>,
        ctx: &ControlFlowContext<'_>,
    ) -> genc_value::Result<ExecutorValue> {
        let elements = match argument {
            Some(ExecutorValue::Structure(elements)) => elements,
            Some(_) => return Err(GencError::invalid_argument("parallel_map argument must be a struct")),
            None => return Err(GencError::invalid_argument("parallel_map requires a struct argument")),
        };
        let function = ctx.executor.create_value(static_parameter.clone()).await?;
        let calls = elements.into_iter().map(|element| {
            let function = function.clone();
            async move { ctx.executor.create_call(&function, Some(&element)).await }
        });
        let results = join_all(calls).await;
        let mut out = Vec::with_capacity(results.len());
        for r in results {
            out.push(r?);
        }
        Ok(ExecutorValue::Structure(out))
    }
}
