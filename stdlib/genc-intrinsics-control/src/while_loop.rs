use crate::static_params::labeled;
use async_trait::async_trait;
use genc_runtime::{ControlFlowContext, ControlFlowHandler, Executor, ExecutorValue};
use genc_value::{GencError, Value};

/// `while`: `state <- arg`; while `condition_fn(state)` is `true`,
/// `state <- body_fn(state)`; returns the final state. The condition is
/// evaluated before every iteration, including the first, so a
/// condition that's false on entry never runs the body.
pub struct While;

#[async_trait]
impl ControlFlowHandler for While {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        labeled(static_parameter, "condition_fn")?;
        labeled(static_parameter, "body_fn")?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Option<ExecutorValue>,
        ctx: &ControlFlowContext<'_>,
    ) -> genc_value::Result<ExecutorValue> {
        let mut state = argument.ok_or_else(|| GencError::invalid_argument("while requires an initial state argument"))?;
        let condition = ctx.executor.create_value(labeled(static_parameter, "condition_fn")?.clone()).await?;
        let body = ctx.executor.create_value(labeled(static_parameter, "body_fn")?.clone()).await?;
        loop {
            let test = ctx.executor.create_call(&condition, Some(&state)).await?;
            let materialized = ctx.executor.materialize(&test).await?;
            let should_continue = materialized
                .as_boolean()
                .ok_or_else(|| GencError::invalid_argument("while condition_fn must return a boolean"))?;
            if !should_continue {
                break;
            }
            state = ctx.executor.create_call(&body, Some(&state)).await?;
        }
        Ok(state)
    }
}
