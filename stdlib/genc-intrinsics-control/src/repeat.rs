use crate::static_params::labeled;
use async_trait::async_trait;
use genc_runtime::{ControlFlowContext, ControlFlowHandler, Executor, ExecutorValue};
use genc_value::{GencError, Literal, Value};

/// `repeat`: `state <- arg`; runs `body_fn` on the state a fixed
/// `num_steps` times, unconditionally (no early exit — that's
/// `breakable_chain`).
pub struct Repeat;

fn num_steps(static_parameter: &Value) -> genc_value::Result<u32> {
    match labeled(static_parameter, "num_steps")? {
        Value::Literal(Literal::Int32(n)) if *n >= 0 => Ok(*n as u32),
        _ => Err(GencError::invalid_argument("repeat's 'num_steps' static parameter must be a non-negative int32")),
    }
}

#[async_trait]
impl ControlFlowHandler for Repeat {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        num_steps(static_parameter)?;
        labeled(static_parameter, "body_fn")?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Option<ExecutorValue>,
        ctx: &ControlFlowContext<'_>,
    ) -> genc_value::Result<ExecutorValue> {
        let mut state = argument.ok_or_else(|| GencError::invalid_argument("repeat requires an initial state argument"))?;
        let steps = num_steps(static_parameter)?;
        let body = ctx.executor.create_value(labeled(static_parameter, "body_fn")?.clone()).await?;
        for _ in 0..steps {
            state = ctx.executor.create_call(&body, Some(&state)).await?;
        }
        Ok(state)
    }
}
