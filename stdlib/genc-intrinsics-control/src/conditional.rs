use crate::static_params::labeled;
use async_trait::async_trait;
use genc_runtime::{ControlFlowContext, ControlFlowHandler, Executor, ExecutorValue};
use genc_value::{GencError, Value};

/// `conditional`: picks between a `then` and an `else` branch carried in
/// the static parameter, based on a boolean argument. Neither branch is
/// evaluated until the decision is made — the static parameter holds
/// unevaluated `Value` nodes, and only the selected one is ever turned
/// into an executor value.
pub struct Conditional;

#[async_trait]
impl ControlFlowHandler for Conditional {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        labeled(static_parameter, "then")?;
        labeled(static_parameter, "else")?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Option<ExecutorValue>,
        ctx: &ControlFlowContext<'_>,
    ) -> genc_value::Result<ExecutorValue> {
        let arg = argument.ok_or_else(|| GencError::invalid_argument("conditional requires a boolean argument"))?;
        let materialized = ctx.executor.materialize(&arg).await?;
        let test = materialized
            .as_boolean()
            .ok_or_else(|| GencError::invalid_argument("conditional argument must evaluate to a boolean"))?;
        let branch = labeled(static_parameter, if test { "then" } else { "else" })?.clone();
        ctx.executor.create_value(branch).await
    }
}
