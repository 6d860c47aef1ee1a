use crate::static_params::ordered_functions;
use async_trait::async_trait;
use genc_runtime::{ControlFlowContext, ControlFlowHandler, Executor, ExecutorValue};
use genc_value::{ErrorKind, GencError, Value};

/// `fallback`: tries each candidate function in listed order against the
/// same dynamic argument, returning the first one that succeeds. If every
/// candidate fails, returns an `Unavailable` error wrapping the last
/// failure (the candidates are *exhausted*, which is a distinct failure
/// mode from any one candidate's own error kind).
pub struct Fallback;

#[async_trait]
impl ControlFlowHandler for Fallback {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        ordered_functions(static_parameter)?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Option<ExecutorValue>,
        ctx: &ControlFlowContext<'_>,
    ) -> genc_value::Result<ExecutorValue> {
        let candidates = ordered_functions(static_parameter)?;
        let mut last_err: Option<GencError> = None;
        for candidate in candidates {
            let function = ctx.executor.create_value(candidate.clone()).await?;
            match ctx.executor.create_call(&function, argument.as_ref()).await {
                Ok(result) => return Ok(result),
                Err(e) => last_err = Some(e),
            }
        }
        let last_err = last_err.expect("ordered_functions rejects an empty list");
        Err(GencError::with_source(
            ErrorKind::Unavailable,
            format!("all fallback candidates failed; last error: {last_err}"),
            last_err,
        ))
    }
}
