use crate::static_params::{labeled, ordered_functions};
use async_trait::async_trait;
use genc_runtime::{ControlFlowContext, ControlFlowHandler, Executor, ExecutorValue};
use genc_value::{GencError, Literal, Value};

/// Runs a chain of functions against `state` with break-on-boolean
/// semantics: each step's result is checked, and if it materializes to a
/// boolean, the chain stops (`true` or `false` both stop it, per the
/// source behaviour this mirrors) and the *previous* state is returned
/// rather than the boolean itself; any other result becomes the new
/// state and the chain continues. Returns the final state and whether a
/// break occurred, so `repeated_conditional_chain` can propagate it to
/// its own outer loop.
async fn run_breakable_chain(
    functions: &[&Value],
    mut state: ExecutorValue,
    ctx: &ControlFlowContext<'_>,
) -> genc_value::Result<(ExecutorValue, bool)> {
    for f in functions {
        let function = ctx.executor.create_value((*f).clone()).await?;
        let next = ctx.executor.create_call(&function, Some(&state)).await?;
        let materialized = ctx.executor.materialize(&next).await?;
        if matches!(materialized, Value::Literal(Literal::Boolean(_))) {
            return Ok((state, true));
        }
        state = next;
    }
    Ok((state, false))
}

/// `breakable_chain`: applies each function in order; a boolean-shaped
/// intermediate result stops the chain and returns the state from before
/// that step.
pub struct BreakableChain;

#[async_trait]
impl ControlFlowHandler for BreakableChain {
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
        let state = argument.ok_or_else(|| GencError::invalid_argument("breakable_chain requires an initial state argument"))?;
        let functions = ordered_functions(static_parameter)?;
        let (state, _broke) = run_breakable_chain(&functions, state, ctx).await?;
        Ok(state)
    }
}

/// `serial_chain`: applies each function in order unconditionally; no
/// boolean interpretation, no early exit.
pub struct SerialChain;

#[async_trait]
impl ControlFlowHandler for SerialChain {
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
        let mut state = argument.ok_or_else(|| GencError::invalid_argument("serial_chain requires an initial state argument"))?;
        for f in ordered_functions(static_parameter)? {
            let function = ctx.executor.create_value(f.clone()).await?;
            state = ctx.executor.create_call(&function, Some(&state)).await?;
        }
        Ok(state)
    }
}

fn num_steps(static_parameter: &Value) -> genc_value::Result<u32> {
    match labeled(static_parameter, "num_steps")? {
        Value::Literal(Literal::Int32(n)) if *n >= 0 => Ok(*n as u32),
        _ => Err(GencError::invalid_argument(
            "repeated_conditional_chain's 'num_steps' static parameter must be a non-negative int32",
        )),
    }
}

/// `repeated_conditional_chain`: runs up to `num_steps` iterations of the
/// inner `chain`, each with `breakable_chain` semantics; a break inside
/// any iteration also terminates the outer loop.
pub struct RepeatedConditionalChain;

#[async_trait]
impl ControlFlowHandler for RepeatedConditionalChain {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        num_steps(static_parameter)?;
        ordered_functions(labeled(static_parameter, "chain")?)?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Option<ExecutorValue>,
        ctx: &ControlFlowContext<'_>,
    ) -> genc_value::Result<ExecutorValue> {
        let mut state = argument
            .ok_or_else(|| GencError::invalid_argument("repeated_conditional_chain requires an initial state argument"))?;
        let steps = num_steps(static_parameter)?;
        let chain = labeled(static_parameter, "chain")?;
        let functions = ordered_functions(chain)?;
        for _ in 0..steps {
            let (next_state, broke) = run_breakable_chain(&functions, state, ctx).await?;
            state = next_state;
            if broke {
                break;
            }
        }
        Ok(state)
    }
}
