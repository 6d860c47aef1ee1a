//! Control-flow intrinsics: branching, looping, chaining, and fan-out
//! over the computation graph. Everything here operates on executor
//! values rather than materialized ones, because each handler needs to
//! re-enter the executor to build or call sub-values (`conditional`
//! never evaluates its unselected branch; `parallel_map` issues one call
//! per element). `logical_not` and `regex_partial_match` are the two
//! exceptions — they're pure value transforms and so run inline.

mod chains;
mod conditional;
mod fallback;
mod logical_not;
mod parallel_map;
mod regex_match;
mod repeat;
mod static_params;
mod while_loop;

pub use chains::{BreakableChain, RepeatedConditionalChain, SerialChain};
pub use conditional::Conditional;
pub use fallback::Fallback;
pub use logical_not::LogicalNot;
pub use parallel_map::ParallelMap;
pub use regex_match::RegexPartialMatch;
pub use repeat::Repeat;
pub use while_loop::While;

use genc_runtime::{Handler, HandlerSet};
use std::sync::Arc;

/// Registers every control-flow intrinsic under its stable URI (§6).
/// Returns an error if any URI collides with one already registered
/// (e.g. a second call against the same handler set).
pub fn register(handlers: &HandlerSet) -> genc_value::Result<()> {
    handlers.register("conditional", Handler::ControlFlow(Arc::new(Conditional)))?;
    handlers.register("fallback", Handler::ControlFlow(Arc::new(Fallback)))?;
    handlers.register("logical_not", Handler::Inline(Arc::new(LogicalNot)))?;
    handlers.register("regex_partial_match", Handler::Inline(Arc::new(RegexPartialMatch)))?;
    handlers.register("while", Handler::ControlFlow(Arc::new(While)))?;
    handlers.register("repeat", Handler::ControlFlow(Arc::new(Repeat)))?;
    handlers.register("breakable_chain", Handler::ControlFlow(Arc::new(BreakableChain)))?;
    handlers.register("serial_chain", Handler::ControlFlow(Arc::new(SerialChain)))?;
    handlers.register("repeated_conditional_chain", Handler::ControlFlow(Arc::new(RepeatedConditionalChain)))?;
    handlers.register("parallel_map", Handler::ControlFlow(Arc::new(ParallelMap)))?;
    Ok(())
}
