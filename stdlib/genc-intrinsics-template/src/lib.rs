//! Prompt-templating intrinsics: `{name}`-placeholder substitution (plain
//! and parameterized) and a richer Handlebars-backed engine for
//! templates needing loops and conditionals. All three are inline —
//! pure string-in, string-out transforms with no need to re-enter the
//! executor.

mod inja_template;
mod placeholder;
mod prompt_template;
mod prompt_template_with_parameters;

pub use inja_template::InjaTemplate;
pub use prompt_template::PromptTemplate;
pub use prompt_template_with_parameters::PromptTemplateWithParameters;

use genc_runtime::{Handler, HandlerSet};
use std::sync::Arc;

pub fn register(handlers: &HandlerSet) -> genc_value::Result<()> {
    handlers.register("prompt_template", Handler::Inline(Arc::new(PromptTemplate)))?;
    handlers.register("prompt_template_with_parameters", Handler::Inline(Arc::new(PromptTemplateWithParameters)))?;
    handlers.register("inja_template", Handler::Inline(Arc::new(InjaTemplate)))?;
    Ok(())
}
