use async_trait::async_trait;
use genc_runtime::{InlineContext, InlineHandler};
use genc_value::{GencError, Value};
use handlebars::Handlebars;

/// `inja_template`: a richer template than `prompt_template` — the
/// argument is a JSON string, and the template supports loops and
/// conditionals over it. The original runtime renders these via the
/// `inja` C++ template engine; `handlebars` is this crate's equivalent
/// (both are Jinja-family, `{{ }}`-delimited engines), so templates are
/// written in Handlebars syntax rather than inja's (noted in DESIGN.md).
pub struct InjaTemplate;

#[async_trait]
impl InlineHandler for InjaTemplate {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        static_parameter
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("inja_template static parameter must be a template string"))?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Value,
        _ctx: &InlineContext<'_>,
    ) -> genc_value::Result<Value> {
        let template = static_parameter.as_str().expect("checked well-formed");
        let json = argument
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("inja_template argument must be a JSON string"))?;
        let data: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| GencError::internal(format!("inja_template argument is not valid JSON: {e}")))?;
        let rendered = Handlebars::new()
            .render_template(template, &data)
            .map_err(|e| GencError::internal(format!("inja_template failed to render: {e}")))?;
        Ok(Value::str(rendered))
    }
}
