use crate::placeholder::substitute;
use async_trait::async_trait;
use genc_runtime::{InlineContext, InlineHandler};
use genc_value::{GencError, Value};

fn labeled<'a>(static_parameter: &'a Value, label: &str) -> genc_value::Result<&'a Value> {
    static_parameter
        .as_struct()
        .and_then(|fields| fields.iter().find(|f| f.label.as_deref() == Some(label)))
        .map(|f| &f.value)
        .ok_or_else(|| {
            GencError::invalid_argument(format!(
                "prompt_template_with_parameters static parameter must be a struct carrying '{label}'"
            ))
        })
}

fn parameter_names(static_parameter: &Value) -> genc_value::Result<Vec<&str>> {
    let fields = labeled(static_parameter, "parameters")?
        .as_struct()
        .ok_or_else(|| GencError::invalid_argument("'parameters' must be a struct of parameter-name strings"))?;
    fields
        .iter()
        .map(|f| f.value.as_str().ok_or_else(|| GencError::invalid_argument("each parameter name must be a string")))
        .collect()
}

/// `prompt_template_with_parameters`: static parameter is a `(template,
/// ordered parameter-name list)` pair; the argument must be a struct of
/// exactly that arity, matched positionally against the parameter names
/// (not by the argument's own labels, which may be absent).
pub struct PromptTemplateWithParameters;

#[async_trait]
impl InlineHandler for PromptTemplateWithParameters {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        labeled(static_parameter, "template")?
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("'template' must be a string"))?;
        parameter_names(static_parameter)?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Value,
        _ctx: &InlineContext<'_>,
    ) -> genc_value::Result<Value> {
        let template = labeled(static_parameter, "template")?.as_str().expect("checked well-formed");
        let names = parameter_names(static_parameter)?;
        let elements = argument
            .as_struct()
            .ok_or_else(|| GencError::invalid_argument("prompt_template_with_parameters argument must be a struct"))?;
        if elements.len() != names.len() {
            return Err(GencError::invalid_argument(format!(
                "prompt_template_with_parameters expected {} arguments, got {}",
                names.len(),
                elements.len()
            )));
        }
        let mut values = Vec::with_capacity(elements.len());
        for (name, field) in names.iter().zip(elements.iter()) {
            let s = field
                .value
                .as_str()
                .ok_or_else(|| GencError::invalid_argument(format!("argument for parameter '{name}' must be a string")))?;
            values.push((*name, s.to_string()));
        }
        Ok(Value::str(substitute(template, |n| values.iter().find(|(name, _)| *name == n).map(|(_, v)| v.clone()))))
    }
}
