use crate::placeholder::{placeholders, substitute};
use async_trait::async_trait;
use genc_runtime::{InlineContext, InlineHandler};
use genc_value::{GencError, Value};

/// `prompt_template`: static parameter is a template string containing
/// `{name}` placeholders. The argument is either a single string
/// (substituted into the sole placeholder) or a struct of labeled string
/// elements (substituted by label). Undefined placeholders are left
/// as-is.
///
/// A template with more than one placeholder given an unlabeled
/// single-string argument is ambiguous — which placeholder does the
/// string belong to? — and is rejected rather than guessing (see
/// DESIGN.md).
pub struct PromptTemplate;

#[async_trait]
impl InlineHandler for PromptTemplate {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        static_parameter
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("prompt_template static parameter must be a template string"))?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Value,
        _ctx: &InlineContext<'_>,
    ) -> genc_value::Result<Value> {
        let template = static_parameter.as_str().expect("checked well-formed");
        let names = placeholders(template);

        if let Some(s) = argument.as_str() {
            return match names.len() {
                0 => Ok(Value::str(template)),
                1 => Ok(Value::str(substitute(template, |n| (n == names[0]).then(|| s.to_string())))),
                _ => Err(GencError::invalid_argument(format!(
                    "prompt_template has {} placeholders but received an unlabeled single-string argument; \
                     pass a labeled struct instead",
                    names.len()
                ))),
            };
        }

        let fields = argument
            .as_struct()
            .ok_or_else(|| GencError::invalid_argument("prompt_template argument must be a string or a labeled struct"))?;
        let mut values = Vec::with_capacity(fields.len());
        for f in fields {
            let label = f
                .label
                .as_ref()
                .ok_or_else(|| GencError::invalid_argument("prompt_template struct elements must be labeled"))?;
            let s = f
                .value
                .as_str()
                .ok_or_else(|| GencError::invalid_argument(format!("prompt_template element '{label}' must be a string")))?;
            values.push((label.to_string(), s.to_string()));
        }
        Ok(Value::str(substitute(template, |n| {
            values.iter().find(|(label, _)| label == n).map(|(_, v)| v.clone())
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genc_value::StructField;

    fn ctx() -> InlineContext<'static> {
        InlineContext { scheduler: &genc_runtime::ThreadPerTask }
    }

    #[tokio::test]
    async fn single_placeholder_substitutes_unlabeled_string() {
        let h = PromptTemplate;
        let tpl = Value::str("hello {name}");
        let result = h.execute(&tpl, Value::str("world"), &ctx()).await.unwrap();
        assert_eq!(result, Value::str("hello world"));
    }

    #[tokio::test]
    async fn multivariate_template_substitutes_by_label() {
        let h = PromptTemplate;
        let tpl = Value::str("A template in which a foo is {foo} and a bar is {bar}.");
        let arg = Value::struct_of(vec![StructField::labeled("foo", Value::str("XXX")), StructField::labeled("bar", Value::str("YYY"))]);
        let result = h.execute(&tpl, arg, &ctx()).await.unwrap();
        assert_eq!(result, Value::str("A template in which a foo is XXX and a bar is YYY."));
    }

    #[tokio::test]
    async fn multiple_placeholders_with_unlabeled_string_is_invalid_argument() {
        let h = PromptTemplate;
        let tpl = Value::str("{a} and {b}");
        let err = h.execute(&tpl, Value::str("oops"), &ctx()).await.unwrap_err();
        assert_eq!(err.kind(), genc_value::ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn undefined_placeholders_are_left_as_is() {
        let h = PromptTemplate;
        let tpl = Value::str("{known} and {unknown}");
        let arg = Value::struct_of(vec![StructField::labeled("known", Value::str("X"))]);
        let result = h.execute(&tpl, arg, &ctx()).await.unwrap();
        assert_eq!(result, Value::str("X and {unknown}"));
    }
}
