use async_trait::async_trait;
use genc_runtime::{InlineContext, InlineHandler};
use genc_value::{GencError, Value};
use regex::Regex;

/// `regex_partial_match`: static parameter is a pattern string; returns
/// whether it partially matches (searches within, doesn't anchor) the
/// string argument.
pub struct RegexPartialMatch;

#[async_trait]
impl InlineHandler for RegexPartialMatch {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        let pattern = static_parameter
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("regex_partial_match static parameter must be a string pattern"))?;
        Regex::new(pattern)
            .map_err(|e| GencError::invalid_argument(format!("invalid regex pattern '{pattern}': {e}")))?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Value,
        _ctx: &InlineContext<'_>,
    ) -> genc_value::Result<Value> {
        let pattern = static_parameter.as_str().expect("checked well-formed");
        let regex = Regex::new(pattern).expect("checked well-formed");
        let subject = argument
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("regex_partial_match argument must be a string"))?;
        Ok(Value::boolean(regex.is_match(subject)))
    }
}
