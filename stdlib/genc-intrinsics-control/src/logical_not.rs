use async_trait::async_trait;
use genc_runtime::{InlineContext, InlineHandler};
use genc_value::{GencError, Value};

/// `logical_not`: negates a boolean argument. No static parameter.
pub struct LogicalNot;

#[async_trait]
impl InlineHandler for LogicalNot {
    fn check_well_formed(&self, _static_parameter: &Value) -> genc_value::Result<()> {
        Ok(())
    }

    async fn execute(
        &self,
        _static_parameter: &Value,
        argument: Value,
        _ctx: &InlineContext<'_>,
    ) -> genc_value::Result<Value> {
        let b = argument
            .as_boolean()
            .ok_or_else(|| GencError::invalid_argument("logical_not argument must be a boolean"))?;
        Ok(Value::boolean(!b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn negates_true_and_false() {
        let h = LogicalNot;
        let ctx = InlineContext { scheduler: &genc_runtime::ThreadPerTask };
        assert_eq!(h.execute(&Value::struct_unlabeled([]), Value::boolean(true), &ctx).await.unwrap(), Value::boolean(false));
        assert_eq!(h.execute(&Value::struct_unlabeled([]), Value::boolean(false), &ctx).await.unwrap(), Value::boolean(true));
    }

    #[tokio::test]
    async fn non_boolean_is_invalid_argument() {
        let h = LogicalNot;
        let ctx = InlineContext { scheduler: &genc_runtime::ThreadPerTask };
        let err = h.execute(&Value::struct_unlabeled([]), Value::int32(1), &ctx).await.unwrap_err();
        assert_eq!(err.kind(), genc_value::ErrorKind::InvalidArgument);
    }
}
