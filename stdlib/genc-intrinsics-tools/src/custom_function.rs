use crate::collaborators::CustomFunction;
use arcstr::ArcStr;
use async_trait::async_trait;
use fxhash::FxHashMap;
use genc_runtime::{InlineContext, InlineHandler};
use genc_value::{GencError, Value};
use std::sync::Arc;

/// `custom_function`: static parameter is a function URI; delegates to a
/// user-supplied function keyed by URI.
pub struct CustomFunctionHandler {
    functions: FxHashMap<ArcStr, Arc<dyn CustomFunction>>,
}

impl CustomFunctionHandler {
    pub fn new(functions: FxHashMap<ArcStr, Arc<dyn CustomFunction>>) -> Self {
        CustomFunctionHandler { functions }
    }
}

#[async_trait]
impl InlineHandler for CustomFunctionHandler {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        static_parameter
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("custom_function static parameter must be a function uri string"))?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Value,
        _ctx: &InlineContext<'_>,
    ) -> genc_value::Result<Value> {
        let uri = static_parameter.as_str().expect("checked well-formed");
        let function = self
            .functions
            .get(uri)
            .cloned()
            .ok_or_else(|| GencError::unimplemented(format!("no custom function registered for uri '{uri}'")))?;
        function.call(argument).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genc_value::ErrorKind;

    struct Double;
    #[async_trait]
    impl CustomFunction for Double {
        async fn call(&self, argument: Value) -> genc_value::Result<Value> {
            match argument {
                Value::Literal(genc_value::Literal::Int32(n)) => Ok(Value::int32(n * 2)),
                _ => Err(GencError::invalid_argument("expected int32")),
            }
        }
    }

    fn ctx() -> InlineContext<'static> {
        InlineContext { scheduler: &genc_runtime::ThreadPerTask }
    }

    #[tokio::test]
    async fn dispatches_by_uri() {
        let mut functions: FxHashMap<ArcStr, Arc<dyn CustomFunction>> = FxHashMap::default();
        functions.insert(ArcStr::from("double"), Arc::new(Double));
        let h = CustomFunctionHandler::new(functions);
        let result = h.execute(&Value::str("double"), Value::int32(21), &ctx()).await.unwrap();
        assert_eq!(result, Value::int32(42));
    }

    #[tokio::test]
    async fn unregistered_uri_is_unimplemented() {
        let h = CustomFunctionHandler::new(FxHashMap::default());
        let err = h.execute(&Value::str("missing"), Value::int32(1), &ctx()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unimplemented);
    }
}
