use crate::collaborators::InferenceFunction;
use crate::static_params::labeled;
use arcstr::ArcStr;
use async_trait::async_trait;
use fxhash::FxHashMap;
use genc_runtime::{InlineContext, InlineHandler};
use genc_value::{GencError, Value};
use std::sync::Arc;

const TEST_MODEL_URI: &str = "test_model";

/// `model_inference` / `model_inference_with_config`: static parameter
/// carries the model URI, either directly (plain `model_inference`) or
/// as a `(model_uri, config)` struct (`model_inference_with_config`);
/// dispatches to a user-supplied inference function keyed by URI.
///
/// The built-in `test_model` URI bypasses the function table entirely
/// and returns a canned deterministic string, so tests exercising the
/// `model_inference` call shape don't need to register a fake backend.
pub struct ModelInference {
    functions: FxHashMap<ArcStr, Arc<dyn InferenceFunction>>,
}

impl ModelInference {
    pub fn new(functions: FxHashMap<ArcStr, Arc<dyn InferenceFunction>>) -> Self {
        ModelInference { functions }
    }
}

fn model_uri_and_config(static_parameter: &Value) -> genc_value::Result<(ArcStr, Option<Value>)> {
    if let Some(uri) = static_parameter.as_str() {
        return Ok((ArcStr::from(uri), None));
    }
    let uri = labeled(static_parameter, "model_uri")?
        .as_str()
        .ok_or_else(|| GencError::invalid_argument("'model_uri' must be a string"))?;
    let config = labeled(static_parameter, "config")?.clone();
    Ok((ArcStr::from(uri), Some(config)))
}

#[async_trait]
impl InlineHandler for ModelInference {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        model_uri_and_config(static_parameter)?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Value,
        _ctx: &InlineContext<'_>,
    ) -> genc_value::Result<Value> {
        let (uri, config) = model_uri_and_config(static_parameter)?;
        if uri.as_str() == TEST_MODEL_URI {
            let prompt = argument.as_str().unwrap_or("");
            return Ok(Value::str(format!("test_model response to: {prompt}")));
        }
        let function = self
            .functions
            .get(uri.as_str())
            .cloned()
            .ok_or_else(|| GencError::unimplemented(format!("no inference function registered for model uri '{uri}'")))?;
        function.infer(config.as_ref(), argument).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genc_value::{ErrorKind, StructField};

    struct Canned(&'static str);
    #[async_trait]
    impl InferenceFunction for Canned {
        async fn infer(&self, _config: Option<&Value>, _argument: Value) -> genc_value::Result<Value> {
            Ok(Value::str(self.0))
        }
    }

    fn ctx() -> InlineContext<'static> {
        InlineContext { scheduler: &genc_runtime::ThreadPerTask }
    }

    #[tokio::test]
    async fn test_model_returns_a_canned_response_without_a_table() {
        let h = ModelInference::new(FxHashMap::default());
        let result = h.execute(&Value::str(TEST_MODEL_URI), Value::str("hi"), &ctx()).await.unwrap();
        assert_eq!(result, Value::str("test_model response to: hi"));
    }

    #[tokio::test]
    async fn dispatches_to_the_registered_function_by_uri() {
        let mut functions: FxHashMap<ArcStr, Arc<dyn InferenceFunction>> = FxHashMap::default();
        functions.insert(ArcStr::from("my-model"), Arc::new(Canned("canned-output")));
        let h = ModelInference::new(functions);
        let result = h.execute(&Value::str("my-model"), Value::str("hi"), &ctx()).await.unwrap();
        assert_eq!(result, Value::str("canned-output"));
    }

    #[tokio::test]
    async fn with_config_passes_through_the_config_struct() {
        let mut functions: FxHashMap<ArcStr, Arc<dyn InferenceFunction>> = FxHashMap::default();
        functions.insert(ArcStr::from("my-model"), Arc::new(Canned("configured-output")));
        let h = ModelInference::new(functions);
        let sp = Value::struct_of(vec![
            StructField::labeled("model_uri", Value::str("my-model")),
            StructField::labeled("config", Value::struct_unlabeled([Value::str("temperature=0")])),
        ]);
        let result = h.execute(&sp, Value::str("hi"), &ctx()).await.unwrap();
        assert_eq!(result, Value::str("configured-output"));
    }

    #[tokio::test]
    async fn unregistered_uri_is_unimplemented() {
        let h = ModelInference::new(FxHashMap::default());
        let err = h.execute(&Value::str("no-such-model"), Value::str("hi"), &ctx()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unimplemented);
    }
}
