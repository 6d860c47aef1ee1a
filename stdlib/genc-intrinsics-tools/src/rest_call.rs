use crate::collaborators::HttpClient;
use crate::static_params::labeled;
use async_trait::async_trait;
use genc_runtime::{InlineContext, InlineHandler};
use genc_value::{GencError, Value};
use std::sync::Arc;

/// `rest_call`: static parameter is `(method, uri, api_key?)`; the
/// argument is the request body. Dispatches through an injected
/// [`HttpClient`]; with none configured, registered but answers
/// `Unimplemented` rather than failing to register at all (so a handler
/// set built without network access still has every URI present).
pub struct RestCall {
    client: Option<Arc<dyn HttpClient>>,
}

impl RestCall {
    pub fn new(client: Option<Arc<dyn HttpClient>>) -> Self {
        RestCall { client }
    }
}

#[async_trait]
impl InlineHandler for RestCall {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        labeled(static_parameter, "method")?
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("rest_call 'method' must be a string"))?;
        labeled(static_parameter, "uri")?
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("rest_call 'uri' must be a string"))?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Value,
        _ctx: &InlineContext<'_>,
    ) -> genc_value::Result<Value> {
        let method = labeled(static_parameter, "method")?.as_str().expect("checked well-formed");
        let uri = labeled(static_parameter, "uri")?.as_str().expect("checked well-formed");
        let api_key = labeled(static_parameter, "api_key").ok().and_then(|v| v.as_str());
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| GencError::unimplemented("rest_call has no http client configured"))?;
        let body = argument.as_str().ok_or_else(|| GencError::invalid_argument("rest_call argument must be a string body"))?;
        let response = match method.to_ascii_uppercase().as_str() {
            "GET" => client.get(uri, api_key).await?,
            "POST" => client.post_json(uri, api_key, body).await?,
            other => return Err(GencError::invalid_argument(format!("unsupported rest_call method '{other}'"))),
        };
        Ok(Value::str(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genc_value::{ErrorKind, StructField};

    struct FakeClient;
    #[async_trait]
    impl HttpClient for FakeClient {
        async fn get(&self, uri: &str, _api_key: Option<&str>) -> genc_value::Result<String> {
            Ok(format!("GET {uri}"))
        }
        async fn post_json(&self, uri: &str, _api_key: Option<&str>, body: &str) -> genc_value::Result<String> {
            Ok(format!("POST {uri} {body}"))
        }
    }

    fn ctx() -> InlineContext<'static> {
        InlineContext { scheduler: &genc_runtime::ThreadPerTask }
    }

    fn static_param(method: &str) -> Value {
        Value::struct_of(vec![
            StructField::labeled("method", Value::str(method)),
            StructField::labeled("uri", Value::str("https://example.test/endpoint")),
        ])
    }

    #[tokio::test]
    async fn posts_the_body_to_the_configured_uri() {
        let h = RestCall::new(Some(Arc::new(FakeClient)));
        let result = h.execute(&static_param("POST"), Value::str("{}"), &ctx()).await.unwrap();
        assert_eq!(result, Value::str("POST https://example.test/endpoint {}"));
    }

    #[tokio::test]
    async fn without_a_client_configured_is_unimplemented() {
        let h = RestCall::new(None);
        let err = h.execute(&static_param("GET"), Value::str(""), &ctx()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unimplemented);
    }
}
