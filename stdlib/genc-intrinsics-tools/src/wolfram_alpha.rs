use crate::collaborators::HttpClient;
use async_trait::async_trait;
use genc_runtime::{InlineContext, InlineHandler};
use genc_value::{GencError, Value};
use std::sync::Arc;

/// `wolfram_alpha`: static parameter is the application credential
/// (app id); the argument is the query. Shares the `rest_call` HTTP
/// capability rather than opening its own connection type.
pub struct WolframAlpha {
    client: Option<Arc<dyn HttpClient>>,
}

impl WolframAlpha {
    pub fn new(client: Option<Arc<dyn HttpClient>>) -> Self {
        WolframAlpha { client }
    }
}

fn url_encode(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_string() } else { format!("%{:02X}", c as u32) })
        .collect()
}

#[async_trait]
impl InlineHandler for WolframAlpha {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        static_parameter
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("wolfram_alpha static parameter must be an app id string"))?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Value,
        _ctx: &InlineContext<'_>,
    ) -> genc_value::Result<Value> {
        let app_id = static_parameter.as_str().expect("checked well-formed");
        let query = argument.as_str().ok_or_else(|| GencError::invalid_argument("wolfram_alpha argument must be a string query"))?;
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| GencError::unimplemented("wolfram_alpha has no http client configured"))?;
        let uri = format!("https://api.wolframalpha.com/v1/result?appid={app_id}&i={}", url_encode(query));
        let response = client.get(&uri, None).await?;
        Ok(Value::str(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genc_value::ErrorKind;

    struct FakeClient;
    #[async_trait]
    impl HttpClient for FakeClient {
        async fn get(&self, uri: &str, _api_key: Option<&str>) -> genc_value::Result<String> {
            Ok(format!("answer for {uri}"))
        }
        async fn post_json(&self, _uri: &str, _api_key: Option<&str>, _body: &str) -> genc_value::Result<String> {
            unreachable!("wolfram_alpha only issues GET requests")
        }
    }

    fn ctx() -> InlineContext<'static> {
        InlineContext { scheduler: &genc_runtime::ThreadPerTask }
    }

    #[tokio::test]
    async fn queries_with_the_configured_app_id() {
        let h = WolframAlpha::new(Some(Arc::new(FakeClient)));
        let result = h.execute(&Value::str("APPID123"), Value::str("2+2"), &ctx()).await.unwrap();
        assert_eq!(result, Value::str("answer for https://api.wolframalpha.com/v1/result?appid=APPID123&i=2%2B2"));
    }

    #[tokio::test]
    async fn without_a_client_configured_is_unimplemented() {
        let h = WolframAlpha::new(None);
        let err = h.execute(&Value::str("APPID123"), Value::str("2+2"), &ctx()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unimplemented);
    }
}
