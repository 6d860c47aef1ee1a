use async_trait::async_trait;
use genc_remote::ExecutorRpcTransport;
use genc_value::Value;
use std::sync::Arc;

/// The HTTP capability `rest_call` and `wolfram_alpha` delegate to. The
/// core ships no concrete implementation (a real one wraps `reqwest`);
/// tests inject an in-memory fake so the suite stays hermetic.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, uri: &str, api_key: Option<&str>) -> genc_value::Result<String>;

    async fn post_json(
        &self,
        uri: &str,
        api_key: Option<&str>,
        body: &str,
    ) -> genc_value::Result<String>;
}

/// A model-inference backend keyed by URI. `config` is the optional
/// struct carried by `model_inference_with_config`'s static parameter;
/// plain `model_inference` calls always pass `None`.
#[async_trait]
pub trait InferenceFunction: Send + Sync {
    async fn infer(&self, config: Option<&Value>, argument: Value) -> genc_value::Result<Value>;
}

/// A user-registered function keyed by URI, invoked by `custom_function`.
#[async_trait]
pub trait CustomFunction: Send + Sync {
    async fn call(&self, argument: Value) -> genc_value::Result<Value>;
}

/// Runs a closed-form computation in a named foreign environment,
/// invoked by `delegate`. Implementations might shell out to another
/// process, another language runtime, or (in this repository's own
/// tests) just another local executor via `genc_remote::LoopbackTransport`.
#[async_trait]
pub trait DelegateRunner: Send + Sync {
    async fn run(&self, computation: Value, argument: Option<Value>) -> genc_value::Result<Value>;
}

/// Opens a channel to a confidential-computing server, returning the RPC
/// transport `confidential_computation` drives. Attestation (verifying
/// `image_digest` against the server's measured boot) is this
/// collaborator's concern, not the core's.
#[async_trait]
pub trait ConfidentialChannelOpener: Send + Sync {
    async fn open(
        &self,
        server_address: &str,
        image_digest: Option<&str>,
    ) -> genc_value::Result<Arc<dyn ExecutorRpcTransport>>;
}

/// Receives every value `logger` passes through, in addition to the
/// `log` facade emission. Lets tests assert on logged values without
/// capturing stdout.
pub trait LogSink: Send + Sync {
    fn record(&self, value: &Value);
}
