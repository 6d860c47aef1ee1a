use arcstr::ArcStr;
use async_trait::async_trait;
use genc_value::Value;

/// The six executor-service RPC methods, one per operation of the executor
/// contract (§4.1/§4.5/§6). Values are referenced by an `id` string
/// carrying a decimal integer that uniquely identifies a value within a
/// session, exactly as the wire contract specifies; the transport itself
/// (bytes on a socket, a `tonic` service, whatever) is the out-of-scope RPC
/// service shell — this trait is the shape the core consumes from it.
#[async_trait]
pub trait ExecutorRpcTransport: Send + Sync {
    async fn create_value(&self, value: Value) -> genc_value::Result<ArcStr>;

    async fn create_call(&self, function: &str, argument: Option<&str>) -> genc_value::Result<ArcStr>;

    async fn create_struct(&self, children: &[ArcStr]) -> genc_value::Result<ArcStr>;

    async fn create_selection(&self, source: &str, index: u32) -> genc_value::Result<ArcStr>;

    async fn materialize(&self, handle: &str) -> genc_value::Result<Value>;

    /// Dispose errors are logged and swallowed by the caller (the handle's
    /// local bookkeeping is gone regardless of whether the RPC lands).
    async fn dispose(&self, handle: &str);
}
