use async_trait::async_trait;
use genc_value::Value;

/// The contract every executor layer (inline, control-flow, remote)
/// implements. Inputs are handles local to that executor; outputs are
/// owned handles whose drop schedules a dispose. Every operation returns
/// a future internally (via the handle's `GencFuture`) so callers may
/// pipeline by passing not-yet-completed handles into later calls.
#[async_trait]
pub trait Executor: Send + Sync {
    type Handle: Send + Sync;

    async fn create_value(&self, value: Value) -> genc_value::Result<Self::Handle>;

    async fn create_call(
        &self,
        function: &Self::Handle,
        argument: Option<&Self::Handle>,
    ) -> genc_value::Result<Self::Handle>;

    async fn create_struct(&self, children: &[Self::Handle]) -> genc_value::Result<Self::Handle>;

    async fn create_selection(
        &self,
        source: &Self::Handle,
        index: u32,
    ) -> genc_value::Result<Self::Handle>;

    /// Blocks until the handle is ready, then serializes its value back
    /// into a `Value` node. The only operation in the contract that must
    /// actually block on completion; every other operation's failure is
    /// observable only when the caller awaits (or materializes) it.
    async fn materialize(&self, handle: &Self::Handle) -> genc_value::Result<Value>;

    /// Releases a handle explicitly. Idempotent; safe to call concurrently
    /// with operations on other handles of the same executor.
    async fn dispose(&self, handle: Self::Handle);
}
