use crate::transport::ExecutorRpcTransport;
use arcstr::ArcStr;
use async_trait::async_trait;
use fxhash::FxHashMap;
use genc_runtime::{ControlFlowExecutor, Executor, ExecutorValue};
use genc_value::{GencError, Value};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A reference [`ExecutorRpcTransport`] that dispatches every RPC to a
/// local [`ControlFlowExecutor`] instead of a real network hop — useful for
/// tests, and for same-process "remote" delegation (e.g. `delegate`
/// running an environment that happens to live in this process) where no
/// actual wire format is needed.
///
/// Maintains its own decimal-string id table exactly as a real server
/// would, so code exercising this transport sees the same id-indirection
/// contract it would against a networked peer.
pub struct LoopbackTransport {
    executor: Arc<ControlFlowExecutor>,
    table: Mutex<FxHashMap<u64, ExecutorValue>>,
    next_id: AtomicU64,
}

impl LoopbackTransport {
    pub fn new(executor: Arc<ControlFlowExecutor>) -> Self {
        LoopbackTransport { executor, table: Mutex::new(FxHashMap::default()), next_id: AtomicU64::new(1) }
    }

    fn insert(&self, value: ExecutorValue) -> ArcStr {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.table.lock().insert(id, value);
        ArcStr::from(id.to_string())
    }

    fn lookup(&self, id: &str) -> genc_value::Result<ExecutorValue> {
        let numeric: u64 =
            id.parse().map_err(|_| GencError::invalid_argument(format!("malformed value id '{id}'")))?;
        self.table
            .lock()
            .get(&numeric)
            .cloned()
            .ok_or_else(|| GencError::not_found(format!("no value registered for id '{id}'")))
    }
}

#[async_trait]
impl ExecutorRpcTransport for LoopbackTransport {
    async fn create_value(&self, value: Value) -> genc_value::Result<ArcStr> {
        let v = self.executor.create_value(value).await?;
        Ok(self.insert(v))
    }

    async fn create_call(&self, function: &str, argument: Option<&str>) -> genc_value::Result<ArcStr> {
        let f = self.lookup(function)?;
        let a = argument.map(|a| self.lookup(a)).transpose()?;
        let result = self.executor.create_call(&f, a.as_ref()).await?;
        Ok(self.insert(result))
    }

    async fn create_struct(&self, children: &[ArcStr]) -> genc_value::Result<ArcStr> {
        let values =
            children.iter().map(|c| self.lookup(c)).collect::<genc_value::Result<Vec<ExecutorValue>>>()?;
        let result = self.executor.create_struct(&values).await?;
        Ok(self.insert(result))
    }

    async fn create_selection(&self, source: &str, index: u32) -> genc_value::Result<ArcStr> {
        let s = self.lookup(source)?;
        let result = self.executor.create_selection(&s, index).await?;
        Ok(self.insert(result))
    }

    async fn materialize(&self, handle: &str) -> genc_value::Result<Value> {
        let v = self.lookup(handle)?;
        self.executor.materialize(&v).await
    }

    async fn dispose(&self, handle: &str) {
        if let Ok(numeric) = handle.parse::<u64>() {
            let removed = self.table.lock().remove(&numeric);
            if let Some(v) = removed {
                self.executor.dispose(v).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote_executor::RemoteExecutor;
    use genc_runtime::{HandlerSet, ThreadPerTask};

    #[tokio::test]
    async fn round_trips_a_literal_through_the_loopback() {
        let _ = env_logger::try_init();
        let local = Arc::new(ControlFlowExecutor::new(Arc::new(HandlerSet::new()), Arc::new(ThreadPerTask)));
        let transport = Arc::new(LoopbackTransport::new(local));
        let remote = RemoteExecutor::new(transport);
        let h = remote.create_value(Value::str("hello")).await.unwrap();
        assert_eq!(remote.materialize(&h).await.unwrap(), Value::str("hello"));
    }

    #[tokio::test]
    async fn struct_and_selection_cross_the_loopback() {
        let local = Arc::new(ControlFlowExecutor::new(Arc::new(HandlerSet::new()), Arc::new(ThreadPerTask)));
        let transport = Arc::new(LoopbackTransport::new(local));
        let remote = RemoteExecutor::new(transport);
        let a = remote.create_value(Value::int32(1)).await.unwrap();
        let b = remote.create_value(Value::int32(2)).await.unwrap();
        let s = remote.create_struct(&[a, b]).await.unwrap();
        let sel = remote.create_selection(&s, 1).await.unwrap();
        assert_eq!(remote.materialize(&sel).await.unwrap(), Value::int32(2));
    }

    #[tokio::test]
    async fn dispose_removes_the_server_side_entry() {
        let local = Arc::new(ControlFlowExecutor::new(Arc::new(HandlerSet::new()), Arc::new(ThreadPerTask)));
        let transport = Arc::new(LoopbackTransport::new(local));
        let remote = RemoteExecutor::new(transport.clone());
        let h = remote.create_value(Value::int32(1)).await.unwrap();
        remote.dispose(h).await;
        assert!(transport.table.lock().is_empty());
    }
}
