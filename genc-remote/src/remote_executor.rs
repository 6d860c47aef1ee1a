use crate::transport::ExecutorRpcTransport;
use arcstr::ArcStr;
use async_trait::async_trait;
use genc_runtime::{Executor, GencFuture};
use genc_value::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Implements the executor contract over a remote RPC (§4.5). Every
/// operation dispatches exactly one RPC against the injected
/// [`ExecutorRpcTransport`]; pipelining is explicit — `create_call` awaits
/// both the function's and the argument's id futures before issuing the
/// call RPC, so independent requests built concurrently don't serialize on
/// each other.
pub struct RemoteExecutor<T: ExecutorRpcTransport + 'static> {
    transport: Arc<T>,
}

impl<T: ExecutorRpcTransport + 'static> RemoteExecutor<T> {
    pub fn new(transport: Arc<T>) -> Self {
        RemoteExecutor { transport }
    }

    fn wrap(&self, id: GencFuture<ArcStr>) -> RemoteHandle<T> {
        RemoteHandle { id, transport: Arc::downgrade(&self.transport), disposed: Arc::new(AtomicBool::new(false)) }
    }
}

/// A handle to a value owned by the remote peer, identified by a
/// server-assigned decimal-string id. The id itself may still be pending
/// (e.g. while a prior `create_call` RPC for it is in flight); handles
/// capture a [`GencFuture`] over the id rather than the id itself so they
/// can be passed into a later operation before they resolve.
pub struct RemoteHandle<T: ExecutorRpcTransport + 'static> {
    id: GencFuture<ArcStr>,
    transport: Weak<T>,
    disposed: Arc<AtomicBool>,
}

impl<T: ExecutorRpcTransport + 'static> RemoteHandle<T> {
    /// Explicit, awaitable disposal; idempotent, matching the inline/
    /// control-flow handles' contract.
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(transport) = self.transport.upgrade() {
            if let Ok(id) = self.id.get().await {
                transport.dispose(&id).await;
            }
        }
    }

    fn clone_handle(&self) -> Self {
        RemoteHandle { id: self.id.clone(), transport: self.transport.clone(), disposed: self.disposed.clone() }
    }
}

impl<T: ExecutorRpcTransport + 'static> Drop for RemoteHandle<T> {
    fn drop(&mut self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(transport) = self.transport.upgrade() {
            let id = self.id.clone();
            match tokio::runtime::Handle::try_current() {
                Ok(rt) => {
                    rt.spawn(async move {
                        if let Ok(id) = id.get().await {
                            transport.dispose(&id).await;
                        }
                    });
                }
                Err(_) => {
                    log::warn!(
                        target: "genc::remote::remote_executor",
                        "dropping remote handle outside a tokio runtime; dispose RPC skipped"
                    );
                }
            }
        }
    }
}

impl<T: ExecutorRpcTransport + 'static> fmt::Debug for RemoteHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteHandle").field("disposed", &self.disposed.load(Ordering::SeqCst)).finish()
    }
}

#[async_trait]
impl<T: ExecutorRpcTransport + 'static> Executor for RemoteExecutor<T> {
    type Handle = RemoteHandle<T>;

    async fn create_value(&self, value: Value) -> genc_value::Result<Self::Handle> {
        let transport = self.transport.clone();
        let fut = GencFuture::from_future(async move { transport.create_value(value).await });
        Ok(self.wrap(fut))
    }

    async fn create_call(
        &self,
        function: &Self::Handle,
        argument: Option<&Self::Handle>,
    ) -> genc_value::Result<Self::Handle> {
        let transport = self.transport.clone();
        let function_id = function.id.clone();
        let argument_id = argument.map(|a| a.id.clone());
        let fut = GencFuture::from_future(async move {
            let f = function_id.get_owned().await?;
            let a = match argument_id {
                Some(fut) => Some(fut.get_owned().await?),
                None => None,
            };
            transport.create_call(&f, a.as_deref()).await
        });
        Ok(self.wrap(fut))
    }

    async fn create_struct(&self, children: &[Self::Handle]) -> genc_value::Result<Self::Handle> {
        let transport = self.transport.clone();
        let child_ids: Vec<GencFuture<ArcStr>> = children.iter().map(|c| c.id.clone()).collect();
        let fut = GencFuture::from_future(async move {
            let mut ids = Vec::with_capacity(child_ids.len());
            for c in &child_ids {
                ids.push(c.get_owned().await?);
            }
            transport.create_struct(&ids).await
        });
        Ok(self.wrap(fut))
    }

    async fn create_selection(&self, source: &Self::Handle, index: u32) -> genc_value::Result<Self::Handle> {
        let transport = self.transport.clone();
        let source_id = source.id.clone();
        let fut = GencFuture::from_future(async move {
            let s = source_id.get_owned().await?;
            transport.create_selection(&s, index).await
        });
        Ok(self.wrap(fut))
    }

    async fn materialize(&self, handle: &Self::Handle) -> genc_value::Result<Value> {
        let id = handle.id.get_owned().await?;
        self.transport.materialize(&id).await
    }

    async fn dispose(&self, handle: Self::Handle) {
        handle.dispose().await;
    }
}

impl<T: ExecutorRpcTransport + 'static> RemoteHandle<T> {
    /// Produces a second handle sharing this one's disposed flag, used
    /// exactly like `OwnedHandle::clone_handle` when a value needs to be
    /// threaded through more than one downstream operation.
    pub fn share(&self) -> Self {
        self.clone_handle()
    }
}
