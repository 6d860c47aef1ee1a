use crate::concurrency::GencFuture;
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_EXECUTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Identity tag stamped onto every handle an executor hands out. Checked at
/// the entry point of every operation so a handle from executor A can
/// never be silently accepted by executor B; a mismatch surfaces as
/// `InvalidArgument` rather than undefined behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecutorId(u64);

impl ExecutorId {
    pub fn fresh() -> Self {
        ExecutorId(NEXT_EXECUTOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ExecutorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "executor#{}", self.0)
    }
}

/// An executor's disposal sink, implemented by whatever owns the
/// per-executor handle table. `OwnedHandle::drop` upgrades a weak
/// reference to this trait object and fires a best-effort dispose;
/// failures are logged and discarded (dispose-on-drop is fire-and-forget
/// per the error-handling design).
#[async_trait]
pub trait DisposeSink: Send + Sync {
    async fn dispose(&self, id: u64);
}

/// A handle to a value owned by some executor's internal table, generic
/// over the payload type `T` the handle ultimately resolves to (a `Value`
/// for the inline executor, an `ExecutorValue` for the control-flow
/// executor).
///
/// Dropping an `OwnedHandle` schedules a dispose on its owner
/// (fire-and-forget); calling `dispose()` explicitly awaits it and is
/// idempotent, satisfying the "double-drop is a no-op" testable property.
pub struct OwnedHandle<T: Clone + Send + Sync + 'static> {
    id: u64,
    executor_id: ExecutorId,
    result: GencFuture<T>,
    owner: Weak<dyn DisposeSink>,
    disposed: Arc<AtomicBool>,
}

impl<T: Clone + Send + Sync + 'static> OwnedHandle<T> {
    pub fn new(
        id: u64,
        executor_id: ExecutorId,
        result: GencFuture<T>,
        owner: Weak<dyn DisposeSink>,
    ) -> Self {
        OwnedHandle { id, executor_id, result, owner, disposed: Arc::new(AtomicBool::new(false)) }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn executor_id(&self) -> ExecutorId {
        self.executor_id
    }

    pub fn result(&self) -> &GencFuture<T> {
        &self.result
    }

    /// Explicit, awaitable disposal. Safe to call more than once; only the
    /// first call reaches the owner.
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(owner) = self.owner.upgrade() {
            owner.dispose(self.id).await;
        }
    }

    /// True once this specific handle has had `dispose()` called on it, or
    /// its clone-sibling has (the flag is shared across clones of the same
    /// logical handle produced by `clone_handle`).
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Produces a second handle to the same underlying id that shares this
    /// handle's disposed flag, so disposing either disposes both logically
    /// (used when a value is threaded through multiple operations without
    /// the caller wanting two independent lifetimes).
    pub fn clone_handle(&self) -> Self {
        OwnedHandle {
            id: self.id,
            executor_id: self.executor_id,
            result: self.result.clone(),
            owner: self.owner.clone(),
            disposed: self.disposed.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for OwnedHandle<T> {
    fn drop(&mut self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(owner) = self.owner.upgrade() {
            let id = self.id;
            match tokio::runtime::Handle::try_current() {
                Ok(rt) => {
                    rt.spawn(async move {
                        owner.dispose(id).await;
                    });
                }
                Err(_) => {
                    log::warn!(
                        target: "genc::runtime::handle",
                        "dropping handle {id} outside a tokio runtime; dispose skipped"
                    );
                }
            }
        }
    }
}

impl<T: Clone + Send + Sync + 'static> fmt::Debug for OwnedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedHandle")
            .field("id", &self.id)
            .field("executor_id", &self.executor_id)
            .field("disposed", &self.disposed.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::GencFuture;
    use std::sync::atomic::AtomicUsize;

    struct CountingSink {
        count: AtomicUsize,
    }

    #[async_trait]
    impl DisposeSink for CountingSink {
        async fn dispose(&self, _id: u64) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn explicit_dispose_is_idempotent() {
        let sink = Arc::new(CountingSink { count: AtomicUsize::new(0) });
        let weak: Weak<dyn DisposeSink> = Arc::downgrade(&sink) as Weak<dyn DisposeSink>;
        let handle = OwnedHandle::new(1, ExecutorId::fresh(), GencFuture::ready(()), weak);
        handle.dispose().await;
        handle.dispose().await;
        assert_eq!(sink.count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn drop_after_explicit_dispose_does_not_double_fire() {
        let sink = Arc::new(CountingSink { count: AtomicUsize::new(0) });
        let weak: Weak<dyn DisposeSink> = Arc::downgrade(&sink) as Weak<dyn DisposeSink>;
        let handle = OwnedHandle::new(1, ExecutorId::fresh(), GencFuture::ready(()), weak);
        handle.dispose().await;
        drop(handle);
        tokio::task::yield_now().await;
        assert_eq!(sink.count.load(Ordering::SeqCst), 1);
    }
}
