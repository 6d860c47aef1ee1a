use fxhash::FxHashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use genc_value::GencError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Completion token carrying no result, just pass/fail status.
///
/// A `Waitable` is produced by `ConcurrencyInterface::schedule`; callers
/// `.wait().await` it to block until the scheduled callback has run.
#[derive(Clone)]
pub struct Waitable {
    inner: Shared<BoxFuture<'static, Result<(), Arc<GencError>>>>,
}

impl Waitable {
    pub fn wait(&self) -> impl std::future::Future<Output = Result<(), Arc<GencError>>> + 'static {
        self.inner.clone()
    }

    pub fn wait_blocking(&self) -> Result<(), Arc<GencError>> {
        futures::executor::block_on(self.inner.clone())
    }
}

/// Completion token carrying a typed result. Built on a `Shared` boxed
/// future so that multiple callers may `get()` the same outcome, and so
/// that pipelining (passing a not-yet-completed `GencFuture` into a later
/// operation) is just cloning the handle.
pub struct GencFuture<T: Clone + Send + Sync + 'static> {
    inner: Shared<BoxFuture<'static, Result<T, Arc<GencError>>>>,
}

impl<T: Clone + Send + Sync + 'static> Clone for GencFuture<T> {
    fn clone(&self) -> Self {
        GencFuture { inner: self.inner.clone() }
    }
}

impl<T: Clone + Send + Sync + 'static> GencFuture<T> {
    pub fn from_future(
        fut: impl std::future::Future<Output = Result<T, GencError>> + Send + 'static,
    ) -> Self {
        let boxed: BoxFuture<'static, Result<T, Arc<GencError>>> =
            async move { fut.await.map_err(Arc::new) }.boxed();
        GencFuture { inner: boxed.shared() }
    }

    pub fn ready(value: T) -> Self {
        Self::from_future(async move { Ok(value) })
    }

    pub fn failed(err: GencError) -> Self {
        Self::from_future(async move { Err(err) })
    }

    /// Async-native "blocking" wait: suspends the current task until the
    /// scheduled work completes.
    pub async fn get(&self) -> Result<T, Arc<GencError>> {
        self.inner.clone().await
    }

    /// Synchronous convenience for non-async call sites (e.g. FFI-adjacent
    /// glue or plain `#[test]`s); drives the shared future on the calling
    /// thread via `futures::executor::block_on`.
    pub fn get_blocking(&self) -> Result<T, Arc<GencError>> {
        futures::executor::block_on(self.get())
    }

    /// Like `get`, but clones the error out of its shared `Arc` so the
    /// caller can return a plain `GencError` from its own signature.
    pub async fn get_owned(&self) -> Result<T, GencError> {
        self.get().await.map_err(|e| e.duplicate())
    }
}

/// Hint passed to `TokioPoolConcurrency::schedule` distinguishing work that
/// may block the calling thread from already-async handler futures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleHint {
    Blocking,
    Async,
}

/// The single method every scheduling strategy must implement: accept a
/// no-argument callback, run it somewhere, and return a `Waitable` that
/// completes when it's done.
pub trait ConcurrencyInterface: Send + Sync {
    fn schedule(
        &self,
        hint: ScheduleHint,
        task: Box<dyn FnOnce() + Send + 'static>,
    ) -> Waitable;

    /// Schedules an async task directly (default strategies that are
    /// themselves async-hosted, e.g. `TokioPoolConcurrency`, override this
    /// to avoid a thread hop; `ThreadPerTask` falls back to driving the
    /// future to completion on its detached thread).
    fn spawn_future(
        &self,
        fut: BoxFuture<'static, ()>,
    ) -> Waitable {
        self.schedule(ScheduleHint::Async, Box::new(move || {
            futures::executor::block_on(fut);
        }))
    }

    /// Runs `f` via `schedule` and wraps the result in a `GencFuture<T>`.
    fn run_async<T, F>(&self, hint: ScheduleHint, f: F) -> GencFuture<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<T, GencError> + Send + 'static,
    {
        let (tx, rx) = futures::channel::oneshot::channel();
        let waitable = self.schedule(
            hint,
            Box::new(move || {
                let _ = tx.send(f());
            }),
        );
        GencFuture::from_future(async move {
            waitable
                .wait()
                .await
                .map_err(|e| GencError::internal(format!("scheduled task panicked: {e}")))?;
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(GencError::internal("scheduled task dropped its result sender")),
            }
        })
    }
}

/// Default strategy: each `schedule` call detaches a new OS thread.
///
/// Matches the original runtime's default scheduler; appropriate for
/// handler code that performs blocking I/O (HTTP calls, synchronous
/// inference backends) and has no expectation of running inside an
/// existing async runtime.
pub struct ThreadPerTask;

impl ConcurrencyInterface for ThreadPerTask {
    fn schedule(
        &self,
        _hint: ScheduleHint,
        task: Box<dyn FnOnce() + Send + 'static>,
    ) -> Waitable {
        let (tx, rx) = futures::channel::oneshot::channel();
        std::thread::spawn(move || {
            task();
            let _ = tx.send(());
        });
        let fut: BoxFuture<'static, Result<(), Arc<GencError>>> = async move {
            rx.await.map_err(|_| {
                Arc::new(GencError::internal("thread-per-task worker dropped without signalling"))
            })
        }
        .boxed();
        Waitable { inner: fut.shared() }
    }
}

/// An embedding application's own thread pool or event loop, injected as a
/// plain closure. Useful when the host already manages worker threads and
/// would rather not have this runtime spawn its own.
pub struct HostSupplied<F>
where
    F: Fn(Box<dyn FnOnce() + Send + 'static>) + Send + Sync + 'static,
{
    dispatch: F,
}

impl<F> HostSupplied<F>
where
    F: Fn(Box<dyn FnOnce() + Send + 'static>) + Send + Sync + 'static,
{
    pub fn new(dispatch: F) -> Self {
        HostSupplied { dispatch }
    }
}

impl<F> ConcurrencyInterface for HostSupplied<F>
where
    F: Fn(Box<dyn FnOnce() + Send + 'static>) + Send + Sync + 'static,
{
    fn schedule(
        &self,
        _hint: ScheduleHint,
        task: Box<dyn FnOnce() + Send + 'static>,
    ) -> Waitable {
        let (tx, rx) = futures::channel::oneshot::channel();
        let wrapped: Box<dyn FnOnce() + Send + 'static> = Box::new(move || {
            task();
            let _ = tx.send(());
        });
        (self.dispatch)(wrapped);
        let fut: BoxFuture<'static, Result<(), Arc<GencError>>> = async move {
            rx.await.map_err(|_| {
                Arc::new(GencError::internal("host-supplied dispatcher dropped task"))
            })
        }
        .boxed();
        Waitable { inner: fut.shared() }
    }
}

/// Schedules blocking work onto `tokio::task::spawn_blocking` and
/// already-async work onto `tokio::task::spawn`. Chosen by an embedder
/// that already runs inside a tokio runtime (the common case for a host
/// that builds its stack via `GencConfig::build_stack` from within an
/// existing `#[tokio::main]`).
pub struct TokioPoolConcurrency {
    handle: tokio::runtime::Handle,
}

impl TokioPoolConcurrency {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        TokioPoolConcurrency { handle }
    }

    pub fn current() -> Self {
        TokioPoolConcurrency { handle: tokio::runtime::Handle::current() }
    }
}

impl ConcurrencyInterface for TokioPoolConcurrency {
    fn schedule(
        &self,
        hint: ScheduleHint,
        task: Box<dyn FnOnce() + Send + 'static>,
    ) -> Waitable {
        let join = match hint {
            ScheduleHint::Blocking => self.handle.spawn_blocking(task),
            ScheduleHint::Async => self.handle.spawn(async move { task() }),
        };
        let fut: BoxFuture<'static, Result<(), Arc<GencError>>> = async move {
            join.await.map_err(|e| Arc::new(GencError::internal(format!("tokio task failed: {e}"))))
        }
        .boxed();
        Waitable { inner: fut.shared() }
    }

    fn spawn_future(&self, fut: BoxFuture<'static, ()>) -> Waitable {
        let join = self.handle.spawn(fut);
        let fut: BoxFuture<'static, Result<(), Arc<GencError>>> = async move {
            join.await.map_err(|e| Arc::new(GencError::internal(format!("tokio task failed: {e}"))))
        }
        .boxed();
        Waitable { inner: fut.shared() }
    }
}

/// Instruments any base `ConcurrencyInterface` with a counter and a
/// registry of outstanding `Waitable`s so the embedder can block until all
/// scheduled work has drained, e.g. at executor teardown.
pub struct ConcurrencyManagerWithCallbackTracker<C: ConcurrencyInterface> {
    inner: C,
    outstanding: Mutex<FxHashMap<u64, Waitable>>,
    next_id: AtomicU64,
}

impl<C: ConcurrencyInterface> ConcurrencyManagerWithCallbackTracker<C> {
    pub fn new(inner: C) -> Self {
        ConcurrencyManagerWithCallbackTracker {
            inner,
            outstanding: Mutex::new(FxHashMap::default()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.lock().len()
    }

    /// Awaits every task scheduled through this tracker up to the moment
    /// of the call. Tasks scheduled concurrently with this call may or may
    /// not be included; it is meant for teardown, not steady-state sync.
    pub async fn wait_all(&self) {
        let waitables: Vec<Waitable> = self.outstanding.lock().values().cloned().collect();
        for w in waitables {
            let _ = w.wait().await;
        }
    }
}

impl<C: ConcurrencyInterface> ConcurrencyInterface for ConcurrencyManagerWithCallbackTracker<C> {
    fn schedule(
        &self,
        hint: ScheduleHint,
        task: Box<dyn FnOnce() + Send + 'static>,
    ) -> Waitable {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let waitable = self.inner.schedule(hint, task);
        self.outstanding.lock().insert(id, waitable.clone());
        waitable
    }
}

impl fmt::Debug for ScheduleHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleHint::Blocking => write!(f, "Blocking"),
            ScheduleHint::Async => write!(f, "Async"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genc_value::ErrorKind;

    #[tokio::test]
    async fn thread_per_task_runs_and_completes() {
        let conc = ThreadPerTask;
        let fut = conc.run_async(ScheduleHint::Blocking, || Ok::<i32, GencError>(42));
        assert_eq!(fut.get().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn tokio_pool_schedules_async_work() {
        let conc = TokioPoolConcurrency::current();
        let fut = conc.run_async(ScheduleHint::Async, || Ok::<&'static str, GencError>("done"));
        assert_eq!(fut.get().await.unwrap(), "done");
    }

    #[tokio::test]
    async fn tracker_counts_outstanding_tasks() {
        let tracker = ConcurrencyManagerWithCallbackTracker::new(ThreadPerTask);
        let fut = tracker.run_async(ScheduleHint::Blocking, || Ok::<(), GencError>(()));
        fut.get().await.unwrap();
        tracker.wait_all().await;
        assert_eq!(tracker.outstanding_count(), 1);
    }

    #[tokio::test]
    async fn future_propagates_error() {
        let conc = ThreadPerTask;
        let fut: GencFuture<i32> =
            conc.run_async(ScheduleHint::Blocking, || Err(GencError::invalid_argument("bad")));
        let err = fut.get().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
