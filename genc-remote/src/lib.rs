//! The remote delegation boundary (§4.5): an [`ExecutorRpcTransport`]
//! contract describing the six RPCs a remote executor service exposes, a
//! [`RemoteExecutor`] implementing the same [`genc_runtime::Executor`]
//! contract as the local stack over that transport, and a
//! [`LoopbackTransport`] reference implementation useful for tests and for
//! in-process delegation where no real network hop is needed.
//!
//! Nothing in this crate knows how a transport actually moves bytes —
//! that's left to whatever `ExecutorRpcTransport` impl an embedder wires
//! in (a `tonic` client, an HTTP client, whatever the host's confidential
//! computation fabric speaks).

pub mod loopback;
pub mod remote_executor;
pub mod transport;

pub use loopback::LoopbackTransport;
pub use remote_executor::{RemoteExecutor, RemoteHandle};
pub use transport::ExecutorRpcTransport;
