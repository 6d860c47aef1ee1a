//! Immutable value graph and error taxonomy shared by every executor layer.
//!
//! This crate has no dependency on the executor, concurrency, or intrinsic
//! machinery; it only defines the wire/authoring node type (`Value`) and the
//! structured error type (`GencError`) that flow through them.

mod error;
mod value;

pub use error::{ErrorKind, GencError, Result};
pub use value::{BlockLocal, Literal, StructField, Tensor, Value};
