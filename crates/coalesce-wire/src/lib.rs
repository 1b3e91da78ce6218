// Numan Thabit 2025
#![forbid(unsafe_code)]
#![deny(missing_docs)]
//! coalesce-wire: shared data model for the call batching protocol.
//!
//! Everything that crosses the wire between the batching client and the
//! batch executor lives here: call descriptors and their tuple encoding,
//! settled results, and the structured error taxonomy.

/// Call descriptors and their wire tuple form.
pub mod call;
/// Structured error taxonomy crossing the call boundary.
pub mod error;
/// Per-call settled outcomes.
pub mod settled;

pub use call::{CallDescriptor, CallTuple, Method, UnknownMethod};
pub use error::{ErrorKind, RpcError};
pub use settled::SettledResult;
