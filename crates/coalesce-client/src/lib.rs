// Numan Thabit 2025
#![forbid(unsafe_code)]
//! coalesce-client: transparent call batching over any transport.
//!
//! Calls issued within one scheduling tick are coalesced into a single
//! round trip against a configured batch endpoint, with per-call
//! success/failure semantics preserved exactly as if each call had been
//! made individually. Structurally identical calls in the same window are
//! deduplicated and every original caller still receives its own outcome.
//!
//! Determinism of the implicit window relies on the cooperative
//! single-threaded scheduling model: run the aggregating client on a
//! current-thread runtime.

mod client;
mod config;
mod dispatch;
mod transport;
mod window;

pub use client::{BatchClient, BatchScope, BatchTransport, ServiceHandle};
pub use config::{BatchConfig, ConfigError, MISSING_BATCH_SERVICE};
pub use transport::{CallOptions, Transport};
