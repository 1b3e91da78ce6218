// Numan Thabit 2025

use async_trait::async_trait;
use coalesce_wire::{CallDescriptor, RpcError};
use serde_json::Value;

/// Per-call options recognised by the batching layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Set to `false` to send this call directly, bypassing any batch window.
    pub batch: Option<bool>,
}

impl CallOptions {
    /// Options that keep the call out of every batch window.
    pub fn no_batch() -> Self {
        Self { batch: Some(false) }
    }

    /// Whether the call may join a batch window.
    pub(crate) fn batchable(&self) -> bool {
        self.batch != Some(false)
    }
}

/// Underlying remote-call layer the batching client sits on top of.
///
/// Implementations deliver a single descriptor and surface the structured
/// error raised on the other side. Retry policy, authentication and rate
/// limiting are transport concerns; the batching layer never sees them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one call and return its raw result.
    async fn call(&self, call: &CallDescriptor) -> Result<Value, RpcError>;
}
