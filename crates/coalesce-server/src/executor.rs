// Numan Thabit 2025

use std::sync::Arc;

use coalesce_wire::{CallTuple, RpcError, SettledResult};
use futures::future;
use tracing::debug;

use crate::registry::ServiceRegistry;
use crate::service;

/// Runs a dispatched batch: every call independently and concurrently,
/// outcomes collected in input order.
pub struct BatchExecutor {
    registry: Arc<ServiceRegistry>,
}

impl BatchExecutor {
    /// Executor over the given registry.
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// Execute the batch.
    ///
    /// Only a structural problem rejects the batch itself: every target is
    /// resolved before anything runs, so an unknown service fails the whole
    /// dispatch with `not-acceptable` and no side effects. Individual call
    /// failures are recovered into `rejected` settled results and never
    /// cancel or block sibling calls.
    pub async fn execute(&self, calls: &[CallTuple]) -> Result<Vec<SettledResult>, RpcError> {
        let mut planned = Vec::with_capacity(calls.len());
        for call in calls {
            let descriptor = call.descriptor();
            let target = self.registry.resolve(descriptor.service()).ok_or_else(|| {
                RpcError::not_acceptable(format!("unknown service '{}'", descriptor.service()))
            })?;
            planned.push((target, descriptor));
        }

        debug!(calls = calls.len(), "executing batch");
        let settled = future::join_all(planned.into_iter().map(|(target, descriptor)| async move {
            let outcome =
                service::dispatch(target.as_ref(), descriptor.method(), descriptor.args()).await;
            SettledResult::from_outcome(outcome)
        }))
        .await;
        Ok(settled)
    }
}
