// Numan Thabit 2025

use std::sync::Arc;

use async_trait::async_trait;
use coalesce_wire::{CallTuple, RpcError};
use serde::Deserialize;
use serde_json::Value;

use crate::executor::BatchExecutor;
use crate::registry::ServiceRegistry;
use crate::service::Service;

#[derive(Deserialize)]
struct BatchPayload {
    calls: Vec<CallTuple>,
}

/// The batch endpoint: a service whose `create` runs a dispatched batch and
/// answers with the order-aligned settled results.
///
/// Register it in a registry under the name the client configures as
/// `batch_service`.
pub struct BatchService {
    executor: BatchExecutor,
}

impl BatchService {
    /// Batch endpoint executing against the given registry.
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            executor: BatchExecutor::new(registry),
        }
    }
}

#[async_trait]
impl Service for BatchService {
    async fn create(&self, data: Value, _params: Value) -> Result<Value, RpcError> {
        // A payload that does not parse is structural, same as an unknown
        // target service inside it.
        let payload: BatchPayload = serde_json::from_value(data)
            .map_err(|err| RpcError::not_acceptable(format!("malformed batch payload: {err}")))?;
        let settled = self.executor.execute(&payload.calls).await?;
        serde_json::to_value(settled)
            .map_err(|err| RpcError::general_error(format!("unencodable batch result: {err}")))
    }
}
