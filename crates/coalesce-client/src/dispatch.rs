// Numan Thabit 2025
//! The single network interaction of a batch window.

use coalesce_wire::{CallDescriptor, CallTuple, Method, RpcError, SettledResult};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::transport::Transport;

/// Serialize the tuples into one `create` against the batch endpoint and
/// decode the order-aligned settled results.
///
/// Any failure here is batch-level: a transport error, an undecodable
/// response, or a response whose length does not match the dispatched batch.
/// None of those can be attributed to a single call, so the caller rejects
/// the whole window with the returned error.
pub(crate) async fn send_batch(
    transport: &dyn Transport,
    batch_service: &str,
    tuples: &[CallTuple],
) -> Result<Vec<SettledResult>, RpcError> {
    debug!(batch_service, calls = tuples.len(), "dispatching batch window");
    let payload = json!({ "calls": tuples });
    let descriptor = CallDescriptor::new(Method::Create, batch_service, vec![payload]);

    let raw = match transport.call(&descriptor).await {
        Ok(raw) => raw,
        Err(error) => {
            warn!(batch_service, %error, "batch dispatch failed");
            return Err(error);
        }
    };
    decode_settled(raw, tuples.len())
}

fn decode_settled(raw: Value, expected: usize) -> Result<Vec<SettledResult>, RpcError> {
    let results: Vec<SettledResult> = serde_json::from_value(raw)
        .map_err(|err| RpcError::unavailable(format!("undecodable batch response: {err}")))?;
    if results.len() != expected {
        return Err(RpcError::unavailable(format!(
            "batch response carries {} results for {} calls",
            results.len(),
            expected
        )));
    }
    Ok(results)
}
