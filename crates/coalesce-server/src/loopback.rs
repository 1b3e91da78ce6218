// Numan Thabit 2025

use std::sync::Arc;

use async_trait::async_trait;
use coalesce_client::Transport;
use coalesce_wire::{CallDescriptor, RpcError};
use serde_json::Value;

use crate::registry::ServiceRegistry;
use crate::service;

/// In-process transport that executes calls against a registry.
///
/// Errors cross this "wire" through their serialized JSON form, so the
/// caller reconstructs exactly the taxonomy a remote boundary would carry.
/// Useful for tests and for co-located client/server deployments.
pub struct LoopbackTransport {
    registry: Arc<ServiceRegistry>,
}

impl LoopbackTransport {
    /// Transport over the given registry.
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn call(&self, call: &CallDescriptor) -> Result<Value, RpcError> {
        let target = self.registry.resolve(call.service()).ok_or_else(|| {
            RpcError::not_found(format!("no service registered as '{}'", call.service()))
        })?;
        let outcome = service::dispatch(target.as_ref(), call.method(), call.args()).await;
        round_trip(outcome)
    }
}

fn round_trip(outcome: Result<Value, RpcError>) -> Result<Value, RpcError> {
    let error = match outcome {
        Ok(value) => return Ok(value),
        Err(error) => error,
    };
    let encoded = serde_json::to_value(&error)
        .map_err(|err| RpcError::general_error(format!("unencodable error: {err}")))?;
    let decoded: RpcError = serde_json::from_value(encoded)
        .map_err(|err| RpcError::general_error(format!("undecodable error: {err}")))?;
    Err(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::Service;
    use coalesce_wire::ErrorKind;
    use serde_json::json;

    struct Validator;

    #[async_trait]
    impl Service for Validator {
        async fn create(&self, _data: Value, _params: Value) -> Result<Value, RpcError> {
            Err(RpcError::bad_request("name is invalid")
                .with_data(json!({"attempt": 1}))
                .with_field_errors(json!({"name": "must not be empty"})))
        }
    }

    #[tokio::test]
    async fn errors_survive_the_boundary_verbatim() {
        let registry = Arc::new(ServiceRegistry::new());
        registry.register("people", Arc::new(Validator)).expect("register");
        let transport = LoopbackTransport::new(registry);

        let err = transport
            .call(&CallDescriptor::create("people", json!({}), None))
            .await
            .expect_err("must reject");
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert_eq!(err.code, 400);
        assert_eq!(err.category, "client-error");
        assert_eq!(err.data, Some(json!({"attempt": 1})));
        assert_eq!(err.field_errors, Some(json!({"name": "must not be empty"})));
    }

    #[tokio::test]
    async fn unknown_service_is_not_found() {
        let transport = LoopbackTransport::new(Arc::new(ServiceRegistry::new()));
        let err = transport
            .call(&CallDescriptor::find("missing", None))
            .await
            .expect_err("must reject");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
