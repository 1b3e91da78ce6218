// Numan Thabit 2025

use async_trait::async_trait;
use coalesce_wire::{Method, RpcError};
use serde_json::Value;

/// One application service exposing the closed method set.
///
/// Every method defaults to a `method-not-allowed` rejection so a service
/// implements only what it supports. Arguments arrive as raw JSON values;
/// services own their validation.
#[async_trait]
pub trait Service: Send + Sync {
    /// List resources matching `params`.
    async fn find(&self, _params: Value) -> Result<Value, RpcError> {
        Err(method_not_allowed(Method::Find))
    }

    /// Fetch one resource by id.
    async fn get(&self, _id: Value, _params: Value) -> Result<Value, RpcError> {
        Err(method_not_allowed(Method::Get))
    }

    /// Create a resource.
    async fn create(&self, _data: Value, _params: Value) -> Result<Value, RpcError> {
        Err(method_not_allowed(Method::Create))
    }

    /// Replace a resource.
    async fn update(&self, _id: Value, _data: Value, _params: Value) -> Result<Value, RpcError> {
        Err(method_not_allowed(Method::Update))
    }

    /// Partially modify a resource.
    async fn patch(&self, _id: Value, _data: Value, _params: Value) -> Result<Value, RpcError> {
        Err(method_not_allowed(Method::Patch))
    }

    /// Delete a resource.
    async fn remove(&self, _id: Value, _params: Value) -> Result<Value, RpcError> {
        Err(method_not_allowed(Method::Remove))
    }
}

fn method_not_allowed(method: Method) -> RpcError {
    RpcError::method_not_allowed(format!("service does not implement {method}"))
}

fn arity(method: Method) -> usize {
    match method {
        Method::Find => 1,
        Method::Get | Method::Create | Method::Remove => 2,
        Method::Update | Method::Patch => 3,
    }
}

/// Map a tuple's positional args onto the right trait method.
///
/// Missing trailing args become `null`; surplus args fail the call with
/// `bad-request` rather than being dropped silently.
pub async fn dispatch(
    service: &dyn Service,
    method: Method,
    args: &[Value],
) -> Result<Value, RpcError> {
    let arity = arity(method);
    if args.len() > arity {
        return Err(RpcError::bad_request(format!(
            "{method} takes at most {arity} arguments, got {}",
            args.len()
        )));
    }
    let arg = |i: usize| args.get(i).cloned().unwrap_or(Value::Null);
    match method {
        Method::Find => service.find(arg(0)).await,
        Method::Get => service.get(arg(0), arg(1)).await,
        Method::Create => service.create(arg(0), arg(1)).await,
        Method::Update => service.update(arg(0), arg(1), arg(2)).await,
        Method::Patch => service.patch(arg(0), arg(1), arg(2)).await,
        Method::Remove => service.remove(arg(0), arg(1)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coalesce_wire::ErrorKind;
    use serde_json::json;

    struct EchoGet;

    #[async_trait]
    impl Service for EchoGet {
        async fn get(&self, id: Value, params: Value) -> Result<Value, RpcError> {
            Ok(json!({ "id": id, "params": params }))
        }
    }

    #[tokio::test]
    async fn missing_trailing_args_become_null() {
        let value = dispatch(&EchoGet, Method::Get, &[json!(5)]).await.expect("get");
        assert_eq!(value, json!({"id": 5, "params": null}));
    }

    #[tokio::test]
    async fn surplus_args_fail_that_call_only() {
        let err = dispatch(&EchoGet, Method::Get, &[json!(5), json!({}), json!({})])
            .await
            .expect_err("must fail");
        assert_eq!(err.kind, ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn unimplemented_methods_reject_with_method_not_allowed() {
        let err = dispatch(&EchoGet, Method::Remove, &[json!(5)])
            .await
            .expect_err("must fail");
        assert_eq!(err.kind, ErrorKind::MethodNotAllowed);
        assert!(err.message.contains("remove"));
    }
}
