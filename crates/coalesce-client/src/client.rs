// Numan Thabit 2025
//! The three batching integration points and the explicit-scope APIs.

use std::sync::Arc;

use coalesce_wire::{CallDescriptor, RpcError, SettledResult};
use serde_json::Value;

use crate::config::{BatchConfig, ConfigError};
use crate::dispatch;
use crate::transport::{CallOptions, Transport};
use crate::window::{recv_outcome, Aggregator, Window};

/// Full-client integration point: a batching layer over a transport.
///
/// Cheap to clone; clones share the same aggregator, so their calls join the
/// same windows. Independently constructed clients share nothing.
#[derive(Clone)]
pub struct BatchClient {
    transport: Arc<dyn Transport>,
    aggregator: Arc<Aggregator>,
}

impl BatchClient {
    /// Wrap `transport` with batching per `config`.
    ///
    /// Fails fast when `batch_service` is not configured.
    pub fn new(transport: Arc<dyn Transport>, config: BatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let aggregator = Aggregator::new(transport.clone(), config.batch_service);
        Ok(Self {
            transport,
            aggregator,
        })
    }

    /// Handle over one named service exposing the closed method set.
    pub fn service(&self, name: impl Into<String>) -> ServiceHandle {
        ServiceHandle {
            client: self.clone(),
            service: name.into(),
            options: CallOptions::default(),
        }
    }

    /// Issue one call, honouring the per-call opt-out.
    ///
    /// Opted-out calls go straight to the transport before any descriptor is
    /// admitted to a window, so they are invisible to deduplication.
    pub async fn issue(
        &self,
        descriptor: CallDescriptor,
        options: CallOptions,
    ) -> Result<Value, RpcError> {
        if !options.batchable() {
            return self.transport.call(&descriptor).await;
        }
        recv_outcome(self.aggregator.enqueue(descriptor)).await
    }

    /// Run every call recorded inside `scope` as one explicit batch and
    /// return the fulfilled values in call order.
    ///
    /// The first failed call rejects the whole operation with its error.
    pub async fn all<F>(&self, scope: F) -> Result<Vec<Value>, RpcError>
    where
        F: FnOnce(&mut BatchScope),
    {
        let settled = self.all_settled(scope).await?;
        settled.into_iter().map(SettledResult::into_outcome).collect()
    }

    /// Run every call recorded inside `scope` as one explicit batch and
    /// mirror every call's outcome in call order.
    ///
    /// Only a structural or transport failure of the batch itself rejects;
    /// individual call failures surface as `rejected` settled results.
    pub async fn all_settled<F>(&self, scope: F) -> Result<Vec<SettledResult>, RpcError>
    where
        F: FnOnce(&mut BatchScope),
    {
        let mut collector = BatchScope::default();
        scope(&mut collector);

        let mut window = Window::default();
        let receivers: Vec<_> = collector
            .calls
            .into_iter()
            .map(|descriptor| window.merge(descriptor))
            .collect();
        if window.is_empty() {
            return Ok(Vec::new());
        }

        let tuples = window.tuples();
        let results = dispatch::send_batch(
            self.transport.as_ref(),
            self.aggregator.batch_service(),
            &tuples,
        )
        .await?;
        window.settle(results);

        let mut settled = Vec::with_capacity(receivers.len());
        for rx in receivers {
            let outcome = rx
                .await
                .map_err(|_| RpcError::unavailable("batch window dropped before settling"))?;
            settled.push(SettledResult::from_outcome(outcome));
        }
        Ok(settled)
    }
}

/// Call surface for one named service, the method-set integration point.
#[derive(Clone)]
pub struct ServiceHandle {
    client: BatchClient,
    service: String,
    options: CallOptions,
}

impl ServiceHandle {
    /// Install the six-method surface for `service` directly over a
    /// transport. Fails fast when `batch_service` is not configured.
    pub fn install(
        transport: Arc<dyn Transport>,
        config: BatchConfig,
        service: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(BatchClient::new(transport, config)?.service(service))
    }

    /// Copy of this handle whose calls carry the given per-call options.
    pub fn with_options(&self, options: CallOptions) -> Self {
        Self {
            client: self.client.clone(),
            service: self.service.clone(),
            options,
        }
    }

    /// Copy of this handle whose calls bypass batching entirely.
    pub fn unbatched(&self) -> Self {
        self.with_options(CallOptions::no_batch())
    }

    /// `find(params?)`.
    pub async fn find(&self, params: Option<Value>) -> Result<Value, RpcError> {
        self.issue(CallDescriptor::find(&self.service, params)).await
    }

    /// `get(id, params?)`.
    pub async fn get(&self, id: Value, params: Option<Value>) -> Result<Value, RpcError> {
        self.issue(CallDescriptor::get(&self.service, id, params)).await
    }

    /// `create(data, params?)`.
    pub async fn create(&self, data: Value, params: Option<Value>) -> Result<Value, RpcError> {
        self.issue(CallDescriptor::create(&self.service, data, params)).await
    }

    /// `update(id, data, params?)`.
    pub async fn update(
        &self,
        id: Value,
        data: Value,
        params: Option<Value>,
    ) -> Result<Value, RpcError> {
        self.issue(CallDescriptor::update(&self.service, id, data, params)).await
    }

    /// `patch(id, data, params?)`.
    pub async fn patch(
        &self,
        id: Value,
        data: Value,
        params: Option<Value>,
    ) -> Result<Value, RpcError> {
        self.issue(CallDescriptor::patch(&self.service, id, data, params)).await
    }

    /// `remove(id, params?)`.
    pub async fn remove(&self, id: Value, params: Option<Value>) -> Result<Value, RpcError> {
        self.issue(CallDescriptor::remove(&self.service, id, params)).await
    }

    async fn issue(&self, descriptor: CallDescriptor) -> Result<Value, RpcError> {
        self.client.issue(descriptor, self.options).await
    }
}

/// Call-emitting handle passed to the explicit-scope closures.
///
/// Calls are recorded, not sent; outcomes come only from the batch response,
/// in emission order.
#[derive(Default)]
pub struct BatchScope {
    calls: Vec<CallDescriptor>,
}

impl BatchScope {
    /// Record a `find(params?)` call.
    pub fn find(&mut self, service: impl Into<String>, params: Option<Value>) {
        self.calls.push(CallDescriptor::find(service, params));
    }

    /// Record a `get(id, params?)` call.
    pub fn get(&mut self, service: impl Into<String>, id: Value, params: Option<Value>) {
        self.calls.push(CallDescriptor::get(service, id, params));
    }

    /// Record a `create(data, params?)` call.
    pub fn create(&mut self, service: impl Into<String>, data: Value, params: Option<Value>) {
        self.calls.push(CallDescriptor::create(service, data, params));
    }

    /// Record an `update(id, data, params?)` call.
    pub fn update(
        &mut self,
        service: impl Into<String>,
        id: Value,
        data: Value,
        params: Option<Value>,
    ) {
        self.calls.push(CallDescriptor::update(service, id, data, params));
    }

    /// Record a `patch(id, data, params?)` call.
    pub fn patch(
        &mut self,
        service: impl Into<String>,
        id: Value,
        data: Value,
        params: Option<Value>,
    ) {
        self.calls.push(CallDescriptor::patch(service, id, data, params));
    }

    /// Record a `remove(id, params?)` call.
    pub fn remove(&mut self, service: impl Into<String>, id: Value, params: Option<Value>) {
        self.calls.push(CallDescriptor::remove(service, id, params));
    }

    /// Record an arbitrary descriptor.
    pub fn push(&mut self, descriptor: CallDescriptor) {
        self.calls.push(descriptor);
    }
}

/// Call-interception integration point: a [`Transport`] that transparently
/// batches the calls flowing through it.
///
/// Existing transport-consuming code gains batching without API changes.
/// Calls addressed to the batch endpoint itself, and calls carrying the
/// opt-out flag, pass straight through to the inner transport.
pub struct BatchTransport {
    inner: Arc<dyn Transport>,
    aggregator: Arc<Aggregator>,
}

impl BatchTransport {
    /// Intercept `inner` per `config`. Fails fast when `batch_service` is
    /// not configured.
    pub fn new(inner: Arc<dyn Transport>, config: BatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let aggregator = Aggregator::new(inner.clone(), config.batch_service);
        Ok(Self { inner, aggregator })
    }

    /// Route one call, honouring the per-call opt-out.
    pub async fn call_with(
        &self,
        call: &CallDescriptor,
        options: CallOptions,
    ) -> Result<Value, RpcError> {
        if !options.batchable() || call.service() == self.aggregator.batch_service() {
            return self.inner.call(call).await;
        }
        recv_outcome(self.aggregator.enqueue(call.clone())).await
    }
}

#[async_trait::async_trait]
impl Transport for BatchTransport {
    async fn call(&self, call: &CallDescriptor) -> Result<Value, RpcError> {
        self.call_with(call, CallOptions::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MISSING_BATCH_SERVICE;
    use async_trait::async_trait;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn call(&self, _call: &CallDescriptor) -> Result<Value, RpcError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn every_integration_point_fails_setup_without_batch_service() {
        let transport: Arc<dyn Transport> = Arc::new(NullTransport);

        let err = BatchClient::new(transport.clone(), BatchConfig::new(""))
            .err()
            .expect("client setup must fail");
        assert_eq!(err.to_string(), MISSING_BATCH_SERVICE);

        let err = BatchTransport::new(transport.clone(), BatchConfig::new(""))
            .err()
            .expect("hook setup must fail");
        assert_eq!(err.to_string(), MISSING_BATCH_SERVICE);

        let err = ServiceHandle::install(transport, BatchConfig::new(""), "people")
            .err()
            .expect("method-set setup must fail");
        assert_eq!(err.to_string(), MISSING_BATCH_SERVICE);
    }

    #[test]
    fn scope_records_in_emission_order() {
        let mut scope = BatchScope::default();
        scope.get("people", serde_json::json!(1), None);
        scope.find("messages", None);
        assert_eq!(scope.calls.len(), 2);
        assert_eq!(scope.calls[0].service(), "people");
        assert_eq!(scope.calls[1].service(), "messages");
    }
}
