// Numan Thabit 2025

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::service::Service;

/// Registration failures, raised at setup time.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Service names must be non-empty.
    #[error("service name must not be empty")]
    EmptyName,
    /// Each name maps to exactly one handler.
    #[error("service '{0}' is already registered")]
    Duplicate(String),
}

/// Lookup table from service name to handler.
///
/// The mapping is validated when a service is registered, not when a batch
/// references it; an unknown name at execute time is a structural error on
/// the caller's side.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<String, Arc<dyn Service>>>,
}

impl ServiceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` under `name`.
    pub fn register(
        &self,
        name: impl Into<String>,
        service: Arc<dyn Service>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let mut services = self.services.write();
        if services.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        services.insert(name, service);
        Ok(())
    }

    /// Resolve a handler by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.services.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coalesce_wire::RpcError;
    use serde_json::Value;

    struct Stub;

    #[async_trait]
    impl Service for Stub {
        async fn find(&self, _params: Value) -> Result<Value, RpcError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn registration_validates_the_name() {
        let registry = ServiceRegistry::new();
        assert_eq!(registry.register("", Arc::new(Stub)), Err(RegistryError::EmptyName));
        assert_eq!(registry.register("  ", Arc::new(Stub)), Err(RegistryError::EmptyName));

        registry.register("people", Arc::new(Stub)).expect("first registration");
        assert_eq!(
            registry.register("people", Arc::new(Stub)),
            Err(RegistryError::Duplicate("people".to_string()))
        );
    }

    #[test]
    fn resolves_registered_names_only() {
        let registry = ServiceRegistry::new();
        registry.register("people", Arc::new(Stub)).expect("register");
        assert!(registry.resolve("people").is_some());
        assert!(registry.resolve("missing").is_none());
    }
}
