// Numan Thabit 2025
#![forbid(unsafe_code)]
//! coalesce-server: settled batch execution against registered services.
//!
//! The batch endpoint receives an ordered list of call tuples, runs each
//! one independently and concurrently, and answers with an order-aligned
//! settled-result array that never fails because an individual call did.

/// The batch endpoint service.
pub mod batch;
/// Order-preserving concurrent batch execution.
pub mod executor;
/// In-process transport over a registry.
pub mod loopback;
/// Validated name-to-handler lookup.
pub mod registry;
/// The closed service method set.
pub mod service;

pub use batch::BatchService;
pub use executor::BatchExecutor;
pub use loopback::LoopbackTransport;
pub use registry::{RegistryError, ServiceRegistry};
pub use service::{dispatch, Service};
