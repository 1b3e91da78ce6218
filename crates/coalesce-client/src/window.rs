// Numan Thabit 2025
//! Batch windows: collection, deduplication and result fan-out.

use std::sync::Arc;

use coalesce_wire::{CallDescriptor, CallTuple, RpcError, SettledResult};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use crate::dispatch;
use crate::transport::Transport;

/// What one waiter ultimately observes.
pub(crate) type CallOutcome = Result<Value, RpcError>;

/// One canonical descriptor plus every invocation waiting on it.
pub(crate) struct Entry {
    descriptor: CallDescriptor,
    waiters: Vec<oneshot::Sender<CallOutcome>>,
}

/// Ordered, deduplicated entries scoped to one aggregation cycle.
///
/// Lifecycle: OPEN while entries may still merge, FLUSHING once taken for
/// dispatch (frozen), SETTLED after [`Window::settle`] or
/// [`Window::reject_all`] consumed it.
#[derive(Default)]
pub(crate) struct Window {
    entries: Vec<Entry>,
}

impl Window {
    /// Merge a descriptor into the window.
    ///
    /// A structurally equal entry gains a new waiter; otherwise a fresh
    /// entry is appended, preserving first-seen order. Returns the receiver
    /// settled with this invocation's outcome.
    pub(crate) fn merge(&mut self, descriptor: CallDescriptor) -> oneshot::Receiver<CallOutcome> {
        let (tx, rx) = oneshot::channel();
        match self.entries.iter_mut().find(|e| e.descriptor == descriptor) {
            Some(entry) => entry.waiters.push(tx),
            None => self.entries.push(Entry {
                descriptor,
                waiters: vec![tx],
            }),
        }
        rx
    }

    /// One wire tuple per entry, in entry order. Deduplication already
    /// collapsed equivalent calls, so waiter counts do not matter here.
    pub(crate) fn tuples(&self) -> Vec<CallTuple> {
        self.entries
            .iter()
            .map(|e| CallTuple::from(e.descriptor.clone()))
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distribute the order-aligned settled results: every waiter of entry
    /// `i` observes a clone of `results[i]`, in insertion order. Each waiter
    /// is settled exactly once (oneshot semantics).
    pub(crate) fn settle(self, results: Vec<SettledResult>) {
        for (entry, settled) in self.entries.into_iter().zip(results) {
            let outcome = settled.into_outcome();
            for waiter in entry.waiters {
                // A dropped receiver means that caller went away.
                let _ = waiter.send(outcome.clone());
            }
        }
    }

    /// Reject every waiter with the same error. Used when the batch-level
    /// dispatch itself failed and no single call can be blamed.
    pub(crate) fn reject_all(self, error: RpcError) {
        for entry in self.entries {
            for waiter in entry.waiters {
                let _ = waiter.send(Err(error.clone()));
            }
        }
    }
}

/// Collects batchable calls issued within one scheduling tick and flushes
/// them as a single dispatch.
///
/// The first enqueue after a flush (or ever) opens a window and schedules
/// exactly one deferred flush task; every call enqueued synchronously before
/// that task runs joins the same window. On a cooperative current-thread
/// scheduler this makes "issued in the same tick" deterministic.
pub(crate) struct Aggregator {
    transport: Arc<dyn Transport>,
    batch_service: String,
    window: Mutex<Option<Window>>,
}

impl Aggregator {
    pub(crate) fn new(transport: Arc<dyn Transport>, batch_service: String) -> Arc<Self> {
        Arc::new(Self {
            transport,
            batch_service,
            window: Mutex::new(None),
        })
    }

    pub(crate) fn batch_service(&self) -> &str {
        &self.batch_service
    }

    /// Admit a descriptor into the open window, opening one if necessary.
    pub(crate) fn enqueue(self: &Arc<Self>, descriptor: CallDescriptor) -> oneshot::Receiver<CallOutcome> {
        let mut slot = self.window.lock();
        match slot.as_mut() {
            Some(window) => window.merge(descriptor),
            None => {
                let mut window = Window::default();
                let rx = window.merge(descriptor);
                *slot = Some(window);
                debug!(batch_service = %self.batch_service, "batch window opened");
                let aggregator = Arc::clone(self);
                tokio::spawn(async move {
                    // One yield lets every call queued in the current unit
                    // of work enqueue before the window freezes.
                    tokio::task::yield_now().await;
                    aggregator.flush().await;
                });
                rx
            }
        }
    }

    /// Freeze and dispatch the open window.
    ///
    /// The window leaves the shared slot before the first await, so a call
    /// arriving while dispatch is in flight opens the next window and the
    /// two never interleave.
    async fn flush(&self) {
        let window = self.window.lock().take();
        let Some(window) = window else { return };
        let tuples = window.tuples();
        match dispatch::send_batch(self.transport.as_ref(), &self.batch_service, &tuples).await {
            Ok(results) => window.settle(results),
            Err(error) => window.reject_all(error),
        }
    }
}

/// Await a waiter's outcome, mapping a dropped window to a transport-class
/// failure.
pub(crate) async fn recv_outcome(rx: oneshot::Receiver<CallOutcome>) -> CallOutcome {
    match rx.await {
        Ok(outcome) => outcome,
        Err(_) => Err(RpcError::unavailable("batch window dropped before settling")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equivalent_descriptors_share_one_entry() {
        let mut window = Window::default();
        let a = window.merge(CallDescriptor::get("people", json!(1), None));
        let b = window.merge(CallDescriptor::get("people", json!(1), None));
        let c = window.merge(CallDescriptor::get("people", json!(2), None));
        assert_eq!(window.tuples().len(), 2);

        window.settle(vec![
            SettledResult::fulfilled(json!({"id": 1})),
            SettledResult::fulfilled(json!({"id": 2})),
        ]);
        assert_eq!(a.blocking_recv().expect("settled"), Ok(json!({"id": 1})));
        assert_eq!(b.blocking_recv().expect("settled"), Ok(json!({"id": 1})));
        assert_eq!(c.blocking_recv().expect("settled"), Ok(json!({"id": 2})));
    }

    #[test]
    fn tuples_preserve_first_seen_order() {
        let mut window = Window::default();
        let _z = window.merge(CallDescriptor::get("people", json!("z"), None));
        let _a = window.merge(CallDescriptor::get("people", json!("a"), None));
        let _z2 = window.merge(CallDescriptor::get("people", json!("z"), None));
        let encoded = serde_json::to_value(window.tuples()).expect("encode");
        assert_eq!(encoded, json!([["get", "people", "z"], ["get", "people", "a"]]));
    }

    #[test]
    fn reject_all_reaches_every_waiter() {
        let mut window = Window::default();
        let a = window.merge(CallDescriptor::find("people", None));
        let b = window.merge(CallDescriptor::find("messages", None));
        window.reject_all(RpcError::unavailable("connection reset"));
        for rx in [a, b] {
            let outcome = rx.blocking_recv().expect("settled");
            assert_eq!(outcome, Err(RpcError::unavailable("connection reset")));
        }
    }
}
