// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Registry of in-flight requests keyed by fingerprint
//!
//! Holds at most one cancellation handle per fingerprint. The registry is
//! owned by a client instance; there is no process-wide state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::fingerprint::Fingerprint;

/// Identifies one registration of a fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

/// Fires the cancellation of one in-flight request
#[derive(Debug)]
pub struct CancelHandle {
    tx: oneshot::Sender<Fingerprint>,
}

/// Receiving side of a [`CancelHandle`]
#[derive(Debug)]
pub struct CancelSignal {
    rx: oneshot::Receiver<Fingerprint>,
}

/// Create a connected cancel handle and signal
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = oneshot::channel();
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    /// Cancel the associated request. Consumes the handle, so it fires once.
    pub fn cancel(self, reason: Fingerprint) {
        // The request may already have settled and dropped its signal
        let _ = self.tx.send(reason);
    }
}

impl CancelSignal {
    /// Resolve with the cancellation reason.
    ///
    /// If the handle is dropped without firing, the request is no longer
    /// tracked and this never resolves.
    pub async fn cancelled(self) -> Fingerprint {
        match self.rx.await {
            Ok(reason) => reason,
            Err(_) => std::future::pending().await,
        }
    }
}

struct Slot {
    id: SlotId,
    handle: CancelHandle,
}

/// Fingerprint -> cancellation handle of the request currently in flight
#[derive(Default)]
pub struct PendingRegistry {
    slots: Mutex<HashMap<Fingerprint, Slot>>,
    next_id: AtomicU64,
}

impl PendingRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn next_slot(&self) -> SlotId {
        SlotId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Insert a handle unless the fingerprint is already pending
    pub fn register(&self, fingerprint: Fingerprint, handle: CancelHandle) -> Option<SlotId> {
        let mut slots = self.slots.lock();
        if slots.contains_key(&fingerprint) {
            return None;
        }
        let id = self.next_slot();
        slots.insert(fingerprint, Slot { id, handle });
        Some(id)
    }

    /// Cancel and remove the pending request for a fingerprint.
    ///
    /// Returns false if nothing was pending.
    pub fn supersede(&self, fingerprint: &Fingerprint) -> bool {
        let slot = self.slots.lock().remove(fingerprint);
        match slot {
            Some(slot) => {
                tracing::debug!(fingerprint = %fingerprint, "Cancelling duplicate request");
                slot.handle.cancel(fingerprint.clone());
                true
            }
            None => false,
        }
    }

    /// Remove the entry for a fingerprint without cancelling it
    pub fn release(&self, fingerprint: &Fingerprint) -> bool {
        self.slots.lock().remove(fingerprint).is_some()
    }

    /// Remove the entry only if it still belongs to the given registration
    pub fn release_slot(&self, fingerprint: &Fingerprint, id: SlotId) -> bool {
        let mut slots = self.slots.lock();
        match slots.get(fingerprint) {
            Some(slot) if slot.id == id => {
                slots.remove(fingerprint);
                true
            }
            _ => false,
        }
    }

    /// Supersede any pending request with the same fingerprint, then
    /// register the new handle. Both steps happen under one lock.
    pub fn dispatch(&self, fingerprint: Fingerprint, handle: CancelHandle) -> SlotId {
        let id = self.next_slot();
        let mut slots = self.slots.lock();
        if let Some(previous) = slots.remove(&fingerprint) {
            tracing::debug!(fingerprint = %fingerprint, "Cancelling duplicate request");
            previous.handle.cancel(fingerprint.clone());
        }
        slots.insert(fingerprint, Slot { id, handle });
        id
    }

    /// Cancel every pending request
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<(Fingerprint, Slot)> = self.slots.lock().drain().collect();
        let count = drained.len();
        for (fingerprint, slot) in drained {
            slot.handle.cancel(fingerprint);
        }
        count
    }

    /// Check whether a fingerprint is pending
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.slots.lock().contains_key(fingerprint)
    }

    /// Number of pending fingerprints
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for PendingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRegistry")
            .field("pending", &self.len())
            .finish()
    }
}

/// Releases a registry slot when dropped
pub(crate) struct PendingGuard<'a> {
    registry: &'a PendingRegistry,
    fingerprint: Fingerprint,
    id: SlotId,
}

impl<'a> PendingGuard<'a> {
    pub(crate) fn new(registry: &'a PendingRegistry, fingerprint: Fingerprint, id: SlotId) -> Self {
        Self {
            registry,
            fingerprint,
            id,
        }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.registry.release_slot(&self.fingerprint, self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn fp(url: &str) -> Fingerprint {
        Fingerprint::of(&Method::GET, url, None, None)
    }

    #[test]
    fn test_register_first_writer_wins() {
        let registry = PendingRegistry::new();
        let (first, _first_signal) = cancel_pair();
        let (second, _second_signal) = cancel_pair();

        assert!(registry.register(fp("/a"), first).is_some());
        assert!(registry.register(fp("/a"), second).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_supersede_fires_handle() {
        let registry = PendingRegistry::new();
        let (handle, signal) = cancel_pair();
        registry.register(fp("/a"), handle);

        assert!(registry.supersede(&fp("/a")));
        assert!(!registry.contains(&fp("/a")));
        assert_eq!(signal.cancelled().await, fp("/a"));

        // Absent entry is a no-op
        assert!(!registry.supersede(&fp("/a")));
    }

    #[tokio::test]
    async fn test_release_does_not_cancel() {
        let registry = PendingRegistry::new();
        let (handle, signal) = cancel_pair();
        registry.register(fp("/a"), handle);

        assert!(registry.release(&fp("/a")));
        assert!(registry.is_empty());

        let outcome =
            tokio::time::timeout(std::time::Duration::from_millis(20), signal.cancelled()).await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn test_dispatch_replaces_and_cancels_once() {
        let registry = PendingRegistry::new();
        let (a, a_signal) = cancel_pair();
        let (b, mut b_signal) = cancel_pair();

        let a_id = registry.dispatch(fp("/a"), a);
        let b_id = registry.dispatch(fp("/a"), b);

        assert_ne!(a_id, b_id);
        assert_eq!(registry.len(), 1);
        assert_eq!(a_signal.cancelled().await, fp("/a"));
        assert!(b_signal.rx.try_recv().is_err());

        // The superseded request settling late must not evict its successor
        assert!(!registry.release_slot(&fp("/a"), a_id));
        assert!(registry.contains(&fp("/a")));
        assert!(registry.release_slot(&fp("/a"), b_id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let registry = PendingRegistry::new();
        let (handle, _signal) = cancel_pair();
        let id = registry.dispatch(fp("/a"), handle);
        {
            let _guard = PendingGuard::new(&registry, fp("/a"), id);
            assert!(registry.contains(&fp("/a")));
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let registry = PendingRegistry::new();
        let (a, a_signal) = cancel_pair();
        let (b, b_signal) = cancel_pair();
        registry.register(fp("/a"), a);
        registry.register(fp("/b"), b);

        assert_eq!(registry.cancel_all(), 2);
        assert!(registry.is_empty());
        assert_eq!(a_signal.cancelled().await, fp("/a"));
        assert_eq!(b_signal.cancelled().await, fp("/b"));
    }
}
