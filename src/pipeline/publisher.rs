//! Publish slots for cycle results.
//!
//! A publish is a single atomic replace: readers see either the previous
//! result or the new one in full, never a mix.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::watch;

/// Receives each completed cycle's result.
pub trait Publisher<T>: Send + Sync + 'static {
    fn publish(&self, value: T);
}

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn publish(&self, value: T) {
        (**self).publish(value);
    }
}

// ============================================================================
// Snapshot Store (pull)
// ============================================================================

/// Latest-value slot backed by an atomic pointer swap.
#[derive(Debug)]
pub struct SnapshotStore<T> {
    slot: ArcSwapOption<T>,
    publishes: AtomicU64,
}

impl<T> Default for SnapshotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SnapshotStore<T> {
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
            publishes: AtomicU64::new(0),
        }
    }

    /// Most recently published value, if any.
    pub fn load(&self) -> Option<Arc<T>> {
        self.slot.load_full()
    }

    /// Number of publishes since creation.
    pub fn publish_count(&self) -> u64 {
        self.publishes.load(Ordering::Acquire)
    }
}

impl<T: Send + Sync + 'static> Publisher<T> for SnapshotStore<T> {
    fn publish(&self, value: T) {
        self.slot.store(Some(Arc::new(value)));
        self.publishes.fetch_add(1, Ordering::AcqRel);
    }
}

// ============================================================================
// Watch Channel (push)
// ============================================================================

/// Subscribers are woken on every publish; a lagging subscriber only ever
/// sees the newest value.
impl<T: Send + Sync + 'static> Publisher<T> for watch::Sender<Option<Arc<T>>> {
    fn publish(&self, value: T) {
        self.send_replace(Some(Arc::new(value)));
    }
}
