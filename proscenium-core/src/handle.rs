//! Per-entry mutation capability.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::key::RequestKey;

/// Slot-addressed operations a handle can reach on its registry.
///
/// Object-safe so handles carry no target-node type parameter; the key is
/// passed alongside the slot purely for log context.
pub(crate) trait SlotOps {
    fn update_slot(&self, slot: usize, key: RequestKey, props: Rc<dyn Any>);
    fn remove_slot(&self, slot: usize, key: RequestKey);
}

/// Capability returned by registration: the only value able to update or
/// remove its entry.
///
/// Deliberately not `Clone`; per-entry exclusivity is what prevents one
/// requester from interfering with another's entry. A handle does not keep
/// its registry alive, and every operation through a dead or stale handle is
/// a silent no-op.
pub struct Handle<P> {
    ops: Weak<dyn SlotOps>,
    slot: usize,
    key: RequestKey,
    _props: PhantomData<fn(P)>,
}

impl<P: 'static> Handle<P> {
    pub(crate) fn new(ops: Weak<dyn SlotOps>, slot: usize, key: RequestKey) -> Self {
        Self {
            ops,
            slot,
            key,
            _props: PhantomData,
        }
    }

    /// Key this handle was issued for.
    pub fn key(&self) -> RequestKey {
        self.key
    }

    /// Replaces the entry's props wholesale. No-op once the entry has been
    /// removed or replaced.
    pub fn update(&self, props: P) {
        match self.ops.upgrade() {
            Some(ops) => ops.update_slot(self.slot, self.key, Rc::new(props)),
            None => trace!(key = %self.key, "update on dropped registry ignored"),
        }
    }

    /// Deletes the entry. Idempotent: repeated calls, and calls racing a
    /// replacement, are no-ops.
    pub fn remove(&self) {
        match self.ops.upgrade() {
            Some(ops) => ops.remove_slot(self.slot, self.key),
            None => trace!(key = %self.key, "remove on dropped registry ignored"),
        }
    }
}

impl<P> fmt::Debug for Handle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("key", &self.key)
            .field("slot", &self.slot)
            .finish()
    }
}
