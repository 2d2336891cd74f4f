//! Registration-set internals: the tombstoned slot arena and its mutation
//! protocol.
//!
//! ## Invariants
//!
//! 1. At most one live entry per key; the key index maps every live key to
//!    the occupied slot holding it.
//! 2. The arena is append-only. Removal tombstones a slot, never shifts or
//!    reuses one, so surviving entries keep their positions.
//! 3. Every effective mutation bumps `generation` exactly once; no-ops
//!    (stale updates, repeated removes) leave it untouched.
//! 4. Handles address slots, not keys. A handle whose slot was tombstoned,
//!    whether by removal or by duplicate-key replacement, degrades to a
//!    silent no-op and can never reach another entry.
//! 5. The scheduler is signaled only after the registry cell is released,
//!    so the callback may immediately re-enter the registry.
//! 6. Values displaced from the registry (replaced entries, superseded
//!    payloads, the previous scheduler) also drop only after the cell is
//!    released; payload drops may re-enter the registry.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::component::{ComponentRef, Portal};
use crate::error::RegistryError;
use crate::handle::{Handle, SlotOps};
use crate::key::RequestKey;
use crate::render::Instruction;
use crate::stage::{EntrySummary, Scheduler, StageSummary};

// ---------------------------------------------------------------------------
// 1. Slots and entries
// ---------------------------------------------------------------------------

/// One live render-request.
struct Entry<N> {
    key: RequestKey,
    target: N,
    component: ComponentRef,
    props: Rc<dyn Any>,
}

/// Arena slot: a live entry, or the tombstone left where one used to be.
enum Slot<N> {
    Occupied(Entry<N>),
    Vacant,
}

impl<N> Slot<N> {
    fn as_entry(&self) -> Option<&Entry<N>> {
        match self {
            Slot::Occupied(entry) => Some(entry),
            Slot::Vacant => None,
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Registry state
// ---------------------------------------------------------------------------

struct RegistryInner<N> {
    slots: Vec<Slot<N>>,
    by_key: HashMap<RequestKey, usize>,
    generation: u64,
}

impl<N> RegistryInner<N> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_key: HashMap::new(),
            generation: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Shared core
// ---------------------------------------------------------------------------

/// Single-threaded shared state behind a `Stage` and every scope and handle
/// issued from it.
pub(crate) struct StageCore<N> {
    inner: RefCell<RegistryInner<N>>,
    scheduler: RefCell<Option<Rc<dyn Scheduler>>>,
}

impl<N: Clone + 'static> StageCore<N> {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            inner: RefCell::new(RegistryInner::new()),
            scheduler: RefCell::new(None),
        })
    }

    pub(crate) fn set_scheduler(&self, scheduler: Option<Rc<dyn Scheduler>>) {
        // Swap first so the previous callback drops with the cell released.
        let previous = mem::replace(&mut *self.scheduler.borrow_mut(), scheduler);
        drop(previous);
    }

    /// Clones the scheduler out of its cell before signaling, so the
    /// callback runs with no registry borrow held.
    fn notify(&self) {
        let scheduler = self.scheduler.borrow().clone();
        if let Some(scheduler) = scheduler {
            scheduler.request_render();
        }
    }

    /// Inserts an entry, replacing any live entry under the same key.
    ///
    /// Associated form rather than a method: the handle needs a weak
    /// back-reference, so the caller's `Rc` is part of the input.
    pub(crate) fn register<C: Portal>(
        core: &Rc<Self>,
        key: RequestKey,
        target: N,
        props: C::Props,
    ) -> Handle<C::Props> {
        let component = ComponentRef::of::<C>();
        let (slot, displaced) = {
            let mut inner = core.inner.borrow_mut();
            let displaced = if let Some(previous) = inner.by_key.get(&key).copied() {
                // Tombstone the old slot so its handle goes inert; the new
                // entry gets a fresh slot the stale handle cannot address.
                warn!(%key, previous_slot = previous, "duplicate request key; replacing entry");
                Some(mem::replace(&mut inner.slots[previous], Slot::Vacant))
            } else {
                None
            };
            let slot = inner.slots.len();
            inner.slots.push(Slot::Occupied(Entry {
                key,
                target,
                component,
                props: Rc::new(props),
            }));
            inner.by_key.insert(key, slot);
            inner.generation += 1;
            (slot, displaced)
        };
        debug!(%key, %component, slot, "registered render request");
        // The replaced entry drops only now, with the cell released; its
        // payload may re-enter the registry.
        drop(displaced);
        core.notify();
        let ops = Rc::downgrade(core);
        Handle::new(ops, slot, key)
    }

    /// Owned snapshot of every live entry, in slot order.
    pub(crate) fn instructions(&self) -> Vec<Instruction<N>> {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter_map(Slot::as_entry)
            .map(|entry| {
                Instruction::new(
                    entry.key,
                    entry.target.clone(),
                    entry.component,
                    Rc::clone(&entry.props),
                )
            })
            .collect()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.inner.borrow().generation
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().by_key.len()
    }

    pub(crate) fn contains(&self, key: RequestKey) -> bool {
        self.inner.borrow().by_key.contains_key(&key)
    }

    pub(crate) fn summary(&self) -> StageSummary {
        let inner = self.inner.borrow();
        let entries = inner
            .slots
            .iter()
            .enumerate()
            .filter_map(|(slot, s)| {
                s.as_entry().map(|entry| EntrySummary {
                    key: entry.key,
                    component: entry.component.name().to_string(),
                    slot,
                })
            })
            .collect();
        StageSummary {
            generation: inner.generation,
            live: inner.by_key.len(),
            entries,
        }
    }

    /// Audits the key-index/arena agreement.
    pub(crate) fn self_check(&self) -> Result<(), RegistryError> {
        let inner = self.inner.borrow();
        for (key, &slot) in &inner.by_key {
            match inner.slots.get(slot) {
                Some(Slot::Occupied(entry)) if entry.key == *key => {}
                Some(Slot::Occupied(entry)) => {
                    return Err(RegistryError::Inconsistent(format!(
                        "key {key} indexed to slot {slot} holding key {}",
                        entry.key
                    )));
                }
                _ => {
                    return Err(RegistryError::Inconsistent(format!(
                        "key {key} indexed to vacant slot {slot}"
                    )));
                }
            }
        }
        let live = inner.slots.iter().filter(|s| s.as_entry().is_some()).count();
        if live != inner.by_key.len() {
            return Err(RegistryError::Inconsistent(format!(
                "{live} occupied slots but {} indexed keys",
                inner.by_key.len()
            )));
        }
        Ok(())
    }
}

impl<N: Clone + 'static> SlotOps for StageCore<N> {
    fn update_slot(&self, slot: usize, key: RequestKey, props: Rc<dyn Any>) {
        // The superseded payload drops after the cell is released; its drop
        // may re-enter the registry.
        let displaced = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            match inner.slots.get_mut(slot) {
                Some(Slot::Occupied(entry)) => {
                    let previous = mem::replace(&mut entry.props, props);
                    inner.generation += 1;
                    Some(previous)
                }
                _ => None,
            }
        };
        if displaced.is_some() {
            trace!(%key, slot, "updated props");
            self.notify();
        } else {
            debug!(%key, slot, "stale update ignored; entry no longer live");
        }
    }

    fn remove_slot(&self, slot: usize, key: RequestKey) {
        // The removed entry drops after the cell is released; its payload
        // may re-enter the registry.
        let displaced = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            match inner.slots.get_mut(slot) {
                Some(occupied @ Slot::Occupied(_)) => {
                    let entry = mem::replace(occupied, Slot::Vacant);
                    // The key index may already point at a replacement entry;
                    // only drop it when it still addresses this slot.
                    if inner.by_key.get(&key) == Some(&slot) {
                        inner.by_key.remove(&key);
                    }
                    inner.generation += 1;
                    Some(entry)
                }
                _ => None,
            }
        };
        if displaced.is_some() {
            debug!(%key, slot, "removed render request");
            self.notify();
        } else {
            trace!(%key, slot, "repeated remove ignored");
        }
    }
}
