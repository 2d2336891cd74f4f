//! Proxy lifecycle: the invisible stand-in mounted at a requester's logical
//! tree position.
//!
//! A placeholder walks one way through
//! `Created → AwaitingAttachment → Registered → Removed`:
//!
//! - its key is minted once at creation and never regenerated, however often
//!   props change;
//! - prop updates arriving before registration are retained, not dropped,
//!   and become the registration's initial payload (updates replace
//!   wholesale, so the latest pending payload carries the whole queue's
//!   effect);
//! - teardown removes the registry entry exactly once, whether it runs via
//!   [`Placeholder::detach`], drop, or both.

use std::fmt;
use std::mem;

use tracing::{debug, trace};

use proscenium_core::{Handle, Portal, RequestKey, Scope};

use crate::placement::Placement;

/// Externally observable lifecycle of a [`Placeholder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Instance exists; no placement has been supplied yet.
    Created,
    /// A placement was seen, but no parent attachment was available.
    AwaitingAttachment,
    /// The entry is registered and the handle is live.
    Registered,
    /// Terminal: the entry was removed, or the instance gave up registering.
    Removed,
}

enum State<P> {
    Created { props: P },
    Awaiting { props: P },
    Registered { handle: Handle<P> },
    Removed,
}

/// One mounted proxy instance for the requestable component `C`.
pub struct Placeholder<C: Portal, N> {
    key: RequestKey,
    scope: Scope<N>,
    state: State<C::Props>,
}

impl<C: Portal, N> Placeholder<C, N> {
    pub(crate) fn new(key: RequestKey, scope: Scope<N>, props: C::Props) -> Self {
        trace!(%key, "placeholder created");
        Self {
            key,
            scope,
            state: State::Created { props },
        }
    }

    /// Key assigned at creation; stable for the instance's whole lifetime.
    pub fn key(&self) -> RequestKey {
        self.key
    }

    pub fn state(&self) -> LifecycleState {
        match self.state {
            State::Created { .. } => LifecycleState::Created,
            State::Awaiting { .. } => LifecycleState::AwaitingAttachment,
            State::Registered { .. } => LifecycleState::Registered,
            State::Removed => LifecycleState::Removed,
        }
    }

    /// Forwards a prop change. Before registration the payload is retained;
    /// after removal it is dropped silently.
    pub fn set_props(&mut self, props: C::Props) {
        match &mut self.state {
            State::Created { props: pending } | State::Awaiting { props: pending } => {
                *pending = props;
            }
            State::Registered { handle } => handle.update(props),
            State::Removed => trace!(key = %self.key, "props after removal ignored"),
        }
    }

    /// Tears the instance down, removing the registry entry if one was ever
    /// registered. Idempotent; drop runs the same path.
    pub fn detach(&mut self) {
        match mem::replace(&mut self.state, State::Removed) {
            State::Registered { handle } => {
                handle.remove();
                debug!(key = %self.key, "placeholder removed");
            }
            State::Created { .. } | State::Awaiting { .. } => {
                trace!(key = %self.key, "detached before registration; nothing to remove");
            }
            State::Removed => {}
        }
    }
}

impl<C: Portal, N: Clone + 'static> Placeholder<C, N> {
    /// Supplies the placement point discovered at mount.
    ///
    /// Registration happens here, once a parent attachment exists. With a
    /// detached placement the instance keeps waiting; a later placement may
    /// still attach it. A placement arriving after the stage itself is gone
    /// retires the instance: its entry could never render.
    pub fn attach(&mut self, placement: &Placement<N>) {
        match mem::replace(&mut self.state, State::Removed) {
            State::Created { props } | State::Awaiting { props } => match placement.parent() {
                None => {
                    trace!(key = %self.key, "placement detached; awaiting attachment");
                    self.state = State::Awaiting { props };
                }
                Some(target) => {
                    match self.scope.register::<C>(self.key, target.clone(), props) {
                        Some(handle) => {
                            debug!(key = %self.key, "placeholder registered");
                            self.state = State::Registered { handle };
                        }
                        None => {
                            debug!(
                                key = %self.key,
                                "stage dropped before registration; placeholder retired"
                            );
                            self.state = State::Removed;
                        }
                    }
                }
            },
            State::Registered { handle } => {
                trace!(key = %self.key, "attach after registration ignored");
                self.state = State::Registered { handle };
            }
            State::Removed => {}
        }
    }
}

impl<C: Portal, N> Drop for Placeholder<C, N> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<C: Portal, N> fmt::Debug for Placeholder<C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Placeholder")
            .field("key", &self.key)
            .field("state", &self.state())
            .finish()
    }
}
