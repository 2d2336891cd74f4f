//! Registry host.
//!
//! A [`Stage`] owns the live registration set and the one ambient provider
//! instance shared by every entry. Requesters never touch the stage
//! directly: they hold a [`Scope`], registered entries are mutated through
//! their own [`Handle`](crate::Handle), and the host runtime consumes
//! [`RenderPass`] snapshots.

use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::component::Portal;
use crate::error::RegistryError;
use crate::handle::Handle;
use crate::key::RequestKey;
use crate::provider::{PassThrough, Provider};
use crate::registry::StageCore;
use crate::render::RenderPass;

// ---------------------------------------------------------------------------
// Scheduling seam
// ---------------------------------------------------------------------------

/// Render-scheduling callback, signaled once per effective registration-set
/// change (register, replace, update, remove; never for no-ops).
///
/// Signaling happens after the registry has already been mutated and
/// released, so implementations may render immediately or coalesce however
/// the host runtime batches.
pub trait Scheduler {
    fn request_render(&self);
}

impl<F: Fn()> Scheduler for F {
    fn request_render(&self) {
        self()
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Registry host: the live collection of render-requests plus the single
/// shared ambient provider.
///
/// `N` is the opaque external mount-node type; `P` the ambient provider,
/// defaulting to [`PassThrough`]. Dropping the stage disarms every
/// outstanding scope and handle.
pub struct Stage<N, P: Provider = PassThrough> {
    core: Rc<StageCore<N>>,
    provider: P,
}

impl<N: Clone + 'static> Stage<N, PassThrough> {
    /// Host with the pass-through provider.
    pub fn new() -> Self {
        Self::with_provider(())
    }
}

impl<N: Clone + 'static> Default for Stage<N, PassThrough> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone + 'static, P: Provider> Stage<N, P> {
    /// Host with an explicit ambient provider, mounted here and never
    /// remounted for this stage's lifetime.
    pub fn with_provider(props: P::Props) -> Self {
        Self {
            core: StageCore::new(),
            provider: P::mount(props),
        }
    }

    /// Forwards host props unchanged to the provider instance. Does not
    /// signal the scheduler: the host initiated this change itself.
    pub fn set_props(&mut self, props: P::Props) {
        self.provider.update(props);
    }

    /// The single provider instance.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Reference for requesters to reach this host. Cheap to clone and safe
    /// to outlive the stage; operations through a dead scope are silent
    /// no-ops.
    pub fn scope(&self) -> Scope<N> {
        Scope {
            core: Rc::downgrade(&self.core),
        }
    }

    /// Installs the render-scheduling callback, replacing any previous one.
    pub fn set_scheduler(&self, scheduler: impl Scheduler + 'static) {
        self.core.set_scheduler(Some(Rc::new(scheduler)));
    }

    pub fn clear_scheduler(&self) {
        self.core.set_scheduler(None);
    }

    /// Inserts a render-request and returns its entry's handle. A key that
    /// is already live replaces the existing entry (never merges props) and
    /// leaves the old entry's handle inert.
    pub fn register<C: Portal>(
        &self,
        key: RequestKey,
        target: N,
        props: C::Props,
    ) -> Handle<C::Props> {
        StageCore::register::<C>(&self.core, key, target, props)
    }

    /// Snapshot of the live instruction list plus the shared provider.
    pub fn render(&self) -> RenderPass<'_, N, P> {
        RenderPass::new(&self.provider, self.core.generation(), self.core.instructions())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` currently addresses a live entry.
    pub fn contains(&self, key: RequestKey) -> bool {
        self.core.contains(key)
    }

    /// Monotonic mutation counter; no-ops leave it unchanged.
    pub fn generation(&self) -> u64 {
        self.core.generation()
    }

    /// Diagnostic snapshot of the live set.
    pub fn summary(&self) -> StageSummary {
        self.core.summary()
    }

    /// Audits internal invariants (key index and slot arena agreement).
    pub fn self_check(&self) -> Result<(), RegistryError> {
        self.core.self_check()
    }
}

impl<N: Clone + 'static, P: Provider> fmt::Debug for Stage<N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("live", &self.len())
            .field("generation", &self.generation())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Weak reference requesters use to reach their enclosing [`Stage`].
///
/// Obtained from [`Stage::scope`] and passed explicitly, so coexisting hosts
/// never share state. A scope whose stage is gone turns every registration
/// into the silent-no-op path.
pub struct Scope<N> {
    core: Weak<StageCore<N>>,
}

impl<N> Clone for Scope<N> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
        }
    }
}

impl<N> Scope<N> {
    /// Whether the stage behind this scope is still alive.
    pub fn is_live(&self) -> bool {
        self.core.strong_count() > 0
    }
}

impl<N: Clone + 'static> Scope<N> {
    /// Registers against the scoped stage. `None` when the stage has been
    /// dropped; the caller's entry can never render, so there is nothing to
    /// hold a handle to.
    pub fn register<C: Portal>(
        &self,
        key: RequestKey,
        target: N,
        props: C::Props,
    ) -> Option<Handle<C::Props>> {
        match self.core.upgrade() {
            Some(core) => Some(StageCore::register::<C>(&core, key, target, props)),
            None => {
                trace!(%key, "registration against dropped stage ignored");
                None
            }
        }
    }
}

impl<N> fmt::Debug for Scope<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope").field("live", &self.is_live()).finish()
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Point-in-time view of a stage's live set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StageSummary {
    pub generation: u64,
    pub live: usize,
    pub entries: Vec<EntrySummary>,
}

/// One live entry in a [`StageSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EntrySummary {
    pub key: RequestKey,
    /// Fully-qualified component type name.
    pub component: String,
    /// Arena slot; stable for the entry's lifetime.
    pub slot: usize,
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::key::{KeySource, SequentialKeys};

    struct Banner;

    impl Portal for Banner {
        type Props = &'static str;
    }

    /// Counts mounts through a shared cell and remembers the latest update.
    struct CountingProvider {
        last_update: Option<&'static str>,
    }

    impl Provider for CountingProvider {
        type Props = (Rc<Cell<u32>>, &'static str);

        fn mount((mounts, _greeting): Self::Props) -> Self {
            mounts.set(mounts.get() + 1);
            Self { last_update: None }
        }

        fn update(&mut self, (_mounts, greeting): Self::Props) {
            self.last_update = Some(greeting);
        }
    }

    fn keys() -> SequentialKeys {
        SequentialKeys::new()
    }

    #[test]
    fn provider_mounts_exactly_once() {
        let mounts = Rc::new(Cell::new(0u32));
        let stage: Stage<u8, CountingProvider> =
            Stage::with_provider((Rc::clone(&mounts), "hi"));
        assert_eq!(mounts.get(), 1);

        let keys = keys();
        let _a = stage.register::<Banner>(keys.next_key(), 1, "a");
        let _b = stage.register::<Banner>(keys.next_key(), 2, "b");
        for _ in 0..3 {
            let _pass = stage.render();
        }

        assert_eq!(mounts.get(), 1, "renders and registrations must not remount");
    }

    #[test]
    fn set_props_reaches_the_provider_unchanged() {
        let mounts = Rc::new(Cell::new(0u32));
        let mut stage: Stage<u8, CountingProvider> =
            Stage::with_provider((Rc::clone(&mounts), "hi"));

        stage.set_props((Rc::clone(&mounts), "bye"));

        assert_eq!(stage.provider().last_update, Some("bye"));
        assert_eq!(mounts.get(), 1);
        assert_eq!(stage.generation(), 0, "host props are not a set mutation");
    }

    #[test]
    fn scope_reports_liveness_and_goes_silent_after_drop() {
        let stage: Stage<u8> = Stage::new();
        let scope = stage.scope();
        assert!(scope.is_live());

        drop(stage);
        assert!(!scope.is_live());
        assert!(scope
            .register::<Banner>(keys().next_key(), 1, "late")
            .is_none());
    }

    #[test]
    fn contains_tracks_live_keys_only() {
        let stage: Stage<u8> = Stage::new();
        let key = keys().next_key();
        let handle = stage.register::<Banner>(key, 1, "x");
        assert!(stage.contains(key));
        assert_eq!(stage.len(), 1);

        handle.remove();
        assert!(!stage.contains(key));
        assert!(stage.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn summary_serializes_to_json() {
        let stage: Stage<u8> = Stage::new();
        let _handle = stage.register::<Banner>(keys().next_key(), 1, "x");

        let value = serde_json::to_value(stage.summary()).expect("serializable");
        assert_eq!(value["live"], 1);
        assert_eq!(value["entries"][0]["slot"], 0);
    }
}
