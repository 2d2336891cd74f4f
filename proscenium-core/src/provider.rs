//! Ambient provider seam.

/// The shared wrapper conceptually surrounding every dispatched entry.
///
/// A stage mounts exactly one provider instance when it is created,
/// regardless of how many entries come and go afterwards; that single
/// instance is what [`RenderPass::provider`](crate::RenderPass::provider)
/// exposes. Host-level props are forwarded unchanged through
/// [`Stage::set_props`](crate::Stage::set_props).
pub trait Provider: 'static {
    /// Props accepted by the provider.
    type Props;

    /// Called once, when the owning stage is created.
    fn mount(props: Self::Props) -> Self;

    /// Called whenever the host's own props change.
    fn update(&mut self, props: Self::Props);
}

/// Default provider: wraps nothing and carries no props.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl Provider for PassThrough {
    type Props = ();

    fn mount(_props: ()) -> Self {
        PassThrough
    }

    fn update(&mut self, _props: ()) {}
}
