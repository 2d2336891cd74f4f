//! Placement points: how a proxy learns where its output belongs.

/// What a proxy's invisible placement point discovered at mount time.
///
/// The point renders nothing itself; its only job is to expose the parent
/// attachment location, one level up from the proxy's logical tree position,
/// as the registration target. A point mounted in a detached tree has no
/// parent yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement<N> {
    parent: Option<N>,
}

impl<N> Placement<N> {
    /// Placement attached under `parent`.
    pub fn under(parent: N) -> Self {
        Self {
            parent: Some(parent),
        }
    }

    /// Placement in a detached tree: no parent attachment exists yet.
    pub fn detached() -> Self {
        Self { parent: None }
    }

    /// The discovered parent attachment, if any.
    pub fn parent(&self) -> Option<&N> {
        self.parent.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }
}
