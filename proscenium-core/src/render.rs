//! Render output: instruction snapshots handed to the portal capability.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::component::ComponentRef;
use crate::key::RequestKey;
use crate::provider::Provider;

/// One dispatchable render-request: everything an out-of-tree mount needs
/// to place `component` with `props` at `target`.
///
/// Instructions are owned snapshots; holding one never blocks further
/// registry mutation, and a retained instruction keeps showing the props it
/// was produced with.
#[derive(Clone)]
pub struct Instruction<N> {
    key: RequestKey,
    target: N,
    component: ComponentRef,
    props: Rc<dyn Any>,
}

impl<N> Instruction<N> {
    pub(crate) fn new(
        key: RequestKey,
        target: N,
        component: ComponentRef,
        props: Rc<dyn Any>,
    ) -> Self {
        Self {
            key,
            target,
            component,
            props,
        }
    }

    pub fn key(&self) -> RequestKey {
        self.key
    }

    /// External mount node this entry renders into.
    pub fn target(&self) -> &N {
        &self.target
    }

    pub fn component(&self) -> ComponentRef {
        self.component
    }

    /// Erased prop payload.
    pub fn props(&self) -> &dyn Any {
        &*self.props
    }

    /// Typed view of the payload; `None` when `P` is not the registered
    /// component's prop type.
    pub fn props_as<P: 'static>(&self) -> Option<&P> {
        self.props.downcast_ref::<P>()
    }
}

impl<N: fmt::Debug> fmt::Debug for Instruction<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("key", &self.key)
            .field("target", &self.target)
            .field("component", &self.component)
            .finish()
    }
}

/// Product of one `Stage::render` call: the live instruction list plus the
/// stage's single shared provider instance.
///
/// The pass is a snapshot. Consumers may register, update, or remove entries
/// while walking it; such changes show up in the next pass, not this one.
pub struct RenderPass<'a, N, P: Provider> {
    provider: &'a P,
    generation: u64,
    instructions: Vec<Instruction<N>>,
}

impl<'a, N, P: Provider> RenderPass<'a, N, P> {
    pub(crate) fn new(provider: &'a P, generation: u64, instructions: Vec<Instruction<N>>) -> Self {
        Self {
            provider,
            generation,
            instructions,
        }
    }

    /// The ambient provider wrapping every instruction: one instance per
    /// stage, however many entries are live.
    pub fn provider(&self) -> &'a P {
        self.provider
    }

    /// Registry generation this pass was produced at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn instructions(&self) -> &[Instruction<N>] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction<N>> {
        self.instructions.iter()
    }
}

impl<'a, 'p, N, P: Provider> IntoIterator for &'a RenderPass<'p, N, P> {
    type Item = &'a Instruction<N>;
    type IntoIter = std::slice::Iter<'a, Instruction<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
