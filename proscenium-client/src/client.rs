//! Client factory: binds a requestable component type to a stage scope.

use std::marker::PhantomData;
use std::rc::Rc;

use proscenium_core::{KeySource, Portal, Scope, UuidKeys};

use crate::placeholder::Placeholder;

/// Factory producing [`Placeholder`] instances of the component type `C`
/// against one stage scope.
///
/// Clones share the scope and the key source, so every instance minted by
/// any clone still gets a distinct key.
pub struct Client<C: Portal, N> {
    scope: Scope<N>,
    keys: Rc<dyn KeySource>,
    _component: PhantomData<fn(C)>,
}

impl<C: Portal, N: Clone + 'static> Client<C, N> {
    /// Client minting process-unique random keys.
    pub fn new(scope: Scope<N>) -> Self {
        Self::with_key_source(scope, UuidKeys)
    }

    /// Client with an injected key source, for deterministic tests or an
    /// external id authority.
    pub fn with_key_source(scope: Scope<N>, keys: impl KeySource + 'static) -> Self {
        Self {
            scope,
            keys: Rc::new(keys),
            _component: PhantomData,
        }
    }

    /// Mints a proxy instance carrying `props` as its initial payload. The
    /// instance's key is assigned here, exactly once.
    pub fn instance(&self, props: C::Props) -> Placeholder<C, N> {
        Placeholder::new(self.keys.next_key(), self.scope.clone(), props)
    }
}

impl<C: Portal, N> Clone for Client<C, N> {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            keys: Rc::clone(&self.keys),
            _component: PhantomData,
        }
    }
}
