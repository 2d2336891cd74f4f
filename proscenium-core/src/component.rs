//! Requestable component identity.

use std::any::TypeId;
use std::fmt;

/// A component type that can be requested for out-of-tree rendering.
///
/// The trait only binds a component to its prop shape; implementors are
/// usually zero-sized markers. The component's rendering behavior lives with
/// the portal capability that consumes instructions, not here.
pub trait Portal: 'static {
    /// Prop payload accepted by this component.
    type Props: 'static;
}

/// Value-level identity of a [`Portal`] type.
///
/// Carried on every instruction so consumers can dispatch without the type
/// parameter, and compared by `TypeId`, never by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    id: TypeId,
    name: &'static str,
}

impl ComponentRef {
    /// Identity of the component type `C`.
    pub fn of<C: Portal>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    /// Whether this refers to the component type `C`.
    pub fn is<C: Portal>(&self) -> bool {
        self.id == TypeId::of::<C>()
    }

    /// Fully-qualified type name. Diagnostics only; the exact text is not
    /// stable across compiler versions.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name.
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
