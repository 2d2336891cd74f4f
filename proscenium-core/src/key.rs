//! Request keys and the key-generation seam.
//!
//! Every registration is addressed by a [`RequestKey`] minted exactly once
//! per proxy instance and never regenerated, no matter how often the
//! instance's props change. Generation is injected via [`KeySource`] so the
//! process-unique default ([`UuidKeys`]) can be swapped for a deterministic
//! sequence in tests ([`SequentialKeys`]).

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::RegistryError;

// ---------------------------------------------------------------------------
// RequestKey
// ---------------------------------------------------------------------------

/// Stable identity of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RequestKey(Uuid);

impl RequestKey {
    /// Wraps a UUID issued elsewhere.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for RequestKey {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for RequestKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|source| RegistryError::InvalidKey {
                value: s.to_string(),
                source,
            })
    }
}

// ---------------------------------------------------------------------------
// KeySource
// ---------------------------------------------------------------------------

/// Key-generation service.
///
/// Implementations must produce keys unique across the lifetime of every
/// registry they feed; reusing a live key replaces that entry rather than
/// raising an error.
pub trait KeySource {
    fn next_key(&self) -> RequestKey;
}

impl<K: KeySource + ?Sized> KeySource for Rc<K> {
    fn next_key(&self) -> RequestKey {
        (**self).next_key()
    }
}

/// Default source: random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeys;

impl KeySource for UuidKeys {
    fn next_key(&self) -> RequestKey {
        RequestKey(Uuid::new_v4())
    }
}

/// Deterministic source for tests: 1, 2, 3, ... encoded as UUIDs.
#[derive(Debug)]
pub struct SequentialKeys {
    next: Cell<u128>,
}

impl SequentialKeys {
    pub fn new() -> Self {
        Self { next: Cell::new(1) }
    }
}

impl Default for SequentialKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for SequentialKeys {
    fn next_key(&self) -> RequestKey {
        let n = self.next.get();
        self.next.set(n + 1);
        RequestKey(Uuid::from_u128(n))
    }
}
