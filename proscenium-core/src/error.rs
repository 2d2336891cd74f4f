//! Error types for proscenium-core.

use thiserror::Error;

/// All errors that can arise from registry operations.
///
/// The registration protocol itself is infallible: stale updates, repeated
/// removes, and duplicate-key registrations are absorbed as no-ops or
/// replacements, never surfaced as errors. These variants cover the parts of
/// the API that can genuinely fail.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A textual key did not parse as a UUID.
    #[error("invalid request key {value:?}: {source}")]
    InvalidKey {
        value: String,
        #[source]
        source: uuid::Error,
    },

    /// An internal invariant audit failed; reported by `Stage::self_check`.
    #[error("registry inconsistency: {0}")]
    Inconsistent(String),
}
