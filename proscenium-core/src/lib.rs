//! Proscenium core: the shared rendering registry host.
//!
//! Many scattered, transiently-mounted requesters inject content into
//! external mount points while sharing one ambient provider instance. This
//! crate is the host side: the registration set, the per-entry handle
//! protocol, and the instruction snapshots a portal capability consumes.
//!
//! Public API surface:
//! - [`key`]: [`RequestKey`] and the [`KeySource`] seam
//! - [`component`]: [`Portal`] component types and [`ComponentRef`] identity
//! - [`stage`]: the [`Stage`] host, [`Scope`] references, [`Scheduler`]
//! - [`handle`]: the per-entry [`Handle`] capability
//! - [`render`]: [`RenderPass`] and [`Instruction`] snapshots
//! - [`provider`]: the ambient [`Provider`] seam and [`PassThrough`]
//! - [`error`]: [`RegistryError`]
//!
//! ```
//! use proscenium_core::{KeySource, Portal, SequentialKeys, Stage};
//!
//! struct Tooltip;
//!
//! impl Portal for Tooltip {
//!     type Props = &'static str;
//! }
//!
//! let keys = SequentialKeys::new();
//! let stage: Stage<u32> = Stage::new();
//!
//! let handle = stage.register::<Tooltip>(keys.next_key(), 7, "hi");
//! handle.update("bye");
//!
//! let pass = stage.render();
//! assert_eq!(pass.len(), 1);
//! assert_eq!(pass.instructions()[0].props_as::<&str>(), Some(&"bye"));
//!
//! handle.remove();
//! assert!(stage.render().is_empty());
//! ```

pub mod component;
pub mod error;
pub mod handle;
pub mod key;
pub mod provider;
mod registry;
pub mod render;
pub mod stage;

pub use component::{ComponentRef, Portal};
pub use error::RegistryError;
pub use handle::Handle;
pub use key::{KeySource, RequestKey, SequentialKeys, UuidKeys};
pub use provider::{PassThrough, Provider};
pub use render::{Instruction, RenderPass};
pub use stage::{EntrySummary, Scheduler, Scope, Stage, StageSummary};
