//! Proscenium client: proxy components for the shared rendering registry.
//!
//! Where `proscenium-core` is the host side, this crate is the requester
//! side: a [`Client`] factory that, given any requestable component type,
//! mints invisible [`Placeholder`] instances. Each placeholder registers
//! itself once its [`Placement`] reveals a parent attachment, forwards its
//! own prop updates, and deregisters on teardown.
//!
//! Public API surface:
//! - [`client`]: the [`Client`] factory
//! - [`placeholder`]: [`Placeholder`] instances and [`LifecycleState`]
//! - [`placement`]: [`Placement`] points
//!
//! ```
//! use proscenium_client::{Client, Placement};
//! use proscenium_core::{Portal, Stage};
//!
//! struct Banner;
//!
//! impl Portal for Banner {
//!     type Props = String;
//! }
//!
//! let stage: Stage<&'static str> = Stage::new();
//! let client: Client<Banner, _> = Client::new(stage.scope());
//!
//! let mut proxy = client.instance(String::from("welcome"));
//! proxy.attach(&Placement::under("sidebar"));
//! assert_eq!(stage.len(), 1);
//!
//! proxy.set_props(String::from("goodbye"));
//! drop(proxy);
//! assert!(stage.is_empty());
//! ```

pub mod client;
pub mod placeholder;
pub mod placement;

pub use client::Client;
pub use placeholder::{LifecycleState, Placeholder};
pub use placement::Placement;
