//! Cluster access: the resource client, the resource model shared by all
//! panels and the gateway endpoint derivation.

mod client;
pub mod endpoint;
mod model;

pub use client::{KubeClient, ResourceClient};
pub use endpoint::derive_endpoint;
pub use model::{ResourceItem, ResourceKind, StreamTag};
