//! Scene management
//!
//! Nodes are component containers; the scene stores them together with the
//! component registry, the default viewport and the active camera slot.
//! Parent/child hierarchy is not modelled here: nodes are a flat list.

mod node;
#[allow(clippy::module_inception)]
mod scene;

pub use node::{Node, NodeData, NodeId};
pub use scene::{Scene, SceneData};
