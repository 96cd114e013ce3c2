//! Scene graph seam
//!
//! The shell never owns rendering. It drives the host engine's scene graph
//! through [`SceneHost`], treating nodes as opaque [`NodeId`] handles that can
//! be attached, detached and destroyed.
//!
//! [`MemoryScene`] is a complete in-process implementation used by tests and
//! headless tools.

pub mod scene_graph;

pub use crate::foundation::collections::NodeId;
pub use scene_graph::{MemoryScene, SceneHost, SharedScene};
