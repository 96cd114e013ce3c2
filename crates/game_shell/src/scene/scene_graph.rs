//! Scene host trait and the in-memory node tree

use crate::assets::Prefab;
use crate::foundation::collections::{NodeId, SlotMap};
use std::cell::RefCell;
use std::rc::Rc;

/// Operations the shell needs from the host engine's scene graph
pub trait SceneHost {
    /// Create an empty, detached node
    fn create_node(&mut self, name: &str) -> NodeId;

    /// Instantiate a loaded prefab as a new detached node tree
    fn instantiate(&mut self, prefab: &Prefab) -> NodeId;

    /// Attach `child` as the last child of `parent`, detaching it from any previous parent
    fn add_child(&mut self, parent: NodeId, child: NodeId);

    /// Detach a node from its parent, keeping it alive
    fn remove_from_parent(&mut self, node: NodeId);

    /// Destroy a node and all of its descendants
    fn destroy(&mut self, node: NodeId);

    /// Parent of a node, if attached
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of a node in sibling order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Whether the handle still refers to a live node
    fn is_valid(&self, node: NodeId) -> bool;

    /// Node name
    fn name(&self, node: NodeId) -> Option<String>;

    /// Move a node to `index` among its siblings (clamped)
    fn set_sibling_index(&mut self, node: NodeId, index: usize);
}

/// Scene host shared between the UI manager and its layers
pub type SharedScene = Rc<RefCell<dyn SceneHost>>;

#[derive(Debug)]
struct NodeData {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Slot-map backed node tree
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: SlotMap<NodeId, NodeData>,
}

impl MemoryScene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap into a shared handle
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Find the first direct child with the given name
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes.get(parent)?.children.iter().copied().find(|child| {
            self.nodes
                .get(*child)
                .is_some_and(|data| data.name == name)
        })
    }

    /// True when `node` is attached somewhere under `ancestor`
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|data| data.parent.take()) else {
            return;
        };
        if let Some(parent_data) = self.nodes.get_mut(parent) {
            parent_data.children.retain(|child| *child != node);
        }
    }
}

impl SceneHost for MemoryScene {
    fn create_node(&mut self, name: &str) -> NodeId {
        self.nodes.insert(NodeData {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
        })
    }

    fn instantiate(&mut self, prefab: &Prefab) -> NodeId {
        self.create_node(prefab.name())
    }

    fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            log::warn!("add_child ignored: invalid parent or child node");
            return;
        }
        self.detach(child);
        if let Some(data) = self.nodes.get_mut(child) {
            data.parent = Some(parent);
        }
        if let Some(data) = self.nodes.get_mut(parent) {
            data.children.push(child);
        }
    }

    fn remove_from_parent(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn destroy(&mut self, node: NodeId) {
        if !self.nodes.contains_key(node) {
            return;
        }
        self.detach(node);
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.remove(current) {
                stack.extend(data.children);
            }
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    fn is_valid(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn name(&self, node: NodeId) -> Option<String> {
        self.nodes.get(node).map(|data| data.name.clone())
    }

    fn set_sibling_index(&mut self, node: NodeId, index: usize) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(parent_data) = self.nodes.get_mut(parent) {
            parent_data.children.retain(|child| *child != node);
            let index = index.min(parent_data.children.len());
            parent_data.children.insert(index, node);
        }
    }
}
