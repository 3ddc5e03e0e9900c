//! Scene node

use crate::foundation::collections::{ComponentId, NodeId};
use crate::foundation::math::Transform;

/// A point in the scene tree
///
/// Topology (parent, children, attached components) is owned by the
/// [`Scene`](super::Scene) and only readable here. The first entry of
/// [`components`](Node::components) is always the node's transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Display name
    pub name: String,
    
    /// Static self-active flag
    pub active_self: bool,
    
    /// Pose relative to the parent
    pub local_transform: Transform,
    
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) components: Vec<ComponentId>,
    pub(super) merge_bone: bool,
}

impl Node {
    pub(super) fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            active_self: true,
            local_transform: Transform::identity(),
            parent,
            children: Vec::new(),
            components: Vec::new(),
            merge_bone: false,
        }
    }
    
    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
    
    /// Direct children in order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
    
    /// Attached components, transform first
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }
    
    /// The node's structural component
    pub fn transform(&self) -> ComponentId {
        self.components[0]
    }
    
    /// Whether the bone-merge qualifier has annotated this node
    pub fn merge_bone(&self) -> bool {
        self.merge_bone
    }
}
