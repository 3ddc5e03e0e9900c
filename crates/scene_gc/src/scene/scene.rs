//! Scene arena
//!
//! Owns every node and component of one hierarchy. All collector phases
//! receive the scene as an explicit handle; nothing about it is global.

use std::collections::VecDeque;

use thiserror::Error;

use super::component::{Component, ComponentKind};
use super::node::Node;
use crate::foundation::collections::{ComponentId, ComponentMap, NodeId, NodeMap};

/// Type name given to the implicit transform component
pub const TRANSFORM_TYPE_NAME: &str = "Transform";

/// Scene construction and editing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Node handle is stale or foreign
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),
    
    /// Component handle is stale or foreign
    #[error("Component not found: {0:?}")]
    ComponentNotFound(ComponentId),
    
    /// Transforms are removed together with their node
    #[error("Transform {0:?} can only be removed with its node")]
    TransformRemoval(ComponentId),
    
    /// Additional transforms cannot be attached
    #[error("Node {0:?} already owns a transform")]
    DuplicateTransform(NodeId),
    
    /// The root node anchors the hierarchy
    #[error("The root node cannot be removed")]
    RootRemoval,
}

/// Hierarchy of nodes and their components
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: NodeMap<Node>,
    components: ComponentMap<Component>,
    root: NodeId,
}

impl Scene {
    /// Create a scene holding only a root node
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut scene = Self {
            nodes: NodeMap::with_key(),
            components: ComponentMap::with_key(),
            root: NodeId::default(),
        };
        scene.root = scene.insert_node(root_name.into(), None);
        scene
    }
    
    fn insert_node(&mut self, name: String, parent: Option<NodeId>) -> NodeId {
        let node = self.nodes.insert(Node::new(name, parent));
        let mut transform = Component::new(ComponentKind::Transform, TRANSFORM_TYPE_NAME);
        transform.attach_to(node);
        let transform = self.components.insert(transform);
        self.nodes[node].components.push(transform);
        node
    }
    
    /// Root node of the hierarchy
    pub fn root(&self) -> NodeId {
        self.root
    }
    
    /// Transform of the root node
    pub fn root_transform(&self) -> ComponentId {
        self.nodes[self.root].transform()
    }
    
    /// Append a new child node under `parent`
    pub fn add_node(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        
        let node = self.insert_node(name.into(), Some(parent));
        self.nodes[parent].children.push(node);
        Ok(node)
    }
    
    /// Attach a non-structural component to `node`
    pub fn add_component(&mut self, node: NodeId, mut component: Component) -> Result<ComponentId, SceneError> {
        if !self.nodes.contains_key(node) {
            return Err(SceneError::NodeNotFound(node));
        }
        if component.is_transform() {
            return Err(SceneError::DuplicateTransform(node));
        }
        
        component.attach_to(node);
        let id = self.components.insert(component);
        self.nodes[node].components.push(id);
        Ok(id)
    }
    
    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }
    
    /// Look up a node for editing its name, flag, or pose
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }
    
    /// Look up a component
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }
    
    /// Look up a component for editing
    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id)
    }
    
    /// Whether the node still exists
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }
    
    /// Whether the component still exists
    pub fn contains_component(&self, id: ComponentId) -> bool {
        self.components.contains_key(id)
    }
    
    /// Parent of a node, `None` for the root or a stale handle
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(Node::parent)
    }
    
    /// Direct children of a node, empty for a stale handle
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], Node::children)
    }
    
    /// Components of a node, empty for a stale handle
    pub fn components_of(&self, id: NodeId) -> &[ComponentId] {
        self.nodes.get(id).map_or(&[], Node::components)
    }
    
    /// Transform of a node
    pub fn transform_of(&self, id: NodeId) -> Option<ComponentId> {
        self.nodes.get(id).map(Node::transform)
    }
    
    /// Owning node of a component
    pub fn node_of(&self, id: ComponentId) -> Option<NodeId> {
        self.components.get(id).map(Component::node)
    }
    
    /// Every live node handle
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().collect()
    }
    
    /// Every live component handle
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.components.keys().collect()
    }
    
    /// Every live component of the given kind
    pub fn components_of_kind(&self, kind: ComponentKind) -> Vec<ComponentId> {
        self.components
            .iter()
            .filter(|(_, component)| component.kind == kind)
            .map(|(id, _)| id)
            .collect()
    }
    
    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
    
    /// Number of live components, transforms included
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
    
    /// `node` followed by all of its descendants, breadth-first
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        if !self.nodes.contains_key(node) {
            return result;
        }
        
        let mut queue = VecDeque::from([node]);
        while let Some(current) = queue.pop_front() {
            result.push(current);
            queue.extend(self.children(current).iter().copied());
        }
        result
    }
    
    /// Static activity: the node and every ancestor have `active_self` set
    pub fn active_in_hierarchy(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.nodes.get(id) {
                Some(n) if n.active_self => current = n.parent,
                _ => return false,
            }
        }
        true
    }
    
    /// Annotate a node for the downstream bone-flattening transform
    pub fn set_merge_bone(&mut self, node: NodeId) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(node).ok_or(SceneError::NodeNotFound(node))?;
        node.merge_bone = true;
        Ok(())
    }
    
    /// Detach and drop a single non-structural component
    pub fn remove_component(&mut self, id: ComponentId) -> Result<Component, SceneError> {
        let component = self.components.get(id).ok_or(SceneError::ComponentNotFound(id))?;
        if component.is_transform() {
            return Err(SceneError::TransformRemoval(id));
        }
        
        let owner = component.node();
        if let Some(node) = self.nodes.get_mut(owner) {
            node.components.retain(|c| *c != id);
        }
        self.components.remove(id).ok_or(SceneError::ComponentNotFound(id))
    }
    
    /// Remove a node together with its whole subtree and every attached component
    ///
    /// Returns the number of nodes removed.
    pub fn remove_node(&mut self, id: NodeId) -> Result<usize, SceneError> {
        if id == self.root {
            return Err(SceneError::RootRemoval);
        }
        if !self.nodes.contains_key(id) {
            return Err(SceneError::NodeNotFound(id));
        }
        
        if let Some(parent) = self.parent(id) {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.retain(|child| *child != id);
            }
        }
        
        let doomed = self.subtree(id);
        for node in &doomed {
            if let Some(node) = self.nodes.remove(*node) {
                for component in node.components {
                    self.components.remove(component);
                }
            }
        }
        Ok(doomed.len())
    }
}
