//! Scene documents
//!
//! A document bundles everything one collector run consumes: the node
//! hierarchy with its components, the dependency edges, the entry points,
//! the property overrides, and the always-kept nodes. Objects refer to each
//! other by name. A node's name also names its transform.
//!
//! ```ron
//! (
//!     root: (
//!         name: "Avatar",
//!         components: [(id: "Body", type_name: "SkinnedMeshRenderer", kind: Renderer)],
//!         children: [(name: "Hips")],
//!     ),
//!     edges: [(from: "Body", to: "Hips", kind: "BONE")],
//!     entrypoints: ["Body"],
//! )
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Component, ComponentKind, FieldValue, Scene, SceneError};
use crate::dependency::{DependencyEdge, DependencyFlags, DependencyGraph, DependencyKind};
use crate::foundation::collections::{ComponentId, NodeId};
use crate::foundation::math::Transform;
use crate::overlay::{OverrideMap, OverrideValue, PropertyTarget};

/// Document loading errors
#[derive(Error, Debug)]
pub enum DocumentError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    /// Malformed RON
    #[error("Parse error: {0}")]
    Parse(String),
    
    /// Two nodes or components share a name
    #[error("Duplicate name: {0}")]
    DuplicateName(String),
    
    /// A name that no node or component carries
    #[error("Unknown reference: {0}")]
    UnknownReference(String),
    
    /// Scene construction failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

const fn default_true() -> bool {
    true
}

/// Serialized node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    /// Unique name; also names the node's transform
    pub name: String,
    /// Static self-active flag
    #[serde(default = "default_true")]
    pub active: bool,
    /// Local pose
    #[serde(default)]
    pub transform: Transform,
    /// Non-structural components
    #[serde(default)]
    pub components: Vec<ComponentDocument>,
    /// Child nodes
    #[serde(default)]
    pub children: Vec<NodeDocument>,
}

/// Serialized component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDocument {
    /// Unique name
    pub id: String,
    /// Concrete type label
    pub type_name: String,
    /// Resolver category
    pub kind: ComponentKind,
    /// Static enable flag
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Serialized fields
    #[serde(default)]
    pub payload: PayloadDocument,
}

/// Serialized payload; references are names
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum PayloadDocument {
    /// Absent value
    #[default]
    Null,
    /// Boolean field
    Bool(bool),
    /// Integer field
    Int(i64),
    /// Floating point field
    Float(f64),
    /// Text field
    String(String),
    /// Numeric vector
    Vector(Vec<f32>),
    /// Named scene reference, `None` for an empty slot
    Ref(Option<String>),
    /// Persistent asset reference
    Asset(String),
    /// Array
    List(Vec<PayloadDocument>),
    /// Nested structure
    Record(Vec<(String, PayloadDocument)>),
}

/// Serialized dependency edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDocument {
    /// Dependent component (or node name for its transform)
    pub from: String,
    /// Dependency component (or node name for its transform)
    pub to: String,
    /// Reason
    #[serde(default = "normal_kind")]
    pub kind: DependencyKind,
    /// Conditions
    #[serde(default)]
    pub flags: DependencyFlags,
}

const fn normal_kind() -> DependencyKind {
    DependencyKind::NORMAL
}

/// Which object an override applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverrideTargetDocument {
    /// Node-level property
    Node(String),
    /// Component-level property; a node name addresses its transform
    Component(String),
}

/// Serialized override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideDocument {
    /// Target object
    pub target: OverrideTargetDocument,
    /// Property name
    pub property: String,
    /// Pinned value
    pub value: OverrideValue,
}

/// Whole collector input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Root of the hierarchy
    pub root: NodeDocument,
    /// Dependency edges
    #[serde(default)]
    pub edges: Vec<EdgeDocument>,
    /// Components flagged as entry points
    #[serde(default)]
    pub entrypoints: Vec<String>,
    /// Pending property modifications
    #[serde(default)]
    pub overrides: Vec<OverrideDocument>,
    /// Nodes that are always kept
    #[serde(default)]
    pub exclusions: Vec<String>,
}

/// A document turned into live collector inputs
#[derive(Debug, Clone)]
pub struct LoadedScene {
    /// Hierarchy
    pub scene: Scene,
    /// Dependency graph covering every component of the scene
    pub graph: DependencyGraph,
    /// Overrides
    pub overlay: OverrideMap,
    /// Always-kept nodes
    pub exclusions: HashSet<NodeId>,
    /// Node lookup by name
    pub nodes: HashMap<String, NodeId>,
    /// Component lookup by name, transforms under their node's name
    pub components: HashMap<String, ComponentId>,
}

impl LoadedScene {
    /// Name of a live node
    pub fn node_name(&self, node: NodeId) -> Option<&str> {
        self.scene.node(node).map(|n| n.name.as_str())
    }
    
    /// Name a component was loaded under
    pub fn component_name(&self, component: ComponentId) -> Option<&str> {
        self.components
            .iter()
            .find(|(_, id)| **id == component)
            .map(|(name, _)| name.as_str())
    }
}

impl SceneDocument {
    /// Parse a RON document
    pub fn from_ron(contents: &str) -> Result<Self, DocumentError> {
        ron::from_str(contents).map_err(|e| DocumentError::Parse(e.to_string()))
    }
    
    /// Read and parse a RON document
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }
    
    /// Build the scene, graph, and overlay
    pub fn build(&self) -> Result<LoadedScene, DocumentError> {
        let mut builder = Builder {
            scene: Scene::new(self.root.name.clone()),
            nodes: HashMap::new(),
            components: HashMap::new(),
            deferred_payloads: Vec::new(),
        };
        let root = builder.scene.root();
        builder.populate(root, &self.root)?;
        
        for (component, payload) in std::mem::take(&mut builder.deferred_payloads) {
            let payload = builder.resolve_payload(&payload)?;
            if let Some(component) = builder.scene.component_mut(component) {
                component.payload = payload;
            }
        }
        
        let mut graph = DependencyGraph::new();
        graph.register_scene(&builder.scene);
        for edge in &self.edges {
            let from = builder.component(&edge.from)?;
            let to = builder.component(&edge.to)?;
            graph.add_dependency(from, to, DependencyEdge::new(edge.flags, edge.kind));
        }
        for name in &self.entrypoints {
            graph.set_entrypoint(builder.component(name)?);
        }
        
        let mut overlay = OverrideMap::new();
        for entry in &self.overrides {
            let target = match &entry.target {
                OverrideTargetDocument::Node(name) => PropertyTarget::Node(builder.node(name)?),
                OverrideTargetDocument::Component(name) => PropertyTarget::Component(builder.component(name)?),
            };
            overlay.set(target, entry.property.clone(), entry.value);
        }
        
        let exclusions = self
            .exclusions
            .iter()
            .map(|name| builder.node(name))
            .collect::<Result<HashSet<_>, _>>()?;
        
        log::debug!(
            "Loaded scene document: {} nodes, {} components, {} edges",
            builder.scene.node_count(),
            builder.scene.component_count(),
            graph.edge_count()
        );
        
        Ok(LoadedScene {
            scene: builder.scene,
            graph,
            overlay,
            exclusions,
            nodes: builder.nodes,
            components: builder.components,
        })
    }
}

struct Builder {
    scene: Scene,
    nodes: HashMap<String, NodeId>,
    components: HashMap<String, ComponentId>,
    deferred_payloads: Vec<(ComponentId, PayloadDocument)>,
}

impl Builder {
    fn populate(&mut self, node: NodeId, document: &NodeDocument) -> Result<(), DocumentError> {
        if let Some(live) = self.scene.node_mut(node) {
            live.active_self = document.active;
            live.local_transform = document.transform.clone();
        }
        
        let transform = self.scene.transform_of(node).ok_or(SceneError::NodeNotFound(node))?;
        self.claim_node(&document.name, node)?;
        self.claim_component(&document.name, transform)?;
        
        for component in &document.components {
            let id = self.scene.add_component(
                node,
                Component::new(component.kind, component.type_name.clone()).with_enabled(component.enabled),
            )?;
            self.claim_component(&component.id, id)?;
            // references may point forward in the tree
            self.deferred_payloads.push((id, component.payload.clone()));
        }
        
        for child in &document.children {
            let child_id = self.scene.add_node(node, child.name.clone())?;
            self.populate(child_id, child)?;
        }
        Ok(())
    }
    
    fn claim_node(&mut self, name: &str, node: NodeId) -> Result<(), DocumentError> {
        if self.nodes.insert(name.to_string(), node).is_some() {
            return Err(DocumentError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
    
    fn claim_component(&mut self, name: &str, component: ComponentId) -> Result<(), DocumentError> {
        if self.components.insert(name.to_string(), component).is_some() {
            return Err(DocumentError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
    
    fn node(&self, name: &str) -> Result<NodeId, DocumentError> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| DocumentError::UnknownReference(name.to_string()))
    }
    
    fn component(&self, name: &str) -> Result<ComponentId, DocumentError> {
        self.components
            .get(name)
            .copied()
            .ok_or_else(|| DocumentError::UnknownReference(name.to_string()))
    }
    
    fn resolve_payload(&self, payload: &PayloadDocument) -> Result<FieldValue, DocumentError> {
        Ok(match payload {
            PayloadDocument::Null => FieldValue::Null,
            PayloadDocument::Bool(value) => FieldValue::Bool(*value),
            PayloadDocument::Int(value) => FieldValue::Int(*value),
            PayloadDocument::Float(value) => FieldValue::Float(*value),
            PayloadDocument::String(value) => FieldValue::String(value.clone()),
            PayloadDocument::Vector(values) => FieldValue::Vector(values.clone()),
            PayloadDocument::Ref(None) => FieldValue::ComponentRef(None),
            PayloadDocument::Ref(Some(name)) => FieldValue::ComponentRef(Some(self.component(name)?)),
            PayloadDocument::Asset(path) => FieldValue::AssetRef(path.clone()),
            PayloadDocument::List(items) => FieldValue::List(
                items
                    .iter()
                    .map(|item| self.resolve_payload(item))
                    .collect::<Result<_, _>>()?,
            ),
            PayloadDocument::Record(fields) => FieldValue::Record(
                fields
                    .iter()
                    .map(|(name, value)| self.resolve_payload(value).map(|value| (name.clone(), value)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}
