//! Component types attached to scene nodes
//!
//! A component is a unit of behavior or data owned by exactly one node. The
//! collector only cares about its kind (to decide how it can be switched off)
//! and, on the legacy path, about the references stored in its payload.

use serde::{Deserialize, Serialize};

use crate::foundation::collections::{ComponentId, NodeId};

/// Closed set of component categories understood by the activeness resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// The implicit structural component every node owns
    Transform,
    /// Scripted behaviour with an `enabled` toggle
    Behaviour,
    /// Cloth simulation
    Cloth,
    /// Physics collider
    Collider,
    /// Level-of-detail group
    LodGroup,
    /// Anything that draws
    Renderer,
    /// Components with no enable toggle (particle systems, rigidbodies, joints, mesh filters)
    AlwaysEnabled,
    /// Kinds the resolver does not recognize
    Unknown,
}

impl ComponentKind {
    /// Whether components of this kind carry their own `enabled` flag
    pub const fn has_enabled_flag(self) -> bool {
        matches!(
            self,
            Self::Behaviour | Self::Cloth | Self::Collider | Self::LodGroup | Self::Renderer
        )
    }
}

/// Generic serialized field tree carried by a component
///
/// This is the shape the legacy reference scan walks. Leaf values are never
/// descended into; lists and records are.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum FieldValue {
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
    /// Fixed-size numeric vector (positions, colors, bounds)
    Vector(Vec<f32>),
    /// Reference to another component in the same scene, possibly dangling
    ComponentRef(Option<ComponentId>),
    /// Reference to a persistent asset outside the scene
    AssetRef(String),
    /// Array of values
    List(Vec<FieldValue>),
    /// Named fields of a nested structure
    Record(Vec<(String, FieldValue)>),
}

impl FieldValue {
    /// Convenience constructor for a record payload
    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldValue)>,
        S: Into<String>,
    {
        Self::Record(fields.into_iter().map(|(name, value)| (name.into(), value)).collect())
    }
}

/// A component attached to a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Concrete type label (for logs and subtree-retention rules)
    pub type_name: String,
    
    /// Category used for activeness resolution
    pub kind: ComponentKind,
    
    /// Static enable flag; ignored by kinds without one
    pub enabled: bool,
    
    /// Serialized fields
    pub payload: FieldValue,
    
    node: NodeId,
}

impl Component {
    /// Create an enabled component with an empty payload
    pub fn new(kind: ComponentKind, type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind,
            enabled: true,
            payload: FieldValue::Null,
            node: NodeId::default(),
        }
    }
    
    /// Builder pattern: Set the static enable flag
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
    
    /// Builder pattern: Set the serialized payload
    #[must_use]
    pub fn with_payload(mut self, payload: FieldValue) -> Self {
        self.payload = payload;
        self
    }
    
    /// Node that owns this component
    pub fn node(&self) -> NodeId {
        self.node
    }
    
    pub(super) fn attach_to(&mut self, node: NodeId) {
        self.node = node;
    }
    
    /// Whether this is the structural component of its node
    pub fn is_transform(&self) -> bool {
        self.kind == ComponentKind::Transform
    }
}
