//! Property override overlay
//!
//! Animations and other pending modifications can supersede the static
//! values stored in the scene. The collector only ever asks two questions:
//! "is this property pinned to a known constant?" and "is this property
//! touched at all?". [`PropertyOverlay`] is that read-only seam;
//! [`OverrideMap`] is the in-memory implementation used by documents and
//! tests.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::foundation::collections::{ComponentId, NodeId};

/// Node property holding the self-active flag
pub const IS_ACTIVE: &str = "is_active";

/// Component property holding the enable flag
pub const ENABLED: &str = "enabled";

/// Transform properties that describe the local pose
pub const TRANSFORM_POSE_PROPERTIES: [&str; 13] = [
    "local_rotation.x",
    "local_rotation.y",
    "local_rotation.z",
    "local_rotation.w",
    "local_position.x",
    "local_position.y",
    "local_position.z",
    "local_scale.x",
    "local_scale.y",
    "local_scale.z",
    "local_euler_angles_raw.x",
    "local_euler_angles_raw.y",
    "local_euler_angles_raw.z",
];

/// Object whose property is overridden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyTarget {
    /// A node-level property such as [`IS_ACTIVE`]
    Node(NodeId),
    /// A component-level property such as [`ENABLED`] or a pose field
    Component(ComponentId),
}

/// Value an override pins a property to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OverrideValue {
    /// Every modification agrees on this boolean
    Bool(bool),
    /// Every modification agrees on this number
    Float(f32),
    /// Modified to values that are not known at analysis time
    Variable,
}

/// Read-only lookup of pending property modifications
pub trait PropertyOverlay {
    /// Constant boolean value of a property
    ///
    /// Unmodified properties return `Some(fallback)`. Properties modified to
    /// anything other than one known boolean return `None`, and the fallback
    /// is ignored.
    fn constant_bool(&self, target: PropertyTarget, property: &str, fallback: bool) -> Option<bool>;
    
    /// Names of every modified property of `target`
    fn modified_properties(&self, target: PropertyTarget) -> BTreeSet<String>;
    
    /// Every target with at least one modified property
    fn modified_targets(&self) -> Vec<PropertyTarget>;
    
    /// Whether `property` of `target` is modified at all
    fn is_modified(&self, target: PropertyTarget, property: &str) -> bool {
        self.modified_properties(target).contains(property)
    }
}

/// In-memory overlay keyed by target and property name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideMap {
    entries: HashMap<PropertyTarget, HashMap<String, OverrideValue>>,
}

impl OverrideMap {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Record an override, replacing any earlier value for the same property
    pub fn set(&mut self, target: PropertyTarget, property: impl Into<String>, value: OverrideValue) {
        self.entries
            .entry(target)
            .or_default()
            .insert(property.into(), value);
    }
    
    /// Builder pattern: Record an override
    #[must_use]
    pub fn with(mut self, target: PropertyTarget, property: impl Into<String>, value: OverrideValue) -> Self {
        self.set(target, property, value);
        self
    }
    
    /// Stored override, if any
    pub fn get(&self, target: PropertyTarget, property: &str) -> Option<OverrideValue> {
        self.entries.get(&target)?.get(property).copied()
    }
    
    /// Whether no property is overridden
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertyOverlay for OverrideMap {
    fn constant_bool(&self, target: PropertyTarget, property: &str, fallback: bool) -> Option<bool> {
        match self.get(target, property) {
            None => Some(fallback),
            Some(OverrideValue::Bool(value)) => Some(value),
            // numeric animation curves drive booleans through non-zero tests
            Some(OverrideValue::Float(value)) => Some(value != 0.0),
            Some(OverrideValue::Variable) => None,
        }
    }
    
    fn modified_properties(&self, target: PropertyTarget) -> BTreeSet<String> {
        self.entries
            .get(&target)
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default()
    }
    
    fn modified_targets(&self) -> Vec<PropertyTarget> {
        self.entries
            .iter()
            .filter(|(_, properties)| !properties.is_empty())
            .map(|(target, _)| *target)
            .collect()
    }
}

/// Whether any pose field of a transform is modified
pub fn transform_pose_modified(overlay: &dyn PropertyOverlay, transform: ComponentId) -> bool {
    let properties = overlay.modified_properties(PropertyTarget::Component(transform));
    if properties.is_empty() {
        return false;
    }
    
    // TODO: treat pose curves that hold a single constant value as unmodified
    TRANSFORM_POSE_PROPERTIES
        .iter()
        .any(|property| properties.contains(*property))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    
    #[test]
    fn test_constant_bool_fallback_and_override() {
        let scene = Scene::new("Root");
        let target = PropertyTarget::Node(scene.root());
        let mut overlay = OverrideMap::new();
        
        assert_eq!(overlay.constant_bool(target, IS_ACTIVE, true), Some(true));
        
        overlay.set(target, IS_ACTIVE, OverrideValue::Bool(false));
        assert_eq!(overlay.constant_bool(target, IS_ACTIVE, true), Some(false));
        
        overlay.set(target, IS_ACTIVE, OverrideValue::Variable);
        assert_eq!(overlay.constant_bool(target, IS_ACTIVE, true), None);
        assert!(overlay.is_modified(target, IS_ACTIVE));
    }
    
    #[test]
    fn test_transform_pose_modified() {
        let scene = Scene::new("Root");
        let transform = scene.root_transform();
        let target = PropertyTarget::Component(transform);
        
        let unrelated = OverrideMap::new().with(target, "some_other_field", OverrideValue::Variable);
        assert!(!transform_pose_modified(&unrelated, transform));
        
        let animated = OverrideMap::new().with(target, "local_scale.y", OverrideValue::Float(2.0));
        assert!(transform_pose_modified(&animated, transform));
    }
}
