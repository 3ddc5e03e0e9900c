//! Legacy reachability
//!
//! The older, coarser collector. It works on whole nodes, ignores activeness
//! conditions, and discovers references by scanning component payloads
//! instead of consulting the dependency graph. It keeps strictly more than
//! the precise path and is used when payload scanning is needed for
//! components the dependency collector does not understand.

use std::collections::{HashSet, VecDeque};

use crate::foundation::collections::{ComponentId, NodeId};
use crate::overlay::{PropertyOverlay, PropertyTarget, IS_ACTIVE};
use crate::scene::{ComponentKind, FieldValue, Scene};

/// Type name whose components keep their whole subtree alive by default
pub const DEFAULT_SUBTREE_TYPE: &str = "PhysBone";

/// Source of component-to-component references for the legacy path
pub trait ReferenceEnumerator {
    /// Every scene component `component` refers to
    fn enumerate_references(&self, scene: &Scene, component: ComponentId) -> Vec<ComponentId>;
    
    /// Whether `component` needs every descendant of its node
    fn retains_subtree(&self, _scene: &Scene, _component: ComponentId) -> bool {
        false
    }
}

/// Reference enumerator that walks the generic payload tree
#[derive(Debug, Clone)]
pub struct PayloadReferenceWalker {
    subtree_types: HashSet<String>,
}

impl Default for PayloadReferenceWalker {
    fn default() -> Self {
        Self::new([DEFAULT_SUBTREE_TYPE])
    }
}

impl PayloadReferenceWalker {
    /// Create a walker; components of the given types retain their subtree
    pub fn new<I, S>(subtree_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subtree_types: subtree_types.into_iter().map(Into::into).collect(),
        }
    }
    
    fn walk(value: &FieldValue, out: &mut Vec<ComponentId>) {
        match value {
            FieldValue::ComponentRef(Some(target)) => out.push(*target),
            FieldValue::List(items) => {
                for item in items {
                    Self::walk(item, out);
                }
            }
            FieldValue::Record(fields) => {
                for (_, field) in fields {
                    Self::walk(field, out);
                }
            }
            // persistent assets are never part of the scene
            FieldValue::AssetRef(_)
            | FieldValue::ComponentRef(None)
            | FieldValue::Null
            | FieldValue::Bool(_)
            | FieldValue::Int(_)
            | FieldValue::Float(_)
            | FieldValue::String(_)
            | FieldValue::Vector(_) => {}
        }
    }
}

impl ReferenceEnumerator for PayloadReferenceWalker {
    fn enumerate_references(&self, scene: &Scene, component: ComponentId) -> Vec<ComponentId> {
        let mut references = Vec::new();
        if let Some(component) = scene.component(component) {
            // parents are followed structurally, not through the payload
            if component.kind != ComponentKind::Transform {
                Self::walk(&component.payload, &mut references);
            }
        }
        references
    }
    
    fn retains_subtree(&self, scene: &Scene, component: ComponentId) -> bool {
        scene
            .component(component)
            .is_some_and(|c| self.subtree_types.contains(&c.type_name))
    }
}

struct LegacyMarker<'a> {
    scene: &'a Scene,
    referenced: HashSet<NodeId>,
    queue: VecDeque<NodeId>,
}

impl LegacyMarker<'_> {
    fn add(&mut self, node: NodeId) {
        if self.scene.contains_node(node) && self.referenced.insert(node) {
            self.queue.push_back(node);
        }
    }
}

/// Nodes the legacy path keeps
pub fn legacy_referenced_nodes(
    scene: &Scene,
    overlay: &dyn PropertyOverlay,
    exclusions: &HashSet<NodeId>,
    enumerator: &dyn ReferenceEnumerator,
) -> HashSet<NodeId> {
    let mut marker = LegacyMarker {
        scene,
        referenced: HashSet::new(),
        queue: VecDeque::new(),
    };
    
    for node in scene.node_ids() {
        if scene.active_in_hierarchy(node) {
            marker.add(node);
        }
    }
    
    // any activity override keeps the whole subtree
    for target in overlay.modified_targets() {
        let PropertyTarget::Node(node) = target else {
            continue;
        };
        if overlay.is_modified(target, IS_ACTIVE) {
            for descendant in scene.subtree(node) {
                marker.add(descendant);
            }
        }
    }
    
    for &node in exclusions {
        marker.add(node);
    }
    
    while let Some(node) = marker.queue.pop_front() {
        for &component in scene.components_of(node) {
            let is_transform = scene.component(component).is_some_and(|c| c.is_transform());
            if is_transform {
                if let Some(parent) = scene.parent(node) {
                    marker.add(parent);
                }
                continue;
            }
            
            if enumerator.retains_subtree(scene, component) {
                for descendant in scene.subtree(node) {
                    marker.add(descendant);
                }
            }
            
            for target in enumerator.enumerate_references(scene, component) {
                if let Some(target_node) = scene.node_of(target) {
                    marker.add(target_node);
                }
            }
        }
    }
    
    marker.referenced
}

/// Remove every node the legacy path does not keep; returns nodes and components removed
pub fn legacy_sweep(scene: &mut Scene, referenced: &HashSet<NodeId>) -> (usize, usize) {
    let components_before = scene.component_count();
    let mut removed_nodes = 0;
    
    for node in scene.node_ids() {
        if referenced.contains(&node) || !scene.contains_node(node) {
            continue;
        }
        match scene.remove_node(node) {
            Ok(count) => removed_nodes += count,
            Err(err) => log::warn!("Legacy sweep skipped {node:?}: {err}"),
        }
    }
    
    (removed_nodes, components_before - scene.component_count())
}
