//! Component dependency graph
//!
//! The graph is produced by an external [`UsageCollector`] that knows, per
//! component type, what each component needs at runtime. The collector
//! itself is opaque to this crate; the mark phase only consumes the finished
//! [`DependencyGraph`], which is read-only for the whole pass.

use std::collections::HashMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::collections::ComponentId;
use crate::scene::Scene;

bitflags! {
    /// Conditions under which a dependency edge holds
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DependencyFlags: u8 {
        /// The dependency is needed even when the dependent can never be active
        const MAY_EXIST_WHILE_DEPENDENT_DISABLED = 1 << 0;
        /// The dependency is needed even when it can never be active itself
        const MAY_EXIST_WHILE_DEPENDENCY_DISABLED = 1 << 1;
    }
}

bitflags! {
    /// Why a dependency exists; unioned into the keep-reason mask of its target
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DependencyKind: u16 {
        /// Generic usage
        const NORMAL = 1 << 0;
        /// Used as a skinning bone
        const BONE = 1 << 1;
        /// Used as the parent of another transform
        const PARENT = 1 << 2;
        /// A component depends on the transform it is attached to
        const COMPONENT_TO_TRANSFORM = 1 << 3;
        /// Provides mesh data
        const MESH = 1 << 4;
        /// Provides material or texture bindings
        const MATERIAL = 1 << 5;
        /// Source or target of a constraint
        const CONSTRAINT = 1 << 6;
        /// Part of a physics bone chain
        const PHYS_BONE = 1 << 7;
    }
}

/// Usages that still allow a transform to be folded into its parent
pub const MERGEABLE_USAGES: DependencyKind = DependencyKind::BONE
    .union(DependencyKind::PARENT)
    .union(DependencyKind::COMPONENT_TO_TRANSFORM);

/// Condition and reason attached to one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Conditions under which the edge holds
    pub flags: DependencyFlags,
    /// Reason for the dependency
    pub kind: DependencyKind,
}

impl DependencyEdge {
    /// Create an edge
    pub const fn new(flags: DependencyFlags, kind: DependencyKind) -> Self {
        Self { flags, kind }
    }
    
    /// Unconditional edge of the given kind
    pub const fn of_kind(kind: DependencyKind) -> Self {
        Self::new(DependencyFlags::empty(), kind)
    }
}

/// Everything the collector knows about one component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentDependencies {
    /// Kept whenever its node can be active, regardless of incoming edges
    pub entrypoint: bool,
    /// Outgoing edges keyed by dependency
    pub dependencies: HashMap<ComponentId, DependencyEdge>,
}

impl ComponentDependencies {
    /// Add an edge, merging with an existing edge to the same dependency
    ///
    /// Merged edges hold under the weaker of the two conditions and carry
    /// both kinds.
    pub fn add_dependency(&mut self, dependency: ComponentId, edge: DependencyEdge) {
        self.dependencies
            .entry(dependency)
            .and_modify(|existing| {
                existing.flags |= edge.flags;
                existing.kind |= edge.kind;
            })
            .or_insert(edge);
    }
}

/// Read-only dependency graph for one pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    records: HashMap<ComponentId, ComponentDependencies>,
    empty: ComponentDependencies,
}

impl DependencyGraph {
    /// Create a graph with no records
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Register a component as part of the analyzed hierarchy
    pub fn register(&mut self, component: ComponentId) -> &mut ComponentDependencies {
        self.records.entry(component).or_default()
    }
    
    /// Register every component of a scene
    pub fn register_scene(&mut self, scene: &Scene) {
        for component in scene.component_ids() {
            self.register(component);
        }
    }
    
    /// Flag a component as an entry point
    pub fn set_entrypoint(&mut self, component: ComponentId) {
        self.register(component).entrypoint = true;
    }
    
    /// Add a dependent → dependency edge, registering both ends
    pub fn add_dependency(&mut self, dependent: ComponentId, dependency: ComponentId, edge: DependencyEdge) {
        self.register(dependency);
        self.register(dependent).add_dependency(dependency, edge);
    }
    
    /// Record for a component; an empty record for unknown components
    pub fn dependencies(&self, component: ComponentId) -> &ComponentDependencies {
        self.records.get(&component).unwrap_or(&self.empty)
    }
    
    /// Record for a component, absent when it is outside the analyzed hierarchy
    pub fn try_dependencies(&self, component: ComponentId) -> Option<&ComponentDependencies> {
        self.records.get(&component)
    }
    
    /// Number of registered components
    pub fn len(&self) -> usize {
        self.records.len()
    }
    
    /// Whether no component is registered
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    
    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.records.values().map(|record| record.dependencies.len()).sum()
    }
}

/// Producer of the dependency graph
///
/// Implementations walk component-specific knowledge to enumerate edges.
/// `preserve_end_bone` asks the collector to keep leaf bones that nothing
/// skins to.
pub trait UsageCollector {
    /// Build the graph for `scene` once, before marking starts
    fn collect_all_usages(&self, scene: &Scene, preserve_end_bone: bool) -> DependencyGraph;
}

impl UsageCollector for DependencyGraph {
    fn collect_all_usages(&self, _scene: &Scene, _preserve_end_bone: bool) -> DependencyGraph {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Component, ComponentKind};
    
    #[test]
    fn test_unknown_component_gets_empty_record() {
        let scene = Scene::new("Root");
        let graph = DependencyGraph::new();
        
        let record = graph.dependencies(scene.root_transform());
        assert!(!record.entrypoint);
        assert!(record.dependencies.is_empty());
        assert!(graph.try_dependencies(scene.root_transform()).is_none());
    }
    
    #[test]
    fn test_duplicate_edges_merge() {
        let mut scene = Scene::new("Root");
        let root = scene.root();
        let renderer = scene
            .add_component(root, Component::new(ComponentKind::Renderer, "SkinnedMeshRenderer"))
            .unwrap();
        let transform = scene.root_transform();
        
        let mut graph = DependencyGraph::new();
        graph.add_dependency(renderer, transform, DependencyEdge::of_kind(DependencyKind::BONE));
        graph.add_dependency(
            renderer,
            transform,
            DependencyEdge::new(
                DependencyFlags::MAY_EXIST_WHILE_DEPENDENT_DISABLED,
                DependencyKind::COMPONENT_TO_TRANSFORM,
            ),
        );
        
        let edge = graph.dependencies(renderer).dependencies[&transform];
        assert_eq!(edge.kind, DependencyKind::BONE | DependencyKind::COMPONENT_TO_TRANSFORM);
        assert_eq!(edge.flags, DependencyFlags::MAY_EXIST_WHILE_DEPENDENT_DISABLED);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edge_count(), 1);
    }
    
    #[test]
    fn test_mergeable_usages() {
        assert!(MERGEABLE_USAGES.contains(DependencyKind::BONE | DependencyKind::PARENT));
        assert!(!MERGEABLE_USAGES.contains(DependencyKind::NORMAL));
    }
}
