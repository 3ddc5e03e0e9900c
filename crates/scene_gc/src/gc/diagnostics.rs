//! Diagnostic snapshot mode
//!
//! Records every input the mark phase would act on (activeness, entry-point
//! flag, outgoing and incoming edges) instead of deleting anything. Meant for
//! offline inspection of why a component was or was not kept.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::activeness::{Activeness, ActivenessResolver};
use super::entry_points::collect_entry_points;
use crate::dependency::{DependencyFlags, DependencyGraph, DependencyKind};
use crate::foundation::collections::{ComponentId, NodeId};
use crate::overlay::PropertyOverlay;
use crate::scene::Scene;

/// Activeness as shown to a human
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivenessLabel {
    /// Never active
    False,
    /// Always active
    True,
    /// Changes at runtime or cannot be determined
    Variable,
}

impl From<Activeness> for ActivenessLabel {
    fn from(activeness: Activeness) -> Self {
        match activeness {
            Activeness::False => Self::False,
            Activeness::True => Self::True,
            Activeness::Unknown => Self::Variable,
        }
    }
}

/// One end of an edge as seen from a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyInfo {
    /// Component on the other end
    pub component: ComponentId,
    /// Conditions of the edge
    pub flags: DependencyFlags,
    /// Reason of the edge
    pub kind: DependencyKind,
}

/// Everything recorded about one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Component identity
    pub component: ComponentId,
    /// Concrete type label
    pub type_name: String,
    /// Resolved activeness
    pub activeness: ActivenessLabel,
    /// Whether the component seeds the mark phase
    pub entrypoint: bool,
    /// Edges leaving this component
    pub dependencies: Vec<DependencyInfo>,
    /// Edges arriving at this component
    pub dependants: Vec<DependencyInfo>,
}

/// Records of all components of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node identity
    pub node: NodeId,
    /// Node name at snapshot time
    pub name: String,
    /// Per-component records, transform first
    pub components: Vec<ComponentRecord>,
}

/// Inspectable result of a diagnostic run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GcSnapshot {
    /// Per-node records in breadth-first order
    pub nodes: Vec<NodeRecord>,
}

impl GcSnapshot {
    /// Records of one node
    pub fn node(&self, node: NodeId) -> Option<&NodeRecord> {
        self.nodes.iter().find(|record| record.node == node)
    }
    
    /// Record of one component
    pub fn component(&self, component: ComponentId) -> Option<&ComponentRecord> {
        self.nodes
            .iter()
            .flat_map(|node| node.components.iter())
            .find(|record| record.component == component)
    }
    
    /// Total number of component records
    pub fn component_count(&self) -> usize {
        self.nodes.iter().map(|node| node.components.len()).sum()
    }
}

/// Snapshot the mark-phase inputs without touching the scene
pub fn collect_gc_data(
    scene: &Scene,
    overlay: &dyn PropertyOverlay,
    graph: &DependencyGraph,
    exclusions: &HashSet<NodeId>,
) -> GcSnapshot {
    let mut resolver = ActivenessResolver::new(scene, overlay);
    
    let entrypoints: HashSet<ComponentId> = collect_entry_points(scene, graph, &mut resolver, exclusions)
        .into_iter()
        .map(|entry| entry.component)
        .collect();
    
    let mut dependants: HashMap<ComponentId, Vec<DependencyInfo>> = HashMap::new();
    for component in scene.component_ids() {
        for (&dependency, edge) in &graph.dependencies(component).dependencies {
            if scene.contains_component(dependency) {
                dependants.entry(dependency).or_default().push(DependencyInfo {
                    component,
                    flags: edge.flags,
                    kind: edge.kind,
                });
            }
        }
    }
    
    let mut nodes = Vec::new();
    for node in scene.subtree(scene.root()) {
        let mut components = Vec::new();
        for &component in scene.components_of(node) {
            let mut dependencies: Vec<DependencyInfo> = graph
                .dependencies(component)
                .dependencies
                .iter()
                .map(|(&target, edge)| DependencyInfo {
                    component: target,
                    flags: edge.flags,
                    kind: edge.kind,
                })
                .collect();
            dependencies.sort_by_key(|info| info.component);
            
            let mut incoming = dependants.remove(&component).unwrap_or_default();
            incoming.sort_by_key(|info| info.component);
            
            components.push(ComponentRecord {
                component,
                type_name: scene
                    .component(component)
                    .map(|c| c.type_name.clone())
                    .unwrap_or_default(),
                activeness: resolver.resolve(component).into(),
                entrypoint: entrypoints.contains(&component),
                dependencies,
                dependants: incoming,
            });
        }
        
        nodes.push(NodeRecord {
            node,
            name: scene.node(node).map(|n| n.name.clone()).unwrap_or_default(),
            components,
        });
    }
    
    log::info!("Collected diagnostic records for {} nodes", nodes.len());
    GcSnapshot { nodes }
}
