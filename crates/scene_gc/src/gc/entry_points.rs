//! Entry-point set construction
//!
//! Seeds for the mark phase are the natural entry-point components of every
//! node that can be active, plus every component of an excluded node.

use std::collections::{HashSet, VecDeque};

use super::activeness::ActivenessResolver;
use crate::dependency::DependencyGraph;
use crate::foundation::collections::{ComponentId, NodeId};
use crate::scene::Scene;

/// One initial worklist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryPoint {
    /// Seed component
    pub component: ComponentId,
    /// Whether the seed itself might be enabled
    pub can_be_active: bool,
}

/// Nodes that are not provably disabled, breadth-first from the root
///
/// A node resolved to `False` is pruned together with its whole subtree.
pub fn active_able_nodes(scene: &Scene, resolver: &mut ActivenessResolver<'_>) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut queue = VecDeque::from([scene.root()]);
    
    while let Some(node) = queue.pop_front() {
        if !resolver.resolve_node(node).can_be_active() {
            log::trace!("Pruning never-active subtree at {node:?}");
            continue;
        }
        result.push(node);
        queue.extend(scene.children(node).iter().copied());
    }
    
    result
}

/// Build the initial worklist
///
/// Natural entry points come first in breadth-first node order, followed by
/// the components of excluded nodes. A component can appear in both groups;
/// the mark phase deduplicates.
pub fn collect_entry_points(
    scene: &Scene,
    graph: &DependencyGraph,
    resolver: &mut ActivenessResolver<'_>,
    exclusions: &HashSet<NodeId>,
) -> Vec<EntryPoint> {
    let mut entry_points = Vec::new();
    
    for node in active_able_nodes(scene, resolver) {
        for &component in scene.components_of(node) {
            if graph.dependencies(component).entrypoint {
                entry_points.push(EntryPoint {
                    component,
                    can_be_active: resolver.resolve(component).can_be_active(),
                });
            }
        }
    }
    
    for &node in exclusions {
        if !scene.contains_node(node) {
            log::debug!("Excluded node {node:?} is not part of the scene");
            continue;
        }
        for &component in scene.components_of(node) {
            entry_points.push(EntryPoint {
                component,
                can_be_active: resolver.resolve(component).can_be_active(),
            });
        }
    }
    
    log::debug!("Collected {} entry points", entry_points.len());
    entry_points
}
