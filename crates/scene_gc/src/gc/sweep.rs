//! Sweep phase
//!
//! Deletes everything the mark phase did not reach. Marks are final before
//! the first deletion, so deletion order is irrelevant.

use super::mark::MarkResult;
use crate::scene::Scene;

/// What a sweep removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Nodes removed, descendants of removed nodes included
    pub removed_nodes: usize,
    /// Components removed, transforms included
    pub removed_components: usize,
}

/// Remove every unmarked component
///
/// An unmarked transform takes its whole node (and subtree) with it. The root
/// node is never removed; only its unmarked non-structural components are.
pub fn sweep(scene: &mut Scene, marks: &MarkResult) -> SweepStats {
    let components_before = scene.component_count();
    let mut stats = SweepStats::default();
    
    for component in scene.component_ids() {
        if marks.is_marked(component) {
            continue;
        }
        // already gone with an earlier node
        let Some(node) = scene.node_of(component) else {
            continue;
        };
        let is_transform = scene.component(component).is_some_and(|c| c.is_transform());
        
        if !is_transform {
            if let Err(err) = scene.remove_component(component) {
                log::warn!("Failed to remove {component:?}: {err}");
            }
        } else if node == scene.root() {
            log::warn!("Root transform is unreachable; keeping the root node");
        } else {
            match scene.remove_node(node) {
                Ok(removed) => stats.removed_nodes += removed,
                Err(err) => log::warn!("Failed to remove node {node:?}: {err}"),
            }
        }
    }
    
    stats.removed_components = components_before - scene.component_count();
    log::info!(
        "Sweep removed {} nodes and {} components",
        stats.removed_nodes,
        stats.removed_components
    );
    stats
}
