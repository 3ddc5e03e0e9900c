//! Bone-merge qualification
//!
//! After the sweep, walks the hierarchy bottom-up and annotates every
//! structural-only node that can be folded into its parent without changing
//! runtime behavior. Nothing is deleted here; the flattening itself is done
//! by a later transform that reads [`Node::merge_bone`](crate::scene::Node::merge_bone).

use std::collections::HashSet;

use super::mark::MarkResult;
use crate::dependency::MERGEABLE_USAGES;
use crate::foundation::collections::NodeId;
use crate::foundation::math::scaled_evenly;
use crate::overlay::{transform_pose_modified, PropertyOverlay, PropertyTarget, IS_ACTIVE};
use crate::scene::Scene;

/// Bottom-up qualifier for one scene
pub struct MergeBoneQualifier<'a> {
    overlay: &'a dyn PropertyOverlay,
    marks: &'a MarkResult,
    visited: HashSet<NodeId>,
    merged: Vec<NodeId>,
}

impl<'a> MergeBoneQualifier<'a> {
    /// Create a qualifier over the marks of a finished mark phase
    pub fn new(overlay: &'a dyn PropertyOverlay, marks: &'a MarkResult) -> Self {
        Self {
            overlay,
            marks,
            visited: HashSet::new(),
            merged: Vec::new(),
        }
    }
    
    /// Annotate every eligible node and return them in post-order
    pub fn configure(mut self, scene: &mut Scene) -> Vec<NodeId> {
        let root = scene.root();
        self.can_merge(scene, root);
        log::info!("{} nodes qualified for bone merging", self.merged.len());
        self.merged
    }
    
    /// Decide one node after deciding all of its children
    fn can_merge(&mut self, scene: &mut Scene, node: NodeId) -> bool {
        if !self.visited.insert(node) {
            log::warn!("Node {node:?} reached twice while qualifying bone merges; refusing to merge it");
            return false;
        }
        
        let children = scene.children(node).to_vec();
        let mut merged_children = true;
        for child in &children {
            merged_children &= self.can_merge(scene, *child);
        }
        
        if !self.qualifies(scene, node, &children, merged_children) {
            return false;
        }
        
        if let Some(existing) = scene.node(node) {
            if !existing.merge_bone() {
                if let Err(err) = scene.set_merge_bone(node) {
                    log::warn!("Failed to annotate {node:?}: {err}");
                    return false;
                }
                self.merged.push(node);
            }
        }
        true
    }
    
    fn qualifies(&self, scene: &Scene, node_id: NodeId, children: &[NodeId], merged_children: bool) -> bool {
        let Some(node) = scene.node(node_id) else {
            return false;
        };
        
        if node.merge_bone() {
            return true;
        }
        // nothing above the root to fold into
        if node_id == scene.root() {
            return false;
        }
        // transform only
        if node.components().len() != 1 {
            return false;
        }
        let transform = node.transform();
        let Some(record) = self.marks.record(transform) else {
            return false;
        };
        if !MERGEABLE_USAGES.contains(record.reasons) {
            return false;
        }
        if transform_pose_modified(self.overlay, transform) {
            return false;
        }
        
        if !merged_children {
            if self.overlay.is_modified(PropertyTarget::Node(node_id), IS_ACTIVE) {
                return false;
            }
            
            if !node.local_transform.is_identity() {
                let child_pose_modified = children.iter().any(|child| {
                    scene
                        .transform_of(*child)
                        .is_some_and(|t| transform_pose_modified(self.overlay, t))
                });
                if child_pose_modified {
                    return false;
                }
                if !scaled_evenly(&node.local_transform.scale) {
                    return false;
                }
            }
        }
        
        true
    }
}

/// Run the qualifier from the root of `scene`
pub fn configure_merge_bone(scene: &mut Scene, overlay: &dyn PropertyOverlay, marks: &MarkResult) -> Vec<NodeId> {
    MergeBoneQualifier::new(overlay, marks).configure(scene)
}
