//! Unused object collection
//!
//! Entry point of the crate. [`FindUnusedObjects`] runs one of three modes
//! over a scene:
//!
//! ```text
//! overlay + scene ──► ActivenessResolver ──► entry points ──► ReachabilityEngine
//!                                                                  │
//!                        ┌─────────────── gc_debug ────────────────┤
//!                        ▼                                         ▼
//!                  GcSnapshot                                    sweep ──► MergeBoneQualifier
//! ```
//!
//! `use_legacy_gc` replaces the whole pipeline with the payload-scanning
//! [`legacy`] collector.

pub mod activeness;
pub mod diagnostics;
pub mod entry_points;
pub mod legacy;
pub mod mark;
pub mod merge_bone;
pub mod sweep;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::dependency::UsageCollector;
use crate::foundation::collections::NodeId;
use crate::overlay::PropertyOverlay;
use crate::scene::Scene;

pub use activeness::{Activeness, ActivenessResolver};
pub use diagnostics::{ActivenessLabel, ComponentRecord, DependencyInfo, GcSnapshot, NodeRecord};
pub use entry_points::EntryPoint;
pub use legacy::{PayloadReferenceWalker, ReferenceEnumerator};
pub use mark::{KeepRecord, MarkResult, MarkState, ReachabilityEngine};
pub use sweep::SweepStats;

/// Options recognized by the collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcOptions {
    /// Ask the dependency collector to keep leaf bones
    pub preserve_end_bone: bool,
    /// Run the payload-scanning legacy collector instead
    pub use_legacy_gc: bool,
    /// Skip bone-merge qualification
    pub no_configure_merge_bone: bool,
    /// Record diagnostics instead of sweeping
    pub gc_debug: bool,
    /// Component types that keep their whole subtree on the legacy path
    pub legacy_subtree_types: Vec<String>,
}

impl Default for GcOptions {
    fn default() -> Self {
        Self {
            preserve_end_bone: false,
            use_legacy_gc: false,
            no_configure_merge_bone: false,
            gc_debug: false,
            legacy_subtree_types: vec![legacy::DEFAULT_SUBTREE_TYPE.to_string()],
        }
    }
}

impl Config for GcOptions {}

impl GcOptions {
    /// Mode selected by these options; legacy wins over debug
    pub fn mode(&self) -> GcMode {
        if self.use_legacy_gc {
            GcMode::Legacy
        } else if self.gc_debug {
            GcMode::Debug
        } else {
            GcMode::MarkAndSweep
        }
    }
}

/// Which pipeline ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GcMode {
    /// Precise mark and sweep, optionally followed by bone merging
    MarkAndSweep,
    /// Payload-scanning node collector
    Legacy,
    /// Diagnostic snapshot, nothing removed
    Debug,
}

/// Outcome of one pass
#[derive(Debug, Clone, PartialEq)]
pub struct GcReport {
    /// Pipeline that ran
    pub mode: GcMode,
    /// Nodes removed
    pub removed_nodes: usize,
    /// Components removed, transforms included
    pub removed_components: usize,
    /// Nodes annotated for bone merging, in post-order
    pub merged_nodes: Vec<NodeId>,
    /// Marks of the precise path
    pub marks: Option<MarkResult>,
    /// Records of the debug path
    pub snapshot: Option<GcSnapshot>,
}

impl GcReport {
    fn new(mode: GcMode) -> Self {
        Self {
            mode,
            removed_nodes: 0,
            removed_components: 0,
            merged_nodes: Vec::new(),
            marks: None,
            snapshot: None,
        }
    }
}

/// One invocation of the unused-object collector
pub struct FindUnusedObjects<'a> {
    overlay: &'a dyn PropertyOverlay,
    options: GcOptions,
    exclusions: HashSet<NodeId>,
    enumerator: Option<Box<dyn ReferenceEnumerator + 'a>>,
}

impl<'a> FindUnusedObjects<'a> {
    /// Create a pass with no exclusions
    pub fn new(overlay: &'a dyn PropertyOverlay, options: GcOptions) -> Self {
        Self {
            overlay,
            options,
            exclusions: HashSet::new(),
            enumerator: None,
        }
    }
    
    /// Builder pattern: Nodes whose components are always kept
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: impl IntoIterator<Item = NodeId>) -> Self {
        self.exclusions.extend(exclusions);
        self
    }
    
    /// Builder pattern: Replace the legacy reference enumerator
    #[must_use]
    pub fn with_reference_enumerator(mut self, enumerator: Box<dyn ReferenceEnumerator + 'a>) -> Self {
        self.enumerator = Some(enumerator);
        self
    }
    
    /// Options of this pass
    pub fn options(&self) -> &GcOptions {
        &self.options
    }
    
    /// Run the selected mode over `scene`
    pub fn process(&self, scene: &mut Scene, collector: &dyn UsageCollector) -> GcReport {
        let mode = self.options.mode();
        log::info!(
            "Collecting unused objects ({mode:?}) over {} nodes / {} components",
            scene.node_count(),
            scene.component_count()
        );
        
        match mode {
            GcMode::Legacy => self.process_legacy(scene),
            GcMode::Debug => self.collect_data_for_gc(scene, collector),
            GcMode::MarkAndSweep => self.process_new(scene, collector),
        }
    }
    
    /// Mark phase only; the scene is left untouched
    pub fn mark(&self, scene: &Scene, collector: &dyn UsageCollector) -> MarkResult {
        let graph = collector.collect_all_usages(scene, self.options.preserve_end_bone);
        log::debug!("Dependency graph: {} components, {} edges", graph.len(), graph.edge_count());
        
        let mut resolver = ActivenessResolver::new(scene, self.overlay);
        let entry_points = entry_points::collect_entry_points(scene, &graph, &mut resolver, &self.exclusions);
        
        let mut engine = ReachabilityEngine::new(&graph, &mut resolver);
        engine.seed_all(entry_points);
        engine.finish()
    }
    
    fn process_new(&self, scene: &mut Scene, collector: &dyn UsageCollector) -> GcReport {
        let mut report = GcReport::new(GcMode::MarkAndSweep);
        
        let marks = self.mark(scene, collector);
        let stats = sweep::sweep(scene, &marks);
        report.removed_nodes = stats.removed_nodes;
        report.removed_components = stats.removed_components;
        
        if !self.options.no_configure_merge_bone {
            report.merged_nodes = merge_bone::configure_merge_bone(scene, self.overlay, &marks);
        }
        
        report.marks = Some(marks);
        report
    }
    
    fn collect_data_for_gc(&self, scene: &Scene, collector: &dyn UsageCollector) -> GcReport {
        let graph = collector.collect_all_usages(scene, self.options.preserve_end_bone);
        let mut report = GcReport::new(GcMode::Debug);
        report.snapshot = Some(diagnostics::collect_gc_data(scene, self.overlay, &graph, &self.exclusions));
        report
    }
    
    fn process_legacy(&self, scene: &mut Scene) -> GcReport {
        let default_walker;
        let enumerator: &dyn ReferenceEnumerator = match &self.enumerator {
            Some(enumerator) => enumerator.as_ref(),
            None => {
                default_walker = PayloadReferenceWalker::new(self.options.legacy_subtree_types.iter().cloned());
                &default_walker
            }
        };
        
        let referenced = legacy::legacy_referenced_nodes(scene, self.overlay, &self.exclusions, enumerator);
        let (removed_nodes, removed_components) = legacy::legacy_sweep(scene, &referenced);
        log::info!("Legacy sweep removed {removed_nodes} nodes and {removed_components} components");
        
        let mut report = GcReport::new(GcMode::Legacy);
        report.removed_nodes = removed_nodes;
        report.removed_components = removed_components;
        report
    }
}
