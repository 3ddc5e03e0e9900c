//! Integration tests for the collector pipeline
//!
//! Scenario tests build small hierarchies by hand; property tests check the
//! invariants the mark phase must hold on a larger generated hierarchy.

mod scenarios;

use crate::dependency::{DependencyEdge, DependencyFlags, DependencyGraph, DependencyKind};
use crate::foundation::collections::{ComponentId, NodeId};
use crate::scene::{Component, ComponentKind, Scene};

/// Scene plus graph under construction
struct Fixture {
    scene: Scene,
    graph: DependencyGraph,
}

impl Fixture {
    fn new() -> Self {
        let scene = Scene::new("Avatar");
        let mut graph = DependencyGraph::new();
        graph.register_scene(&scene);
        Self { scene, graph }
    }
    
    fn root(&self) -> NodeId {
        self.scene.root()
    }
    
    fn node(&mut self, parent: NodeId, name: &str) -> NodeId {
        let node = self.scene.add_node(parent, name).unwrap();
        self.graph.register(self.scene.transform_of(node).unwrap());
        node
    }
    
    fn transform(&self, node: NodeId) -> ComponentId {
        self.scene.transform_of(node).unwrap()
    }
    
    fn component(&mut self, node: NodeId, kind: ComponentKind, enabled: bool) -> ComponentId {
        let id = self
            .scene
            .add_component(node, Component::new(kind, format!("{kind:?}")).with_enabled(enabled))
            .unwrap();
        self.graph.register(id);
        id
    }
    
    fn entrypoint(&mut self, component: ComponentId) {
        self.graph.set_entrypoint(component);
    }
    
    fn edge(&mut self, from: ComponentId, to: ComponentId, kind: DependencyKind, flags: DependencyFlags) {
        self.graph.add_dependency(from, to, DependencyEdge::new(flags, kind));
    }
    
    /// Parent edges the way a collector reports the hierarchy itself
    fn parent_edges(&mut self) {
        for node in self.scene.node_ids() {
            if let Some(parent) = self.scene.parent(node) {
                let child = self.transform(node);
                let parent = self.transform(parent);
                self.edge(child, parent, DependencyKind::PARENT, DependencyFlags::empty());
            }
        }
    }
}
