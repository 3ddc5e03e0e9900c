//! Three-valued activeness resolution
//!
//! Predicts, per component, whether it can be enabled at runtime. The answer
//! is `True` only when the component and every ancestor are pinned on,
//! `False` as soon as anything above it (or it) is pinned off, and `Unknown`
//! otherwise. Results are memoized for the run; a node's answer depends only
//! on its ancestors and its own flag.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::foundation::collections::{ComponentId, NodeId};
use crate::overlay::{PropertyOverlay, PropertyTarget, ENABLED, IS_ACTIVE};
use crate::scene::{ComponentKind, Scene};

/// Activeness lattice value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activeness {
    /// Provably enabled
    True,
    /// Provably disabled
    False,
    /// Depends on values unknown at analysis time
    Unknown,
}

impl Activeness {
    /// Lift an optional constant into the lattice
    pub const fn from_constant(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::True,
            Some(false) => Self::False,
            None => Self::Unknown,
        }
    }
    
    /// Combine a parent's activeness with a local flag; `False` dominates
    pub const fn combine(parent: Self, local: Self) -> Self {
        match (parent, local) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Unknown,
        }
    }
    
    /// Whether the component might be enabled at some point
    pub fn can_be_active(self) -> bool {
        self != Self::False
    }
}

/// Memoizing resolver scoped to one pass over one scene
pub struct ActivenessResolver<'a> {
    scene: &'a Scene,
    overlay: &'a dyn PropertyOverlay,
    cache: HashMap<ComponentId, Activeness>,
    resolving: HashSet<ComponentId>,
}

impl<'a> ActivenessResolver<'a> {
    /// Create a resolver with an empty cache
    pub fn new(scene: &'a Scene, overlay: &'a dyn PropertyOverlay) -> Self {
        Self {
            scene,
            overlay,
            cache: HashMap::new(),
            resolving: HashSet::new(),
        }
    }
    
    /// Resolved activeness of a component
    pub fn resolve(&mut self, component: ComponentId) -> Activeness {
        if let Some(activeness) = self.cache.get(&component) {
            return *activeness;
        }
        
        if !self.resolving.insert(component) {
            log::warn!("Cyclic hierarchy while resolving activeness of {component:?}; treating as unknown");
            return Activeness::Unknown;
        }
        let activeness = self.compute(component);
        self.resolving.remove(&component);
        
        self.cache.insert(component, activeness);
        activeness
    }
    
    /// Resolved activeness of a node's transform
    pub fn resolve_node(&mut self, node: NodeId) -> Activeness {
        self.scene
            .transform_of(node)
            .map_or(Activeness::Unknown, |transform| self.resolve(transform))
    }
    
    fn compute(&mut self, component_id: ComponentId) -> Activeness {
        let scene = self.scene;
        if component_id == scene.root_transform() {
            return Activeness::True;
        }
        
        let Some(component) = scene.component(component_id) else {
            log::debug!("Component {component_id:?} is not part of the scene; activeness unknown");
            return Activeness::Unknown;
        };
        let node_id = component.node();
        
        let parent = if component.is_transform() {
            match scene.parent(node_id).and_then(|parent| scene.transform_of(parent)) {
                Some(parent_transform) => self.resolve(parent_transform),
                None => Activeness::True,
            }
        } else {
            self.resolve_node(node_id)
        };
        if parent == Activeness::False {
            return Activeness::False;
        }
        
        let local = match component.kind {
            ComponentKind::Transform => {
                let active_self = scene.node(node_id).map_or(true, |node| node.active_self);
                Activeness::from_constant(self.overlay.constant_bool(
                    PropertyTarget::Node(node_id),
                    IS_ACTIVE,
                    active_self,
                ))
            }
            kind if kind.has_enabled_flag() => Activeness::from_constant(self.overlay.constant_bool(
                PropertyTarget::Component(component_id),
                ENABLED,
                component.enabled,
            )),
            ComponentKind::Unknown => Activeness::Unknown,
            // kinds without an enable toggle
            _ => Activeness::True,
        };
        
        Activeness::combine(parent, local)
    }
}
