//! # Scene GC
//!
//! Finds the nodes and components of a scene hierarchy that can never
//! matter at runtime and removes them.
//!
//! ## Features
//!
//! - **Three-valued activeness**: every component is proven enabled, proven
//!   disabled, or unknown, taking pending overrides into account
//! - **Conditional reachability**: a mark-and-sweep over an externally built
//!   dependency graph whose edges only hold under stated conditions
//! - **Bone merging**: inert structural nodes are annotated for folding into
//!   their parent
//! - **Diagnostics**: the same analysis, recorded instead of applied
//! - **Legacy mode**: a coarse payload-scanning collector for compatibility
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_gc::prelude::*;
//!
//! let mut scene = Scene::new("Avatar");
//! let root = scene.root();
//! let body = scene
//!     .add_component(root, Component::new(ComponentKind::Renderer, "SkinnedMeshRenderer"))
//!     .unwrap();
//! let unused = scene.add_node(root, "Unused").unwrap();
//!
//! let mut graph = DependencyGraph::new();
//! graph.register_scene(&scene);
//! graph.set_entrypoint(body);
//! graph.add_dependency(
//!     body,
//!     scene.root_transform(),
//!     DependencyEdge::of_kind(DependencyKind::COMPONENT_TO_TRANSFORM),
//! );
//!
//! let overlay = OverrideMap::new();
//! let report = FindUnusedObjects::new(&overlay, GcOptions::default()).process(&mut scene, &graph);
//!
//! assert_eq!(report.removed_nodes, 1);
//! assert!(!scene.contains_node(unused));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod scene;
pub mod overlay;
pub mod dependency;
pub mod gc;

/// Common imports for collector users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        dependency::{
            ComponentDependencies, DependencyEdge, DependencyFlags, DependencyGraph, DependencyKind,
            UsageCollector,
        },
        foundation::{
            collections::{ComponentId, NodeId},
            math::{Quat, Transform, Vec3},
        },
        gc::{
            Activeness, ActivenessResolver, FindUnusedObjects, GcMode, GcOptions, GcReport, GcSnapshot,
            MarkResult, ReferenceEnumerator,
        },
        overlay::{OverrideMap, OverrideValue, PropertyOverlay, PropertyTarget},
        scene::{
            document::{LoadedScene, SceneDocument},
            Component, ComponentKind, FieldValue, Scene, SceneError,
        },
    };
}
