//! Scene model
//!
//! Provides the hierarchy the collector analyzes and rewrites:
//!
//! ```text
//! Scene (arena)
//!   └─ Node ── Transform (implicit, always first)
//!        ├─ Component (Behaviour / Renderer / Collider / ...)
//!        └─ children ...
//! ```
//!
//! The [`document`] submodule loads a whole analysis input (hierarchy,
//! dependency edges and overrides) from RON.

mod component;
mod node;
#[allow(clippy::module_inception)]
mod scene;
pub mod document;

pub use component::{Component, ComponentKind, FieldValue};
pub use node::Node;
pub use scene::{Scene, SceneError, TRANSFORM_TYPE_NAME};
