//! Specialized collection types
//!
//! Nodes and components live in slot maps so that handles stay valid (and
//! detectably stale) while the sweep phase removes entries.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a scene node
    pub struct NodeId;

    /// Stable handle to a component attached to a node
    pub struct ComponentId;
}

/// Handle-based map keyed by node handles
pub type NodeMap<T> = SlotMap<NodeId, T>;

/// Handle-based map keyed by component handles
pub type ComponentMap<T> = SlotMap<ComponentId, T>;
