//! Hand-built scenarios for each phase of the pipeline

use super::Fixture;
use crate::dependency::{DependencyFlags, DependencyKind};
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec3;
use crate::gc::{Activeness, ActivenessLabel, ActivenessResolver, FindUnusedObjects, GcMode, GcOptions};
use crate::overlay::{OverrideMap, OverrideValue, PropertyTarget, IS_ACTIVE};
use crate::scene::{ComponentKind, FieldValue};

const NONE: DependencyFlags = DependencyFlags::empty();

fn options_without_merge() -> GcOptions {
    GcOptions {
        no_configure_merge_bone: true,
        ..GcOptions::default()
    }
}

#[test]
fn test_disabled_parent_disables_subtree_and_sweeps_it() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let a = fx.node(root, "A");
    let b = fx.node(a, "B");
    fx.scene.node_mut(a).unwrap().active_self = false;
    let root_transform = fx.transform(root);
    fx.entrypoint(root_transform);
    fx.entrypoint(fx.transform(a));
    fx.entrypoint(fx.transform(b));
    
    let overlay = OverrideMap::new();
    {
        let mut resolver = ActivenessResolver::new(&fx.scene, &overlay);
        assert_eq!(resolver.resolve_node(a), Activeness::False);
        assert_eq!(resolver.resolve_node(b), Activeness::False);
    }
    
    let report = FindUnusedObjects::new(&overlay, options_without_merge()).process(&mut fx.scene, &fx.graph);
    
    assert_eq!(report.removed_nodes, 2);
    assert!(!fx.scene.contains_node(a));
    assert!(!fx.scene.contains_node(b));
}

#[test]
fn test_dependency_may_exist_while_disabled() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let c = fx.component(root, ComponentKind::Behaviour, true);
    let d = fx.component(root, ComponentKind::Behaviour, false);
    let strict = fx.component(root, ComponentKind::Behaviour, false);
    fx.entrypoint(fx.transform(root));
    fx.entrypoint(c);
    fx.edge(c, d, DependencyKind::NORMAL, DependencyFlags::MAY_EXIST_WHILE_DEPENDENCY_DISABLED);
    fx.edge(c, strict, DependencyKind::NORMAL, NONE);
    
    let overlay = OverrideMap::new();
    let marks = FindUnusedObjects::new(&overlay, GcOptions::default()).mark(&fx.scene, &fx.graph);
    
    assert!(marks.is_marked(d));
    assert!(!marks.record(d).unwrap().can_be_active);
    assert!(!marks.is_marked(strict));
}

#[test]
fn test_inactive_dependent_does_not_follow_strict_edges() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let other = fx.node(root, "Other");
    let e = fx.component(root, ComponentKind::Behaviour, false);
    let f = fx.component(other, ComponentKind::AlwaysEnabled, true);
    let g = fx.component(other, ComponentKind::AlwaysEnabled, true);
    fx.entrypoint(e);
    fx.edge(e, f, DependencyKind::NORMAL, NONE);
    fx.edge(e, g, DependencyKind::NORMAL, DependencyFlags::MAY_EXIST_WHILE_DEPENDENT_DISABLED);
    
    let overlay = OverrideMap::new();
    let marks = FindUnusedObjects::new(&overlay, GcOptions::default()).mark(&fx.scene, &fx.graph);
    
    let record = marks.record(e).unwrap();
    assert!(!record.can_be_active);
    assert_eq!(record.reasons, DependencyKind::NORMAL);
    assert!(!marks.is_marked(f));
    assert!(marks.is_marked(g));
}

#[test]
fn test_exclusions_are_forced_roots() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let g = fx.node(root, "G");
    let script = fx.component(g, ComponentKind::Behaviour, true);
    let collider = fx.component(g, ComponentKind::Collider, false);
    fx.entrypoint(fx.transform(root));
    
    let overlay = OverrideMap::new();
    let mut scene = fx.scene.clone();
    let report = FindUnusedObjects::new(&overlay, options_without_merge())
        .with_exclusions([g])
        .process(&mut scene, &fx.graph);
    
    let marks = report.marks.unwrap();
    assert!(marks.is_marked(fx.transform(g)));
    assert!(marks.is_marked(script));
    assert!(marks.is_marked(collider));
    assert_eq!(report.removed_nodes, 0);
    assert!(scene.contains_component(collider));
}

/// Avatar → Armature → Hips → Leaf, all used only as bones and parents
fn bone_chain() -> (Fixture, [NodeId; 3]) {
    let mut fx = Fixture::new();
    let root = fx.root();
    let armature = fx.node(root, "Armature");
    let hips = fx.node(armature, "Hips");
    let leaf = fx.node(hips, "Leaf");
    let body = fx.component(root, ComponentKind::Renderer, true);
    
    fx.entrypoint(fx.transform(root));
    fx.entrypoint(body);
    for bone in [armature, hips, leaf] {
        let transform = fx.transform(bone);
        fx.edge(body, transform, DependencyKind::BONE, NONE);
    }
    fx.parent_edges();
    
    (fx, [armature, hips, leaf])
}

#[test]
fn test_inert_bone_chain_merges_bottom_up() {
    let (mut fx, [armature, hips, leaf]) = bone_chain();
    let overlay = OverrideMap::new();
    
    let report = FindUnusedObjects::new(&overlay, GcOptions::default()).process(&mut fx.scene, &fx.graph);
    
    assert_eq!(report.mode, GcMode::MarkAndSweep);
    assert_eq!(report.merged_nodes, vec![leaf, hips, armature]);
    assert!(fx.scene.node(hips).unwrap().merge_bone());
    // the root carries a renderer
    assert!(!fx.scene.node(fx.scene.root()).unwrap().merge_bone());
}

#[test]
fn test_non_uniform_scale_with_animated_child() {
    let (mut fx, [armature, hips, leaf]) = bone_chain();
    fx.scene.node_mut(hips).unwrap().local_transform.scale = Vec3::new(1.0, 2.0, 1.0);
    let overlay = OverrideMap::new().with(
        PropertyTarget::Component(fx.transform(leaf)),
        "local_position.x",
        OverrideValue::Variable,
    );
    
    let report = FindUnusedObjects::new(&overlay, GcOptions::default()).process(&mut fx.scene, &fx.graph);
    
    assert_eq!(report.merged_nodes, vec![armature]);
    assert!(!fx.scene.node(hips).unwrap().merge_bone());
}

#[test]
fn test_non_uniform_scale_with_merged_children() {
    let (mut fx, [armature, hips, leaf]) = bone_chain();
    fx.scene.node_mut(hips).unwrap().local_transform.scale = Vec3::new(1.0, 2.0, 1.0);
    let overlay = OverrideMap::new();
    
    let report = FindUnusedObjects::new(&overlay, GcOptions::default()).process(&mut fx.scene, &fx.graph);
    
    assert_eq!(report.merged_nodes, vec![leaf, hips, armature]);
}

#[test]
fn test_scale_rule_applies_when_a_child_stays() {
    let (mut fx, [_, hips, leaf]) = bone_chain();
    let particles = fx.component(leaf, ComponentKind::AlwaysEnabled, true);
    fx.entrypoint(particles);
    
    let mut uneven = fx.scene.clone();
    uneven.node_mut(hips).unwrap().local_transform.scale = Vec3::new(1.0, 2.0, 1.0);
    let mut even = fx.scene.clone();
    even.node_mut(hips).unwrap().local_transform.scale = Vec3::new(2.0, 2.0, 2.0);
    
    let overlay = OverrideMap::new();
    let gc = FindUnusedObjects::new(&overlay, GcOptions::default());
    
    let report = gc.process(&mut uneven, &fx.graph);
    assert!(!report.merged_nodes.contains(&leaf));
    assert!(!report.merged_nodes.contains(&hips));
    
    let report = gc.process(&mut even, &fx.graph);
    assert!(!report.merged_nodes.contains(&leaf));
    assert!(report.merged_nodes.contains(&hips));
}

#[test]
fn test_general_usage_blocks_merge() {
    let (mut fx, [armature, hips, leaf]) = bone_chain();
    let constraint = fx.component(fx.root(), ComponentKind::Behaviour, true);
    fx.entrypoint(constraint);
    fx.edge(constraint, fx.transform(hips), DependencyKind::NORMAL, NONE);
    
    let overlay = OverrideMap::new();
    let report = FindUnusedObjects::new(&overlay, GcOptions::default()).process(&mut fx.scene, &fx.graph);
    
    assert_eq!(report.merged_nodes, vec![leaf, armature]);
}

#[test]
fn test_activity_override_blocks_merge_only_above_unmerged_children() {
    let (mut fx, [armature, hips, leaf]) = bone_chain();
    let overlay = OverrideMap::new().with(PropertyTarget::Node(leaf), IS_ACTIVE, OverrideValue::Variable);
    let report = FindUnusedObjects::new(&overlay, GcOptions::default()).process(&mut fx.scene.clone(), &fx.graph);
    assert_eq!(report.merged_nodes, vec![leaf, hips, armature]);
    
    let particles = fx.component(leaf, ComponentKind::AlwaysEnabled, true);
    fx.entrypoint(particles);
    let overlay = OverrideMap::new().with(PropertyTarget::Node(hips), IS_ACTIVE, OverrideValue::Variable);
    let report = FindUnusedObjects::new(&overlay, GcOptions::default()).process(&mut fx.scene, &fx.graph);
    
    // Hips sits above the unmergeable leaf; Armature has no override of its own
    assert_eq!(report.merged_nodes, vec![armature]);
}

#[test]
fn test_merge_can_be_disabled() {
    let (mut fx, _) = bone_chain();
    let overlay = OverrideMap::new();
    
    let report = FindUnusedObjects::new(&overlay, options_without_merge()).process(&mut fx.scene, &fx.graph);
    
    assert!(report.merged_nodes.is_empty());
    assert!(fx.scene.node_ids().iter().all(|node| !fx.scene.node(*node).unwrap().merge_bone()));
}

#[test]
fn test_debug_mode_records_without_deleting() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let hidden = fx.node(root, "Hidden");
    fx.scene.node_mut(hidden).unwrap().active_self = false;
    let body = fx.component(root, ComponentKind::Renderer, true);
    let toggled = fx.component(root, ComponentKind::Behaviour, true);
    let hidden_script = fx.component(hidden, ComponentKind::Behaviour, true);
    fx.entrypoint(body);
    fx.entrypoint(hidden_script);
    fx.edge(body, fx.transform(hidden), DependencyKind::BONE, DependencyFlags::MAY_EXIST_WHILE_DEPENDENCY_DISABLED);
    
    let overlay = OverrideMap::new().with(PropertyTarget::Component(toggled), "enabled", OverrideValue::Variable);
    let options = GcOptions {
        gc_debug: true,
        ..GcOptions::default()
    };
    let nodes_before = fx.scene.node_count();
    let components_before = fx.scene.component_count();
    
    let report = FindUnusedObjects::new(&overlay, options).process(&mut fx.scene, &fx.graph);
    
    assert_eq!(report.mode, GcMode::Debug);
    assert_eq!(fx.scene.node_count(), nodes_before);
    assert_eq!(fx.scene.component_count(), components_before);
    
    let snapshot = report.snapshot.unwrap();
    assert_eq!(snapshot.component_count(), components_before);
    
    let body_record = snapshot.component(body).unwrap();
    assert!(body_record.entrypoint);
    assert_eq!(body_record.activeness, ActivenessLabel::True);
    assert_eq!(body_record.dependencies.len(), 1);
    
    let hidden_record = snapshot.component(fx.transform(hidden)).unwrap();
    assert_eq!(hidden_record.activeness, ActivenessLabel::False);
    assert_eq!(hidden_record.dependants.len(), 1);
    assert_eq!(hidden_record.dependants[0].component, body);
    assert_eq!(hidden_record.dependants[0].kind, DependencyKind::BONE);
    
    // flagged, but its node is never active
    assert!(!snapshot.component(hidden_script).unwrap().entrypoint);
    assert_eq!(snapshot.component(toggled).unwrap().activeness, ActivenessLabel::Variable);
    assert_eq!(snapshot.node(hidden).unwrap().name, "Hidden");
}

#[test]
fn test_debug_mode_flags_excluded_components_under_disabled_parent() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let hidden = fx.node(root, "Hidden");
    let kept = fx.node(hidden, "Kept");
    fx.scene.node_mut(hidden).unwrap().active_self = false;
    let kept_script = fx.component(kept, ComponentKind::Behaviour, true);
    let sibling_script = fx.component(hidden, ComponentKind::Behaviour, true);
    
    let overlay = OverrideMap::new();
    let options = GcOptions {
        gc_debug: true,
        ..GcOptions::default()
    };
    let report = FindUnusedObjects::new(&overlay, options)
        .with_exclusions([kept])
        .process(&mut fx.scene, &fx.graph);
    let snapshot = report.snapshot.unwrap();
    
    let kept_record = snapshot.node(kept).unwrap();
    assert_eq!(kept_record.components.len(), 2);
    for record in &kept_record.components {
        assert!(record.entrypoint, "{:?} should seed the mark phase", record.component);
        assert_eq!(record.activeness, ActivenessLabel::False);
    }
    assert_eq!(kept_record.components[1].component, kept_script);
    
    // the excluded node's disabled parent is still pruned
    assert!(!snapshot.component(sibling_script).unwrap().entrypoint);
    assert!(!snapshot.component(fx.transform(hidden)).unwrap().entrypoint);
}

#[test]
fn test_unreachable_root_is_never_merged() {
    let fx = Fixture::new();
    let mut scene = fx.scene.clone();
    let overlay = OverrideMap::new();
    
    let report = FindUnusedObjects::new(&overlay, GcOptions::default()).process(&mut scene, &fx.graph);
    
    assert!(!report.marks.unwrap().is_marked(fx.transform(fx.root())));
    assert!(report.merged_nodes.is_empty());
    assert!(!scene.node(scene.root()).unwrap().merge_bone());
}

#[test]
fn test_marked_root_is_never_merged() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let bone = fx.node(root, "Bone");
    let skin = fx.node(root, "Skin");
    let renderer = fx.component(skin, ComponentKind::Renderer, true);
    fx.entrypoint(renderer);
    fx.edge(renderer, fx.transform(bone), DependencyKind::BONE, NONE);
    fx.edge(renderer, fx.transform(skin), DependencyKind::COMPONENT_TO_TRANSFORM, NONE);
    fx.parent_edges();
    
    let overlay = OverrideMap::new();
    let report = FindUnusedObjects::new(&overlay, GcOptions::default()).process(&mut fx.scene, &fx.graph);
    
    assert!(report.marks.unwrap().is_marked(fx.transform(root)));
    assert_eq!(report.merged_nodes, vec![bone]);
    assert!(!fx.scene.node(root).unwrap().merge_bone());
}

#[test]
fn test_legacy_mode_keeps_referenced_nodes() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let hidden = fx.node(root, "Hidden");
    fx.scene.node_mut(hidden).unwrap().active_self = false;
    let target = fx.node(hidden, "Target");
    let dropped = fx.node(hidden, "Dropped");
    let script = fx.component(root, ComponentKind::Behaviour, true);
    let target_transform = fx.transform(target);
    fx.scene.component_mut(script).unwrap().payload = FieldValue::ComponentRef(Some(target_transform));
    
    let overlay = OverrideMap::new();
    let options = GcOptions {
        use_legacy_gc: true,
        gc_debug: true,
        ..GcOptions::default()
    };
    let report = FindUnusedObjects::new(&overlay, options).process(&mut fx.scene, &fx.graph);
    
    assert_eq!(report.mode, GcMode::Legacy);
    assert_eq!(report.removed_nodes, 1);
    assert!(report.merged_nodes.is_empty());
    assert!(fx.scene.contains_node(target));
    assert!(!fx.scene.contains_node(dropped));
}
