//! Mark phase
//!
//! Worklist fixpoint over the dependency graph. Each component moves
//! `Unvisited → Pending → Marked` at most once; later visits through other
//! edges only widen its keep-reason mask. Because the mask union is
//! idempotent and nothing is ever un-marked, the final mark set does not
//! depend on the order in which seeds or edges are processed.

use std::collections::{HashMap, HashSet, VecDeque};

use super::activeness::{Activeness, ActivenessResolver};
use super::entry_points::EntryPoint;
use crate::dependency::{DependencyFlags, DependencyGraph, DependencyKind};
use crate::foundation::collections::ComponentId;

/// Why and how a component is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeepRecord {
    /// Union of the dependency kinds that reached this component
    pub reasons: DependencyKind,
    /// Whether the component might be enabled, fixed when first enqueued
    pub can_be_active: bool,
}

/// Progress of one component through the mark phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkState {
    /// Not reached
    Unvisited,
    /// Reached, outgoing edges not yet followed
    Pending(DependencyKind),
    /// Reached and processed
    Marked(DependencyKind),
}

/// Final output of the mark phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkResult {
    records: HashMap<ComponentId, KeepRecord>,
}

impl MarkResult {
    /// Whether the component survives the sweep
    pub fn is_marked(&self, component: ComponentId) -> bool {
        self.records.contains_key(&component)
    }
    
    /// Keep record of a marked component
    pub fn record(&self, component: ComponentId) -> Option<&KeepRecord> {
        self.records.get(&component)
    }
    
    /// Keep-reason mask, empty for unmarked components
    pub fn reasons(&self, component: ComponentId) -> DependencyKind {
        self.records
            .get(&component)
            .map_or(DependencyKind::empty(), |record| record.reasons)
    }
    
    /// Number of marked components
    pub fn len(&self) -> usize {
        self.records.len()
    }
    
    /// Whether nothing was marked
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    
    /// Every marked component with its record
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &KeepRecord)> {
        self.records.iter().map(|(component, record)| (*component, record))
    }
}

/// Worklist engine for one pass
pub struct ReachabilityEngine<'g, 's> {
    graph: &'g DependencyGraph,
    resolver: &'g mut ActivenessResolver<'s>,
    records: HashMap<ComponentId, KeepRecord>,
    pending: VecDeque<(ComponentId, bool)>,
    processed: HashSet<ComponentId>,
    edges_inspected: usize,
}

impl<'g, 's> ReachabilityEngine<'g, 's> {
    /// Create an engine with an empty worklist
    pub fn new(graph: &'g DependencyGraph, resolver: &'g mut ActivenessResolver<'s>) -> Self {
        Self {
            graph,
            resolver,
            records: HashMap::new(),
            pending: VecDeque::new(),
            processed: HashSet::new(),
            edges_inspected: 0,
        }
    }
    
    /// Enqueue a root of the analysis
    ///
    /// Seeds are kept for a `NORMAL` reason no matter what their own
    /// activeness is; `can_be_active` only decides which of their edges are
    /// followed.
    pub fn seed(&mut self, entry: EntryPoint) {
        self.reach(entry.component, DependencyKind::NORMAL, entry.can_be_active);
    }
    
    /// Enqueue every entry point
    pub fn seed_all(&mut self, entries: impl IntoIterator<Item = EntryPoint>) {
        for entry in entries {
            self.seed(entry);
        }
    }
    
    fn reach(&mut self, component: ComponentId, kind: DependencyKind, can_be_active: bool) {
        if let Some(record) = self.records.get_mut(&component) {
            record.reasons |= kind;
            return;
        }
        
        self.records.insert(component, KeepRecord { reasons: kind, can_be_active });
        self.pending.push_back((component, can_be_active));
    }
    
    /// Current state of a component
    pub fn state(&self, component: ComponentId) -> MarkState {
        match self.records.get(&component) {
            None => MarkState::Unvisited,
            Some(record) if self.processed.contains(&component) => MarkState::Marked(record.reasons),
            Some(record) => MarkState::Pending(record.reasons),
        }
    }
    
    /// Process one pending component; returns `false` once the worklist is empty
    pub fn step(&mut self) -> bool {
        let Some((component, can_be_active)) = self.pending.pop_front() else {
            return false;
        };
        self.processed.insert(component);
        
        let graph = self.graph;
        let Some(dependencies) = graph.try_dependencies(component) else {
            log::trace!("{component:?} is outside the analyzed hierarchy; not following its edges");
            return true;
        };
        
        for (&dependency, edge) in &dependencies.dependencies {
            self.edges_inspected += 1;
            
            if !edge.flags.contains(DependencyFlags::MAY_EXIST_WHILE_DEPENDENT_DISABLED) && !can_be_active {
                continue;
            }
            
            let if_target_can_be_enabled = !edge.flags.contains(DependencyFlags::MAY_EXIST_WHILE_DEPENDENCY_DISABLED);
            let activeness = self.resolver.resolve(dependency);
            if if_target_can_be_enabled && activeness == Activeness::False {
                continue;
            }
            
            self.reach(dependency, edge.kind, activeness.can_be_active());
        }
        
        true
    }
    
    /// Drain the worklist
    pub fn run(&mut self) {
        while self.step() {}
        log::debug!(
            "Mark phase finished: {} components kept, {} edges inspected",
            self.records.len(),
            self.edges_inspected
        );
    }
    
    /// Number of edges looked at so far
    pub fn edges_inspected(&self) -> usize {
        self.edges_inspected
    }
    
    /// Finish the pass and hand out the marks
    pub fn finish(mut self) -> MarkResult {
        self.run();
        MarkResult { records: self.records }
    }
}
