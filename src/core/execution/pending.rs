use crate::core::types::{Generation, NodeId, ValueId};
use crate::core::values::ChangeListener;
use std::mem;

/// Nodes waiting for their next update
///
/// A node is queued at most once per generation: its stamp records the
/// generation it was last queued in, and marking it again in the same
/// generation is a no-op.
#[derive(Debug, Default)]
pub struct PendingQueue {
    next: Vec<NodeId>,
    stamps: Vec<Option<Generation>>,
    generation: Generation,
    conflicts: Vec<(ValueId, Generation)>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make room for a newly registered node
    pub fn register(&mut self) -> NodeId {
        self.stamps.push(None);
        NodeId(self.stamps.len() - 1)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn needs_update(&self) -> bool {
        !self.next.is_empty()
    }

    pub fn pending(&self) -> &[NodeId] {
        &self.next
    }

    /// Take the queued nodes and start a new generation
    pub fn take_snapshot(&mut self) -> Vec<NodeId> {
        self.generation += 1;
        mem::take(&mut self.next)
    }

    /// Queue nodes again after an aborted generation
    pub fn requeue(&mut self, nodes: &[NodeId]) {
        for node in nodes {
            self.mark_dirty(*node);
        }
    }

    /// Remember a bus that had a short circuit in the current generation
    pub fn record_conflict(&mut self, value: ValueId) {
        if !self.conflicts.iter().any(|(v, _)| *v == value) {
            self.conflicts.push((value, self.generation));
        }
    }

    /// Buses with a recorded short circuit and the generation it was seen in
    pub fn conflicts(&self) -> &[(ValueId, Generation)] {
        &self.conflicts
    }

    /// Keep only the recorded short circuits `still_conflict` agrees with
    pub fn retain_conflicts(&mut self, mut still_conflict: impl FnMut(ValueId) -> bool) {
        self.conflicts.retain(|(value, _)| still_conflict(*value));
    }
}

impl ChangeListener for PendingQueue {
    fn mark_dirty(&mut self, node: NodeId) {
        let Some(stamp) = self.stamps.get_mut(node.0) else {
            return;
        };
        if *stamp != Some(self.generation) {
            *stamp = Some(self.generation);
            self.next.push(node);
        }
    }
}
