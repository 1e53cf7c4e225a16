//! Identifiers and simple allocators for graph entities.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ConstraintId(pub u32);

/// Monotonic allocator for NodeId and ConstraintId.
/// Dense indices double as slot indices in the host; IDs are opaque externally.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_node: u32,
    next_constraint: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node = self.next_node.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_constraint(&mut self) -> ConstraintId {
        let id = ConstraintId(self.next_constraint);
        self.next_constraint = self.next_constraint.wrapping_add(1);
        id
    }
}
