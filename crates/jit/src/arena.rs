// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use xjit_types::JitError;

/// An index into a [`NodeArena`]. Cheap to copy, never dereferenced past
/// the arena that produced it (see [`NodeArena::reset`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A bump allocator for expression-tree nodes, specialized to hold `T`
/// directly rather than raw bytes — the tree is a `Vec<T>` plus [`NodeId`]
/// indices into it, not a pointer graph over a byte arena. `reset` is then a
/// one-line "truncate the vec" operation, and `NodeId`s from a prior
/// generation are simply out-of-range (or silently wrong) rather than
/// dangling pointers — callers are expected to rebuild a tree from scratch
/// after a `reset`.
#[derive(Clone)]
pub struct NodeArena<T> {
    nodes: Vec<T>,
    capacity: usize,
}

impl<T> NodeArena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        tracing::debug!(capacity, "creating node arena");
        NodeArena {
            nodes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn alloc(&mut self, value: T) -> Result<NodeId, JitError> {
        if self.nodes.len() >= self.capacity {
            tracing::warn!(capacity = self.capacity, "arena exhausted");
            return Err(JitError::ArenaExhausted {
                requested: 1,
                remaining: 0,
                capacity: self.capacity,
            });
        }
        self.nodes.push(value);
        Ok(NodeId((self.nodes.len() - 1) as u32))
    }

    pub fn get(&self, id: NodeId) -> &T {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Invalidates every [`NodeId`] handed out so far. Callers must not
    /// dereference an id from before a reset — nothing here enforces that
    /// at the type level.
    pub fn reset(&mut self) {
        tracing::debug!(had = self.nodes.len(), "resetting node arena");
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_returns_increasing_ids() {
        let mut arena: NodeArena<u32> = NodeArena::with_capacity(4);
        let a = arena.alloc(10).unwrap();
        let b = arena.alloc(20).unwrap();
        assert_eq!(*arena.get(a), 10);
        assert_eq!(*arena.get(b), 20);
    }

    #[test]
    fn exhaustion_is_reported() {
        let mut arena: NodeArena<u32> = NodeArena::with_capacity(1);
        arena.alloc(1).unwrap();
        assert_eq!(
            arena.alloc(2).unwrap_err(),
            JitError::ArenaExhausted {
                requested: 1,
                remaining: 0,
                capacity: 1,
            }
        );
    }

    #[test]
    fn reset_allows_reuse_of_the_same_capacity() {
        let mut arena: NodeArena<u32> = NodeArena::with_capacity(1);
        let first = arena.alloc(1).unwrap();
        arena.reset();
        let second = arena.alloc(2).unwrap();
        assert_eq!(first, second);
        assert_eq!(*arena.get(second), 2);
    }
}
