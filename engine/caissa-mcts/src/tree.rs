//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and are referenced by [`NodeId`]
//! indices. There are no parent pointers: the engine records its descent
//! path explicitly and walks it back for the value update, which keeps the
//! arena free of back-references.

use caissa_core::Game;

use crate::node::{Node, NodeId};

#[derive(Debug)]
pub struct SearchTree<G> {
    nodes: Vec<Node<G>>,
    root: NodeId,
}

impl<G: Game> SearchTree<G> {
    /// Create a tree holding only an unexpanded root.
    pub fn new(root_state: G) -> Self {
        Self {
            nodes: vec![Node::new(root_state)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node<G> {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<G> {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a node and return its ID.
    pub fn allocate(&mut self, node: Node<G>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Total number of nodes in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
