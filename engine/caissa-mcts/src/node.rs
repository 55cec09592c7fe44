//! Search tree node with per-move statistics.
//!
//! A node owns a position snapshot and one [`Edge`] per legal move. Edges
//! exist only after [`Node::expand`], so visit or value reads on an
//! unexpanded node are impossible by construction rather than silently zero.

use caissa_core::{encode_move, Game, Move};

/// Index into the node arena. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Per-move statistics at a node.
#[derive(Debug, Clone)]
pub struct Edge {
    /// The move this edge represents.
    pub mv: Move,

    /// Prior probability P from the policy network.
    pub prior: f32,

    /// Visit count N.
    pub visits: u32,

    /// Accumulated backed-up value W.
    pub value_sum: f32,

    /// Child node, created lazily on first traversal.
    pub child: Option<NodeId>,
}

impl Edge {
    /// Mean value Q = W / N, zero while unvisited.
    #[inline]
    pub fn q(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f32
        }
    }
}

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct Node<G> {
    /// Owned position snapshot.
    pub state: G,

    /// Whether priors have been assigned. A node expanded with zero edges
    /// is terminal.
    pub expanded: bool,

    /// One edge per legal move, in legal-move enumeration order.
    pub edges: Vec<Edge>,
}

impl<G: Game> Node<G> {
    pub fn new(state: G) -> Self {
        Self {
            state,
            expanded: false,
            edges: Vec::new(),
        }
    }

    /// Assign priors over exactly `legal_moves`, reading each move's prior
    /// from `policy` at its action index.
    ///
    /// The extracted priors are renormalized over the legal set. If they sum
    /// to zero (degenerate policy) they are left as-is rather than divided
    /// by zero. An empty `legal_moves` marks the node terminal: expanded
    /// with no edges.
    pub fn expand(&mut self, policy: &[f32], legal_moves: Vec<Move>) {
        self.edges = legal_moves
            .into_iter()
            .map(|mv| Edge {
                mv,
                prior: policy.get(encode_move(mv)).copied().unwrap_or(0.0),
                visits: 0,
                value_sum: 0.0,
                child: None,
            })
            .collect();

        let sum: f32 = self.edges.iter().map(|e| e.prior).sum();
        if sum > 0.0 {
            for edge in &mut self.edges {
                edge.prior /= sum;
            }
        }

        self.expanded = true;
    }

    /// PUCT selection: pick the edge maximizing
    /// `Q + c_puct * P * sqrt(total_visits) / (1 + N)`.
    ///
    /// Total visits are recomputed from the edges on every call. The first
    /// maximal edge in enumeration order wins ties. Returns `None` for a
    /// terminal (edgeless) node.
    pub fn select(&self, c_puct: f32) -> Option<usize> {
        let total: u32 = self.edges.iter().map(|e| e.visits).sum();
        let sqrt_total = (total as f32).sqrt();

        let mut best: Option<(usize, f32)> = None;
        for (i, edge) in self.edges.iter().enumerate() {
            let u = edge.q() + c_puct * edge.prior * sqrt_total / (1.0 + edge.visits as f32);
            match best {
                Some((_, best_score)) if u <= best_score => {}
                _ => best = Some((i, u)),
            }
        }

        best.map(|(i, _)| i)
    }
}
