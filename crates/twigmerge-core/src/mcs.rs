/// Maximum Common Subgraph engine: McGregor's backtrack algorithm with
/// branch-and-bound pruning (component-design.md Section 4.C).
///
/// This module has no direct analogue elsewhere in this workspace's lineage;
/// the original prototype (`mcgregor.py`) is an unfinished skeleton that
/// tracks only a single best `edges_removed` bound and never accumulates a
/// result list or a node-removal bound. This implementation completes the
/// algorithm per the specification: null-matches, a node-removal bound
/// alongside the edge-removal bound, and full accumulation of every matching
/// that ties for the maximum.
///
/// Graphs here are always directed and simple (no multi-edges); there is no
/// "mixing directed and undirected" precondition to check because the type
/// itself cannot represent an undirected graph.
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// McsGraph
// ---------------------------------------------------------------------------

/// A directed simple graph with opaque node and edge attributes, addressed
/// by small integer indices for the duration of an MCS search.
#[derive(Debug, Clone)]
pub struct McsGraph<N, E> {
    nodes: Vec<N>,
    edges: HashMap<(usize, usize), E>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

/// Raised by [`McsGraph::add_edge`] when the edge would create a multi-edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMcsEdge {
    pub from: usize,
    pub to: usize,
}

impl<N, E> McsGraph<N, E> {
    /// Builds a graph with the given nodes (indexed `0..nodes.len()` in the
    /// order provided) and no edges.
    pub fn new(nodes: Vec<N>) -> Self {
        let n = nodes.len();
        Self {
            nodes,
            edges: HashMap::new(),
            successors: vec![Vec::new(); n],
            predecessors: vec![Vec::new(); n],
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, idx: usize) -> &N {
        &self.nodes[idx]
    }

    /// Adds a directed edge `from -> to`. Fails if this ordered pair already
    /// has an edge (no multi-edges).
    pub fn add_edge(&mut self, from: usize, to: usize, weight: E) -> Result<(), DuplicateMcsEdge> {
        if self.edges.contains_key(&(from, to)) {
            return Err(DuplicateMcsEdge { from, to });
        }
        self.edges.insert((from, to), weight);
        self.successors[from].push(to);
        self.predecessors[to].push(from);
        Ok(())
    }

    pub fn edge(&self, from: usize, to: usize) -> Option<&E> {
        self.edges.get(&(from, to))
    }
}

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// The outcome of [`find_maximum_common_subgraph`] (component-design.md
/// Section 4.C).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McsResult {
    /// Every node-assignment map (`G1 index -> G2 index`) tying for the
    /// maximum; empty only when `g1` has zero nodes.
    pub maximal_common_subgraphs: Vec<HashMap<usize, usize>>,
    /// The edge count of the maximum match.
    pub edges_in_maximal_subgraph: usize,
    /// The minimum number of G1 nodes left unmatched among the maximal
    /// matchings.
    pub maximal_nodes_removed: usize,
    /// The minimum number of edge disagreements tolerated by a maximal
    /// matching.
    pub maximal_edges_removed: usize,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Pending,
    Null,
    Matched(usize),
}

struct Search<'g, N, E, NP, EP> {
    g1: &'g McsGraph<N, E>,
    g2: &'g McsGraph<N, E>,
    candidates: Vec<Vec<usize>>,
    node_pred: NP,
    edge_pred: EP,
    assignment: Vec<Slot>,
    used_g2: HashSet<usize>,
    results: Vec<HashMap<usize, usize>>,
    edges_in_maximal_subgraph: usize,
    maximal_nodes_removed: usize,
    maximal_edges_removed: usize,
}

/// Runs McGregor's branch-and-bound search for the maximum common subgraph
/// of `g1` and `g2` under `node_pred`/`edge_pred`.
///
/// Per component-design.md Section 4.C's setup step, the caller is expected
/// to have already arranged for `g1` to be the graph with the smaller node
/// count (matching proceeds from smaller to larger to minimize branching);
/// this function does not re-check or re-order the inputs itself — the Twig
/// Merger driver tracks that direction explicitly as `flipped`.
pub fn find_maximum_common_subgraph<N, E, NP, EP>(
    g1: &McsGraph<N, E>,
    g2: &McsGraph<N, E>,
    node_pred: NP,
    edge_pred: EP,
) -> McsResult
where
    NP: Fn(&N, &N) -> bool,
    EP: Fn(&E, &E) -> bool,
{
    let n1 = g1.node_count();

    let candidates: Vec<Vec<usize>> = (0..n1)
        .map(|u| {
            (0..g2.node_count())
                .filter(|&v| node_pred(g1.node(u), g2.node(v)))
                .collect()
        })
        .collect();

    let mut search = Search {
        g1,
        g2,
        candidates,
        node_pred,
        edge_pred,
        assignment: vec![Slot::Pending; n1],
        used_g2: HashSet::new(),
        results: Vec::new(),
        edges_in_maximal_subgraph: 0,
        maximal_nodes_removed: n1 + 1,
        maximal_edges_removed: usize::MAX,
    };

    if n1 == 0 {
        return McsResult {
            maximal_common_subgraphs: Vec::new(),
            edges_in_maximal_subgraph: 0,
            maximal_nodes_removed: 0,
            maximal_edges_removed: 0,
        };
    }

    search.assign(0, 0, 0);

    McsResult {
        maximal_common_subgraphs: search.results,
        edges_in_maximal_subgraph: search.edges_in_maximal_subgraph,
        maximal_nodes_removed: search.maximal_nodes_removed,
        maximal_edges_removed: search.maximal_edges_removed,
    }
}

impl<'g, N, E, NP, EP> Search<'g, N, E, NP, EP>
where
    NP: Fn(&N, &N) -> bool,
    EP: Fn(&E, &E) -> bool,
{
    /// Counts edges added/removed by tentatively matching `u` to `v`, given
    /// the already-assigned neighbors of `u` in `g1` (both directions).
    fn edge_delta(&self, u: usize, v: usize) -> (usize, usize) {
        let mut added = 0;
        let mut removed = 0;

        for &w in &self.g1.successors[u] {
            if let Slot::Matched(v_prime) = self.assignment[w] {
                match (self.g1.edge(u, w), self.g2.edge(v, v_prime)) {
                    (Some(e1), Some(e2)) if (self.edge_pred)(e1, e2) => added += 1,
                    _ => removed += 1,
                }
            }
        }
        for &w in &self.g1.predecessors[u] {
            if let Slot::Matched(v_prime) = self.assignment[w] {
                match (self.g1.edge(w, u), self.g2.edge(v_prime, v)) {
                    (Some(e1), Some(e2)) if (self.edge_pred)(e1, e2) => added += 1,
                    _ => removed += 1,
                }
            }
        }

        (added, removed)
    }

    fn assign(&mut self, u: usize, edges_added: usize, edges_removed: usize) {
        let n1 = self.g1.node_count();

        if u == n1 {
            self.record_leaf(edges_added, edges_removed);
            return;
        }

        let candidates = self.candidates[u].clone();
        for v in candidates {
            if self.used_g2.contains(&v) {
                continue;
            }
            let (added, removed_here) = self.edge_delta(u, v);
            let total_removed = edges_removed + removed_here;
            if total_removed > self.maximal_edges_removed {
                continue;
            }

            self.assignment[u] = Slot::Matched(v);
            self.used_g2.insert(v);
            self.assign(u + 1, edges_added + added, total_removed);
            self.used_g2.remove(&v);
            self.assignment[u] = Slot::Pending;
        }

        let nodes_removed_so_far = self.count_nulls();
        let has_candidates = !self.candidates[u].is_empty();
        if !has_candidates || nodes_removed_so_far < self.maximal_nodes_removed {
            self.assignment[u] = Slot::Null;
            self.assign(u + 1, edges_added, edges_removed);
            self.assignment[u] = Slot::Pending;
        }
    }

    fn count_nulls(&self) -> usize {
        self.assignment.iter().filter(|s| matches!(s, Slot::Null)).count()
    }

    fn record_leaf(&mut self, edges_added: usize, edges_removed: usize) {
        let nodes_removed = self.count_nulls();

        let strictly_better =
            edges_added > self.edges_in_maximal_subgraph || nodes_removed < self.maximal_nodes_removed;
        let tie = edges_added == self.edges_in_maximal_subgraph && nodes_removed == self.maximal_nodes_removed;

        if strictly_better {
            self.results.clear();
            self.results.push(self.current_map());
            self.edges_in_maximal_subgraph = edges_added;
            self.maximal_nodes_removed = nodes_removed;
        } else if tie {
            self.results.push(self.current_map());
        }

        if edges_removed < self.maximal_edges_removed {
            self.maximal_edges_removed = edges_removed;
        }
    }

    fn current_map(&self) -> HashMap<usize, usize> {
        self.assignment
            .iter()
            .enumerate()
            .filter_map(|(u, slot)| match slot {
                Slot::Matched(v) => Some((u, *v)),
                _ => None,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
