/// The labeled directed graph of Persons and Relationships (data-model.md
/// Section 3: "Graph").
///
/// Wraps a `petgraph::stable_graph::StableDiGraph` carrying small `Copy`-
/// friendly weight structs (an id newtype plus a `data_index: usize`); the
/// actual [`Person`]/[`Relationship`] payload lives in parallel `Vec`s
/// indexed by `data_index`. This is the arena-plus-index pattern used
/// throughout this workspace's graph substrate, generalized here from a
/// supply-chain node/edge model to a genealogical Person/Relationship one.
use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;

use crate::newtypes::{PersonId, RelationId};
use crate::structures::{Person, Relationship};

// ---------------------------------------------------------------------------
// Weight types
// ---------------------------------------------------------------------------

/// Weight stored inline on each petgraph node.
#[derive(Debug, Clone)]
pub struct NodeWeight {
    pub person_id: PersonId,
    /// Index into [`TwigGraph`]'s `persons` arena.
    pub data_index: usize,
}

/// Weight stored inline on each petgraph edge.
#[derive(Debug, Clone)]
pub struct EdgeWeight {
    pub relation_id: RelationId,
    /// Index into [`TwigGraph`]'s `relationships` arena.
    pub data_index: usize,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors raised by mutating [`TwigGraph`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two Persons in the same graph share an `identifier`.
    DuplicatePersonId(PersonId),
    /// A Relationship's `from_id`/`to_id` does not resolve to a live node.
    DanglingRelationshipRef {
        relation_id: RelationId,
        missing_person_id: PersonId,
    },
    /// An edge already exists between this ordered pair (data-model.md
    /// Section 3 Graph invariant: "no multi-edges").
    DuplicateEdge { from: PersonId, to: PersonId },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicatePersonId(id) => write!(f, "duplicate person id: {id}"),
            Self::DanglingRelationshipRef {
                relation_id,
                missing_person_id,
            } => write!(
                f,
                "relationship {relation_id} references unknown person {missing_person_id}"
            ),
            Self::DuplicateEdge { from, to } => {
                write!(f, "an edge already exists from {from} to {to}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

// ---------------------------------------------------------------------------
// TwigGraph
// ---------------------------------------------------------------------------

/// The graph `G = (V, E)` of data-model.md Section 3: every `v` is a Person,
/// every `e` a Relationship whose endpoints agree with the edge's
/// `(from_id, to_id)`.
#[derive(Debug, Default)]
pub struct TwigGraph {
    graph: StableDiGraph<NodeWeight, EdgeWeight>,
    persons: Vec<Person>,
    relationships: Vec<Relationship>,
    id_to_index: HashMap<PersonId, NodeIndex>,
}

impl TwigGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Adds a new Person as a node. Fails if `identifier` is already present.
    pub fn add_person(&mut self, person: Person) -> Result<(), GraphError> {
        if self.id_to_index.contains_key(&person.identifier) {
            return Err(GraphError::DuplicatePersonId(person.identifier));
        }
        let person_id = person.identifier.clone();
        let data_index = self.persons.len();
        self.persons.push(person);
        let idx = self.graph.add_node(NodeWeight {
            person_id: person_id.clone(),
            data_index,
        });
        self.id_to_index.insert(person_id, idx);
        Ok(())
    }

    /// Adds a Relationship as an edge between its `from_id`/`to_id` endpoints.
    ///
    /// Fails with [`GraphError::DanglingRelationshipRef`] if either endpoint
    /// is unknown, or [`GraphError::DuplicateEdge`] if an edge already exists
    /// for this ordered pair (no multi-edges).
    pub fn add_relationship(&mut self, rel: Relationship) -> Result<(), GraphError> {
        let from_idx = self.index_of(&rel.from_id).ok_or_else(|| GraphError::DanglingRelationshipRef {
            relation_id: rel.identifier.clone(),
            missing_person_id: rel.from_id.clone(),
        })?;
        let to_idx = self.index_of(&rel.to_id).ok_or_else(|| GraphError::DanglingRelationshipRef {
            relation_id: rel.identifier.clone(),
            missing_person_id: rel.to_id.clone(),
        })?;
        if self.graph.find_edge(from_idx, to_idx).is_some() {
            return Err(GraphError::DuplicateEdge {
                from: rel.from_id,
                to: rel.to_id,
            });
        }
        let relation_id = rel.identifier.clone();
        let data_index = self.relationships.len();
        self.relationships.push(rel);
        self.graph.add_edge(
            from_idx,
            to_idx,
            EdgeWeight {
                relation_id,
                data_index,
            },
        );
        Ok(())
    }

    /// Removes the edge between `from` and `to`, if any, returning the
    /// removed Relationship's data-index. Does not compact the arena; the
    /// slot is simply orphaned (mirrors `StableDiGraph`'s own tombstoning).
    pub fn remove_relationship(&mut self, from: &PersonId, to: &PersonId) -> Option<Relationship> {
        let from_idx = self.index_of(from)?;
        let to_idx = self.index_of(to)?;
        let edge_idx = self.graph.find_edge(from_idx, to_idx)?;
        let weight = self.graph.remove_edge(edge_idx)?;
        Some(self.relationships[weight.data_index].clone())
    }

    fn index_of(&self, id: &PersonId) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        let idx = self.index_of(id)?;
        let weight = self.graph.node_weight(idx)?;
        self.persons.get(weight.data_index)
    }

    pub fn person_mut(&mut self, id: &PersonId) -> Option<&mut Person> {
        let idx = self.index_of(id)?;
        let weight = self.graph.node_weight(idx)?;
        self.persons.get_mut(weight.data_index)
    }

    /// Marks a Person as merged (data-model.md Section 3, Lifecycle step 5).
    pub fn mark_merged(&mut self, id: &PersonId) {
        if let Some(person) = self.person_mut(id) {
            person.merged = true;
        }
    }

    pub fn relationship(&self, from: &PersonId, to: &PersonId) -> Option<&Relationship> {
        let from_idx = self.index_of(from)?;
        let to_idx = self.index_of(to)?;
        let edge_idx = self.graph.find_edge(from_idx, to_idx)?;
        let weight = self.graph.edge_weight(edge_idx)?;
        self.relationships.get(weight.data_index)
    }

    /// Every Person, live and merged alike, in arena order.
    pub fn all_persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.iter()
    }

    /// Every Relationship in arena order. Relationships whose edge was
    /// subsequently removed (e.g. during rewiring) remain in the arena but
    /// are not reachable via [`Self::relationship`]; callers that want only
    /// live edges should traverse the graph, not this arena.
    pub fn all_relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    /// Live (non-merged) successors of `id`: `(neighbor_id, relation_id)` for
    /// each outgoing edge to a non-merged Person.
    pub fn live_successors(&self, id: &PersonId) -> Vec<(PersonId, RelationId)> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Live (non-merged) predecessors of `id`.
    pub fn live_predecessors(&self, id: &PersonId) -> Vec<(PersonId, RelationId)> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &PersonId, direction: Direction) -> Vec<(PersonId, RelationId)> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, direction)
            .filter_map(|edge_ref| {
                use petgraph::visit::EdgeRef;
                let neighbor_idx = match direction {
                    Direction::Outgoing => edge_ref.target(),
                    Direction::Incoming => edge_ref.source(),
                };
                let neighbor_weight = self.graph.node_weight(neighbor_idx)?;
                let neighbor = self.persons.get(neighbor_weight.data_index)?;
                if neighbor.merged {
                    return None;
                }
                let edge_weight = edge_ref.weight();
                Some((neighbor.identifier.clone(), edge_weight.relation_id.clone()))
            })
            .collect()
    }

    /// Returns `true` iff a Person with this id is present and not merged.
    pub fn is_live(&self, id: &PersonId) -> bool {
        self.person(id).is_some_and(|p| !p.merged)
    }

    /// Weakly-connected components of the *live* subgraph (Persons with
    /// `merged == false`), each a set of Person ids (data-model.md Section 3;
    /// component-design.md Section 4.D step 1: "Build the live subgraph ...
    /// compute its weakly-connected components").
    ///
    /// Component membership is computed by undirected BFS over live nodes and
    /// edges whose both endpoints are live. Iteration order of the returned
    /// components (and the Person ids within each) follows the underlying
    /// node arena's insertion order, making the result deterministic.
    pub fn weakly_connected_components(&self) -> Vec<Vec<PersonId>> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut components = Vec::new();

        for idx in self.graph.node_indices() {
            if visited.contains(&idx) {
                continue;
            }
            let Some(weight) = self.graph.node_weight(idx) else {
                continue;
            };
            let Some(person) = self.persons.get(weight.data_index) else {
                continue;
            };
            if person.merged {
                continue;
            }

            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(idx);
            visited.insert(idx);

            while let Some(current) = queue.pop_front() {
                let Some(w) = self.graph.node_weight(current) else {
                    continue;
                };
                let Some(p) = self.persons.get(w.data_index) else {
                    continue;
                };
                if p.merged {
                    continue;
                }
                component.push(p.identifier.clone());

                for neighbor in self.graph.neighbors_undirected(current) {
                    if visited.contains(&neighbor) {
                        continue;
                    }
                    let Some(nw) = self.graph.node_weight(neighbor) else {
                        continue;
                    };
                    let Some(np) = self.persons.get(nw.data_index) else {
                        continue;
                    };
                    if np.merged {
                        continue;
                    }
                    visited.insert(neighbor);
                    queue.push_back(neighbor);
                }
            }

            if !component.is_empty() {
                components.push(component);
            }
        }

        components
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
