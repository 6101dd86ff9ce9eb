/// The Twig Merger: incremental reconciliation of weakly-connected
/// components ("twigs") across ingestion batches (component-design.md
/// Section 4.D).
use std::collections::{HashMap, HashSet};

use crate::enums::QueueOrder;
use crate::graph::TwigGraph;
use crate::identity::{person_mismatch, relation_type_equal};
use crate::mcs::{find_maximum_common_subgraph, McsGraph};
use crate::merge::{merge_persons, merge_relationships, RelationMergeConflict, RelationshipIdentity};
use crate::newtypes::{PersonId, RelationId, TwigId};
use crate::structures::Relationship;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for [`TwigMerger::run`] (component-design.md Section 4.D).
#[derive(Debug, Clone)]
pub struct MergerConfig {
    /// MCS results with fewer matched nodes than this are rejected.
    pub minimum_match_size: usize,
    /// The order in which twigs are popped from the work queue.
    pub queue_order: QueueOrder,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            minimum_match_size: 5,
            queue_order: QueueOrder::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Warning
// ---------------------------------------------------------------------------

/// A non-fatal disposition recorded during a merge run (component-design.md
/// Section 4.D, last paragraph: "every skipped candidate or pair ... is
/// recorded as a structured Warning value").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// MCS found no match at all between a twig and a surname-overlapping
    /// candidate.
    EmptyMatch { twig: TwigId, candidate: TwigId },
    /// MCS found more than one maximal matching (ambiguous).
    MultipleMaximalMatches {
        twig: TwigId,
        candidate: TwigId,
        match_count: usize,
    },
    /// The unique MCS match was smaller than `minimum_match_size`.
    MatchTooSmall {
        twig: TwigId,
        candidate: TwigId,
        matched: usize,
        minimum: usize,
    },
    /// The per-pair compatibility oracle rejected a pair the MCS had matched.
    MergeIncompatiblePair {
        left: PersonId,
        right: PersonId,
    },
    /// Pre-flight edge-merge check failed for a pair; the pair's merge was
    /// abandoned (graph left unchanged for this pair).
    RelationMergeConflictDuringMerge {
        left: PersonId,
        right: PersonId,
        reason: String,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMatch { twig, candidate } => {
                write!(f, "no match found between {twig} and candidate {candidate}")
            }
            Self::MultipleMaximalMatches {
                twig,
                candidate,
                match_count,
            } => write!(
                f,
                "ambiguous match between {twig} and candidate {candidate}: {match_count} maximal matches found"
            ),
            Self::MatchTooSmall {
                twig,
                candidate,
                matched,
                minimum,
            } => write!(
                f,
                "match between {twig} and candidate {candidate} too small: matched {matched}, minimum {minimum}"
            ),
            Self::MergeIncompatiblePair { left, right } => {
                write!(f, "person pair ({left}, {right}) rejected by the compatibility oracle")
            }
            Self::RelationMergeConflictDuringMerge {
                left,
                right,
                reason,
            } => write!(
                f,
                "relation merge conflict for pair ({left}, {right}): {reason}"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// TwigMerger
// ---------------------------------------------------------------------------

/// Drives the incremental reconciliation pipeline over a [`TwigGraph`].
pub struct TwigMerger {
    config: MergerConfig,
    processed_twigs: HashMap<TwigId, Vec<PersonId>>,
    surname_index: HashMap<String, HashSet<TwigId>>,
    next_twig_id: u64,
    next_merge_id: u64,
}

impl TwigMerger {
    pub fn new(config: MergerConfig) -> Self {
        Self {
            config,
            processed_twigs: HashMap::new(),
            surname_index: HashMap::new(),
            next_twig_id: 0,
            next_merge_id: 0,
        }
    }

    fn fresh_twig_id(&mut self) -> TwigId {
        let id = TwigId::from_ordinal(self.next_twig_id);
        self.next_twig_id += 1;
        id
    }

    fn fresh_person_id(&mut self, prefix: &str) -> PersonId {
        self.next_merge_id += 1;
        PersonId::try_from(format!("{prefix}-{}", self.next_merge_id))
            .unwrap_or_else(|_| unreachable!("generated merge id is always a non-empty string"))
    }

    /// Runs the driver procedure (component-design.md Section 4.D) over
    /// `graph` to completion, mutating it in place, and returns the
    /// warnings accumulated along the way.
    pub fn run(&mut self, graph: &mut TwigGraph) -> Vec<Warning> {
        let mut warnings = Vec::new();

        let mut components = graph.weakly_connected_components();
        match self.config.queue_order {
            QueueOrder::SmallestFirst => components.sort_by_key(Vec::len),
            QueueOrder::LargestFirst => components.sort_by_key(|c| std::cmp::Reverse(c.len())),
        }
        let mut queue: std::collections::VecDeque<Vec<PersonId>> = components.into();

        while let Some(twig) = queue.pop_front() {
            if twig.len() < self.config.minimum_match_size {
                break;
            }

            let twig_surnames = standardized_surnames(graph, &twig);

            if self.processed_twigs.is_empty() || self.surname_disjoint_from_index(&twig_surnames) {
                self.register_twig(twig, &twig_surnames);
                continue;
            }

            let candidate_ids = self.candidate_twigs(&twig_surnames);
            let mut merged_into_candidate = false;

            for candidate_id in candidate_ids {
                let Some(candidate_members) = self.processed_twigs.get(&candidate_id).cloned() else {
                    continue;
                };

                let twig_id = self.fresh_twig_id_for_warning();
                let (smaller, larger, flipped) = if twig.len() <= candidate_members.len() {
                    (&twig, &candidate_members, false)
                } else {
                    (&candidate_members, &twig, true)
                };

                let mcs_result = run_mcs(graph, smaller, larger);

                if mcs_result.maximal_common_subgraphs.is_empty() {
                    warnings.push(Warning::EmptyMatch {
                        twig: twig_id,
                        candidate: candidate_id,
                    });
                    continue;
                }
                if mcs_result.maximal_common_subgraphs.len() > 1 {
                    warnings.push(Warning::MultipleMaximalMatches {
                        twig: twig_id,
                        candidate: candidate_id,
                        match_count: mcs_result.maximal_common_subgraphs.len(),
                    });
                    continue;
                }

                let raw_match = &mcs_result.maximal_common_subgraphs[0];
                if raw_match.len() < self.config.minimum_match_size {
                    warnings.push(Warning::MatchTooSmall {
                        twig: twig_id,
                        candidate: candidate_id,
                        matched: raw_match.len(),
                        minimum: self.config.minimum_match_size,
                    });
                    continue;
                }

                // Translate the small->large index match back into a
                // twig-id -> candidate-id person mapping, undoing `flipped`
                // so pairs are always (twig person, candidate person).
                let pairs: Vec<(PersonId, PersonId)> = raw_match
                    .iter()
                    .map(|(&si, &li)| {
                        let small_id = smaller[si].clone();
                        let large_id = larger[li].clone();
                        if flipped {
                            (large_id, small_id)
                        } else {
                            (small_id, large_id)
                        }
                    })
                    .collect();

                self.merge_pairs(graph, &pairs, candidate_id, &twig, &mut warnings);
                merged_into_candidate = true;
                break;
            }

            if !merged_into_candidate {
                self.register_twig(twig, &twig_surnames);
            }
        }

        warnings
    }

    fn fresh_twig_id_for_warning(&self) -> TwigId {
        // Warnings reference the in-flight twig by a synthetic id; it is not
        // registered in `processed_twigs` unless a merge ultimately fails for
        // every candidate, in which case `register_twig` assigns the real one.
        TwigId::from_ordinal(self.next_twig_id)
    }

    fn surname_disjoint_from_index(&self, surnames: &HashSet<String>) -> bool {
        surnames.iter().all(|s| !self.surname_index.contains_key(s))
    }

    fn candidate_twigs(&self, surnames: &HashSet<String>) -> Vec<TwigId> {
        let mut candidates: HashSet<TwigId> = HashSet::new();
        for surname in surnames {
            if let Some(ids) = self.surname_index.get(surname) {
                candidates.extend(ids.iter().copied());
            }
        }
        let mut ordered: Vec<TwigId> = candidates.into_iter().collect();
        ordered.sort_by_key(|id| id.to_string());
        ordered
    }

    fn register_twig(&mut self, twig: Vec<PersonId>, surnames: &HashSet<String>) {
        let id = self.fresh_twig_id();
        for surname in surnames {
            self.surname_index.entry(surname.clone()).or_default().insert(id);
        }
        self.processed_twigs.insert(id, twig);
    }

    /// The merge procedure (component-design.md Section 4.D) for a single
    /// MCS match between a twig and a candidate.
    fn merge_pairs(
        &mut self,
        graph: &mut TwigGraph,
        pairs: &[(PersonId, PersonId)],
        candidate_id: TwigId,
        twig: &[PersonId],
        warnings: &mut Vec<Warning>,
    ) {
        let mut merged_member_ids: Vec<PersonId> = Vec::new();

        for (p1_id, p2_id) in pairs {
            let Some(p1) = graph.person(p1_id).cloned() else {
                continue;
            };
            let Some(p2) = graph.person(p2_id).cloned() else {
                continue;
            };

            if person_mismatch(&p1, &p2, graph) {
                warnings.push(Warning::MergeIncompatiblePair {
                    left: p1_id.clone(),
                    right: p2_id.clone(),
                });
                continue;
            }

            let succ1 = graph.live_successors(p1_id);
            let succ2 = graph.live_successors(p2_id);
            let pred1 = graph.live_predecessors(p1_id);
            let pred2 = graph.live_predecessors(p2_id);

            let shared_succ = shared_neighbors(&succ1, &succ2);
            let shared_pred = shared_neighbors(&pred1, &pred2);

            // Pre-flight: every shared neighbor's two edges must be
            // mergeable before any mutation happens (two-phase atomicity).
            if let Err(reason) = self.preflight_shared(graph, p1_id, p2_id, &shared_succ, true) {
                warnings.push(Warning::RelationMergeConflictDuringMerge {
                    left: p1_id.clone(),
                    right: p2_id.clone(),
                    reason,
                });
                continue;
            }
            if let Err(reason) = self.preflight_shared(graph, p1_id, p2_id, &shared_pred, false) {
                warnings.push(Warning::RelationMergeConflictDuringMerge {
                    left: p1_id.clone(),
                    right: p2_id.clone(),
                    reason,
                });
                continue;
            }

            let merged_id = self.fresh_person_id("person");
            let prov1 = self.fresh_person_id("prov");
            let prov2 = self.fresh_person_id("prov");

            let (p_m, r1, r2) = merge_persons(&p1, &p2, graph, merged_id.clone(), prov1, prov2)
                .unwrap_or_else(|_| unreachable!("person_mismatch was already checked above"));

            if graph.add_person(p_m).is_err() {
                unreachable!("merged id is freshly generated and unique");
            }
            if graph.add_relationship(r1).is_err() {
                unreachable!("provenance edge endpoints are valid");
            }
            if graph.add_relationship(r2).is_err() {
                unreachable!("provenance edge endpoints are valid");
            }

            self.rewire_non_shared(graph, p1_id, p2_id, &merged_id, &succ1, &succ2, true);
            self.rewire_non_shared(graph, p1_id, p2_id, &merged_id, &pred1, &pred2, false);
            self.merge_shared(graph, p1_id, p2_id, &merged_id, &shared_succ, true);
            self.merge_shared(graph, p1_id, p2_id, &merged_id, &shared_pred, false);

            graph.mark_merged(p1_id);
            graph.mark_merged(p2_id);
            merged_member_ids.push(merged_id);
        }

        let mut members = self.processed_twigs.remove(&candidate_id).unwrap_or_default();
        members.extend(merged_member_ids);
        members.extend(twig.iter().cloned());
        members.retain(|id| graph.is_live(id));
        members.sort();
        members.dedup();
        self.processed_twigs.insert(candidate_id, members);
    }

    fn preflight_shared(
        &self,
        graph: &TwigGraph,
        p1_id: &PersonId,
        p2_id: &PersonId,
        shared: &[PersonId],
        outgoing: bool,
    ) -> Result<(), String> {
        for neighbor in shared {
            let (r1, r2) = if outgoing {
                (graph.relationship(p1_id, neighbor), graph.relationship(p2_id, neighbor))
            } else {
                (graph.relationship(neighbor, p1_id), graph.relationship(neighbor, p2_id))
            };
            if let (Some(r1), Some(r2)) = (r1, r2) {
                if !relation_type_equal(r1, r2) {
                    return Err(format!(
                        "relationship_type mismatch between shared-neighbor edges for {neighbor}"
                    ));
                }
                let identity = RelationshipIdentity {
                    identifier: r1.identifier.clone(),
                    from_id: r1.from_id.clone(),
                    to_id: r1.to_id.clone(),
                };
                merge_relationships(identity, r1, r2).map_err(|RelationMergeConflict { reason, .. }| reason)?;
            }
        }
        Ok(())
    }

    fn rewire_non_shared(
        &self,
        graph: &mut TwigGraph,
        p1_id: &PersonId,
        p2_id: &PersonId,
        merged_id: &PersonId,
        from_p1: &[(PersonId, RelationId)],
        from_p2: &[(PersonId, RelationId)],
        outgoing: bool,
    ) {
        let p2_neighbors: HashSet<PersonId> = from_p2.iter().map(|(id, _)| id.clone()).collect();
        let p1_neighbors: HashSet<PersonId> = from_p1.iter().map(|(id, _)| id.clone()).collect();

        for (neighbor, _) in from_p1.iter().filter(|(id, _)| !p2_neighbors.contains(id)) {
            self.rewire_one(graph, p1_id, neighbor, merged_id, outgoing);
        }
        for (neighbor, _) in from_p2.iter().filter(|(id, _)| !p1_neighbors.contains(id)) {
            self.rewire_one(graph, p2_id, neighbor, merged_id, outgoing);
        }
    }

    fn rewire_one(&self, graph: &mut TwigGraph, old_id: &PersonId, neighbor: &PersonId, merged_id: &PersonId, outgoing: bool) {
        let (from, to) = if outgoing { (old_id, neighbor) } else { (neighbor, old_id) };
        let Some(mut rel) = graph.remove_relationship(from, to) else {
            return;
        };
        let (new_from, new_to) = if outgoing {
            (merged_id.clone(), neighbor.clone())
        } else {
            (neighbor.clone(), merged_id.clone())
        };
        rel.from_id = new_from;
        rel.to_id = new_to;
        let _ = graph.add_relationship(rel);
    }

    fn merge_shared(
        &mut self,
        graph: &mut TwigGraph,
        p1_id: &PersonId,
        p2_id: &PersonId,
        merged_id: &PersonId,
        shared: &[PersonId],
        outgoing: bool,
    ) {
        for neighbor in shared {
            let (r1, r2) = if outgoing {
                (graph.remove_relationship(p1_id, neighbor), graph.remove_relationship(p2_id, neighbor))
            } else {
                (graph.remove_relationship(neighbor, p1_id), graph.remove_relationship(neighbor, p2_id))
            };
            let (Some(r1), Some(r2)) = (r1, r2) else { continue };

            let (from_id, to_id) = if outgoing {
                (merged_id.clone(), neighbor.clone())
            } else {
                (neighbor.clone(), merged_id.clone())
            };
            let merged_rel_id = self.fresh_person_id("rel");
            let identity = RelationshipIdentity {
                identifier: merged_rel_id,
                from_id,
                to_id,
            };
            if let Ok(merged_rel) = merge_relationships(identity, &r1, &r2) {
                let _ = graph.add_relationship(merged_rel);
            }
        }
    }
}

fn shared_neighbors(a: &[(PersonId, RelationId)], b: &[(PersonId, RelationId)]) -> Vec<PersonId> {
    let b_ids: HashSet<&PersonId> = b.iter().map(|(id, _)| id).collect();
    a.iter()
        .filter(|(id, _)| b_ids.contains(id))
        .map(|(id, _)| id.clone())
        .collect()
}

/// Standardized surnames of every live Person in a twig (component-design.md
/// Section 4.D: `surnames(T)`).
fn standardized_surnames(graph: &TwigGraph, twig: &[PersonId]) -> HashSet<String> {
    let mut surnames = HashSet::new();
    for id in twig {
        if let Some(person) = graph.person(id) {
            for name in &person.names {
                if let Some(surname) = name.comparable_surname() {
                    surnames.insert(surname.to_owned());
                }
            }
        }
    }
    surnames
}

/// Builds [`McsGraph`]s for `small`/`large` person-id lists (induced from the
/// live subgraph) and runs the MCS search with this domain's compatibility
/// oracles.
fn run_mcs(graph: &TwigGraph, small: &[PersonId], large: &[PersonId]) -> crate::mcs::McsResult {
    let small_graph = induced_subgraph(graph, small);
    let large_graph = induced_subgraph(graph, large);

    let node_pred = |a: &PersonId, b: &PersonId| {
        let (Some(pa), Some(pb)) = (graph.person(a), graph.person(b)) else {
            return false;
        };
        !person_mismatch(pa, pb, graph)
    };
    let edge_pred = |a: &Relationship, b: &Relationship| relation_type_equal(a, b);

    find_maximum_common_subgraph(&small_graph, &large_graph, node_pred, edge_pred)
}

fn induced_subgraph(graph: &TwigGraph, members: &[PersonId]) -> McsGraph<PersonId, Relationship> {
    let mut mcs_graph: McsGraph<PersonId, Relationship> = McsGraph::new(members.to_vec());
    let index_of: HashMap<&PersonId, usize> = members.iter().enumerate().map(|(i, id)| (id, i)).collect();

    for (from_idx, from_id) in members.iter().enumerate() {
        for (to_id, _) in graph.live_successors(from_id) {
            if let Some(&to_idx) = index_of.get(&to_id) {
                if let Some(rel) = graph.relationship(from_id, &to_id) {
                    let _ = mcs_graph.add_edge(from_idx, to_idx, rel.clone());
                }
            }
        }
    }

    mcs_graph
}
