//! Property-based tests for the MCS engine and the Twig Merger.
//!
//! Verifies the testable properties enumerated in this workspace's
//! component-design notes: MCS soundness, maximality, and determinism; merge
//! idempotence; and compatibility-oracle symmetry.
#![allow(clippy::expect_used)]

use std::collections::HashSet;

use proptest::prelude::*;

use twigmerge_core::enums::{Gender, RelationshipType};
use twigmerge_core::mcs::{McsGraph, McsResult, find_maximum_common_subgraph};
use twigmerge_core::newtypes::PersonId;
use twigmerge_core::structures::{Person, Relationship};
use twigmerge_core::{MergerConfig, TwigFile, TwigGraph, TwigMerger, person_mismatch};

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// A small labeled directed graph: node labels plus a dedup'd, no-self-loop
/// edge list. Built by a free function rather than a `proptest`-derived type
/// so the edge list can be filtered against the chosen node count.
#[derive(Debug, Clone)]
struct LabeledDigraph {
    labels: Vec<u8>,
    edges: Vec<(usize, usize)>,
}

fn arb_digraph(max_nodes: usize) -> impl Strategy<Value = LabeledDigraph> {
    (1..=max_nodes).prop_flat_map(|n| {
        let labels = proptest::collection::vec(0u8..3, n..=n);
        let edge_candidates: Vec<(usize, usize)> = (0..n)
            .flat_map(|u| (0..n).filter(move |&v| v != u).map(move |v| (u, v)))
            .collect();
        let edges = proptest::collection::vec(proptest::bool::ANY, edge_candidates.len());
        (labels, Just(edge_candidates), edges).prop_map(|(labels, candidates, flags)| {
            let edges = candidates
                .into_iter()
                .zip(flags)
                .filter_map(|(pair, keep)| keep.then_some(pair))
                .collect();
            LabeledDigraph { labels, edges }
        })
    })
}

fn build_mcs_graph(g: &LabeledDigraph) -> McsGraph<u8, ()> {
    let mut graph = McsGraph::new(g.labels.clone());
    for &(from, to) in &g.edges {
        // Duplicate insertion cannot occur: `g.edges` is built from a
        // deduplicated candidate list filtered once per proptest run.
        let _ = graph.add_edge(from, to, ());
    }
    graph
}

fn labels_equal(a: &u8, b: &u8) -> bool {
    a == b
}

fn always_compatible(_: &(), _: &()) -> bool {
    true
}

// ---------------------------------------------------------------------------
// MCS soundness & maximality & determinism
// ---------------------------------------------------------------------------

proptest! {
    /// Every returned assignment is injective, and every g1 edge whose
    /// endpoints are both assigned is correctly classified as added or
    /// removed, summing to the reported `edges_in_maximal_subgraph`.
    #[test]
    fn mcs_soundness(g1 in arb_digraph(5), g2 in arb_digraph(5)) {
        let mg1 = build_mcs_graph(&g1);
        let mg2 = build_mcs_graph(&g2);
        let result = find_maximum_common_subgraph(&mg1, &mg2, labels_equal, always_compatible);

        for assignment in &result.maximal_common_subgraphs {
            // Injective: no two g1 nodes map to the same g2 node.
            let values: HashSet<&usize> = assignment.values().collect();
            prop_assert_eq!(values.len(), assignment.len());

            // Every assigned pair must satisfy the node predicate.
            for (&u, &v) in assignment {
                prop_assert!(labels_equal(&g1.labels[u], &g2.labels[v]));
            }

            // Edge accounting: every g1 edge with both endpoints assigned is
            // either matched by a present g2 edge (added) or contributes to
            // the removed count. The total added must equal the reported
            // edge count for this (tied) maximal match.
            let mut added = 0usize;
            for &(u, w) in &g1.edges {
                if let (Some(&v), Some(&v_prime)) = (assignment.get(&u), assignment.get(&w)) {
                    if g2.edges.contains(&(v, v_prime)) {
                        added += 1;
                    }
                }
            }
            prop_assert_eq!(added, result.edges_in_maximal_subgraph);
        }
    }

    /// No returned assignment can be extended by a single additional (u, v)
    /// pair: every unmatched g1 node is incompatible (by label) with every
    /// unused g2 node. If a compatible free pair existed, the search would
    /// always have taken it (matching strictly reduces the null count,
    /// which `record_leaf` always prefers), contradicting that this
    /// assignment survived as maximal.
    #[test]
    fn mcs_maximality(g1 in arb_digraph(5), g2 in arb_digraph(5)) {
        let mg1 = build_mcs_graph(&g1);
        let mg2 = build_mcs_graph(&g2);
        let result = find_maximum_common_subgraph(&mg1, &mg2, labels_equal, always_compatible);

        for assignment in &result.maximal_common_subgraphs {
            let used: HashSet<usize> = assignment.values().copied().collect();
            for u in 0..g1.labels.len() {
                if assignment.contains_key(&u) {
                    continue;
                }
                for v in 0..g2.labels.len() {
                    if used.contains(&v) {
                        continue;
                    }
                    prop_assert!(
                        !labels_equal(&g1.labels[u], &g2.labels[v]),
                        "unmatched g1 node {u} and unused g2 node {v} are compatible; \
                         assignment {assignment:?} should have been extended"
                    );
                }
            }
        }
    }

    /// Running the search twice on the same inputs yields the same set of
    /// assignments (order-independent) and the same bound counters.
    #[test]
    fn mcs_determinism(g1 in arb_digraph(5), g2 in arb_digraph(5)) {
        let mg1 = build_mcs_graph(&g1);
        let mg2 = build_mcs_graph(&g2);
        let first = find_maximum_common_subgraph(&mg1, &mg2, labels_equal, always_compatible);
        let second = find_maximum_common_subgraph(&mg1, &mg2, labels_equal, always_compatible);

        prop_assert_eq!(first.edges_in_maximal_subgraph, second.edges_in_maximal_subgraph);
        prop_assert_eq!(first.maximal_nodes_removed, second.maximal_nodes_removed);
        prop_assert_eq!(first.maximal_edges_removed, second.maximal_edges_removed);

        let as_set = |r: &McsResult| -> HashSet<Vec<(usize, usize)>> {
            r.maximal_common_subgraphs
                .iter()
                .map(|m| {
                    let mut pairs: Vec<(usize, usize)> = m.iter().map(|(&k, &v)| (k, v)).collect();
                    pairs.sort_unstable();
                    pairs
                })
                .collect()
        };
        prop_assert_eq!(as_set(&first), as_set(&second));
    }
}

// ---------------------------------------------------------------------------
// Oracle symmetry
// ---------------------------------------------------------------------------

fn arb_gender() -> impl Strategy<Value = Gender> {
    prop_oneof![Just(Gender::Male), Just(Gender::Female), Just(Gender::Unknown)]
}

fn minimal_person(id: &str, gender: Gender) -> Person {
    Person {
        identifier: PersonId::try_from(id).expect("valid id"),
        gender,
        names: Vec::new(),
        facts: Vec::new(),
        merged: false,
        sources: Vec::new(),
        notes: Vec::new(),
        confidence: None,
    }
}

proptest! {
    /// `person_mismatch` does not depend on argument order.
    #[test]
    fn oracle_symmetry(gender_a in arb_gender(), gender_b in arb_gender()) {
        let graph = TwigGraph::new();
        let a = minimal_person("p-a", gender_a);
        let b = minimal_person("p-b", gender_b);
        prop_assert_eq!(person_mismatch(&a, &b, &graph), person_mismatch(&b, &a, &graph));
    }
}

// ---------------------------------------------------------------------------
// Merge idempotence
// ---------------------------------------------------------------------------

fn pid(s: &str) -> PersonId {
    PersonId::try_from(s).expect("valid id")
}

fn person(id: &str) -> Person {
    Person {
        identifier: pid(id),
        gender: Gender::Unknown,
        names: Vec::new(),
        facts: Vec::new(),
        merged: false,
        sources: Vec::new(),
        notes: Vec::new(),
        confidence: None,
    }
}

fn relationship(id: &str, from: &str, to: &str) -> Relationship {
    Relationship {
        identifier: pid(id),
        from_id: pid(from),
        to_id: pid(to),
        relationship_type: RelationshipType::ParentChild,
        facts: Vec::new(),
        sources: Vec::new(),
        notes: Vec::new(),
        confidence: None,
    }
}

/// Running the Merger on an already-converged graph produces no new merges
/// and leaves the graph bit-for-bit identical (under canonical JSON).
#[test]
fn merge_is_idempotent_on_a_converged_graph() {
    let mut graph = TwigGraph::new();
    graph.add_person(person("a")).expect("add a");
    graph.add_person(person("b")).expect("add b");
    graph
        .add_relationship(relationship("r1", "a", "b"))
        .expect("add edge");

    let mut merger = TwigMerger::new(MergerConfig::default());
    let first_warnings = merger.run(&mut graph);
    let snapshot_after_first = TwigFile::from_graph(&graph)
        .to_json()
        .expect("serialize snapshot");

    let mut second_merger = TwigMerger::new(MergerConfig::default());
    let second_warnings = second_merger.run(&mut graph);
    let snapshot_after_second = TwigFile::from_graph(&graph)
        .to_json()
        .expect("serialize snapshot");

    assert!(first_warnings.is_empty());
    assert!(second_warnings.is_empty());
    assert_eq!(snapshot_after_first, snapshot_after_second);
}

/// After a merge run, every remaining edge still connects two live Persons
/// (monotone tombstoning): no edge is left dangling after merged Persons are
/// removed from the live subgraph.
#[test]
fn live_subgraph_after_merge_has_no_dangling_edges() {
    let mut graph = TwigGraph::new();
    graph.add_person(person("a")).expect("add a");
    graph.add_person(person("b")).expect("add b");
    graph
        .add_relationship(relationship("r1", "a", "b"))
        .expect("add edge");

    let mut merger = TwigMerger::new(MergerConfig::default());
    merger.run(&mut graph);

    for relation in graph.all_relationships() {
        let (from, to) = relation.endpoints();
        assert!(graph.person(from).is_some());
        assert!(graph.person(to).is_some());
        if graph.is_live(from) {
            assert!(!graph.person(from).expect("from person").merged);
        }
        if graph.is_live(to) {
            assert!(!graph.person(to).expect("to person").merged);
        }
    }
}
