//! The boundary between external record sources and the graph.
//!
//! A [`Record`] is anything that can hand over a batch of Persons and
//! Relationships; [`TwigGraph::append`] drains one into the graph. This
//! workspace ships [`InMemoryRecord`], a trivial in-memory implementation
//! sufficient for tests and for callers that assemble records from sources
//! this crate does not parse itself (e.g. CSV extracts of metrical records).
use crate::graph::{GraphError, TwigGraph};
use crate::structures::{Person, Relationship};

/// A batch of Persons and Relationships ready to be added to a [`TwigGraph`].
///
/// Implementors are free to read from any external source; this crate places
/// no requirement on them beyond producing the two lists below.
pub trait Record {
    /// The Persons carried by this record, in the order they should be added.
    fn people(&self) -> &[Person];

    /// The Relationships carried by this record, in the order they should be
    /// added. Endpoints must refer to Persons either already in the graph or
    /// present earlier in [`Record::people`].
    fn relations(&self) -> &[Relationship];
}

/// A [`Record`] backed by plain `Vec`s, for tests and ad-hoc ingestion.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecord {
    people: Vec<Person>,
    relations: Vec<Relationship>,
}

impl InMemoryRecord {
    pub fn new(people: Vec<Person>, relations: Vec<Relationship>) -> Self {
        Self { people, relations }
    }
}

impl Record for InMemoryRecord {
    fn people(&self) -> &[Person] {
        &self.people
    }

    fn relations(&self) -> &[Relationship] {
        &self.relations
    }
}

impl TwigGraph {
    /// Adds every Person and then every Relationship in `record` to this
    /// graph, in order.
    ///
    /// Persons are added first so that same-record Relationships can refer
    /// to them. Fails on the first [`GraphError`] encountered (duplicate
    /// Person id, dangling Relationship reference, or duplicate edge);
    /// Persons/Relationships added before the failing one remain in the
    /// graph.
    pub fn append<R: Record>(&mut self, record: &R) -> Result<(), GraphError> {
        for person in record.people() {
            self.add_person(person.clone())?;
        }
        for relation in record.relations() {
            self.add_relationship(relation.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{Confidence, Gender, RelationshipType};
    use crate::newtypes::PersonId;

    fn person(id: &str) -> Person {
        Person {
            identifier: PersonId::try_from(id).expect("valid id"),
            gender: Gender::Unknown,
            names: Vec::new(),
            facts: Vec::new(),
            merged: false,
            sources: Vec::new(),
            notes: Vec::new(),
            confidence: Some(Confidence::Certain),
        }
    }

    fn relationship(id: &str, from: &str, to: &str) -> Relationship {
        Relationship {
            identifier: PersonId::try_from(id).expect("valid id"),
            from_id: PersonId::try_from(from).expect("valid id"),
            to_id: PersonId::try_from(to).expect("valid id"),
            relationship_type: RelationshipType::ParentChild,
            facts: Vec::new(),
            sources: Vec::new(),
            notes: Vec::new(),
            confidence: Some(Confidence::Certain),
        }
    }

    #[test]
    fn append_adds_people_before_relations_in_the_same_record() {
        let record = InMemoryRecord::new(
            vec![person("p-1"), person("p-2")],
            vec![relationship("r-1", "p-1", "p-2")],
        );
        let mut graph = TwigGraph::new();
        graph.append(&record).expect("append should succeed");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn append_stops_at_the_first_graph_error() {
        let record = InMemoryRecord::new(
            vec![person("p-1")],
            vec![relationship("r-1", "p-1", "p-missing")],
        );
        let mut graph = TwigGraph::new();
        let err = graph.append(&record).expect_err("dangling ref should fail");
        assert!(matches!(err, GraphError::DanglingRelationshipRef { .. }));
        assert_eq!(graph.node_count(), 1);
    }
}
