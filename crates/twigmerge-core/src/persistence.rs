//! JSON persistence for a [`TwigGraph`] (data-model.md Section 3, §6).
//!
//! Unlike the catch-all supply-chain file format this crate's structure
//! descends from, [`TwigFile`] carries no unknown-field payload: the
//! genealogy domain's enumerations are closed (§9), so there is nothing an
//! extension field would need to preserve. Round-tripping a `TwigFile` is
//! lossless for every live Person and Relationship.
use serde::{Deserialize, Serialize};

use crate::graph::{GraphError, TwigGraph};
use crate::structures::{Person, Relationship};

/// The on-disk representation of a graph: two flat arrays, persons and
/// relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwigFile {
    pub persons: Vec<Person>,
    pub relations: Vec<Relationship>,
}

/// Errors arising from reading or reconstructing a [`TwigFile`].
#[derive(Debug)]
pub enum PersistenceError {
    /// The input was not well-formed JSON, or did not match the `TwigFile`
    /// shape (missing required field, wrong type, etc).
    Malformed(serde_json::Error),
    /// The file parsed but its contents could not be assembled into a
    /// well-formed graph (duplicate Person id, dangling Relationship
    /// reference, duplicate edge).
    Invalid(GraphError),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Malformed(e) => write!(f, "malformed twig file: {e}"),
            PersistenceError::Invalid(e) => write!(f, "invalid twig file contents: {e}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Malformed(e) => Some(e),
            PersistenceError::Invalid(e) => Some(e),
        }
    }
}

impl TwigFile {
    /// Flattens a live graph into a [`TwigFile`], including merged
    /// (tombstoned) Persons and their provenance edges — a `TwigFile` is a
    /// full snapshot, not just the live subgraph.
    pub fn from_graph(graph: &TwigGraph) -> Self {
        Self {
            persons: graph.all_persons().cloned().collect(),
            relations: graph.all_relationships().cloned().collect(),
        }
    }

    /// Reconstructs a [`TwigGraph`] from this file's persons and relations.
    pub fn into_graph(self) -> Result<TwigGraph, GraphError> {
        let mut graph = TwigGraph::new();
        for person in self.persons {
            graph.add_person(person)?;
        }
        for relation in self.relations {
            graph.add_relationship(relation)?;
        }
        Ok(graph)
    }

    /// Parses a `TwigFile` from a JSON string.
    pub fn from_json(input: &str) -> Result<Self, PersistenceError> {
        serde_json::from_str(input).map_err(PersistenceError::Malformed)
    }

    /// Serializes this `TwigFile` to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(PersistenceError::Malformed)
    }

    /// Parses and reconstructs a [`TwigGraph`] in one step.
    pub fn load_graph(input: &str) -> Result<TwigGraph, PersistenceError> {
        Self::from_json(input)?
            .into_graph()
            .map_err(PersistenceError::Invalid)
    }
}
