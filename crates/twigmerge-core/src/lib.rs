#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod enums;
pub mod graph;
pub mod identity;
pub mod ingest;
pub mod mcs;
pub mod merge;
pub mod newtypes;
pub mod persistence;
pub mod structures;
pub mod thesaurus;
pub mod twig_merger;
pub mod types;

pub use enums::{
    Confidence, DurationPrecision, FactKind, Gender, NameType, QueueOrder, RelationshipType,
};
pub use graph::{EdgeWeight, GraphError, NodeWeight, TwigGraph};
pub use identity::{person_mismatch, relation_type_equal};
pub use ingest::{InMemoryRecord, Record};
pub use mcs::{DuplicateMcsEdge, McsGraph, McsResult, find_maximum_common_subgraph};
pub use merge::{
    MergeIncompatible, RelationMergeConflict, RelationshipIdentity, merge_persons,
    merge_relationships,
};
pub use newtypes::{NewtypeError, PersonId, RelationId, TwigId};
pub use persistence::{PersistenceError, TwigFile};
pub use structures::{Person, Relationship};
pub use thesaurus::{HashThesaurus, Thesaurus};
pub use twig_merger::{MergerConfig, TwigMerger, Warning};
pub use types::{AgeDuration, Date, Fact, Location, Name};

/// Returns the current version of the twigmerge-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
