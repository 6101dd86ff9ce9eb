/// Closed tagged-union vocabularies used throughout the genealogical data model
/// (data-model.md Section 3).
///
/// Unlike the open `Known(T)`/`Extension(String)` tag pattern used for
/// extensible vocabularies elsewhere in this workspace's lineage, every
/// enumeration here is closed by the domain itself: a Person's gender, a
/// Name's tag, a Fact's kind, a Relationship's type, and a Confidence level
/// are all fixed, small vocabularies with no external extension surface to
/// preserve. Each enum serializes to/from `snake_case` JSON strings.
use serde::{Deserialize, Serialize};

/// The sex of a [`crate::structures::Person`] as recorded by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

/// The tag distinguishing how a [`crate::types::Name`] relates to its bearer.
///
/// A Person has at most one `Birth` name (data-model.md Section 3); the other
/// variants may repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameType {
    Birth,
    Married,
    AlsoKnownAs,
    Unknown,
}

/// The kind of a [`crate::types::Fact`] attached to a Person or Relationship.
///
/// `Coelebs` ("never married") and `Uxoratus` ("was married") are retained
/// under their original Latin metrical-record terms, matching the source
/// material these facts are transcribed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    Birth,
    Death,
    Burial,
    Stillbirth,
    Coelebs,
    Uxoratus,
    IllegitimateBirth,
    NumberOfMarriages,
    NumberOfChildren,
    MaritalStatus,
}

/// The type of a directed [`crate::structures::Relationship`] edge.
///
/// `MergedInto` is a reserved provenance variant produced only by the merge
/// procedure (data-model.md Section 3, Lifecycle step 3) and never by
/// external ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    ParentChild,
    Spouse,
    MergedInto,
}

/// Confidence level attached to a Person, Relationship, Name, or Fact.
///
/// Mirrors the original model's free-text `Conclusion.confidence` field,
/// closed to a fixed four-level scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Normal,
    High,
    Certain,
}

/// Precision tag for an [`crate::types::AgeDuration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPrecision {
    Year,
    Month,
    Week,
    Day,
}

/// Order in which the [`crate::twig_merger::TwigMerger`] pops twigs from its
/// work queue.
///
/// Resolves the explicit open question in design-notes.md Section 9(a): the
/// source material is ambiguous between largest-first and smallest-first
/// queue processing, so this workspace exposes both as a configuration knob
/// rather than guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOrder {
    /// Pop the smallest twig first (the default).
    SmallestFirst,
    /// Pop the largest twig first.
    LargestFirst,
}

impl Default for QueueOrder {
    fn default() -> Self {
        Self::SmallestFirst
    }
}
