/// The merge contract: fusing two Persons, or two Relationships, into one
/// (component-design.md Section 4.A).
use crate::enums::RelationshipType;
use crate::graph::TwigGraph;
use crate::identity::person_mismatch;
use crate::newtypes::PersonId;
use crate::structures::{Person, Relationship};
use crate::types::{Fact, Name};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Raised when [`merge_persons`] is asked to merge a pair the compatibility
/// oracle would have rejected (component-design.md Section 4.A: "defense in
/// depth; the caller should have checked").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeIncompatible {
    pub left: PersonId,
    pub right: PersonId,
}

impl std::fmt::Display for MergeIncompatible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "persons {} and {} are not compatible for merge",
            self.left, self.right
        )
    }
}

impl std::error::Error for MergeIncompatible {}

/// Raised when two Relationships being merged carry irreconcilable facts
/// (e.g. contradictory marriage dates whose intervals do not overlap).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationMergeConflict {
    pub relation_type: RelationshipType,
    pub reason: String,
}

impl std::fmt::Display for RelationMergeConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot merge {:?} relationships: {}", self.relation_type, self.reason)
    }
}

impl std::error::Error for RelationMergeConflict {}

// ---------------------------------------------------------------------------
// Person::merge
// ---------------------------------------------------------------------------

/// Merges `self` and `other` into a new Person `p_m`, plus the two
/// merge-provenance edges `r1: self -> p_m` and `r2: other -> p_m`.
///
/// # Preconditions
/// `!self.merged && !other.merged`. The caller should already have checked
/// the compatibility oracle ([`crate::identity::person_mismatch`]) for this
/// pair; this function re-checks it anyway and returns
/// [`MergeIncompatible`] rather than fusing a pair the oracle would reject
/// (component-design.md Section 4.A: "defense in depth").
///
/// # Postconditions
/// `p_m.names`/`p_m.facts` are the union of both inputs', deduplicated by
/// structural equality (name-parts, and fact-kind+date respectively).
/// `p_m.gender` is whichever input's gender is known (both are equal, or
/// at most one is known, per the oracle's own mismatch check). `sources`/
/// `notes` are concatenated, self's then other's (unioned, not
/// deduplicated — a historical record, not a set). The caller is
/// responsible for marking `self`/`other` as merged and inserting `p_m`,
/// `r1`, `r2` into the graph.
pub fn merge_persons(
    self_person: &Person,
    other_person: &Person,
    graph: &TwigGraph,
    merged_id: PersonId,
    provenance_id_1: PersonId,
    provenance_id_2: PersonId,
) -> Result<(Person, Relationship, Relationship), MergeIncompatible> {
    if person_mismatch(self_person, other_person, graph) {
        return Err(MergeIncompatible {
            left: self_person.identifier.clone(),
            right: other_person.identifier.clone(),
        });
    }

    let gender = match (self_person.gender, other_person.gender) {
        (crate::enums::Gender::Unknown, other) => other,
        (known, _) => known,
    };

    let mut names = self_person.names.clone();
    for candidate in &other_person.names {
        if !names.iter().any(|existing| names_structurally_equal(existing, candidate)) {
            names.push(candidate.clone());
        }
    }

    let mut facts = self_person.facts.clone();
    for candidate in &other_person.facts {
        if !facts.iter().any(|existing| existing.dedup_key() == candidate.dedup_key()) {
            facts.push(candidate.clone());
        }
    }

    let mut sources = self_person.sources.clone();
    sources.extend(other_person.sources.iter().cloned());
    let mut notes = self_person.notes.clone();
    notes.extend(other_person.notes.iter().cloned());

    let p_m = Person {
        identifier: merged_id.clone(),
        gender,
        names,
        facts,
        merged: false,
        sources,
        notes,
        confidence: self_person.confidence.max(other_person.confidence),
    };

    let r1 = Relationship {
        identifier: provenance_id_1,
        from_id: self_person.identifier.clone(),
        to_id: merged_id.clone(),
        relationship_type: RelationshipType::MergedInto,
        facts: vec![],
        sources: vec![],
        notes: vec![],
        confidence: None,
    };
    let r2 = Relationship {
        identifier: provenance_id_2,
        from_id: other_person.identifier.clone(),
        to_id: merged_id,
        relationship_type: RelationshipType::MergedInto,
        facts: vec![],
        sources: vec![],
        notes: vec![],
        confidence: None,
    };

    Ok((p_m, r1, r2))
}

/// Structural equality of name-parts, per merge-contract.md Section 4.A.
fn names_structurally_equal(a: &Name, b: &Name) -> bool {
    a.name_type == b.name_type
        && a.given == b.given
        && a.surname == b.surname
        && a.house_name == b.house_name
}

// ---------------------------------------------------------------------------
// Relationship::merge
// ---------------------------------------------------------------------------

/// Merges two Relationships that already share `relationship_type` and
/// endpoints (after reassignment to the merged Person's id).
///
/// Facts are unioned, deduplicated by kind+date as with Persons. Fails with
/// [`RelationMergeConflict`] if any pair of same-kind facts carries
/// non-overlapping dates (component-design.md Section 4.A).
pub fn merge_relationships(
    merged_id: RelationshipIdentity,
    a: &Relationship,
    b: &Relationship,
) -> Result<Relationship, RelationMergeConflict> {
    if a.relationship_type != b.relationship_type {
        return Err(RelationMergeConflict {
            relation_type: a.relationship_type,
            reason: format!(
                "relationship_type mismatch: {:?} vs {:?}",
                a.relationship_type, b.relationship_type
            ),
        });
    }

    for fact_a in &a.facts {
        for fact_b in &b.facts {
            if fact_a.kind != fact_b.kind {
                continue;
            }
            if let (Some(date_a), Some(date_b)) = (fact_a.date, fact_b.date) {
                if !date_a.overlap_consistent(&date_b) {
                    return Err(RelationMergeConflict {
                        relation_type: a.relationship_type,
                        reason: format!("{:?} facts carry non-overlapping dates", fact_a.kind),
                    });
                }
            }
        }
    }

    let mut facts: Vec<Fact> = a.facts.clone();
    for candidate in &b.facts {
        if !facts.iter().any(|existing| existing.dedup_key() == candidate.dedup_key()) {
            facts.push(candidate.clone());
        }
    }

    let mut sources = a.sources.clone();
    sources.extend(b.sources.iter().cloned());
    let mut notes = a.notes.clone();
    notes.extend(b.notes.iter().cloned());

    Ok(Relationship {
        identifier: merged_id.identifier,
        from_id: merged_id.from_id,
        to_id: merged_id.to_id,
        relationship_type: a.relationship_type,
        facts,
        sources,
        notes,
        confidence: a.confidence.max(b.confidence),
    })
}

/// The identity (id + endpoints) the caller wants the merged Relationship to
/// carry. Endpoints are supplied by the caller because by the time two edges
/// are merged, one or both endpoints may already have been rewired to a
/// freshly-merged Person id (twig-merger.md Section 4.D step 5).
#[derive(Debug, Clone)]
pub struct RelationshipIdentity {
    pub identifier: crate::newtypes::RelationId,
    pub from_id: PersonId,
    pub to_id: PersonId,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
