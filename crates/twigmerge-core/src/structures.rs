/// Conclusion records: [`Person`] and [`Relationship`] (data-model.md Section 3).
///
/// These are the payload structs held in the graph's parallel arenas
/// (see [`crate::graph`]); the graph itself never inlines them into node or
/// edge weights.
use serde::{Deserialize, Serialize};

use crate::enums::{Confidence, FactKind, Gender, NameType, RelationshipType};
use crate::newtypes::{PersonId, RelationId};
use crate::types::{Fact, Name};

/// A conclusion about one historical individual (data-model.md Section 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub identifier: PersonId,
    pub gender: Gender,
    #[serde(default)]
    pub names: Vec<Name>,
    #[serde(default)]
    pub facts: Vec<Fact>,
    /// Tombstone flag. Once `true`, the person is dead weight kept only for
    /// merge-provenance traceability; the live subgraph filters it out
    /// (data-model.md Section 3, Lifecycle).
    #[serde(default)]
    pub merged: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl Person {
    /// A Person's sole `birth` name, if recorded (data-model.md Section 3: "a
    /// Person has at most one `birth` name").
    pub fn birth_name(&self) -> Option<&Name> {
        self.names.iter().find(|n| n.name_type == NameType::Birth)
    }

    /// Every name of the given type, in recorded order.
    pub fn names_of_type(&self, name_type: NameType) -> impl Iterator<Item = &Name> {
        self.names.iter().filter(move |n| n.name_type == name_type)
    }

    /// Every fact of the given kind, in recorded order.
    pub fn facts_of_kind(&self, kind: FactKind) -> impl Iterator<Item = &Fact> {
        self.facts.iter().filter(move |f| f.kind == kind)
    }
}

/// A directed edge annotation between two Persons (data-model.md Section 3).
///
/// For `parent-child`, `from_id` is the parent. For `spouse`, `from_id` is
/// the husband. `merged-into` is a reserved provenance variant produced only
/// by the merge procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub identifier: RelationId,
    pub from_id: PersonId,
    pub to_id: PersonId,
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub facts: Vec<Fact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl Relationship {
    /// Returns the endpoint pair `(from_id, to_id)`, useful for rewiring
    /// after a merge (merge-contract.md Section 4.A step 4).
    pub fn endpoints(&self) -> (&PersonId, &PersonId) {
        (&self.from_id, &self.to_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Date;
    use chrono::NaiveDate;

    fn pid(s: &str) -> PersonId {
        PersonId::try_from(s).expect("valid test id")
    }

    fn name(name_type: NameType, surname: &str) -> Name {
        Name {
            name_type,
            given: Some("Jan".to_owned()),
            surname: Some(surname.to_owned()),
            house_name: None,
            standardized_given: None,
            standardized_surname: None,
            date: None,
            confidence: None,
        }
    }

    #[test]
    fn birth_name_finds_the_single_birth_tagged_name() {
        let person = Person {
            identifier: pid("p1"),
            gender: Gender::Male,
            names: vec![name(NameType::Birth, "Kowalski"), name(NameType::Married, "Nowak")],
            facts: vec![],
            merged: false,
            sources: vec![],
            notes: vec![],
            confidence: None,
        };
        let birth = person.birth_name().expect("has a birth name");
        assert_eq!(birth.surname.as_deref(), Some("Kowalski"));
    }

    #[test]
    fn names_of_type_filters_correctly() {
        let person = Person {
            identifier: pid("p1"),
            gender: Gender::Unknown,
            names: vec![
                name(NameType::AlsoKnownAs, "A"),
                name(NameType::AlsoKnownAs, "B"),
                name(NameType::Birth, "C"),
            ],
            facts: vec![],
            merged: false,
            sources: vec![],
            notes: vec![],
            confidence: None,
        };
        let aka: Vec<_> = person.names_of_type(NameType::AlsoKnownAs).collect();
        assert_eq!(aka.len(), 2);
    }

    #[test]
    fn facts_of_kind_filters_correctly() {
        let d = NaiveDate::parse_from_str("1820-01-01", "%Y-%m-%d").expect("valid test date");
        let person = Person {
            identifier: pid("p1"),
            gender: Gender::Unknown,
            names: vec![],
            facts: vec![
                Fact {
                    kind: FactKind::Birth,
                    date: Some(Date::exact(d)),
                    age: None,
                    locations: vec![],
                    content: None,
                    confidence: None,
                },
                Fact {
                    kind: FactKind::Death,
                    date: None,
                    age: None,
                    locations: vec![],
                    content: None,
                    confidence: None,
                },
            ],
            merged: false,
            sources: vec![],
            notes: vec![],
            confidence: None,
        };
        assert_eq!(person.facts_of_kind(FactKind::Birth).count(), 1);
        assert_eq!(person.facts_of_kind(FactKind::Death).count(), 1);
        assert_eq!(person.facts_of_kind(FactKind::Burial).count(), 0);
    }

    #[test]
    fn person_defaults_merged_false_on_deserialize() {
        let json = r#"{"identifier":"p1","gender":"unknown"}"#;
        let person: Person = serde_json::from_str(json).expect("deserialize");
        assert!(!person.merged);
        assert!(person.names.is_empty());
        assert!(person.sources.is_empty());
    }

    #[test]
    fn relationship_endpoints_returns_from_then_to() {
        let rel = Relationship {
            identifier: pid("r1"),
            from_id: pid("parent"),
            to_id: pid("child"),
            relationship_type: RelationshipType::ParentChild,
            facts: vec![],
            sources: vec![],
            notes: vec![],
            confidence: None,
        };
        let (from, to) = rel.endpoints();
        assert_eq!(from.to_string(), "parent");
        assert_eq!(to.to_string(), "child");
    }

    #[test]
    fn relationship_round_trip_json() {
        let rel = Relationship {
            identifier: pid("r1"),
            from_id: pid("husband"),
            to_id: pid("wife"),
            relationship_type: RelationshipType::Spouse,
            facts: vec![],
            sources: vec!["book A, p.3".to_owned()],
            notes: vec![],
            confidence: Some(Confidence::Normal),
        };
        let json = serde_json::to_string(&rel).expect("serialize");
        let back: Relationship = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(rel, back);
    }
}
