/// Compatibility oracles for the merge engine.
///
/// Implements `person_mismatch` and `relation_type_equal` as described in
/// component-design.md Section 4.B. Both predicates are pure and
/// side-effect-free except for the read-only graph handle `person_mismatch`
/// consults for rule 5.
use crate::enums::FactKind;
use crate::graph::TwigGraph;
use crate::structures::{Person, Relationship};
use crate::types::Name;

// ---------------------------------------------------------------------------
// person_mismatch
// ---------------------------------------------------------------------------

/// Returns `true` if `p1` and `p2` **cannot** be the same real-world
/// individual.
///
/// Decision rules are applied in order; the first decisive rule wins
/// (component-design.md Section 4.B):
///
/// 1. Either has a `Stillbirth` fact → mismatch.
/// 2. Genders known and differ → mismatch.
/// 3. Name match: a definite disagreement on a birth-name surname, or on
///    both given and surname of any `married`/`unknown` name pairing,
///    is a mismatch. Absence of a name part is never itself a disagreement.
/// 4. Date match: Birth/Birth and Death/Death must be overlap-consistent;
///    a Birth must strictly precede the other's Death.
/// 5. A `Coelebs` fact on one side conflicts with a spouse relation (in the
///    live graph) or a `married` Name on the other.
/// 6. Otherwise → not mismatch.
pub fn person_mismatch(p1: &Person, p2: &Person, graph: &TwigGraph) -> bool {
    // Rule 1: stillbirth.
    if has_stillbirth(p1) || has_stillbirth(p2) {
        return true;
    }

    // Rule 2: gender.
    if genders_conflict(p1, p2) {
        return true;
    }

    // Rule 3: names.
    if names_conflict(p1, p2) {
        return true;
    }

    // Rule 4: dates.
    if dates_conflict(p1, p2) {
        return true;
    }

    // Rule 5: coelebs vs spouse.
    if coelebs_conflicts_with_spouse(p1, p2, graph) {
        return true;
    }

    // Rule 6.
    false
}

fn has_stillbirth(person: &Person) -> bool {
    person.facts_of_kind(FactKind::Stillbirth).next().is_some()
}

fn genders_conflict(p1: &Person, p2: &Person) -> bool {
    use crate::enums::Gender;
    match (p1.gender, p2.gender) {
        (Gender::Unknown, _) | (_, Gender::Unknown) => false,
        (a, b) => a != b,
    }
}

fn names_conflict(p1: &Person, p2: &Person) -> bool {
    use crate::enums::NameType;

    if let (Some(b1), Some(b2)) = (p1.birth_name(), p2.birth_name()) {
        if birth_names_disagree(b1, b2) {
            return true;
        }
    }

    // Married and unknown-type names are pooled per person rather than
    // compared subtype-by-subtype: a `married` name on one side is a valid
    // comparison against an `unknown` name on the other.
    let lhs: Vec<&Name> = [NameType::Married, NameType::Unknown]
        .into_iter()
        .flat_map(|t| p1.names_of_type(t))
        .collect();
    let rhs: Vec<&Name> = [NameType::Married, NameType::Unknown]
        .into_iter()
        .flat_map(|t| p2.names_of_type(t))
        .collect();
    if lhs.iter().any(|a| rhs.iter().any(|b| name_parts_disagree(a, b))) {
        return true;
    }

    false
}

/// A birth-name disagreement on either the given or the surname part is
/// fatal on its own — unlike [`name_parts_disagree`], the two parts are not
/// required to disagree together (component-design.md Section 4.B rule 3:
/// "standardized given AND standardized surname must match when both are
/// known"; a known surname mismatch disqualifies the pair regardless of the
/// given name, and symmetrically for a given-name mismatch).
fn birth_names_disagree(a: &Name, b: &Name) -> bool {
    let given_disagrees = match (a.comparable_given(), b.comparable_given()) {
        (Some(ga), Some(gb)) => !ga.eq_ignore_ascii_case(gb),
        _ => false,
    };
    let surname_disagrees = match (a.comparable_surname(), b.comparable_surname()) {
        (Some(sa), Some(sb)) => !sa.eq_ignore_ascii_case(sb),
        _ => false,
    };
    given_disagrees || surname_disagrees
}

/// Two names disagree only when both given and surname are known on both
/// sides and at least one part differs; an unknown part is never grounds for
/// disagreement ("absence isn't disagreement").
fn name_parts_disagree(a: &Name, b: &Name) -> bool {
    let given_disagrees = match (a.comparable_given(), b.comparable_given()) {
        (Some(ga), Some(gb)) => !ga.eq_ignore_ascii_case(gb),
        _ => false,
    };
    let surname_disagrees = match (a.comparable_surname(), b.comparable_surname()) {
        (Some(sa), Some(sb)) => !sa.eq_ignore_ascii_case(sb),
        _ => false,
    };
    given_disagrees && surname_disagrees
}

fn dates_conflict(p1: &Person, p2: &Person) -> bool {
    let birth1 = p1.facts_of_kind(FactKind::Birth).find_map(|f| f.date);
    let birth2 = p2.facts_of_kind(FactKind::Birth).find_map(|f| f.date);
    let death1 = p1.facts_of_kind(FactKind::Death).find_map(|f| f.date);
    let death2 = p2.facts_of_kind(FactKind::Death).find_map(|f| f.date);

    if let (Some(b1), Some(b2)) = (birth1, birth2) {
        if !b1.overlap_consistent(&b2) {
            return true;
        }
    }

    if let (Some(d1), Some(d2)) = (death1, death2) {
        if !d1.overlap_consistent(&d2) {
            return true;
        }
    }

    if let (Some(b1), Some(d2)) = (birth1, death2) {
        if !b1.strictly_before(&d2) {
            return true;
        }
    }

    if let (Some(b2), Some(d1)) = (birth2, death1) {
        if !b2.strictly_before(&d1) {
            return true;
        }
    }

    false
}

fn coelebs_conflicts_with_spouse(p1: &Person, p2: &Person, graph: &TwigGraph) -> bool {
    (is_coelebs(p1) && has_spouse_evidence(p2, graph)) || (is_coelebs(p2) && has_spouse_evidence(p1, graph))
}

fn is_coelebs(person: &Person) -> bool {
    person.facts_of_kind(FactKind::Coelebs).next().is_some()
}

fn has_spouse_evidence(person: &Person, graph: &TwigGraph) -> bool {
    use crate::enums::{NameType, RelationshipType};

    if person.names_of_type(NameType::Married).next().is_some() {
        return true;
    }

    graph
        .live_successors(&person.identifier)
        .iter()
        .chain(graph.live_predecessors(&person.identifier).iter())
        .any(|(neighbor_id, _)| {
            graph
                .relationship(&person.identifier, neighbor_id)
                .or_else(|| graph.relationship(neighbor_id, &person.identifier))
                .is_some_and(|r| r.relationship_type == RelationshipType::Spouse)
        })
}

// ---------------------------------------------------------------------------
// relation_type_equal
// ---------------------------------------------------------------------------

/// Trivial equality on `relationship_type` (component-design.md Section 4.B).
pub fn relation_type_equal(e1: &Relationship, e2: &Relationship) -> bool {
    e1.relationship_type == e2.relationship_type
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::enums::{FactKind, Gender, NameType, RelationshipType};
    use crate::newtypes::PersonId;
    use crate::types::{Date, Fact};
    use chrono::NaiveDate;

    fn pid(s: &str) -> PersonId {
        PersonId::try_from(s).expect("valid id")
    }

    fn bare_person(id: &str, gender: Gender) -> Person {
        Person {
            identifier: pid(id),
            gender,
            names: vec![],
            facts: vec![],
            merged: false,
            sources: vec![],
            notes: vec![],
            confidence: None,
        }
    }

    fn birth_name(given: &str, surname: &str) -> Name {
        Name {
            name_type: NameType::Birth,
            given: Some(given.to_owned()),
            surname: Some(surname.to_owned()),
            house_name: None,
            standardized_given: None,
            standardized_surname: None,
            date: None,
            confidence: None,
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
    }

    fn fact(kind: FactKind, date: &str) -> Fact {
        Fact {
            kind,
            date: Some(Date::exact(d(date))),
            age: None,
            locations: vec![],
            content: None,
            confidence: None,
        }
    }

    #[test]
    fn stillbirth_is_always_a_mismatch() {
        let mut p1 = bare_person("p1", Gender::Unknown);
        p1.facts.push(Fact {
            kind: FactKind::Stillbirth,
            date: None,
            age: None,
            locations: vec![],
            content: None,
            confidence: None,
        });
        let p2 = bare_person("p2", Gender::Unknown);
        let graph = TwigGraph::new();
        assert!(person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn differing_known_genders_mismatch() {
        let p1 = bare_person("p1", Gender::Male);
        let p2 = bare_person("p2", Gender::Female);
        let graph = TwigGraph::new();
        assert!(person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn unknown_gender_never_causes_mismatch() {
        let p1 = bare_person("p1", Gender::Male);
        let p2 = bare_person("p2", Gender::Unknown);
        let graph = TwigGraph::new();
        assert!(!person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn birth_surname_disagreement_is_fatal_regardless_of_given_name() {
        let mut p1 = bare_person("p1", Gender::Unknown);
        p1.names.push(birth_name("Jan", "Kowalski"));
        let mut p2 = bare_person("p2", Gender::Unknown);
        p2.names.push(birth_name("Jan", "Nowak"));
        let graph = TwigGraph::new();
        assert!(person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn birth_given_name_disagreement_is_fatal_regardless_of_surname() {
        let mut p1 = bare_person("p1", Gender::Unknown);
        p1.names.push(birth_name("Jan", "Kowalski"));
        let mut p2 = bare_person("p2", Gender::Unknown);
        p2.names.push(birth_name("Piotr", "Kowalski"));
        let graph = TwigGraph::new();
        assert!(person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn absent_name_part_is_not_disagreement() {
        let mut p1 = bare_person("p1", Gender::Unknown);
        p1.names.push(Name {
            name_type: NameType::Birth,
            given: None,
            surname: Some("Kowalski".to_owned()),
            house_name: None,
            standardized_given: None,
            standardized_surname: None,
            date: None,
            confidence: None,
        });
        let mut p2 = bare_person("p2", Gender::Unknown);
        p2.names.push(birth_name("Jan", "Kowalski"));
        let graph = TwigGraph::new();
        assert!(!person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn overlapping_birth_dates_are_not_a_mismatch() {
        let mut p1 = bare_person("p1", Gender::Unknown);
        p1.facts.push(fact(FactKind::Birth, "1820-01-01"));
        let mut p2 = bare_person("p2", Gender::Unknown);
        p2.facts.push(fact(FactKind::Birth, "1820-01-01"));
        let graph = TwigGraph::new();
        assert!(!person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn disjoint_birth_dates_mismatch() {
        let mut p1 = bare_person("p1", Gender::Unknown);
        p1.facts.push(fact(FactKind::Birth, "1820-01-01"));
        let mut p2 = bare_person("p2", Gender::Unknown);
        p2.facts.push(fact(FactKind::Birth, "1850-01-01"));
        let graph = TwigGraph::new();
        assert!(person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn birth_after_others_death_mismatches() {
        let mut p1 = bare_person("p1", Gender::Unknown);
        p1.facts.push(fact(FactKind::Birth, "1900-01-01"));
        let mut p2 = bare_person("p2", Gender::Unknown);
        p2.facts.push(fact(FactKind::Death, "1850-01-01"));
        let graph = TwigGraph::new();
        assert!(person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn coelebs_conflicts_with_married_name() {
        let mut p1 = bare_person("p1", Gender::Unknown);
        p1.facts.push(Fact {
            kind: FactKind::Coelebs,
            date: None,
            age: None,
            locations: vec![],
            content: None,
            confidence: None,
        });
        let mut p2 = bare_person("p2", Gender::Unknown);
        p2.names.push(Name {
            name_type: NameType::Married,
            given: None,
            surname: None,
            house_name: None,
            standardized_given: None,
            standardized_surname: None,
            date: None,
            confidence: None,
        });
        let graph = TwigGraph::new();
        assert!(person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn coelebs_conflicts_with_live_spouse_relation() {
        let mut graph = TwigGraph::new();
        let mut p1 = bare_person("p1", Gender::Unknown);
        p1.facts.push(Fact {
            kind: FactKind::Coelebs,
            date: None,
            age: None,
            locations: vec![],
            content: None,
            confidence: None,
        });
        let p2 = bare_person("p2", Gender::Unknown);
        let spouse = bare_person("spouse-of-p2", Gender::Unknown);
        graph.add_person(p2.clone()).expect("add p2");
        graph.add_person(spouse.clone()).expect("add spouse");
        graph
            .add_relationship(Relationship {
                identifier: pid("rel-1"),
                from_id: pid("p2"),
                to_id: pid("spouse-of-p2"),
                relationship_type: RelationshipType::Spouse,
                facts: vec![],
                sources: vec![],
                notes: vec![],
                confidence: None,
            })
            .expect("add relationship");
        assert!(person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn no_conflicting_evidence_is_not_a_mismatch() {
        let p1 = bare_person("p1", Gender::Unknown);
        let p2 = bare_person("p2", Gender::Unknown);
        let graph = TwigGraph::new();
        assert!(!person_mismatch(&p1, &p2, &graph));
    }

    #[test]
    fn relation_type_equal_checks_type_only() {
        let a = Relationship {
            identifier: pid("r1"),
            from_id: pid("x"),
            to_id: pid("y"),
            relationship_type: RelationshipType::ParentChild,
            facts: vec![],
            sources: vec![],
            notes: vec![],
            confidence: None,
        };
        let mut b = a.clone();
        assert!(relation_type_equal(&a, &b));
        b.relationship_type = RelationshipType::Spouse;
        assert!(!relation_type_equal(&a, &b));
    }
}
