/// Shared structural types composed into a [`crate::structures::Person`] or
/// [`crate::structures::Relationship`]: dates, durations, locations, names,
/// and facts (data-model.md Section 3).
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::enums::{Confidence, DurationPrecision, FactKind, NameType};

// ---------------------------------------------------------------------------
// Date
// ---------------------------------------------------------------------------

/// A half-open date interval `[start, end]` with an `accuracy` tolerance in
/// days (data-model.md Section 3).
///
/// An exact date is the degenerate interval `start == end`, `accuracy == 0`.
/// This is the one piece of real date arithmetic in scope: the narrow
/// overlap-consistency predicate the compatibility oracles need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Date {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Tolerance, in days, applied to both ends of the interval when testing
    /// overlap-consistency.
    pub accuracy: i64,
}

impl Date {
    /// Builds the degenerate interval representing a single exact day.
    pub fn exact(on: NaiveDate) -> Self {
        Self {
            start: on,
            end: on,
            accuracy: 0,
        }
    }

    /// Two dates are overlap-consistent iff
    /// `d1.start - d1.acc <= d2.end + d2.acc` AND
    /// `d2.start - d2.acc <= d1.end + d1.acc` (data-model.md Section 3).
    pub fn overlap_consistent(&self, other: &Date) -> bool {
        let my_acc = Duration::days(self.accuracy);
        let other_acc = Duration::days(other.accuracy);
        self.start - my_acc <= other.end + other_acc && other.start - other_acc <= self.end + my_acc
    }

    /// Returns `true` iff `self` is strictly before `other`, comparing
    /// `self.end` against `other.start` (ignoring accuracy — used only for
    /// the "earliest Birth strictly before latest Death" rule, which the
    /// specification states in terms of point comparison, not overlap).
    pub fn strictly_before(&self, other: &Date) -> bool {
        self.end < other.start
    }
}

// ---------------------------------------------------------------------------
// AgeDuration
// ---------------------------------------------------------------------------

/// The age of a Person at the time of a Fact, expressed as `(years, months,
/// weeks, days)` plus a precision tag and an optional unit-ambiguity flag
/// (data-model.md Section 3; mirrors the original model's `Duration` class).
///
/// Not consulted by either compatibility oracle; carried only for
/// persistence fidelity (external-interfaces.md Section 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeDuration {
    /// `[years, months, weeks, days]`.
    pub duration: [u32; 4],
    pub precision: DurationPrecision,
    /// Flags the "dies vitae" transcription ambiguity between days and years
    /// units that the original ingestion pipeline recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_day_ambiguity: Option<bool>,
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A house-number-centric location (data-model.md Section 3).
///
/// `alt_house_number` and `alt_village` record the renumbering/relocation a
/// metrical book entry like `"123/245"` implies; both are `None` when the
/// entry gives a single, unambiguous house number in the home parish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_house_number: Option<u32>,
    /// The renumbered/relocated village a `"123/245"`-style metrical entry
    /// implies, when the record itself names an alternate village rather
    /// than just an alternate house number. `None` when the entry names only
    /// one village.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_village: Option<String>,
}

impl Location {
    /// Two locations are consistent iff their villages match AND the
    /// multisets of house numbers share at least one non-null element
    /// (data-model.md Section 3).
    ///
    /// The primary village each location was recorded under is supplied by
    /// the caller (`self_village`/`other_village`), since it is the
    /// enclosing record's village, not a field of `Location` itself; `self`'s
    /// and `other`'s `alt_village` join that primary village in the multiset
    /// "villages match" compares, the same way `alt_house_number` joins
    /// `house_number`. A `None` village is treated as "the parish's home
    /// village" (per the original model's documented default), so it matches
    /// any other `None` or any explicit village — only two differing
    /// explicit villages disagree.
    pub fn consistent(&self, self_village: Option<&str>, other: &Location, other_village: Option<&str>) -> bool {
        let mine_villages: Vec<&str> = [self_village, self.alt_village.as_deref()].into_iter().flatten().collect();
        let their_villages: Vec<&str> = [other_village, other.alt_village.as_deref()].into_iter().flatten().collect();
        let villages_match = if mine_villages.is_empty() || their_villages.is_empty() {
            true
        } else {
            mine_villages.iter().any(|a| their_villages.contains(a))
        };
        if !villages_match {
            return false;
        }
        let mine = [self.house_number, self.alt_house_number];
        let theirs = [other.house_number, other.alt_house_number];
        mine.into_iter()
            .flatten()
            .any(|h| theirs.into_iter().flatten().any(|o| o == h))
    }
}

// ---------------------------------------------------------------------------
// Name
// ---------------------------------------------------------------------------

/// A single recorded name of a Person (data-model.md Section 3).
///
/// `given`/`surname` are the raw transcribed parts; `standardized_given`/
/// `standardized_surname` are filled in externally by a thesaurus lookup
/// (external-interfaces.md Section 6) and preferred by the comparator when
/// present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub name_type: NameType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standardized_given: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standardized_surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl Name {
    /// The given-name part preferred by the comparator: standardized if
    /// known, else the raw transcription.
    pub fn comparable_given(&self) -> Option<&str> {
        self.standardized_given
            .as_deref()
            .or(self.given.as_deref())
    }

    /// The surname part preferred by the comparator: standardized if known,
    /// else the raw transcription.
    pub fn comparable_surname(&self) -> Option<&str> {
        self.standardized_surname
            .as_deref()
            .or(self.surname.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Fact
// ---------------------------------------------------------------------------

/// A conclusion presumed true about a Person or Relationship
/// (data-model.md Section 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub kind: FactKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<AgeDuration>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locations: Vec<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl Fact {
    /// Two Facts are structurally equal for deduplication purposes iff they
    /// share a `kind` and `date` (merge-contract.md Section 4.A: "deduplicated
    /// by structural equality of name-parts and fact-kind+date").
    pub fn dedup_key(&self) -> (FactKind, Option<Date>) {
        (self.kind, self.date)
    }
}
