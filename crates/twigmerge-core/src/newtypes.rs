/// Validated newtype wrappers for core twigmerge domain identifiers.
///
/// Each newtype enforces a shape constraint at construction time via
/// [`TryFrom<&str>`]. Once constructed, the inner value is immutable (no
/// `DerefMut`). Serde `Deserialize` impls re-run validation so invalid data
/// cannot enter the type system from untrusted JSON.
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when constructing a validated newtype from an invalid string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewtypeError {
    /// The string did not match the expected format.
    InvalidFormat {
        /// Name of the type that rejected the input.
        type_name: &'static str,
        /// A human-readable description of the expected format.
        expected: &'static str,
        /// The input that was rejected.
        got: String,
    },
}

impl fmt::Display for NewtypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat {
                type_name,
                expected,
                got,
            } => write!(f, "invalid {type_name}: expected {expected}, got {got:?}"),
        }
    }
}

impl std::error::Error for NewtypeError {}

// ---------------------------------------------------------------------------
// PersonId
// ---------------------------------------------------------------------------

/// Opaque, globally unique, stable identifier for a [`crate::structures::Person`].
///
/// Accepts any non-empty string; no further shape constraint is imposed by the
/// data model. Assigned at creation and never reused (data-model.md Section 3).
/// Use [`RelationId`] as a type alias when the identifier refers to a
/// [`crate::structures::Relationship`] for documentation clarity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(String);

impl TryFrom<&str> for PersonId {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.is_empty() {
            Err(NewtypeError::InvalidFormat {
                type_name: "PersonId",
                expected: "non-empty string",
                got: s.to_owned(),
            })
        } else {
            Ok(Self(s.to_owned()))
        }
    }
}

impl TryFrom<String> for PersonId {
    type Error = NewtypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_from(s.as_str())
    }
}

impl Deref for PersonId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for PersonId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PersonId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::try_from(s.as_str()).map_err(de::Error::custom)
    }
}

/// Alias for [`PersonId`] used when an identifier refers to a [`crate::structures::Relationship`].
///
/// Semantically distinct in documentation; the same validation rules apply.
pub type RelationId = PersonId;

// ---------------------------------------------------------------------------
// TwigId
// ---------------------------------------------------------------------------

/// Opaque identifier for a twig tracked by [`crate::twig_merger::TwigMerger`].
///
/// Twig identifiers are assigned internally as new twigs are registered; they
/// never appear in persisted graph data and carry no external meaning beyond
/// ordering of assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TwigId(u64);

impl TwigId {
    /// Constructs a `TwigId` from a raw ordinal. Only meant for use by
    /// [`crate::twig_merger::TwigMerger`]'s id-allocation counter.
    pub fn from_ordinal(n: u64) -> Self {
        Self(n)
    }
}

impl fmt::Display for TwigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "twig-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
