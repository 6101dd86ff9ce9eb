//! A read-only `raw -> standardized` lookup for given/surname spellings.
//!
//! Standardization happens before a [`Name`](crate::types::Name) enters the
//! graph; the engine itself never consults a [`Thesaurus`] — it only reads
//! whichever `standardized_given`/`standardized_surname` fields the caller
//! already populated. A miss is non-fatal: the raw spelling is kept as-is.
use std::collections::HashMap;

/// A read-only mapping from a raw spelling to its standardized form.
///
/// Implementors may back this with a static table, a file, or a database;
/// this crate ships only [`HashThesaurus`], a `HashMap`-backed in-memory
/// implementation sufficient for tests and small fixed vocabularies.
pub trait Thesaurus {
    /// Looks up the standardized form of `raw`, if known.
    fn standardize(&self, raw: &str) -> Option<&str>;
}

/// A [`Thesaurus`] backed by a plain `HashMap<String, String>`.
#[derive(Debug, Clone, Default)]
pub struct HashThesaurus {
    entries: HashMap<String, String>,
}

impl HashThesaurus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a thesaurus from an iterator of `(raw, standardized)` pairs.
    pub fn from_entries<I, S1, S2>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S1, S2)>,
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(raw, standardized)| (raw.into(), standardized.into()))
                .collect(),
        }
    }

    /// Inserts or replaces a single `raw -> standardized` entry.
    pub fn insert(&mut self, raw: impl Into<String>, standardized: impl Into<String>) {
        self.entries.insert(raw.into(), standardized.into());
    }
}

impl Thesaurus for HashThesaurus {
    fn standardize(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_spelling_resolves_to_standardized_form() {
        let thesaurus = HashThesaurus::from_entries([("Jan", "Jan"), ("Iwan", "Jan")]);
        assert_eq!(thesaurus.standardize("Iwan"), Some("Jan"));
    }

    #[test]
    fn unknown_spelling_is_a_non_fatal_miss() {
        let thesaurus = HashThesaurus::new();
        assert_eq!(thesaurus.standardize("Unrecognized"), None);
    }

    #[test]
    fn inserted_entry_overrides_prior_value() {
        let mut thesaurus = HashThesaurus::from_entries([("Iwan", "Jan")]);
        thesaurus.insert("Iwan", "Jean");
        assert_eq!(thesaurus.standardize("Iwan"), Some("Jean"));
    }
}
