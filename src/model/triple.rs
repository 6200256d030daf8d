//! Subject-predicate-object statements

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::iri::Iri;
use crate::writer::ntriples::{format_iri, format_node};

use super::Node;

/// A statement. The canonical form `<s> <p> <o>` is both its display text
/// and its comparison key.
#[derive(Debug, Clone)]
pub struct Triple {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Node,
}

impl Triple {
    pub fn new(subject: Iri, predicate: Iri, object: impl Into<Node>) -> Self {
        Triple {
            subject,
            predicate,
            object: object.into(),
        }
    }

    /// Canonical string form
    pub fn canonical(&self) -> String {
        format!(
            "{} {} {}",
            format_iri(&self.subject),
            format_iri(&self.predicate),
            format_node(&self.object)
        )
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl PartialEq for Triple {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Triple {}

impl Hash for Triple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl Ord for Triple {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

impl PartialOrd for Triple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Literal;

    fn iri(s: &str) -> Iri {
        Iri::parse(s).unwrap()
    }

    #[test]
    fn test_canonical_form() {
        let t = Triple::new(iri("urn:a"), iri("urn:p"), Literal::with_language("hello", "en"));
        assert_eq!(t.to_string(), "<urn:a> <urn:p> \"hello\"@en");

        let b = Triple::new(Iri::blank("b1"), iri("urn:p"), Iri::blank("b2"));
        assert_eq!(b.to_string(), "_:b1 <urn:p> _:b2");
    }

    #[test]
    fn test_ordering_follows_canonical_form() {
        let a = Triple::new(iri("urn:a"), iri("urn:p"), iri("urn:z"));
        let b = Triple::new(iri("urn:b"), iri("urn:p"), iri("urn:a"));
        assert!(a < b);
        let mut sorted = vec![b.clone(), a.clone()];
        sorted.sort();
        assert_eq!(sorted, vec![a, b]);
    }
}
