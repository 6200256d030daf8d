//! Namespace context: prefix <-> namespace URI table
//!
//! Compaction always picks the longest registered namespace URI that is a
//! string prefix of the identifier, so with both `http://example.org/` and
//! `http://example.org/vocab#` registered, `http://example.org/vocab#term`
//! compacts against the second.

pub mod ns;

use fnv::FnvHashMap;
use indexmap::IndexMap;

use crate::iri::{Iri, IriError};

/// Bidirectional prefix table
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// prefix -> namespace URI, in registration order
    prefixes: IndexMap<String, String>,
    /// namespace URI -> prefix
    uris: FnvHashMap<String, String>,
    /// Registered URIs, longest first
    by_length: Vec<String>,
}

impl NamespaceContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context preloaded with rdf, rdfs, xsd, owl, dc, dcterms, foaf and skos
    pub fn with_defaults() -> Self {
        let mut context = Self::new();
        for (prefix, uri) in ns::DEFAULT_PREFIXES {
            context.add_namespace(prefix, uri);
        }
        context
    }

    /// Register `prefix` for `uri`, replacing an earlier binding of the prefix
    pub fn add_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        let prefix = prefix.into();
        let uri = uri.into();

        if let Some(previous) = self.prefixes.insert(prefix.clone(), uri.clone()) {
            if previous != uri {
                self.forget_uri(&previous, &prefix);
            }
        }

        self.uris.insert(uri.clone(), prefix);
        if !self.by_length.contains(&uri) {
            let at = self.by_length.partition_point(|known| known.len() >= uri.len());
            self.by_length.insert(at, uri);
        }
    }

    /// Drop a prefix binding, returning the URI it was bound to
    pub fn remove_namespace(&mut self, prefix: &str) -> Option<String> {
        let uri = self.prefixes.shift_remove(prefix)?;
        self.forget_uri(&uri, prefix);
        Some(uri)
    }

    fn forget_uri(&mut self, uri: &str, prefix: &str) {
        // Another prefix may still carry the same URI
        match self.prefixes.iter().find(|(_, u)| u.as_str() == uri) {
            Some((other, _)) => {
                let other = other.clone();
                self.uris.insert(uri.to_string(), other);
            }
            None => {
                if self.uris.get(uri).map(String::as_str) == Some(prefix) {
                    self.uris.remove(uri);
                }
                self.by_length.retain(|known| known != uri);
            }
        }
    }

    /// Namespace URI bound to `prefix`
    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Prefix bound to exactly `uri`
    pub fn prefix(&self, uri: &str) -> Option<&str> {
        self.uris.get(uri).map(String::as_str)
    }

    /// `(prefix, uri)` pairs in registration order
    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Shorten `iri` to `prefix:local` using the longest matching namespace.
    ///
    /// With `drop_fragment` the fragment is discarded first. Identifiers no
    /// registered namespace covers come back in full.
    pub fn compact(&self, iri: &Iri, drop_fragment: bool) -> String {
        if drop_fragment && iri.fragment().is_some() {
            self.compact_str(iri.without_fragment().as_str())
        } else {
            self.compact_str(iri.as_str())
        }
    }

    /// [`compact`](Self::compact) on raw text
    pub fn compact_str(&self, text: &str) -> String {
        for uri in &self.by_length {
            if uri.is_empty() {
                continue;
            }
            if let Some(local) = text.strip_prefix(uri.as_str()) {
                if let Some(prefix) = self.uris.get(uri) {
                    return format!("{}:{}", prefix, local);
                }
            }
        }
        text.to_string()
    }

    /// Expand `prefix:local`; text with an unknown prefix comes back unchanged
    pub fn expand_iri(&self, short: &str) -> String {
        if let Some((prefix, local)) = short.split_once(':') {
            if let Some(uri) = self.prefixes.get(prefix) {
                return format!("{}{}", uri, local);
            }
        }
        short.to_string()
    }

    /// Expand and parse
    pub fn to_iri(&self, short: &str) -> Result<Iri, IriError> {
        Iri::parse(&self.expand_iri(short))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_match_wins() {
        let mut context = NamespaceContext::new();
        context.add_namespace("ex", "http://example.org/");
        context.add_namespace("voc", "http://example.org/vocab#");

        let term = Iri::parse("http://example.org/vocab#term").unwrap();
        assert_eq!(context.compact(&term, false), "voc:term");

        let other = Iri::parse("http://example.org/thing").unwrap();
        assert_eq!(context.compact(&other, false), "ex:thing");

        // registration order does not matter
        let mut reversed = NamespaceContext::new();
        reversed.add_namespace("voc", "http://example.org/vocab#");
        reversed.add_namespace("ex", "http://example.org/");
        assert_eq!(reversed.compact(&term, false), "voc:term");
    }

    #[test]
    fn test_compact_drop_fragment() {
        let context = NamespaceContext::with_defaults();
        let doc = Iri::parse("http://purl.org/dc/terms/title#x").unwrap();
        assert_eq!(context.compact(&doc, true), "dcterms:title");
        assert_eq!(context.compact(&doc, false), "dcterms:title#x");
    }

    #[test]
    fn test_compact_unknown() {
        let context = NamespaceContext::with_defaults();
        let iri = Iri::parse("urn:nothing:here").unwrap();
        assert_eq!(context.compact(&iri, false), "urn:nothing:here");
    }

    #[test]
    fn test_expand() {
        let context = NamespaceContext::with_defaults();
        assert_eq!(context.expand_iri("rdf:type"), ns::rdf::TYPE);
        assert_eq!(context.expand_iri("nope:x"), "nope:x");
        assert_eq!(context.to_iri("xsd:int").unwrap(), ns::xsd::int());
    }

    #[test]
    fn test_rebind_and_remove() {
        let mut context = NamespaceContext::new();
        context.add_namespace("ex", "http://example.org/a/");
        context.add_namespace("ex", "http://example.org/b/");
        assert_eq!(context.namespace_uri("ex"), Some("http://example.org/b/"));
        assert_eq!(context.prefix("http://example.org/a/"), None);

        let iri = Iri::parse("http://example.org/a/x").unwrap();
        assert_eq!(context.compact(&iri, false), "http://example.org/a/x");

        assert_eq!(context.remove_namespace("ex").as_deref(), Some("http://example.org/b/"));
        assert!(context.is_empty());
        assert_eq!(context.prefix("http://example.org/b/"), None);
    }

    #[test]
    fn test_namespaces_keep_registration_order() {
        let context = NamespaceContext::with_defaults();
        let prefixes: Vec<&str> = context.namespaces().map(|(p, _)| p).collect();
        assert_eq!(prefixes[..3], ["rdf", "rdfs", "xsd"]);
        assert_eq!(context.len(), 8);
    }
}
