//! Standard vocabulary namespace constants
//!
//! Namespace URIs as `&str` plus constructors for the RDF and XML Schema
//! terms the parsers and serializers mint.

/// RDF namespace
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// RDF Schema namespace
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
/// XML Schema Datatypes namespace
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
/// OWL Web Ontology Language namespace
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
/// Dublin Core elements
pub const DC: &str = "http://purl.org/dc/elements/1.1/";
/// Dublin Core terms
pub const DCTERMS: &str = "http://purl.org/dc/terms/";
/// FOAF (Friend of a Friend)
pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";
/// SKOS (Simple Knowledge Organization System)
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";
/// The XML namespace bound to the `xml` prefix
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefixes registered by [`super::NamespaceContext::with_defaults`]
pub const DEFAULT_PREFIXES: [(&str, &str); 8] = [
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("xsd", XSD),
    ("owl", OWL),
    ("dc", DC),
    ("dcterms", DCTERMS),
    ("foaf", FOAF),
    ("skos", SKOS),
];

fn term(namespace: &str, local: &str) -> crate::iri::Iri {
    crate::iri::Iri::vocabulary(namespace, local)
}

/// RDF syntax terms
pub mod rdf {
    use super::{term, RDF};
    use crate::iri::Iri;

    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";

    pub fn type_() -> Iri {
        term(RDF, "type")
    }

    pub fn first() -> Iri {
        term(RDF, "first")
    }

    pub fn rest() -> Iri {
        term(RDF, "rest")
    }

    pub fn nil() -> Iri {
        term(RDF, "nil")
    }

    pub fn statement() -> Iri {
        term(RDF, "Statement")
    }

    pub fn subject() -> Iri {
        term(RDF, "subject")
    }

    pub fn predicate() -> Iri {
        term(RDF, "predicate")
    }

    pub fn object() -> Iri {
        term(RDF, "object")
    }

    pub fn xml_literal() -> Iri {
        term(RDF, "XMLLiteral")
    }

    /// Container membership property `rdf:_n`
    pub fn li(n: usize) -> Iri {
        term(RDF, &format!("_{}", n))
    }
}

/// XML Schema datatypes
pub mod xsd {
    use super::{term, XSD};
    use crate::iri::Iri;

    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    pub fn int() -> Iri {
        term(XSD, "int")
    }

    pub fn long() -> Iri {
        term(XSD, "long")
    }

    pub fn integer() -> Iri {
        term(XSD, "integer")
    }

    pub fn float() -> Iri {
        term(XSD, "float")
    }

    pub fn double() -> Iri {
        term(XSD, "double")
    }

    pub fn boolean() -> Iri {
        term(XSD, "boolean")
    }

    pub fn string() -> Iri {
        term(XSD, "string")
    }
}
