//! Serializers
//!
//! - [`ntriples`] - one statement per line, N-Triples or N-Quads
//! - [`rdfxml`] - RDF/XML, streamed or from a [`Graph`](crate::model::Graph)

pub mod ntriples;
pub mod rdfxml;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use ntriples::NTriplesWriter;
pub use rdfxml::RdfXmlWriter;

/// Document syntaxes understood by the parsers and writers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    NTriples,
    NQuads,
    RdfXml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::NTriples => "ntriples",
            Format::NQuads => "nquads",
            Format::RdfXml => "rdfxml",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nt" | "ntriples" | "n-triples" => Some(Format::NTriples),
            "nq" | "nquads" | "n-quads" => Some(Format::NQuads),
            "rdf" | "xml" | "rdfxml" | "rdf/xml" | "owl" => Some(Format::RdfXml),
            _ => None,
        }
    }

    /// Guess from a file name
    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        Self::from_str(extension)
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Format::NTriples => "nt",
            Format::NQuads => "nq",
            Format::RdfXml => "rdf",
        }
    }
}
