//! triplekit - RDF graphs, IRIs and document syntaxes
//!
//! # Architecture
//!
//! Parsers never build graphs directly. They push statements into a
//! [`TripleSink`], and a [`Graph`], a writer or a [`TripleCollector`] sits
//! on the other end:
//!
//! - [`iri`] - identifier parsing, resolution, relativization and ordering
//! - [`namespace`] - prefix tables and vocabulary constants
//! - [`model`] - resources owning their blank-node children, literals, graphs
//! - [`parser`] - streaming N-Triples / N-Quads and RDF/XML
//! - [`writer`] - N-Triples / N-Quads and RDF/XML output
//! - [`config`] - TOML configuration with environment overrides
//!
//! # Example
//!
//! ```rust
//! use triplekit::{parse_rdfxml, NTriplesWriter};
//!
//! let graph = parse_rdfxml(r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
//!                                      xmlns:ex="http://example.org/">
//!   <rdf:Description rdf:about="http://example.org/s">
//!     <ex:p>hello</ex:p>
//!   </rdf:Description>
//! </rdf:RDF>"#).unwrap();
//!
//! let mut writer = NTriplesWriter::new(Vec::new());
//! writer.write_graph(&graph).unwrap();
//! let text = String::from_utf8(writer.into_inner()).unwrap();
//! assert_eq!(text, "<http://example.org/s> <http://example.org/p> \"hello\" .\n");
//! ```

pub mod config;
pub mod error;
pub mod iri;
pub mod model;
pub mod namespace;
pub mod parser;
pub mod sink;
pub mod writer;

// Re-export identifier types
pub use iri::{Iri, IriError};

// Re-export namespace types
pub use namespace::{ns, NamespaceContext};

// Re-export model types
pub use model::{BlankNodeGenerator, Graph, Literal, LiteralValue, MultiMap, Node, Resource, Triple};

// Re-export sink types
pub use sink::{Quad, SinkError, TripleCollector, TripleSink};

// Re-export parser types
pub use parser::{
    parse_nquads, parse_ntriples, parse_rdfxml, Location, NTriplesParser, ParseError, RdfXmlParser,
};

// Re-export writer types
pub use writer::{Format, NTriplesWriter, RdfXmlWriter};

// Re-export configuration types
pub use config::{ConfigError, GeneralConfig, LogLevel, ParserConfig, TripleKitConfig, WriterConfig};

// Re-export error types
pub use error::{ErrorCode, ErrorContext, RdfError, RdfResult};
