//! Parsers for N-Triples / N-Quads and RDF/XML
//!
//! Both parsers push statements into a [`TripleSink`] as they go; neither
//! builds a graph itself. The functions at the bottom of this module wire a
//! parser to a [`Graph`] for the common case.

pub mod ntriples;
pub mod rdfxml;

use std::fmt;
use std::io;

use thiserror::Error;

use crate::iri::IriError;
use crate::model::Graph;
use crate::sink::{SinkError, TripleSink};

pub use ntriples::NTriplesParser;
pub use rdfxml::RdfXmlParser;

/// Position in the input: 1-based line and column, 0-based character offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Location {
    pub fn start() -> Self {
        Location {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Move past `c`
    pub fn advance(&mut self, c: char) {
        self.offset += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Move past one byte of UTF-8 input; continuation bytes share the
    /// position of their lead byte
    pub(crate) fn advance_byte(&mut self, byte: u8) {
        if byte & 0xC0 != 0x80 {
            self.advance(char::from(byte));
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Fatal parse failure
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Syntax error at {location}: {message}")]
    Syntax { location: Location, message: String },

    #[error("Invalid escape at {location}: {message}")]
    InvalidEscape { location: Location, message: String },

    #[error("Ambiguous subject at {location}: <{element}> combines rdf:about, rdf:nodeID and rdf:ID")]
    AmbiguousSubject { location: Location, element: String },

    #[error("Invalid IRI at {location}: {source}")]
    InvalidIri {
        location: Location,
        #[source]
        source: IriError,
    },

    #[error("Unexpected end of input at {location}")]
    UnexpectedEof { location: Location },

    #[error("XML error at {location}: {source}")]
    Xml {
        location: Location,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    pub(crate) fn syntax(location: Location, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            location,
            message: message.into(),
        }
    }

    /// Where the failure happened, if it came from the input
    pub fn location(&self) -> Option<Location> {
        match self {
            ParseError::Syntax { location, .. }
            | ParseError::InvalidEscape { location, .. }
            | ParseError::AmbiguousSubject { location, .. }
            | ParseError::InvalidIri { location, .. }
            | ParseError::UnexpectedEof { location }
            | ParseError::Xml { location, .. } => Some(*location),
            ParseError::Sink(_) | ParseError::Io(_) => None,
        }
    }
}

/// Characters allowed in a blank node label after `_:`
pub(crate) fn is_label_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// Decode line-syntax escapes:
/// `\b \f \n \r \t \\ \" \' \uXXXX \UXXXXXXXX`
pub fn unescape(text: &str, location: Location) -> Result<String, ParseError> {
    if !text.contains('\\') {
        return Ok(text.to_string());
    }

    let invalid = |message: String| ParseError::InvalidEscape { location, message };
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            Some(kind @ ('u' | 'U')) => {
                let width = if kind == 'u' { 4 } else { 8 };
                let digits: String = chars.by_ref().take(width).collect();
                if digits.len() != width || !digits.chars().all(|d| d.is_ascii_hexdigit()) {
                    return Err(invalid(format!("incomplete \\{} escape: \\{}{}", kind, kind, digits)));
                }
                let code = u32::from_str_radix(&digits, 16)
                    .map_err(|_| invalid(format!("bad hex digits {}", digits)))?;
                char::from_u32(code)
                    .ok_or_else(|| invalid(format!("U+{:X} is not a character", code)))?
            }
            Some(other) => return Err(invalid(format!("unknown escape \\{}", other))),
            None => return Err(invalid("dangling backslash".to_string())),
        };
        out.push(escaped);
    }
    Ok(out)
}

/// Parse an N-Triples document into a new graph
pub fn parse_ntriples(input: &str) -> Result<Graph, ParseError> {
    let mut graph = Graph::new();
    NTriplesParser::new().parse_str(input, &mut graph)?;
    Ok(graph)
}

/// Parse an N-Quads document into `sink`
pub fn parse_nquads<S: TripleSink + ?Sized>(input: &str, sink: &mut S) -> Result<(), ParseError> {
    NTriplesParser::nquads().parse_str(input, sink)
}

/// Parse an RDF/XML document into a new graph
pub fn parse_rdfxml(input: &str) -> Result<Graph, ParseError> {
    let mut graph = Graph::new();
    let blank_nodes = graph.blank_nodes().clone();
    RdfXmlParser::new()
        .with_blank_nodes(blank_nodes)
        .parse_str(input, &mut graph)?;
    Ok(graph)
}
