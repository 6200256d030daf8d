//! N-Triples / N-Quads output

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::iri::Iri;
use crate::model::{Graph, Literal, Node, Triple};
use crate::sink::{SinkError, TripleSink};

/// Escape literal content: quote, backslash and control characters
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Escape characters that may not appear between `<` and `>`
pub fn escape_iri(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c if (c as u32) <= 0x20 || c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// `<iri>`, or `_:label` for a blank node
pub fn format_iri(iri: &Iri) -> String {
    if iri.is_blank() {
        iri.as_str().to_string()
    } else {
        format!("<{}>", escape_iri(iri.as_str()))
    }
}

/// `"text"`, `"text"@lang` or `"text"^^<datatype>`
pub fn format_literal(literal: &Literal) -> String {
    let value = escape_literal(literal.value());
    match (literal.datatype(), literal.language()) {
        (Some(datatype), _) => format!("\"{}\"^^{}", value, format_iri(datatype)),
        (None, Some(language)) => format!("\"{}\"@{}", value, language),
        (None, None) => format!("\"{}\"", value),
    }
}

pub fn format_node(node: &Node) -> String {
    match node {
        Node::Literal(literal) => format_literal(literal),
        Node::Resource(resource) => format_iri(resource.id()),
        Node::Iri(iri) => format_iri(iri),
    }
}

/// Line-per-statement writer.
///
/// In quad mode a graph label, when given, is written before the terminator.
pub struct NTriplesWriter<W: Write> {
    writer: W,
    quads: bool,
    written: usize,
}

impl<W: Write> NTriplesWriter<W> {
    pub fn new(writer: W) -> Self {
        NTriplesWriter {
            writer,
            quads: false,
            written: 0,
        }
    }

    /// Writer that keeps graph labels
    pub fn nquads(writer: W) -> Self {
        NTriplesWriter {
            quads: true,
            ..Self::new(writer)
        }
    }

    pub fn write_triple(&mut self, triple: &Triple) -> io::Result<()> {
        self.write_quad(triple, None)
    }

    pub fn write_quad(&mut self, triple: &Triple, graph: Option<&Iri>) -> io::Result<()> {
        let line = triple.canonical();
        match graph {
            Some(graph) if self.quads => {
                writeln!(self.writer, "{} {} .", line, format_iri(graph))?
            }
            _ => writeln!(self.writer, "{} .", line)?,
        }
        self.written += 1;
        Ok(())
    }

    /// Every live statement of `graph`, resource by resource
    pub fn write_graph(&mut self, graph: &Graph) -> io::Result<()> {
        for triple in graph.triples() {
            self.write_triple(&triple)?;
        }
        self.writer.flush()
    }

    /// Statements written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TripleSink for NTriplesWriter<W> {
    fn add_non_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        object: &Iri,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        let triple = Triple::new(subject.clone(), predicate.clone(), object.clone());
        Ok(self.write_quad(&triple, graph)?)
    }

    fn add_plain_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        language: Option<&str>,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        let literal = match language {
            Some(language) => Literal::with_language(text, language),
            None => Literal::plain(text),
        };
        let triple = Triple::new(subject.clone(), predicate.clone(), literal);
        Ok(self.write_quad(&triple, graph)?)
    }

    fn add_typed_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        datatype: &Iri,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        let triple = Triple::new(
            subject.clone(),
            predicate.clone(),
            Literal::typed(text, datatype.clone()),
        );
        Ok(self.write_quad(&triple, graph)?)
    }

    fn end_stream(&mut self) -> Result<(), SinkError> {
        Ok(self.writer.flush()?)
    }
}
