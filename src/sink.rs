//! The statement sink both parsers write into

use std::io;

use thiserror::Error;

use crate::iri::Iri;
use crate::model::{Literal, Node, Triple};

/// Failure reported by a sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot serialize {what}: {reason}")]
    Unserializable { what: String, reason: String },

    #[error("statement rejected: {0}")]
    Rejected(String),
}

/// Receiver of parsed statements.
///
/// A parser calls `start_stream` once, then one `add_*` call per statement
/// in document order, then `end_stream`. `graph` carries the N-Quads graph
/// label when there is one.
pub trait TripleSink {
    fn start_stream(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// A namespace declaration seen in the document
    fn on_prefix(&mut self, _prefix: &str, _uri: &str) -> Result<(), SinkError> {
        Ok(())
    }

    fn add_non_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        object: &Iri,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError>;

    fn add_plain_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        language: Option<&str>,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError>;

    fn add_typed_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        datatype: &Iri,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError>;

    fn end_stream(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: TripleSink + ?Sized> TripleSink for &mut S {
    fn start_stream(&mut self) -> Result<(), SinkError> {
        (**self).start_stream()
    }

    fn on_prefix(&mut self, prefix: &str, uri: &str) -> Result<(), SinkError> {
        (**self).on_prefix(prefix, uri)
    }

    fn add_non_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        object: &Iri,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        (**self).add_non_literal(subject, predicate, object, graph)
    }

    fn add_plain_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        language: Option<&str>,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        (**self).add_plain_literal(subject, predicate, text, language, graph)
    }

    fn add_typed_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        datatype: &Iri,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        (**self).add_typed_literal(subject, predicate, text, datatype, graph)
    }

    fn end_stream(&mut self) -> Result<(), SinkError> {
        (**self).end_stream()
    }
}

/// Send one statement to a sink through the matching `add_*` call
pub fn emit<S: TripleSink + ?Sized>(
    sink: &mut S,
    triple: &Triple,
    graph: Option<&Iri>,
) -> Result<(), SinkError> {
    match &triple.object {
        Node::Literal(literal) => match (literal.datatype(), literal.language()) {
            (Some(datatype), _) => sink.add_typed_literal(
                &triple.subject,
                &triple.predicate,
                literal.value(),
                datatype,
                graph,
            ),
            (None, language) => sink.add_plain_literal(
                &triple.subject,
                &triple.predicate,
                literal.value(),
                language,
                graph,
            ),
        },
        other => match other.as_iri() {
            Some(object) => sink.add_non_literal(&triple.subject, &triple.predicate, object, graph),
            None => Err(SinkError::Unserializable {
                what: triple.to_string(),
                reason: "object has no identifier".into(),
            }),
        },
    }
}

/// A statement with its optional graph label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    pub triple: Triple,
    pub graph: Option<Iri>,
}

/// Sink that keeps every statement in arrival order
#[derive(Debug, Default)]
pub struct TripleCollector {
    quads: Vec<Quad>,
    prefixes: Vec<(String, String)>,
    streams: usize,
}

impl TripleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.quads.iter().map(|q| &q.triple)
    }

    /// Namespace declarations seen, in order
    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    /// Completed `start_stream`/`end_stream` pairs
    pub fn streams(&self) -> usize {
        self.streams
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn into_quads(self) -> Vec<Quad> {
        self.quads
    }

    fn push(&mut self, subject: &Iri, predicate: &Iri, object: Node, graph: Option<&Iri>) {
        self.quads.push(Quad {
            triple: Triple::new(subject.clone(), predicate.clone(), object),
            graph: graph.cloned(),
        });
    }
}

impl TripleSink for TripleCollector {
    fn on_prefix(&mut self, prefix: &str, uri: &str) -> Result<(), SinkError> {
        self.prefixes.push((prefix.to_string(), uri.to_string()));
        Ok(())
    }

    fn add_non_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        object: &Iri,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        self.push(subject, predicate, Node::Iri(object.clone()), graph);
        Ok(())
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
        self.push(subject, predicate, Node::Literal(literal), graph);
        Ok(())
    }

    fn add_typed_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        datatype: &Iri,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        let literal = Literal::typed(text, datatype.clone());
        self.push(subject, predicate, Node::Literal(literal), graph);
        Ok(())
    }

    fn end_stream(&mut self) -> Result<(), SinkError> {
        self.streams += 1;
        Ok(())
    }
}
