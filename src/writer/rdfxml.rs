//! RDF/XML output
//!
//! Streaming use groups consecutive statements about the same subject into
//! one `rdf:Description`; callers wanting one element per subject must
//! present statements already grouped. The root element is written with
//! the first statement, so prefixes announced before it are declared there. [`RdfXmlWriter::write_graph`] walks
//! a [`Graph`] resource by resource instead and can nest blank nodes.

use std::collections::VecDeque;
use std::fmt::Display;
use std::io::{self, Write};

use fnv::FnvHashMap;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::iri::Iri;
use crate::model::{Graph, Literal, Node, Resource};
use crate::namespace::ns::RDF;
use crate::namespace::NamespaceContext;
use crate::sink::{SinkError, TripleSink};

pub const DEFAULT_INDENT: usize = 2;

/// Writer for RDF/XML documents
pub struct RdfXmlWriter<W: Write> {
    xml: Writer<W>,
    namespaces: NamespaceContext,
    /// namespace URI -> prefix declared on each element using it: generated
    /// `ns<N>` names and prefixes announced after the root element
    generated: FnvHashMap<String, String>,
    next_prefix: usize,
    started: bool,
    finished: bool,
    subject: Option<Iri>,
    written: usize,
}

impl<W: Write> RdfXmlWriter<W> {
    /// Writer declaring every prefix of `namespaces` on the root element
    pub fn new(writer: W, mut namespaces: NamespaceContext) -> Self {
        if namespaces.namespace_uri("rdf") != Some(RDF) {
            namespaces.add_namespace("rdf", RDF);
        }
        RdfXmlWriter {
            xml: Writer::new_with_indent(writer, b' ', DEFAULT_INDENT),
            namespaces,
            generated: FnvHashMap::default(),
            next_prefix: 0,
            started: false,
            finished: false,
            subject: None,
            written: 0,
        }
    }

    /// Indentation width; 0 writes everything on one line
    pub fn with_indent(self, indent: usize) -> Self {
        let inner = self.xml.into_inner();
        let xml = if indent == 0 {
            Writer::new(inner)
        } else {
            Writer::new_with_indent(inner, b' ', indent)
        };
        RdfXmlWriter { xml, ..self }
    }

    /// Property elements written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.xml.into_inner()
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), SinkError> {
        self.xml.write_event(event).map_err(xml_error)
    }

    fn start(&mut self) -> Result<(), SinkError> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("rdf:RDF");
        for (prefix, uri) in self.namespaces.namespaces() {
            if prefix.is_empty() {
                root.push_attribute(("xmlns", uri));
            } else {
                root.push_attribute((format!("xmlns:{}", prefix).as_str(), uri));
            }
        }
        self.write(Event::Start(root))
    }

    /// Close any open subject and the document element
    pub fn finish(&mut self) -> Result<(), SinkError> {
        if self.finished {
            return Ok(());
        }
        self.start()?;
        self.close_subject()?;
        self.write(Event::End(BytesEnd::new("rdf:RDF")))?;
        self.finished = true;
        let inner = self.xml.get_mut();
        inner.write_all(b"\n")?;
        inner.flush()?;
        Ok(())
    }

    fn fresh_prefix(&mut self) -> String {
        loop {
            self.next_prefix += 1;
            let prefix = format!("ns{}", self.next_prefix);
            let taken = self.namespaces.namespace_uri(&prefix).is_some()
                || self.generated.values().any(|p| p == &prefix);
            if !taken {
                return prefix;
            }
        }
    }

    /// Qualified element name for `predicate`, with the namespace
    /// declaration the element needs when its namespace has no prefix yet
    fn element_name(&mut self, predicate: &Iri) -> Result<(String, Option<(String, String)>), SinkError> {
        let Some((namespace, local)) = split_qname(predicate.as_str()) else {
            return Err(SinkError::Unserializable {
                what: predicate.to_string(),
                reason: "IRI does not end in an XML name".into(),
            });
        };

        if let Some(prefix) = self.namespaces.prefix(namespace) {
            let name = if prefix.is_empty() {
                local.to_string()
            } else {
                format!("{}:{}", prefix, local)
            };
            return Ok((name, None));
        }

        let prefix = match self.generated.get(namespace) {
            Some(prefix) => prefix.clone(),
            None => {
                let prefix = self.fresh_prefix();
                self.generated.insert(namespace.to_string(), prefix.clone());
                prefix
            }
        };
        Ok((
            format!("{}:{}", prefix, local),
            Some((format!("xmlns:{}", prefix), namespace.to_string())),
        ))
    }

    fn open_description(&mut self, id: &Iri) -> Result<(), SinkError> {
        let mut element = BytesStart::new("rdf:Description");
        push_identifier(&mut element, id, "rdf:about");
        self.write(Event::Start(element))
    }

    fn close_description(&mut self) -> Result<(), SinkError> {
        self.write(Event::End(BytesEnd::new("rdf:Description")))
    }

    fn close_subject(&mut self) -> Result<(), SinkError> {
        if self.subject.take().is_some() {
            self.close_description()?;
        }
        Ok(())
    }

    fn property(&mut self, predicate: &Iri, object: &Node) -> Result<(), SinkError> {
        let (name, declaration) = self.element_name(predicate)?;
        let mut element = BytesStart::new(name.as_str());
        if let Some((attribute, uri)) = &declaration {
            element.push_attribute((attribute.as_str(), uri.as_str()));
        }

        match object {
            Node::Literal(literal) => {
                self.literal_property(element, &name, literal)?;
            }
            Node::Resource(resource) => {
                push_identifier(&mut element, resource.id(), "rdf:resource");
                self.write(Event::Empty(element))?;
            }
            Node::Iri(iri) => {
                push_identifier(&mut element, iri, "rdf:resource");
                self.write(Event::Empty(element))?;
            }
        }
        self.written += 1;
        Ok(())
    }

    fn literal_property(
        &mut self,
        mut element: BytesStart<'_>,
        name: &str,
        literal: &Literal,
    ) -> Result<(), SinkError> {
        if let Some(bad) = literal.value().chars().find(|&c| !is_xml_char(c)) {
            return Err(SinkError::Unserializable {
                what: format!("literal {:?}", literal.value()),
                reason: format!("U+{:04X} cannot appear in XML 1.0", bad as u32),
            });
        }
        if let Some(language) = literal.language() {
            element.push_attribute(("xml:lang", language));
        }
        let xml_literal = literal.is_xml_literal();
        if xml_literal {
            element.push_attribute(("rdf:parseType", "Literal"));
        } else if let Some(datatype) = literal.datatype() {
            element.push_attribute(("rdf:datatype", datatype.as_str()));
        }

        self.write(Event::Start(element))?;
        let text = if xml_literal {
            literal.value().replace('\r', "&#xD;")
        } else {
            escape(literal.value()).replace('\r', "&#xD;")
        };
        self.write(Event::Text(BytesText::from_escaped(text)))?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn statement(&mut self, subject: &Iri, predicate: &Iri, object: &Node) -> Result<(), SinkError> {
        if self.finished {
            return Err(SinkError::Rejected("document already closed".into()));
        }
        self.start()?;
        if self.subject.as_ref() != Some(subject) {
            self.close_subject()?;
            self.open_description(subject)?;
            self.subject = Some(subject.clone());
        }
        self.property(predicate, object)
    }

    /// Write `graph` as a complete document.
    ///
    /// Each top-level resource becomes one `rdf:Description`. With
    /// `inline_blank_nodes`, owned blank nodes are nested inside the
    /// property element that links them; otherwise they follow as separate
    /// descriptions referenced by `rdf:nodeID`.
    pub fn write_graph(&mut self, graph: &Graph, inline_blank_nodes: bool) -> Result<(), SinkError> {
        if !self.started {
            for (prefix, uri) in graph.namespaces().namespaces() {
                if self.namespaces.namespace_uri(prefix).is_none() && self.namespaces.prefix(uri).is_none() {
                    self.namespaces.add_namespace(prefix, uri);
                }
            }
            self.declare_predicates(graph);
        }
        self.start()?;
        self.close_subject()?;

        let mut pending: VecDeque<&Resource> = graph.resources().filter(|r| !r.is_deleted()).collect();
        while let Some(resource) = pending.pop_front() {
            self.write_resource(resource, inline_blank_nodes, &mut pending)?;
        }
        self.finish()
    }

    /// Give every predicate namespace a root-level prefix up front
    fn declare_predicates(&mut self, graph: &Graph) {
        for triple in graph.triples() {
            let Some((namespace, _)) = split_qname(triple.predicate.as_str()) else {
                continue;
            };
            if self.namespaces.prefix(namespace).is_none() {
                let prefix = self.fresh_prefix();
                self.namespaces.add_namespace(prefix, namespace);
            }
        }
    }

    fn write_resource<'g>(
        &mut self,
        resource: &'g Resource,
        inline: bool,
        pending: &mut VecDeque<&'g Resource>,
    ) -> Result<(), SinkError> {
        self.open_description(resource.id())?;
        for (predicate, object) in resource.attributes() {
            match object {
                Node::Resource(child) if child.is_deleted() => {}
                Node::Resource(child) if inline && child.is_embedded() => {
                    let (name, declaration) = self.element_name(predicate)?;
                    let mut element = BytesStart::new(name.as_str());
                    if let Some((attribute, uri)) = &declaration {
                        element.push_attribute((attribute.as_str(), uri.as_str()));
                    }
                    self.write(Event::Start(element))?;
                    self.write_resource(child, inline, pending)?;
                    self.write(Event::End(BytesEnd::new(name.as_str())))?;
                    self.written += 1;
                }
                Node::Resource(child) => {
                    self.property(predicate, object)?;
                    pending.push_back(child);
                }
                _ => self.property(predicate, object)?,
            }
        }
        self.close_description()
    }
}

impl<W: Write> TripleSink for RdfXmlWriter<W> {
    fn on_prefix(&mut self, prefix: &str, uri: &str) -> Result<(), SinkError> {
        if self.namespaces.namespace_uri(prefix).is_some() || self.namespaces.prefix(uri).is_some() {
            return Ok(());
        }
        if !self.started {
            self.namespaces.add_namespace(prefix, uri);
        } else if !prefix.is_empty()
            && !self.generated.contains_key(uri)
            && !self.generated.values().any(|p| p == prefix)
        {
            self.generated.insert(uri.to_string(), prefix.to_string());
        }
        Ok(())
    }

    fn add_non_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        object: &Iri,
        _graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        self.statement(subject, predicate, &Node::Iri(object.clone()))
    }

    fn add_plain_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        language: Option<&str>,
        _graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        let literal = match language {
            Some(language) => Literal::with_language(text, language),
            None => Literal::plain(text),
        };
        self.statement(subject, predicate, &Node::Literal(literal))
    }

    fn add_typed_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        datatype: &Iri,
        _graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        let literal = Literal::typed(text, datatype.clone());
        self.statement(subject, predicate, &Node::Literal(literal))
    }

    fn end_stream(&mut self) -> Result<(), SinkError> {
        self.finish()
    }
}

fn push_identifier(element: &mut BytesStart<'_>, id: &Iri, attribute: &str) {
    match id.blank_label() {
        Some(label) => element.push_attribute(("rdf:nodeID", label)),
        None => element.push_attribute((attribute, id.as_str())),
    }
}

fn xml_error(error: impl Display) -> SinkError {
    SinkError::Io(io::Error::new(io::ErrorKind::Other, error.to_string()))
}

/// Characters XML 1.0 allows in content
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-' || c == '.' || (!c.is_ascii() && c.is_alphanumeric())
}

/// Split an IRI into namespace and the longest XML NCName suffix
fn split_qname(iri: &str) -> Option<(&str, &str)> {
    let mut start = iri.len();
    for (i, c) in iri.char_indices().rev() {
        if !is_name_char(c) {
            break;
        }
        start = i;
    }
    let local = &iri[start..];
    let skip = local.find(is_name_start)?;
    let split = start + skip;
    if split == 0 {
        return None;
    }
    Some((&iri[..split], &iri[split..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Triple;
    use crate::namespace::ns::{rdf, xsd};
    use crate::parser::rdfxml::RdfXmlParser;
    use crate::sink::TripleCollector;

    fn iri(s: &str) -> Iri {
        Iri::parse(s).unwrap()
    }

    fn streamed(statements: impl FnOnce(&mut RdfXmlWriter<Vec<u8>>)) -> String {
        let mut namespaces = NamespaceContext::new();
        namespaces.add_namespace("ex", "http://example.org/");
        let mut writer = RdfXmlWriter::new(Vec::new(), namespaces);
        writer.start_stream().unwrap();
        statements(&mut writer);
        writer.end_stream().unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    fn reparse(xml: &str) -> Vec<String> {
        let mut collector = TripleCollector::new();
        RdfXmlParser::new().parse_str(xml, &mut collector).unwrap();
        let mut lines: Vec<String> = collector.triples().map(|t| t.to_string()).collect();
        lines.sort();
        lines
    }

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("http://example.org/a#name"), Some(("http://example.org/a#", "name")));
        assert_eq!(split_qname("urn:p"), Some(("urn:", "p")));
        assert_eq!(split_qname("http://example.org/123abc"), Some(("http://example.org/123", "abc")));
        assert_eq!(split_qname("http://example.org/"), None);
        assert_eq!(split_qname("name"), None);
    }

    #[test]
    fn test_groups_adjacent_subjects() {
        let out = streamed(|w| {
            let s = iri("http://example.org/s");
            w.add_plain_literal(&s, &iri("http://example.org/name"), "A & B", None, None).unwrap();
            w.add_non_literal(&s, &iri("http://example.org/knows"), &Iri::blank("b1"), None).unwrap();
            w.add_typed_literal(&Iri::blank("b1"), &iri("http://example.org/age"), "7", &xsd::int(), None)
                .unwrap();
        });

        assert_eq!(out.matches("<rdf:Description").count(), 2);
        assert!(out.contains("rdf:about=\"http://example.org/s\""));
        assert!(out.contains("<ex:name>A &amp; B</ex:name>"));
        assert!(out.contains("<ex:knows rdf:nodeID=\"b1\"/>"));
        assert!(out.contains("<rdf:Description rdf:nodeID=\"b1\">"));
        assert!(out.contains("rdf:datatype=\"http://www.w3.org/2001/XMLSchema#int\""));
        assert!(out.trim_end().ends_with("</rdf:RDF>"));
    }

    #[test]
    fn test_generated_prefixes() {
        let out = streamed(|w| {
            let s = iri("http://example.org/s");
            w.add_plain_literal(&s, &iri("http://other.org/v#p"), "x", Some("en"), None).unwrap();
            w.add_plain_literal(&s, &iri("http://third.org/q"), "y", None, None).unwrap();
        });
        assert!(out.contains("<ns1:p xmlns:ns1=\"http://other.org/v#\" xml:lang=\"en\">x</ns1:p>"));
        assert!(out.contains("xmlns:ns2=\"http://third.org/\""));
    }

    #[test]
    fn test_xml_literal() {
        let out = streamed(|w| {
            w.add_typed_literal(
                &iri("http://example.org/s"),
                &iri("http://example.org/body"),
                "<b>bold</b>",
                &rdf::xml_literal(),
                None,
            )
            .unwrap();
        });
        assert!(out.contains("rdf:parseType=\"Literal\"><b>bold</b></ex:body>"));
    }

    #[test]
    fn test_document_prefixes_carried_through() {
        let input = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                 xmlns:ex="http://example.org/terms#">
              <rdf:Description rdf:about="http://example.org/s">
                <ex:name>n</ex:name>
              </rdf:Description>
            </rdf:RDF>"#;
        let mut writer = RdfXmlWriter::new(Vec::new(), NamespaceContext::new());
        RdfXmlParser::new().parse_str(input, &mut writer).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();

        assert!(out.contains("xmlns:ex=\"http://example.org/terms#\""));
        assert!(out.contains("<ex:name>n</ex:name>"));
        assert!(!out.contains("ns1"));
        assert_eq!(reparse(&out), vec!["<http://example.org/s> <http://example.org/terms#name> \"n\""]);
    }

    #[test]
    fn test_late_prefix_declared_on_element() {
        let out = streamed(|w| {
            let s = iri("http://example.org/s");
            w.add_plain_literal(&s, &iri("http://example.org/a"), "1", None, None).unwrap();
            w.on_prefix("foaf", "http://xmlns.com/foaf/0.1/").unwrap();
            w.on_prefix("other", "http://example.org/").unwrap();
            w.add_plain_literal(&s, &iri("http://xmlns.com/foaf/0.1/name"), "2", None, None).unwrap();
        });
        assert!(out.contains("<foaf:name xmlns:foaf=\"http://xmlns.com/foaf/0.1/\">2</foaf:name>"));
        assert!(out.contains("<ex:a>1</ex:a>"));
        assert!(!out.contains("other"));
    }

    #[test]
    fn test_literal_characters() {
        let mut writer = RdfXmlWriter::new(Vec::new(), NamespaceContext::new());
        let bell = writer.add_plain_literal(
            &iri("http://example.org/s"),
            &iri("http://example.org/p"),
            "ring\u{7}",
            None,
            None,
        );
        assert!(matches!(bell, Err(SinkError::Unserializable { .. })));

        let out = streamed(|w| {
            w.add_plain_literal(&iri("http://example.org/s"), &iri("http://example.org/p"), "a\r\nb\tc", None, None)
                .unwrap();
        });
        assert!(out.contains("<ex:p>a&#xD;\nb\tc</ex:p>"));
        let mut collector = TripleCollector::new();
        RdfXmlParser::new().parse_str(&out, &mut collector).unwrap();
        let object = &collector.quads()[0].triple.object;
        assert_eq!(object.as_literal().map(Literal::value), Some("a\r\nb\tc"));
    }

    #[test]
    fn test_unnameable_predicate() {
        let mut writer = RdfXmlWriter::new(Vec::new(), NamespaceContext::new());
        let result = writer.add_non_literal(
            &iri("http://example.org/s"),
            &iri("http://example.org/"),
            &iri("http://example.org/o"),
            None,
        );
        assert!(matches!(result, Err(SinkError::Unserializable { .. })));
    }

    #[test]
    fn test_stream_round_trip() {
        let out = streamed(|w| {
            let s = iri("http://example.org/s");
            w.add_plain_literal(&s, &iri("http://example.org/name"), "n", Some("de"), None).unwrap();
            w.add_non_literal(&s, &iri("http://example.org/link"), &iri("http://example.org/o"), None)
                .unwrap();
        });
        assert_eq!(
            reparse(&out),
            vec![
                "<http://example.org/s> <http://example.org/link> <http://example.org/o>",
                "<http://example.org/s> <http://example.org/name> \"n\"@de",
            ]
        );
    }

    #[test]
    fn test_write_graph_nested_and_flat() {
        let mut graph = Graph::new();
        graph.namespaces_mut().add_namespace("ex", "http://example.org/");
        let doc = iri("http://example.org/doc");
        graph.add_triple(Triple::new(doc.clone(), iri("http://example.org/part"), Iri::blank("p")));
        graph.add_triple(Triple::new(Iri::blank("p"), iri("http://example.org/name"), Literal::plain("inner")));
        graph.add_triple(Triple::new(doc, iri("http://vocab.org/title"), Literal::plain("T")));

        let mut expected: Vec<String> = graph.triples().map(|t| t.to_string()).collect();
        expected.sort();

        for inline in [true, false] {
            let mut writer = RdfXmlWriter::new(Vec::new(), NamespaceContext::new());
            writer.write_graph(&graph, inline).unwrap();
            let out = String::from_utf8(writer.into_inner()).unwrap();
            assert!(out.contains("xmlns:ns1=\"http://vocab.org/\""));
            let descriptions = out.matches("<rdf:Description").count();
            assert_eq!(descriptions, 2);
            if inline {
                assert!(out.contains("<ex:part>"));
            } else {
                assert!(out.contains("<ex:part rdf:nodeID=\"p\"/>"));
            }
            assert_eq!(reparse(&out), expected);
        }
    }
}
