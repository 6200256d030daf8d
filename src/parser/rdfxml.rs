//! RDF/XML parser
//!
//! Driven by `quick_xml` events. Every open XML element has a frame on an
//! explicit stack recording what the element is (the `rdf:RDF` root, a
//! node, or a property) together with the `xml:base` and `xml:lang` in
//! scope. Supports:
//! - `rdf:about`, `rdf:nodeID`, `rdf:ID` and anonymous subjects
//! - typed nodes and the `rdf:type` attribute
//! - property attributes on node and property elements
//! - `rdf:resource`, `rdf:nodeID` and `rdf:datatype` on property elements
//! - `rdf:parseType="Resource" | "Collection" | "Literal"`
//! - `rdf:li` numbering and statement reification through `rdf:ID`

use std::io::{self, BufRead, Read};

use percent_encoding::percent_encode_byte;
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::{LocalName, ResolveResult};
use quick_xml::NsReader;

use crate::iri::Iri;
use crate::model::{BlankNodeGenerator, Literal, Node, Triple};
use crate::namespace::ns::{rdf, RDF};
use crate::sink::{emit, TripleSink};

use super::{is_label_char, Location, ParseError};

const RDF_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#RDF";
const RDF_DESCRIPTION: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Description";
const RDF_LI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#li";

struct Frame {
    base: Option<Iri>,
    language: Option<String>,
    kind: FrameKind,
}

enum FrameKind {
    Root,
    Node {
        subject: Iri,
        li: usize,
    },
    Property {
        subject: Iri,
        predicate: Iri,
        /// statement identifier from `rdf:ID`
        reify: Option<Iri>,
        content: Content,
    },
}

/// What a property element is waiting for
enum Content {
    /// Text, or a single nested node element
    Text {
        datatype: Option<Iri>,
        text: String,
        object: Option<Iri>,
    },
    /// `parseType="Resource"`: the element is also the subject of its children
    Resource { object: Iri, li: usize },
    Collection { items: Vec<Iri> },
    /// Raw markup of a `parseType="Literal"` element
    Literal { depth: usize, xml: String },
    /// Object fully given by attributes
    Given,
}

enum Role {
    Root,
    Node,
    Property,
}

#[derive(Default)]
struct Attributes {
    about: Option<String>,
    node_id: Option<String>,
    id: Option<String>,
    resource: Option<String>,
    datatype: Option<String>,
    parse_type: Option<String>,
    rdf_type: Option<String>,
    language: Option<String>,
    base: Option<String>,
    properties: Vec<(Iri, String)>,
}

/// Input wrapper tracking the location of everything consumed so far
struct Tracked<R> {
    inner: R,
    location: Location,
}

impl<R: BufRead> Read for Tracked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R: BufRead> BufRead for Tracked<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        if let Ok(buffered) = self.inner.fill_buf() {
            for &byte in &buffered[..amt.min(buffered.len())] {
                self.location.advance_byte(byte);
            }
        }
        self.inner.consume(amt);
    }
}

/// RDF/XML to sink events
pub struct RdfXmlParser {
    base: Option<Iri>,
    blank_nodes: BlankNodeGenerator,
    repair_iris: bool,
    frames: Vec<Frame>,
    statements: usize,
}

impl Default for RdfXmlParser {
    fn default() -> Self {
        RdfXmlParser {
            base: None,
            blank_nodes: BlankNodeGenerator::new(),
            repair_iris: true,
            frames: Vec::new(),
            statements: 0,
        }
    }
}

impl RdfXmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document base, overridden by `xml:base`
    pub fn with_base(mut self, base: Iri) -> Self {
        self.base = Some(base);
        self
    }

    /// Mint anonymous nodes from a shared generator
    pub fn with_blank_nodes(mut self, blank_nodes: BlankNodeGenerator) -> Self {
        self.blank_nodes = blank_nodes;
        self
    }

    /// Percent-encode illegal characters in malformed IRIs and retry
    /// instead of failing. On by default.
    pub fn repair_iris(mut self, repair: bool) -> Self {
        self.repair_iris = repair;
        self
    }

    /// Statements emitted by the last parse
    pub fn statements(&self) -> usize {
        self.statements
    }

    pub fn parse_str<S: TripleSink + ?Sized>(&mut self, input: &str, sink: &mut S) -> Result<(), ParseError> {
        self.parse_reader(input.as_bytes(), sink)
    }

    /// Parse while reading; only the open element stack is kept in memory
    pub fn parse_reader<R: BufRead, S: TripleSink + ?Sized>(
        &mut self,
        reader: R,
        sink: &mut S,
    ) -> Result<(), ParseError> {
        let mut reader = NsReader::from_reader(Tracked {
            inner: reader,
            location: Location::start(),
        });
        reader.config_mut().expand_empty_elements = true;
        let mut buf = Vec::new();
        self.frames.clear();
        self.statements = 0;

        sink.start_stream()?;
        loop {
            let location = reader.get_ref().location;
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|source| ParseError::Xml { location, source })?;
            match event {
                Event::Start(element) => self.start_element(&reader, &element, location, sink)?,
                Event::End(element) => self.end_element(&element, location, sink)?,
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|source| ParseError::Xml { location, source })?;
                    self.text(&text, false, location)?;
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    self.text(&String::from_utf8_lossy(&data), true, location)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !self.frames.is_empty() {
            return Err(ParseError::UnexpectedEof {
                location: reader.get_ref().location,
            });
        }
        tracing::debug!(statements = self.statements, "RDF/XML document parsed");
        sink.end_stream()?;
        Ok(())
    }

    fn scope(&self) -> (Option<Iri>, Option<String>) {
        match self.frames.last() {
            Some(frame) => (frame.base.clone(), frame.language.clone()),
            None => (self.base.clone(), None),
        }
    }

    fn role(&self, name: &Iri, location: Location) -> Result<Role, ParseError> {
        match self.frames.last().map(|frame| &frame.kind) {
            None if name.as_str() == RDF_RDF => Ok(Role::Root),
            None | Some(FrameKind::Root) => Ok(Role::Node),
            Some(FrameKind::Node { .. })
            | Some(FrameKind::Property {
                content: Content::Resource { .. },
                ..
            }) => Ok(Role::Property),
            Some(FrameKind::Property {
                content: Content::Collection { .. },
                ..
            }) => Ok(Role::Node),
            Some(FrameKind::Property {
                content: Content::Text { object: None, text, .. },
                ..
            }) if text.trim().is_empty() => Ok(Role::Node),
            Some(FrameKind::Property { .. }) => Err(ParseError::syntax(
                location,
                format!("unexpected element <{}> inside a property", name),
            )),
        }
    }

    fn start_element<R, S: TripleSink + ?Sized>(
        &mut self,
        reader: &NsReader<R>,
        element: &BytesStart<'_>,
        location: Location,
        sink: &mut S,
    ) -> Result<(), ParseError> {
        if let Some(Frame {
            kind:
                FrameKind::Property {
                    content: Content::Literal { depth, xml },
                    ..
                },
            ..
        }) = self.frames.last_mut()
        {
            xml.push('<');
            xml.push_str(&String::from_utf8_lossy(element));
            xml.push('>');
            *depth += 1;
            return Ok(());
        }

        let (namespace, local) = reader.resolve_element(element.name());
        let name = expand_name(namespace, local, location)?;
        let name = Iri::parse(&name).map_err(|source| ParseError::InvalidIri { location, source })?;
        let attributes = read_attributes(reader, element, location, sink)?;

        let (parent_base, parent_language) = self.scope();
        let base = match &attributes.base {
            Some(base) => Some(self.resolve(parent_base.as_ref(), base, location)?),
            None => parent_base,
        };
        let language = match &attributes.language {
            Some(language) if language.is_empty() => None,
            Some(language) => Some(language.clone()),
            None => parent_language,
        };

        match self.role(&name, location)? {
            Role::Root => {
                self.frames.push(Frame {
                    base,
                    language,
                    kind: FrameKind::Root,
                });
                Ok(())
            }
            Role::Node => self.node_element(name, attributes, base, language, location, sink),
            Role::Property => self.property_element(name, attributes, base, language, location, sink),
        }
    }

    fn node_element<S: TripleSink + ?Sized>(
        &mut self,
        name: Iri,
        attributes: Attributes,
        base: Option<Iri>,
        language: Option<String>,
        location: Location,
        sink: &mut S,
    ) -> Result<(), ParseError> {
        let subject = self.subject(&attributes, base.as_ref(), &name, location)?;

        let link = match self.frames.last_mut().map(|frame| &mut frame.kind) {
            Some(FrameKind::Property {
                subject: parent,
                predicate,
                reify,
                content: Content::Text { object, .. },
            }) => {
                *object = Some(subject.clone());
                Some((parent.clone(), predicate.clone(), reify.clone()))
            }
            Some(FrameKind::Property {
                content: Content::Collection { items },
                ..
            }) => {
                items.push(subject.clone());
                None
            }
            _ => None,
        };
        if let Some((parent, predicate, reify)) = link {
            self.statement(sink, &parent, &predicate, Node::Iri(subject.clone()), reify.as_ref())?;
        }

        if name.as_str() != RDF_DESCRIPTION {
            self.statement(sink, &subject, &rdf::type_(), Node::Iri(name), None)?;
        }
        self.property_attributes(sink, &subject, &attributes, language.as_deref(), base.as_ref(), location)?;

        self.frames.push(Frame {
            base,
            language,
            kind: FrameKind::Node { subject, li: 0 },
        });
        Ok(())
    }

    fn subject(
        &self,
        attributes: &Attributes,
        base: Option<&Iri>,
        name: &Iri,
        location: Location,
    ) -> Result<Iri, ParseError> {
        let given = [&attributes.about, &attributes.node_id, &attributes.id]
            .iter()
            .filter(|value| value.is_some())
            .count();
        if given > 1 {
            return Err(ParseError::AmbiguousSubject {
                location,
                element: name.to_string(),
            });
        }

        if let Some(about) = &attributes.about {
            self.resolve(base, about, location)
        } else if let Some(node_id) = &attributes.node_id {
            node_id_iri(node_id, location)
        } else if let Some(id) = &attributes.id {
            self.resolve(base, &format!("#{}", id), location)
        } else {
            Ok(self.blank_nodes.next_iri())
        }
    }

    fn property_element<S: TripleSink + ?Sized>(
        &mut self,
        name: Iri,
        attributes: Attributes,
        base: Option<Iri>,
        language: Option<String>,
        location: Location,
        sink: &mut S,
    ) -> Result<(), ParseError> {
        let (subject, predicate) = match self.frames.last_mut().map(|frame| &mut frame.kind) {
            Some(FrameKind::Node { subject, li })
            | Some(FrameKind::Property {
                content: Content::Resource { object: subject, li },
                ..
            }) => {
                let predicate = if name.as_str() == RDF_LI {
                    *li += 1;
                    rdf::li(*li)
                } else {
                    name
                };
                (subject.clone(), predicate)
            }
            _ => return Err(ParseError::syntax(location, "property element outside a node")),
        };

        let reify = match &attributes.id {
            Some(id) => Some(self.resolve(base.as_ref(), &format!("#{}", id), location)?),
            None => None,
        };

        let content = match attributes.parse_type.as_deref() {
            Some("Resource") => {
                let object = self.blank_nodes.next_iri();
                self.statement(sink, &subject, &predicate, Node::Iri(object.clone()), reify.as_ref())?;
                Content::Resource { object, li: 0 }
            }
            Some("Collection") => Content::Collection { items: Vec::new() },
            Some(parse_type) => {
                if parse_type != "Literal" {
                    tracing::warn!(parse_type, %predicate, "unknown rdf:parseType, reading content as an XML literal");
                }
                Content::Literal {
                    depth: 0,
                    xml: String::new(),
                }
            }
            None => {
                let has_properties = !attributes.properties.is_empty() || attributes.rdf_type.is_some();
                let object = match (&attributes.resource, &attributes.node_id) {
                    (Some(_), Some(_)) => {
                        return Err(ParseError::syntax(
                            location,
                            format!("<{}> has both rdf:resource and rdf:nodeID", predicate),
                        ))
                    }
                    (Some(resource), None) => Some(self.resolve(base.as_ref(), resource, location)?),
                    (None, Some(node_id)) => Some(node_id_iri(node_id, location)?),
                    (None, None) if has_properties => Some(self.blank_nodes.next_iri()),
                    (None, None) => None,
                };
                match object {
                    Some(object) => {
                        self.statement(sink, &subject, &predicate, Node::Iri(object.clone()), reify.as_ref())?;
                        self.property_attributes(
                            sink,
                            &object,
                            &attributes,
                            language.as_deref(),
                            base.as_ref(),
                            location,
                        )?;
                        Content::Given
                    }
                    None => {
                        let datatype = match &attributes.datatype {
                            Some(datatype) => Some(self.resolve(base.as_ref(), datatype, location)?),
                            None => None,
                        };
                        Content::Text {
                            datatype,
                            text: String::new(),
                            object: None,
                        }
                    }
                }
            }
        };

        self.frames.push(Frame {
            base,
            language,
            kind: FrameKind::Property {
                subject,
                predicate,
                reify,
                content,
            },
        });
        Ok(())
    }

    /// `rdf:type` and property attributes as statements about `subject`
    fn property_attributes<S: TripleSink + ?Sized>(
        &mut self,
        sink: &mut S,
        subject: &Iri,
        attributes: &Attributes,
        language: Option<&str>,
        base: Option<&Iri>,
        location: Location,
    ) -> Result<(), ParseError> {
        if let Some(class) = &attributes.rdf_type {
            let class = self.resolve(base, class, location)?;
            self.statement(sink, subject, &rdf::type_(), Node::Iri(class), None)?;
        }
        for (predicate, value) in &attributes.properties {
            let literal = match language {
                Some(language) => Literal::with_language(value.as_str(), language),
                None => Literal::plain(value.as_str()),
            };
            self.statement(sink, subject, predicate, Node::Literal(literal), None)?;
        }
        Ok(())
    }

    fn end_element<S: TripleSink + ?Sized>(
        &mut self,
        element: &BytesEnd<'_>,
        location: Location,
        sink: &mut S,
    ) -> Result<(), ParseError> {
        if let Some(Frame {
            kind:
                FrameKind::Property {
                    content: Content::Literal { depth, xml },
                    ..
                },
            ..
        }) = self.frames.last_mut()
        {
            if *depth > 0 {
                *depth -= 1;
                xml.push_str("</");
                xml.push_str(&String::from_utf8_lossy(element.name().as_ref()));
                xml.push('>');
                return Ok(());
            }
        }

        let Some(frame) = self.frames.pop() else {
            return Err(ParseError::syntax(location, "end tag without start tag"));
        };
        let FrameKind::Property {
            subject,
            predicate,
            reify,
            content,
        } = frame.kind
        else {
            return Ok(());
        };

        match content {
            Content::Text {
                object: None,
                datatype,
                text,
            } => {
                let literal = match (datatype, frame.language) {
                    (Some(datatype), _) => Literal::typed(text, datatype),
                    (None, Some(language)) => Literal::with_language(text, language),
                    (None, None) => Literal::plain(text),
                };
                self.statement(sink, &subject, &predicate, Node::Literal(literal), reify.as_ref())
            }
            Content::Collection { items } => self.collection(sink, &subject, &predicate, items, reify.as_ref()),
            Content::Literal { xml, .. } => {
                let literal = Literal::typed(xml, rdf::xml_literal());
                self.statement(sink, &subject, &predicate, Node::Literal(literal), reify.as_ref())
            }
            Content::Text { object: Some(_), .. } | Content::Resource { .. } | Content::Given => Ok(()),
        }
    }

    /// `rdf:first`/`rdf:rest` cells for a closed collection, head first
    fn collection<S: TripleSink + ?Sized>(
        &mut self,
        sink: &mut S,
        subject: &Iri,
        predicate: &Iri,
        items: Vec<Iri>,
        reify: Option<&Iri>,
    ) -> Result<(), ParseError> {
        if items.is_empty() {
            return self.statement(sink, subject, predicate, Node::Iri(rdf::nil()), reify);
        }

        let cells: Vec<Iri> = items.iter().map(|_| self.blank_nodes.next_iri()).collect();
        self.statement(sink, subject, predicate, Node::Iri(cells[0].clone()), reify)?;
        for (i, (cell, item)) in cells.iter().zip(items).enumerate() {
            self.statement(sink, cell, &rdf::first(), Node::Iri(item), None)?;
            let rest = cells.get(i + 1).cloned().unwrap_or_else(rdf::nil);
            self.statement(sink, cell, &rdf::rest(), Node::Iri(rest), None)?;
        }
        Ok(())
    }

    fn text(&mut self, text: &str, cdata: bool, location: Location) -> Result<(), ParseError> {
        match self.frames.last_mut().map(|frame| &mut frame.kind) {
            Some(FrameKind::Property {
                content:
                    Content::Text {
                        text: buffer,
                        object: None,
                        ..
                    },
                ..
            }) => buffer.push_str(text),
            Some(FrameKind::Property {
                content: Content::Literal { xml, .. },
                ..
            }) => {
                if cdata {
                    xml.push_str("<![CDATA[");
                    xml.push_str(text);
                    xml.push_str("]]>");
                } else {
                    xml.push_str(&escape(text));
                }
            }
            _ if text.trim().is_empty() => {}
            _ => {
                return Err(ParseError::syntax(
                    location,
                    format!("unexpected text '{}'", text.trim()),
                ))
            }
        }
        Ok(())
    }

    /// Emit one statement, plus its reification when `reify` names it
    fn statement<S: TripleSink + ?Sized>(
        &mut self,
        sink: &mut S,
        subject: &Iri,
        predicate: &Iri,
        object: Node,
        reify: Option<&Iri>,
    ) -> Result<(), ParseError> {
        let triple = Triple::new(subject.clone(), predicate.clone(), object);
        emit(sink, &triple, None)?;
        self.statements += 1;

        if let Some(statement) = reify {
            let Triple {
                subject,
                predicate,
                object,
            } = triple;
            let reification = [
                Triple::new(statement.clone(), rdf::type_(), rdf::statement()),
                Triple::new(statement.clone(), rdf::subject(), subject),
                Triple::new(statement.clone(), rdf::predicate(), predicate),
                Triple::new(statement.clone(), rdf::object(), object),
            ];
            for triple in &reification {
                emit(sink, triple, None)?;
            }
            self.statements += reification.len();
        }
        Ok(())
    }

    /// Resolve `reference` against `base`, repairing it first if allowed
    fn resolve(&self, base: Option<&Iri>, reference: &str, location: Location) -> Result<Iri, ParseError> {
        let iri = match Iri::parse(reference) {
            Ok(iri) => iri,
            Err(source) if self.repair_iris => {
                let repaired = repair_iri(reference);
                match Iri::parse(&repaired) {
                    Ok(iri) => {
                        tracing::warn!(original = reference, repaired = %iri, "repaired malformed IRI");
                        iri
                    }
                    Err(_) => return Err(ParseError::InvalidIri { location, source }),
                }
            }
            Err(source) => return Err(ParseError::InvalidIri { location, source }),
        };
        Ok(match base {
            Some(base) if !iri.is_absolute() => base.resolve(&iri),
            _ => iri,
        })
    }
}

fn expand_name(namespace: ResolveResult<'_>, local: LocalName<'_>, location: Location) -> Result<String, ParseError> {
    let local = String::from_utf8_lossy(local.as_ref());
    match namespace {
        ResolveResult::Bound(namespace) => Ok(format!("{}{}", String::from_utf8_lossy(namespace.as_ref()), local)),
        ResolveResult::Unbound => Err(ParseError::syntax(
            location,
            format!("element <{}> has no namespace", local),
        )),
        ResolveResult::Unknown(prefix) => Err(ParseError::syntax(
            location,
            format!("unknown prefix '{}'", String::from_utf8_lossy(&prefix)),
        )),
    }
}

/// `_:label` for an `rdf:nodeID`, which must be an XML name without colons
fn node_id_iri(node_id: &str, location: Location) -> Result<Iri, ParseError> {
    let mut chars = node_id.chars();
    let valid = chars.next().map_or(false, |c| c.is_alphabetic() || c == '_') && chars.all(is_label_char);
    if !valid {
        return Err(ParseError::syntax(
            location,
            format!("rdf:nodeID \"{}\" is not a valid blank node label", node_id),
        ));
    }
    Ok(Iri::blank(node_id))
}

fn read_attributes<R, S: TripleSink + ?Sized>(
    reader: &NsReader<R>,
    element: &BytesStart<'_>,
    location: Location,
    sink: &mut S,
) -> Result<Attributes, ParseError> {
    let mut attributes = Attributes::default();
    for attribute in element.attributes() {
        let attribute = attribute
            .map_err(|error| ParseError::Xml {
                location,
                source: quick_xml::Error::InvalidAttr(error),
            })?;
        let value = attribute
            .unescape_value()
            .map_err(|source| ParseError::Xml { location, source })?
            .into_owned();
        let key = attribute.key.as_ref();

        if key == b"xmlns" {
            sink.on_prefix("", &value)?;
            continue;
        }
        if let Some(prefix) = key.strip_prefix(b"xmlns:") {
            sink.on_prefix(&String::from_utf8_lossy(prefix), &value)?;
            continue;
        }
        match key {
            b"xml:lang" => {
                attributes.language = Some(value);
                continue;
            }
            b"xml:base" => {
                attributes.base = Some(value);
                continue;
            }
            _ if key.starts_with(b"xml") => continue,
            _ => {}
        }

        let (namespace, local) = reader.resolve_attribute(attribute.key);
        let syntax_name = match &namespace {
            ResolveResult::Bound(namespace) if namespace.as_ref() == RDF.as_bytes() => Some(local.as_ref()),
            // unqualified rdf attributes as written by older producers
            ResolveResult::Unbound => Some(local.as_ref()),
            _ => None,
        };
        let slot = match syntax_name {
            Some(b"about") => &mut attributes.about,
            Some(b"nodeID") => &mut attributes.node_id,
            Some(b"ID") => &mut attributes.id,
            Some(b"resource") => &mut attributes.resource,
            Some(b"datatype") => &mut attributes.datatype,
            Some(b"parseType") => &mut attributes.parse_type,
            Some(b"type") => &mut attributes.rdf_type,
            Some(b"bagID" | b"aboutEach" | b"aboutEachPrefix") => continue,
            _ if matches!(namespace, ResolveResult::Unbound) => {
                tracing::warn!(attribute = %String::from_utf8_lossy(key), "ignoring attribute without namespace");
                continue;
            }
            _ => {
                let predicate = expand_name(namespace, local, location)?;
                let predicate = Iri::parse(&predicate).map_err(|source| ParseError::InvalidIri { location, source })?;
                attributes.properties.push((predicate, value));
                continue;
            }
        };
        *slot = Some(value);
    }
    Ok(attributes)
}

/// Percent-encode characters that may not appear in an IRI, and any '%'
/// that does not start an escape
fn repair_iri(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        let escape_start = c == '%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
        match c {
            '%' if !escape_start => out.push_str(percent_encode_byte(b'%')),
            ' ' | '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`' => out.push_str(percent_encode_byte(c as u8)),
            c if c.is_ascii_control() => out.push_str(percent_encode_byte(c as u8)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Graph;
    use crate::namespace::ns::xsd;
    use crate::parser::NTriplesParser;
    use crate::sink::TripleCollector;
    use crate::writer::NTriplesWriter;

    const HEADER: &str = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ex="http://example.org/">"#;

    fn document(body: &str) -> String {
        format!("<?xml version=\"1.0\"?>\n{}\n{}\n</rdf:RDF>\n", HEADER, body)
    }

    fn collect(body: &str) -> Vec<String> {
        let mut collector = TripleCollector::new();
        RdfXmlParser::new()
            .parse_str(&document(body), &mut collector)
            .unwrap();
        collector.triples().map(|t| t.to_string()).collect()
    }

    fn fails(body: &str) -> ParseError {
        let mut collector = TripleCollector::new();
        RdfXmlParser::new()
            .parse_str(&document(body), &mut collector)
            .unwrap_err()
    }

    #[test]
    fn test_description_with_literal_and_resource() {
        let lines = collect(
            r#"<rdf:Description rdf:about="http://example.org/s">
                 <ex:name>value</ex:name>
                 <ex:knows rdf:resource="http://example.org/bob"/>
               </rdf:Description>"#,
        );
        assert_eq!(
            lines,
            vec![
                "<http://example.org/s> <http://example.org/name> \"value\"",
                "<http://example.org/s> <http://example.org/knows> <http://example.org/bob>",
            ]
        );
    }

    #[test]
    fn test_typed_node_and_type_attribute() {
        let lines = collect(
            r#"<ex:Person rdf:about="http://example.org/alice" rdf:type="http://example.org/Agent" ex:nick="al"/>"#,
        );
        assert_eq!(
            lines,
            vec![
                "<http://example.org/alice> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Person>",
                "<http://example.org/alice> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Agent>",
                "<http://example.org/alice> <http://example.org/nick> \"al\"",
            ]
        );
    }

    #[test]
    fn test_prefixes_reported() {
        let mut collector = TripleCollector::new();
        RdfXmlParser::new()
            .parse_str(&document(""), &mut collector)
            .unwrap();
        let prefixes: Vec<&str> = collector.prefixes().iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(prefixes, vec!["rdf", "ex"]);
    }

    #[test]
    fn test_language_and_datatype() {
        let lines = collect(
            r#"<rdf:Description rdf:about="http://example.org/s" xml:lang="en" ex:label="attr">
                 <ex:title>Hello</ex:title>
                 <ex:titre xml:lang="fr">Bonjour</ex:titre>
                 <ex:untagged xml:lang="">plain</ex:untagged>
                 <ex:age rdf:datatype="http://www.w3.org/2001/XMLSchema#int">7</ex:age>
               </rdf:Description>"#,
        );
        assert_eq!(lines[0], "<http://example.org/s> <http://example.org/label> \"attr\"@en");
        assert_eq!(lines[1], "<http://example.org/s> <http://example.org/title> \"Hello\"@en");
        assert_eq!(lines[2], "<http://example.org/s> <http://example.org/titre> \"Bonjour\"@fr");
        assert_eq!(lines[3], "<http://example.org/s> <http://example.org/untagged> \"plain\"");
        assert_eq!(
            lines[4],
            format!("<http://example.org/s> <http://example.org/age> \"7\"^^<{}>", xsd::INT)
        );
    }

    #[test]
    fn test_base_and_id() {
        let lines = collect(
            r#"<rdf:Description rdf:ID="me" xml:base="http://example.org/dir/doc">
                 <ex:see rdf:resource="../other"/>
               </rdf:Description>"#,
        );
        assert_eq!(
            lines,
            vec!["<http://example.org/dir/doc#me> <http://example.org/see> <http://example.org/other>"]
        );
    }

    #[test]
    fn test_parser_base() {
        let mut collector = TripleCollector::new();
        RdfXmlParser::new()
            .with_base(Iri::parse("http://example.org/base/").unwrap())
            .parse_str(
                &document(r##"<rdf:Description rdf:about="thing"><ex:p rdf:resource="#x"/></rdf:Description>"##),
                &mut collector,
            )
            .unwrap();
        let triple = &collector.quads()[0].triple;
        assert_eq!(triple.subject.as_str(), "http://example.org/base/thing");
        assert_eq!(triple.object.as_iri().map(Iri::as_str), Some("http://example.org/base/#x"));
    }

    #[test]
    fn test_nested_node_and_node_ids() {
        let lines = collect(
            r#"<rdf:Description rdf:about="http://example.org/s">
                 <ex:friend>
                   <ex:Person rdf:nodeID="f1"><ex:name>Bo</ex:name></ex:Person>
                 </ex:friend>
                 <ex:again rdf:nodeID="f1"/>
               </rdf:Description>"#,
        );
        assert_eq!(
            lines,
            vec![
                "<http://example.org/s> <http://example.org/friend> _:f1",
                "_:f1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Person>",
                "_:f1 <http://example.org/name> \"Bo\"",
                "<http://example.org/s> <http://example.org/again> _:f1",
            ]
        );
    }

    #[test]
    fn test_anonymous_nodes_use_generator() {
        let blank_nodes = BlankNodeGenerator::new();
        let mut collector = TripleCollector::new();
        RdfXmlParser::new()
            .with_blank_nodes(blank_nodes.clone())
            .parse_str(
                &document(
                    r#"<rdf:Description><ex:p rdf:parseType="Resource"><ex:q>v</ex:q></ex:p></rdf:Description>"#,
                ),
                &mut collector,
            )
            .unwrap();
        let lines: Vec<String> = collector.triples().map(|t| t.to_string()).collect();
        assert_eq!(lines, vec!["_:b1 <http://example.org/p> _:b2", "_:b2 <http://example.org/q> \"v\""]);
        assert_eq!(blank_nodes.peek(), 3);
    }

    #[test]
    fn test_collection() {
        let blank_nodes = BlankNodeGenerator::new();
        let mut collector = TripleCollector::new();
        RdfXmlParser::new()
            .with_blank_nodes(blank_nodes)
            .parse_str(
                &document(
                    r#"<rdf:Description rdf:about="http://example.org/s">
                         <ex:list rdf:parseType="Collection">
                           <rdf:Description rdf:about="http://example.org/a"/>
                           <rdf:Description rdf:about="http://example.org/b"/>
                         </ex:list>
                         <ex:empty rdf:parseType="Collection"></ex:empty>
                       </rdf:Description>"#,
                ),
                &mut collector,
            )
            .unwrap();
        let lines: Vec<String> = collector.triples().map(|t| t.to_string()).collect();
        let nil = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#nil>";
        let first = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#first>";
        let rest = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#rest>";
        assert_eq!(
            lines,
            vec![
                "<http://example.org/s> <http://example.org/list> _:b1".to_string(),
                format!("_:b1 {} <http://example.org/a>", first),
                format!("_:b1 {} _:b2", rest),
                format!("_:b2 {} <http://example.org/b>", first),
                format!("_:b2 {} {}", rest, nil),
                format!("<http://example.org/s> <http://example.org/empty> {}", nil),
            ]
        );
    }

    #[test]
    fn test_xml_literal() {
        let mut collector = TripleCollector::new();
        RdfXmlParser::new()
            .parse_str(
                &document(
                    r#"<rdf:Description rdf:about="http://example.org/s"><ex:body rdf:parseType="Literal"><b class="x">bold &amp; <i>more</i></b><br/></ex:body></rdf:Description>"#,
                ),
                &mut collector,
            )
            .unwrap();
        let literal = collector.quads()[0].triple.object.as_literal().unwrap().clone();
        assert!(literal.is_xml_literal());
        assert_eq!(literal.value(), "<b class=\"x\">bold &amp; <i>more</i></b><br></br>");
    }

    #[test]
    fn test_li_and_reification() {
        let lines = collect(
            r#"<rdf:Bag rdf:about="http://example.org/bag">
                 <rdf:li>one</rdf:li>
                 <rdf:li rdf:ID="st">two</rdf:li>
               </rdf:Bag>"#,
        );
        let rdf_ns = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
        assert_eq!(lines[1], format!("<http://example.org/bag> <{}_1> \"one\"", rdf_ns));
        assert_eq!(lines[2], format!("<http://example.org/bag> <{}_2> \"two\"", rdf_ns));
        assert_eq!(lines.len(), 7);
        assert!(lines[3].contains(&format!("<{}Statement>", rdf_ns)));
        assert_eq!(lines[6], format!("<#st> <{}object> \"two\"", rdf_ns));
    }

    #[test]
    fn test_property_attributes_on_property_element() {
        let lines = collect(
            r#"<rdf:Description rdf:about="http://example.org/s">
                 <ex:address ex:city="Oslo" rdf:resource="http://example.org/addr"/>
               </rdf:Description>"#,
        );
        assert_eq!(
            lines,
            vec![
                "<http://example.org/s> <http://example.org/address> <http://example.org/addr>",
                "<http://example.org/addr> <http://example.org/city> \"Oslo\"",
            ]
        );
    }

    #[test]
    fn test_empty_property_is_empty_literal() {
        let lines = collect(r#"<rdf:Description rdf:about="http://example.org/s"><ex:note/></rdf:Description>"#);
        assert_eq!(lines, vec!["<http://example.org/s> <http://example.org/note> \"\""]);
    }

    #[test]
    fn test_cdata_text() {
        let lines = collect(
            r#"<rdf:Description rdf:about="http://example.org/s"><ex:code><![CDATA[a < b]]></ex:code></rdf:Description>"#,
        );
        assert_eq!(lines, vec!["<http://example.org/s> <http://example.org/code> \"a < b\""]);
    }

    #[test]
    fn test_ambiguous_subject() {
        let error = fails(r#"<rdf:Description rdf:about="http://example.org/a" rdf:nodeID="n"/>"#);
        assert!(matches!(error, ParseError::AmbiguousSubject { .. }));
    }

    #[test]
    fn test_node_id_must_be_a_label() {
        for body in [
            r#"<rdf:Description rdf:nodeID="a b"><ex:p>v</ex:p></rdf:Description>"#,
            r#"<rdf:Description rdf:about="http://example.org/s"><ex:p rdf:nodeID="1x"/></rdf:Description>"#,
            r#"<rdf:Description rdf:nodeID=""/>"#,
        ] {
            assert!(matches!(fails(body), ParseError::Syntax { .. }), "{}", body);
        }
    }

    #[test]
    fn test_node_ids_survive_line_syntax() {
        let mut writer = NTriplesWriter::new(Vec::new());
        RdfXmlParser::new()
            .parse_str(
                &document(
                    r#"<rdf:Description rdf:nodeID="n-1.x">
                         <ex:p rdf:nodeID="_other"/>
                         <ex:q>v</ex:q>
                       </rdf:Description>"#,
                ),
                &mut writer,
            )
            .unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text,
            "_:n-1.x <http://example.org/p> _:_other .\n_:n-1.x <http://example.org/q> \"v\" .\n"
        );

        let mut reread = TripleCollector::new();
        NTriplesParser::new().parse_str(&text, &mut reread).unwrap();
        assert_eq!(reread.quads()[0].triple.subject, Iri::blank("n-1.x"));
        assert_eq!(reread.quads()[0].triple.object.as_iri(), Some(&Iri::blank("_other")));
    }

    #[test]
    fn test_reader_in_small_pieces() {
        let input = document(
            r#"<rdf:Description rdf:about="http://example.org/s">
                 <ex:name>café &amp; more</ex:name>
                 <ex:list rdf:parseType="Collection"><rdf:Description rdf:about="http://example.org/a"/></ex:list>
               </rdf:Description>"#,
        );
        let mut whole = TripleCollector::new();
        RdfXmlParser::new().parse_str(&input, &mut whole).unwrap();

        let mut pieces = TripleCollector::new();
        RdfXmlParser::new()
            .parse_reader(std::io::BufReader::with_capacity(5, input.as_bytes()), &mut pieces)
            .unwrap();
        assert_eq!(pieces.quads(), whole.quads());
        assert_eq!(
            whole.quads()[0].triple.to_string(),
            "<http://example.org/s> <http://example.org/name> \"café & more\""
        );
    }

    #[test]
    fn test_error_location_from_reader() {
        let input = document(r#"<rdf:Description rdf:about="http://example.org/a">stray</rdf:Description>"#);
        let mut collector = TripleCollector::new();
        let error = RdfXmlParser::new()
            .parse_reader(std::io::BufReader::with_capacity(3, input.as_bytes()), &mut collector)
            .unwrap_err();
        assert!(matches!(error, ParseError::Syntax { .. }));
        assert_eq!(error.location().map(|l| l.line), Some(4));
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(
            fails(r#"<rdf:Description rdf:about="http://example.org/a">stray</rdf:Description>"#),
            ParseError::Syntax { .. }
        ));
        assert!(matches!(
            fails(r#"<rdf:Description rdf:about="http://example.org/a"><ex:p>text<ex:Q/></ex:p></rdf:Description>"#),
            ParseError::Syntax { .. }
        ));
        assert!(matches!(fails(r#"<nope:Thing/>"#), ParseError::Syntax { .. }));

        let mut collector = TripleCollector::new();
        let truncated = RdfXmlParser::new().parse_str(&format!("{}<rdf:Description>", HEADER), &mut collector);
        assert!(truncated.is_err());
    }

    #[test]
    fn test_iri_repair() {
        let body = r#"<rdf:Description rdf:about="http://example.org/a b"><ex:p>x</ex:p></rdf:Description>"#;
        let lines = collect(body);
        assert_eq!(lines, vec!["<http://example.org/a%20b> <http://example.org/p> \"x\""]);

        let mut collector = TripleCollector::new();
        let strict = RdfXmlParser::new()
            .repair_iris(false)
            .parse_str(&document(body), &mut collector);
        assert!(matches!(strict, Err(ParseError::InvalidIri { .. })));
    }

    #[test]
    fn test_repair_iri() {
        assert_eq!(repair_iri("http://a/b c|d"), "http://a/b%20c%7Cd");
        assert_eq!(repair_iri("http://a/100%"), "http://a/100%25");
        assert_eq!(repair_iri("http://a/%41"), "http://a/%41");
    }

    #[test]
    fn test_into_graph_rebuilds_tree() {
        let mut graph = Graph::new();
        let blank_nodes = graph.blank_nodes().clone();
        RdfXmlParser::new()
            .with_blank_nodes(blank_nodes)
            .parse_str(
                &document(
                    r#"<rdf:Description rdf:about="http://example.org/s">
                         <ex:p rdf:parseType="Resource"><ex:q>v</ex:q></ex:p>
                       </rdf:Description>"#,
                ),
                &mut graph,
            )
            .unwrap();
        assert_eq!(graph.len(), 1);
        let s = graph.resource(&Iri::parse("http://example.org/s").unwrap()).unwrap();
        assert_eq!(s.children().count(), 1);
        assert_eq!(graph.namespaces().namespace_uri("ex"), Some("http://example.org/"));
    }
}
