//! Streaming N-Triples / N-Quads parser
//!
//! A character-level state machine. Input may be fed in chunks split at
//! any point, including inside a token or a multi-byte character when
//! reading bytes through [`NTriplesParser::parse_reader`]; partial tokens
//! are carried over between calls.

use std::io::Read;

use crate::iri::Iri;
use crate::sink::TripleSink;

use super::{is_label_char, unescape, Location, ParseError};

/// Bytes read per call by [`NTriplesParser::parse_reader`] unless configured
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Marks a backslash whose escape kind is not known yet
const ESCAPE_PENDING: u8 = 9;

/// Tokenizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Outside,
    Uri,
    BlankNode,
    Literal,
    AfterLiteral,
    LiteralType,
    Comment,
}

#[derive(Debug)]
enum Object {
    Iri(Iri),
    Literal {
        text: String,
        language: Option<String>,
        datatype: Option<Iri>,
    },
}

/// Parser for the line syntaxes
#[derive(Debug)]
pub struct NTriplesParser {
    state: State,
    quads: bool,
    base: Option<Iri>,
    /// Token being accumulated, kept across chunks
    token: String,
    /// Raw literal text while its suffix is read
    literal: String,
    escape: u8,
    subject: Option<Iri>,
    predicate: Option<Iri>,
    object: Option<Object>,
    graph: Option<Iri>,
    /// Start of the current token
    token_start: Location,
    location: Location,
    started: bool,
    statements: usize,
}

impl Default for NTriplesParser {
    fn default() -> Self {
        NTriplesParser {
            state: State::Outside,
            quads: false,
            base: None,
            token: String::new(),
            literal: String::new(),
            escape: 0,
            subject: None,
            predicate: None,
            object: None,
            graph: None,
            token_start: Location::start(),
            location: Location::start(),
            started: false,
            statements: 0,
        }
    }
}

impl NTriplesParser {
    /// N-Triples: three terms per statement
    pub fn new() -> Self {
        Self::default()
    }

    /// N-Quads: an optional fourth term names the graph
    pub fn nquads() -> Self {
        NTriplesParser {
            quads: true,
            ..Self::default()
        }
    }

    /// Resolve relative IRIs against `base`
    pub fn with_base(mut self, base: Iri) -> Self {
        self.base = Some(base);
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Position of the next character to be read
    pub fn location(&self) -> Location {
        self.location
    }

    /// Statements emitted so far
    pub fn statements(&self) -> usize {
        self.statements
    }

    /// Feed the next piece of the document
    pub fn process<S: TripleSink + ?Sized>(&mut self, chunk: &str, sink: &mut S) -> Result<(), ParseError> {
        if !self.started {
            self.started = true;
            sink.start_stream()?;
        }
        for c in chunk.chars() {
            if !self.step(c, sink)? {
                // the finished token handed `c` back to the outer state
                self.step(c, sink)?;
            }
            self.location.advance(c);
        }
        Ok(())
    }

    /// Signal end of input. Fails if a token or statement is left open.
    pub fn finish<S: TripleSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), ParseError> {
        if !self.started {
            self.started = true;
            sink.start_stream()?;
        }
        match self.state {
            State::Outside | State::Comment => {}
            State::BlankNode => self.end_blank_node(sink)?,
            State::AfterLiteral => self.end_plain_literal()?,
            State::LiteralType => self.end_literal_suffix(sink)?,
            State::Uri | State::Literal => {
                return Err(ParseError::UnexpectedEof {
                    location: self.location,
                })
            }
        }
        self.state = State::Outside;
        if self.pending() {
            return Err(ParseError::UnexpectedEof {
                location: self.location,
            });
        }
        tracing::debug!(statements = self.statements, "line syntax document parsed");
        sink.end_stream()?;
        Ok(())
    }

    /// Parse a whole document held in memory
    pub fn parse_str<S: TripleSink + ?Sized>(&mut self, input: &str, sink: &mut S) -> Result<(), ParseError> {
        self.process(input, sink)?;
        self.finish(sink)
    }

    /// Parse from a byte stream, `chunk_size` bytes at a time
    pub fn parse_reader<R: Read, S: TripleSink + ?Sized>(
        &mut self,
        mut reader: R,
        chunk_size: usize,
        sink: &mut S,
    ) -> Result<(), ParseError> {
        let mut buffer = vec![0u8; chunk_size.max(4)];
        // bytes of a character cut off by the previous read
        let mut carry: Vec<u8> = Vec::new();
        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            carry.extend_from_slice(&buffer[..read]);
            let valid = match std::str::from_utf8(&carry) {
                Ok(text) => text.len(),
                Err(error) if error.error_len().is_none() => error.valid_up_to(),
                Err(_) => return Err(ParseError::syntax(self.location, "input is not valid UTF-8")),
            };
            let text = std::str::from_utf8(&carry[..valid])
                .map_err(|_| ParseError::syntax(self.location, "input is not valid UTF-8"))?;
            self.process(text, sink)?;
            carry.drain(..valid);
        }
        if !carry.is_empty() {
            return Err(ParseError::UnexpectedEof {
                location: self.location,
            });
        }
        self.finish(sink)
    }

    fn pending(&self) -> bool {
        self.subject.is_some() || self.predicate.is_some() || self.object.is_some() || self.graph.is_some()
    }

    fn begin_token(&mut self, state: State) {
        self.state = state;
        self.token.clear();
        self.token_start = self.location;
    }

    /// Returns `false` when `c` ended a token without being consumed
    fn step<S: TripleSink + ?Sized>(&mut self, c: char, sink: &mut S) -> Result<bool, ParseError> {
        match self.state {
            State::Outside => match c {
                '"' => {
                    self.begin_token(State::Literal);
                    self.escape = 0;
                }
                '<' => self.begin_token(State::Uri),
                '_' => {
                    self.begin_token(State::BlankNode);
                    self.token.push(c);
                }
                '#' => self.state = State::Comment,
                '.' => self.end_statement(sink)?,
                c if c.is_whitespace() => {}
                c => {
                    return Err(ParseError::syntax(
                        self.location,
                        format!("unexpected character '{}'", c.escape_default()),
                    ))
                }
            },

            State::Comment => {
                if c == '\n' || c == '\r' {
                    self.state = State::Outside;
                }
            }

            State::Uri => match c {
                '>' => {
                    let iri = self.iri_token()?;
                    self.place(iri, false)?;
                    self.state = State::Outside;
                }
                '\n' | '\r' => return Err(ParseError::syntax(self.location, "line break inside IRI")),
                c => self.token.push(c),
            },

            State::BlankNode => {
                if is_label_char(c) || (c == ':' && self.token == "_") {
                    self.token.push(c);
                } else {
                    self.end_blank_node(sink)?;
                    self.state = State::Outside;
                    return Ok(false);
                }
            }

            State::Literal => {
                if self.escape == ESCAPE_PENDING {
                    self.escape = match c {
                        'u' => 4,
                        'U' => 8,
                        _ => 0,
                    };
                    self.token.push(c);
                } else if self.escape > 0 {
                    self.escape -= 1;
                    self.token.push(c);
                } else {
                    match c {
                        '\\' => {
                            self.escape = ESCAPE_PENDING;
                            self.token.push(c);
                        }
                        '"' => {
                            self.literal = std::mem::take(&mut self.token);
                            self.state = State::AfterLiteral;
                        }
                        '\n' | '\r' => {
                            return Err(ParseError::syntax(self.location, "line break inside literal"))
                        }
                        c => self.token.push(c),
                    }
                }
            }

            State::AfterLiteral => match c {
                '@' | '^' => {
                    self.begin_token(State::LiteralType);
                    self.token.push(c);
                }
                '.' => {
                    self.end_plain_literal()?;
                    self.state = State::Outside;
                    self.end_statement(sink)?;
                }
                c if c.is_whitespace() => {
                    self.end_plain_literal()?;
                    self.state = State::Outside;
                }
                '<' | '_' | '#' => {
                    self.end_plain_literal()?;
                    self.state = State::Outside;
                    return Ok(false);
                }
                c => {
                    return Err(ParseError::syntax(
                        self.location,
                        format!("unexpected '{}' after literal", c.escape_default()),
                    ))
                }
            },

            State::LiteralType => {
                if c.is_whitespace() {
                    self.end_literal_suffix(sink)?;
                    self.state = State::Outside;
                } else {
                    self.token.push(c);
                }
            }
        }
        Ok(true)
    }

    fn iri_token(&self) -> Result<Iri, ParseError> {
        let text = unescape(&self.token, self.token_start)?;
        self.iri(&text)
    }

    fn iri(&self, text: &str) -> Result<Iri, ParseError> {
        let iri = Iri::parse(text).map_err(|source| ParseError::InvalidIri {
            location: self.token_start,
            source,
        })?;
        match &self.base {
            Some(base) if !iri.is_absolute() => Ok(base.resolve(&iri)),
            _ => Ok(iri),
        }
    }

    /// Put a non-literal term in the next free position
    fn place(&mut self, term: Iri, blank: bool) -> Result<(), ParseError> {
        if self.subject.is_none() {
            self.subject = Some(term);
        } else if self.predicate.is_none() {
            if blank {
                return Err(ParseError::syntax(self.token_start, "a blank node cannot be a predicate"));
            }
            self.predicate = Some(term);
        } else if self.object.is_none() {
            self.object = Some(Object::Iri(term));
        } else if self.graph.is_none() && self.quads {
            self.graph = Some(term);
        } else if self.quads {
            return Err(ParseError::syntax(self.token_start, "more than four terms in statement"));
        } else {
            return Err(ParseError::syntax(
                self.token_start,
                "graph label is not allowed in N-Triples",
            ));
        }
        Ok(())
    }

    fn place_literal(&mut self, text: String, language: Option<String>, datatype: Option<Iri>) -> Result<(), ParseError> {
        if self.subject.is_none() || self.predicate.is_none() || self.object.is_some() {
            return Err(ParseError::syntax(self.token_start, "a literal can only be the object"));
        }
        self.object = Some(Object::Literal {
            text,
            language,
            datatype,
        });
        Ok(())
    }

    fn end_blank_node<S: TripleSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), ParseError> {
        let mut label = std::mem::take(&mut self.token);
        // a label may contain '.' but not end with one: that is the terminator
        let terminated = label.ends_with('.');
        if terminated {
            label.pop();
        }
        let Some(name) = label.strip_prefix("_:").filter(|name| !name.is_empty()) else {
            return Err(ParseError::syntax(self.token_start, format!("malformed blank node '{}'", label)));
        };
        if name.ends_with('.') {
            return Err(ParseError::syntax(self.token_start, format!("malformed blank node '{}'", label)));
        }
        self.place(Iri::blank(name), true)?;
        if terminated {
            self.end_statement(sink)?;
        }
        Ok(())
    }

    fn end_plain_literal(&mut self) -> Result<(), ParseError> {
        let text = unescape(&std::mem::take(&mut self.literal), self.token_start)?;
        self.place_literal(text, None, None)
    }

    /// Classify `@lang` or `^^<datatype>`, closing the statement when the
    /// suffix swallowed the terminating '.'
    fn end_literal_suffix<S: TripleSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), ParseError> {
        let mut suffix = std::mem::take(&mut self.token);
        let terminated = suffix.ends_with('.');
        if terminated {
            suffix.pop();
        }
        let text = unescape(&std::mem::take(&mut self.literal), self.token_start)?;

        if let Some(language) = suffix.strip_prefix('@') {
            if !is_language_tag(language) {
                return Err(ParseError::syntax(self.token_start, format!("invalid language tag '{}'", language)));
            }
            self.place_literal(text, Some(language.to_string()), None)?;
        } else if let Some(datatype) = suffix.strip_prefix("^^<").and_then(|s| s.strip_suffix('>')) {
            let datatype = unescape(datatype, self.token_start)?;
            let datatype = self.iri(&datatype)?;
            self.place_literal(text, None, Some(datatype))?;
        } else {
            return Err(ParseError::syntax(self.token_start, format!("invalid literal suffix '{}'", suffix)));
        }

        if terminated {
            self.end_statement(sink)?;
        }
        Ok(())
    }

    fn end_statement<S: TripleSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), ParseError> {
        if !self.pending() {
            return Err(ParseError::syntax(self.location, "'.' without a statement"));
        }
        let (Some(subject), Some(predicate), Some(object)) =
            (self.subject.take(), self.predicate.take(), self.object.take())
        else {
            return Err(ParseError::syntax(self.location, "incomplete statement"));
        };
        let graph = self.graph.take();

        match object {
            Object::Iri(object) => sink.add_non_literal(&subject, &predicate, &object, graph.as_ref())?,
            Object::Literal {
                text,
                datatype: Some(datatype),
                ..
            } => sink.add_typed_literal(&subject, &predicate, &text, &datatype, graph.as_ref())?,
            Object::Literal { text, language, .. } => {
                sink.add_plain_literal(&subject, &predicate, &text, language.as_deref(), graph.as_ref())?
            }
        }
        self.statements += 1;
        Ok(())
    }
}

fn is_language_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary = parts.next().unwrap_or_default();
    !primary.is_empty()
        && primary.chars().all(|c| c.is_ascii_alphabetic())
        && parts.all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()))
}
