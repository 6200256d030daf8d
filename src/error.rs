//! Structured error handling for triplekit
//!
//! Each component reports its own `thiserror` enum ([`IriError`],
//! [`ParseError`], [`SinkError`], [`ConfigError`]). [`RdfError`] is the
//! umbrella used by the convenience API and the command line tool: a stable
//! numeric [`ErrorCode`], a message, optional context and a hint.
//!
//! # Error Categories
//!
//! - 1xxx - document syntax (N-Triples, N-Quads, RDF/XML)
//! - 2xxx - identifiers
//! - 3xxx - sinks and writers
//! - 4xxx - I/O
//! - 7xxx - configuration
//!
//! # Example
//!
//! ```rust
//! use triplekit::error::{ErrorCode, RdfError};
//!
//! fn check_base(base: &str) -> Result<(), RdfError> {
//!     if base.is_empty() {
//!         return Err(RdfError::new(ErrorCode::InvalidIri, "empty base IRI")
//!             .with_context("option", "--base"));
//!     }
//!     Ok(())
//! }
//! assert!(check_base("").is_err());
//! ```

use std::fmt;
use std::io;

use indexmap::IndexMap;

use crate::config::ConfigError;
use crate::iri::IriError;
use crate::parser::ParseError;
use crate::sink::SinkError;

// ============================================================================
// Error Codes
// ============================================================================

/// Unique error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Syntax errors (1xxx)
    /// Generic syntax error
    ParseError = 1000,
    /// Malformed RDF/XML, including XML well-formedness
    InvalidRdfXml = 1002,
    /// Bad backslash escape in a line-syntax token
    InvalidEscape = 1003,
    /// Node element names its subject more than once
    AmbiguousSubject = 1004,
    /// Input ended inside a statement or element
    UnexpectedEof = 1005,

    // Identifier errors (2xxx)
    /// Generic identifier error
    InvalidIri = 2000,
    InvalidScheme = 2001,
    IllegalCharacter = 2002,
    InvalidPercentEncoding = 2003,
    InvalidPort = 2004,

    // Sink errors (3xxx)
    /// A writer cannot express a statement
    Unserializable = 3002,
    /// A sink refused a statement
    SinkRejected = 3003,

    // I/O errors (4xxx)
    IoError = 4000,
    FileNotFound = 4001,
    PermissionDenied = 4002,

    // Configuration errors (7xxx)
    ConfigError = 7000,
    ConfigNotFound = 7001,
    InvalidConfigSyntax = 7002,
    InvalidConfigValue = 7003,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a short description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRdfXml => "Invalid RDF/XML syntax",
            ErrorCode::InvalidEscape => "Invalid escape sequence",
            ErrorCode::AmbiguousSubject => "Ambiguous subject",
            ErrorCode::UnexpectedEof => "Unexpected end of input",

            ErrorCode::InvalidIri => "Invalid IRI",
            ErrorCode::InvalidScheme => "Invalid IRI scheme",
            ErrorCode::IllegalCharacter => "Illegal character in IRI",
            ErrorCode::InvalidPercentEncoding => "Malformed percent escape",
            ErrorCode::InvalidPort => "Invalid port",

            ErrorCode::Unserializable => "Statement cannot be serialized",
            ErrorCode::SinkRejected => "Statement rejected by sink",

            ErrorCode::IoError => "I/O error",
            ErrorCode::FileNotFound => "File not found",
            ErrorCode::PermissionDenied => "Permission denied",

            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ConfigNotFound => "Configuration file not found",
            ErrorCode::InvalidConfigSyntax => "Invalid configuration syntax",
            ErrorCode::InvalidConfigValue => "Invalid configuration value",
        }
    }

    /// Process exit status for the command line tool
    pub fn exit_status(&self) -> i32 {
        match self.code() / 1000 {
            1 | 2 => 65,
            3 => 70,
            4 => 74,
            7 => 78,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// Error Context
// ============================================================================

/// Additional context information for an error
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Key-value pairs, in the order they were added
    pub fields: IndexMap<String, String>,
    /// Input location (`line L, column C`)
    pub location: Option<String>,
    /// Stack of error causes, outermost first
    pub causes: Vec<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// The umbrella error type for triplekit
#[derive(Debug, Clone)]
pub struct RdfError {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    pub context: Option<ErrorContext>,
    /// Hint for resolving the error
    pub hint: Option<String>,
}

impl RdfError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    // ========================================================================
    // Factory methods for common error types
    // ========================================================================

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.fields.insert(key.into(), value.into());
        self
    }

    /// Add a cause to the error chain
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.causes.push(cause.into());
        self
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.location = Some(location.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_syntax_error(&self) -> bool {
        self.code.code() / 1000 == 1
    }

    pub fn is_identifier_error(&self) -> bool {
        self.code.code() / 1000 == 2
    }

    pub fn exit_status(&self) -> i32 {
        self.code.exit_status()
    }
}

impl fmt::Display for RdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)?;

        if let Some(ref ctx) = self.context {
            if let Some(ref loc) = ctx.location {
                write!(f, " at {}", loc)?;
            }
            for (key, value) in &ctx.fields {
                write!(f, "\n  {}: {}", key, value)?;
            }
            if !ctx.causes.is_empty() {
                write!(f, "\nCaused by:")?;
                for cause in &ctx.causes {
                    write!(f, "\n  - {}", cause)?;
                }
            }
        }

        if let Some(ref hint) = self.hint {
            write!(f, "\nHint: {}", hint)?;
        }

        Ok(())
    }
}

impl std::error::Error for RdfError {}

// ============================================================================
// Conversions from component errors
// ============================================================================

impl From<IriError> for RdfError {
    fn from(err: IriError) -> Self {
        let code = match &err {
            IriError::InvalidScheme { .. } => ErrorCode::InvalidScheme,
            IriError::IllegalCharacter { .. } => ErrorCode::IllegalCharacter,
            IriError::InvalidPercentEncoding { .. } => ErrorCode::InvalidPercentEncoding,
            IriError::InvalidPort { .. } => ErrorCode::InvalidPort,
        };
        RdfError::new(code, err.to_string()).with_context("iri", err.iri())
    }
}

impl From<ParseError> for RdfError {
    fn from(err: ParseError) -> Self {
        let location = err.location();
        let converted = match err {
            ParseError::Syntax { message, .. } => RdfError::parse(message),
            ParseError::InvalidEscape { message, .. } => RdfError::new(ErrorCode::InvalidEscape, message),
            ParseError::AmbiguousSubject { element, .. } => RdfError::new(
                ErrorCode::AmbiguousSubject,
                format!("<{}> names its subject more than once", element),
            )
            .with_hint("Use only one of rdf:about, rdf:nodeID and rdf:ID"),
            ParseError::InvalidIri { source, .. } => RdfError::from(source),
            ParseError::UnexpectedEof { .. } => {
                RdfError::new(ErrorCode::UnexpectedEof, "input ended in the middle of a statement")
            }
            ParseError::Xml { source, .. } => RdfError::new(ErrorCode::InvalidRdfXml, source.to_string()),
            ParseError::Sink(source) => RdfError::from(source),
            ParseError::Io(source) => RdfError::from(source),
        };
        match location {
            Some(location) => converted.at(location.to_string()),
            None => converted,
        }
    }
}

impl From<SinkError> for RdfError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Io(source) => RdfError::from(source),
            SinkError::Unserializable { what, reason } => {
                RdfError::new(ErrorCode::Unserializable, format!("cannot serialize {}", what)).with_cause(reason)
            }
            SinkError::Rejected(reason) => RdfError::new(ErrorCode::SinkRejected, reason),
        }
    }
}

impl From<io::Error> for RdfError {
    fn from(err: io::Error) -> Self {
        let code = match err.kind() {
            io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        RdfError::new(code, err.to_string())
    }
}

impl From<ConfigError> for RdfError {
    fn from(err: ConfigError) -> Self {
        let code = match &err {
            ConfigError::Io { .. } => ErrorCode::ConfigNotFound,
            ConfigError::Parse { .. } => ErrorCode::InvalidConfigSyntax,
            ConfigError::Serialize(_) => ErrorCode::ConfigError,
            ConfigError::Invalid { .. } => ErrorCode::InvalidConfigValue,
        };
        RdfError::new(code, err.to_string())
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// A Result type using RdfError
pub type RdfResult<T> = Result<T, RdfError>;
