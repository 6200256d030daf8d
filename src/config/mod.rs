//! Configuration for triplekit
//!
//! Settings come from a TOML file, then environment variables override
//! individual keys.
//!
//! # Configuration File Locations
//!
//! Configuration files are searched in order (first found wins):
//! 1. `./triplekit.toml` - Project-local configuration
//! 2. `~/.config/triplekit/config.toml` - User configuration (XDG)
//! 3. `~/.triplekit/config.toml` - User configuration (legacy)
//! 4. `/etc/triplekit/config.toml` - System-wide configuration
//!
//! # Environment Variables
//!
//! - `TRIPLEKIT_BASE_URI` - Base IRI for relative references
//! - `TRIPLEKIT_LOG_LEVEL` - quiet, normal, verbose, debug
//! - `TRIPLEKIT_INPUT_FORMAT` / `TRIPLEKIT_OUTPUT_FORMAT` - ntriples, nquads, rdfxml
//! - `TRIPLEKIT_CHUNK_SIZE` - Bytes per read when streaming line syntax
//! - `TRIPLEKIT_REPAIR_IRIS` - Repair malformed IRIs in RDF/XML (true/false)
//!
//! # Example Configuration
//!
//! ```toml
//! [general]
//! base_uri = "http://example.org/"
//! log_level = "verbose"
//! output_format = "rdfxml"
//!
//! [writer]
//! indent = 4
//! inline_blank_nodes = true
//!
//! [prefixes]
//! ex = "http://example.org/"
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::iri::Iri;
use crate::namespace::NamespaceContext;
use crate::parser::ntriples::DEFAULT_CHUNK_SIZE;
use crate::writer::rdfxml::DEFAULT_INDENT;
use crate::writer::Format;

// ============================================================================
// Configuration Schema
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TripleKitConfig {
    pub general: GeneralConfig,
    pub parser: ParserConfig,
    pub writer: WriterConfig,
    /// Extra prefix definitions, added on top of the well-known ones
    pub prefixes: BTreeMap<String, String>,
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default base IRI for relative references
    pub base_uri: Option<String>,
    pub log_level: LogLevel,
    /// Assumed when the input format cannot be guessed from a file name
    pub input_format: Format,
    pub output_format: Format,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            base_uri: None,
            log_level: LogLevel::Normal,
            input_format: Format::NTriples,
            output_format: Format::NTriples,
        }
    }
}

/// Parser options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Bytes per read when streaming N-Triples / N-Quads
    pub chunk_size: usize,
    /// Percent-encode illegal characters in RDF/XML IRIs instead of failing
    pub repair_iris: bool,
    /// Accept a graph label in line syntax
    pub quads: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            repair_iris: true,
            quads: false,
        }
    }
}

/// Writer options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// RDF/XML indentation width, 0 for none
    pub indent: usize,
    /// Nest embedded resources inside their property elements
    pub inline_blank_nodes: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            inline_blank_nodes: true,
        }
    }
}

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" | "q" | "0" => Some(LogLevel::Quiet),
            "normal" | "n" | "1" => Some(LogLevel::Normal),
            "verbose" | "v" | "2" => Some(LogLevel::Verbose),
            "debug" | "d" | "3" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// Most verbose `tracing` level to record
    pub fn tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Quiet => tracing::Level::ERROR,
            LogLevel::Normal => tracing::Level::INFO,
            LogLevel::Verbose => tracing::Level::DEBUG,
            LogLevel::Debug => tracing::Level::TRACE,
        }
    }
}

// ============================================================================
// Configuration Loading
// ============================================================================

impl TripleKitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the first existing default location, then
    /// apply environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for path in Self::config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                config = Self::load_from_file(&path)?;
                break;
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            source,
        })
    }

    /// Config file search paths, in priority order
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./triplekit.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("triplekit").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".triplekit").join("config.toml"));
        }

        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/triplekit/config.toml"));

        paths
    }

    /// Apply `TRIPLEKIT_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Overrides from any key lookup; unparseable values are skipped
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("TRIPLEKIT_BASE_URI") {
            self.general.base_uri = Some(val);
        }

        if let Some(val) = lookup("TRIPLEKIT_LOG_LEVEL") {
            match LogLevel::from_str(&val) {
                Some(level) => self.general.log_level = level,
                None => tracing::warn!(value = %val, "ignoring TRIPLEKIT_LOG_LEVEL"),
            }
        }

        if let Some(val) = lookup("TRIPLEKIT_INPUT_FORMAT") {
            match Format::from_str(&val) {
                Some(format) => self.general.input_format = format,
                None => tracing::warn!(value = %val, "ignoring TRIPLEKIT_INPUT_FORMAT"),
            }
        }

        if let Some(val) = lookup("TRIPLEKIT_OUTPUT_FORMAT") {
            match Format::from_str(&val) {
                Some(format) => self.general.output_format = format,
                None => tracing::warn!(value = %val, "ignoring TRIPLEKIT_OUTPUT_FORMAT"),
            }
        }

        if let Some(val) = lookup("TRIPLEKIT_CHUNK_SIZE") {
            match val.parse::<usize>() {
                Ok(size) => self.parser.chunk_size = size,
                Err(_) => tracing::warn!(value = %val, "ignoring TRIPLEKIT_CHUNK_SIZE"),
            }
        }

        if let Some(val) = lookup("TRIPLEKIT_REPAIR_IRIS") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.parser.repair_iris = true,
                "false" | "0" | "no" => self.parser.repair_iris = false,
                _ => tracing::warn!(value = %val, "ignoring TRIPLEKIT_REPAIR_IRIS"),
            }
        }
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                key: "parser.chunk_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        self.base_iri()?;
        for (prefix, uri) in &self.prefixes {
            Iri::parse(uri).map_err(|error| ConfigError::Invalid {
                key: format!("prefixes.{}", prefix),
                reason: error.to_string(),
            })?;
        }
        Ok(())
    }

    /// The configured base as an identifier
    pub fn base_iri(&self) -> Result<Option<Iri>, ConfigError> {
        self.general
            .base_uri
            .as_deref()
            .map(|base| {
                Iri::parse(base).map_err(|error| ConfigError::Invalid {
                    key: "general.base_uri".to_string(),
                    reason: error.to_string(),
                })
            })
            .transpose()
    }

    /// Well-known prefixes plus the `[prefixes]` table
    pub fn namespace_context(&self) -> NamespaceContext {
        let mut context = NamespaceContext::with_defaults();
        for (prefix, uri) in &self.prefixes {
            context.add_namespace(prefix.as_str(), uri.as_str());
        }
        context
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Commented template for a new configuration file
    pub fn default_config_content() -> &'static str {
        r#"# triplekit configuration

[general]
# Base IRI for relative references
# base_uri = "http://example.org/"
# Logging level: quiet, normal, verbose, debug
log_level = "normal"
# Formats: ntriples, nquads, rdfxml
input_format = "ntriples"
output_format = "ntriples"

[parser]
# Bytes per read when streaming N-Triples / N-Quads
chunk_size = 65536
# Percent-encode illegal characters in RDF/XML IRIs instead of failing
repair_iris = true
# Accept graph labels in line syntax
quads = false

[writer]
# RDF/XML indentation, 0 for none
indent = 2
# Nest blank nodes inside their property elements
inline_blank_nodes = true

[prefixes]
# ex = "http://example.org/"
"#
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = TripleKitConfig::new();
        assert_eq!(config.parser.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.parser.repair_iris);
        assert_eq!(config.writer.indent, 2);
        assert_eq!(config.general.output_format, Format::NTriples);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [general]
            base_uri = "http://example.org/base/"
            log_level = "verbose"
            output_format = "rdfxml"

            [parser]
            chunk_size = 1024
            quads = true

            [writer]
            indent = 0
        "#;

        let config = TripleKitConfig::load_from_str(toml).unwrap();
        assert_eq!(config.general.log_level, LogLevel::Verbose);
        assert_eq!(config.general.output_format, Format::RdfXml);
        assert_eq!(config.general.input_format, Format::NTriples);
        assert_eq!(config.parser.chunk_size, 1024);
        assert!(config.parser.quads);
        assert!(config.parser.repair_iris);
        assert_eq!(config.writer.indent, 0);
        assert_eq!(
            config.base_iri().unwrap().map(|iri| iri.to_string()),
            Some("http://example.org/base/".to_string())
        );
    }

    #[test]
    fn test_parse_error() {
        let result = TripleKitConfig::load_from_str("[general]\nlog_level = 3\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str("quiet"), Some(LogLevel::Quiet));
        assert_eq!(LogLevel::from_str("V"), Some(LogLevel::Verbose));
        assert_eq!(LogLevel::from_str("loud"), None);
        assert_eq!(LogLevel::Debug.tracing_level(), tracing::Level::TRACE);
        assert_eq!(LogLevel::Quiet.tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TRIPLEKIT_BASE_URI", "http://example.org/env/"),
            ("TRIPLEKIT_OUTPUT_FORMAT", "nq"),
            ("TRIPLEKIT_CHUNK_SIZE", "not a number"),
            ("TRIPLEKIT_REPAIR_IRIS", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = TripleKitConfig::new();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.general.base_uri.as_deref(), Some("http://example.org/env/"));
        assert_eq!(config.general.output_format, Format::NQuads);
        assert_eq!(config.parser.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(!config.parser.repair_iris);
    }

    #[test]
    fn test_validate() {
        let mut config = TripleKitConfig::new();
        config.parser.chunk_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { key, .. }) if key == "parser.chunk_size"));

        let mut config = TripleKitConfig::new();
        config.general.base_uri = Some("http://example.org/a b".to_string());
        assert!(config.validate().is_err());

        let mut config = TripleKitConfig::new();
        config.prefixes.insert("ex".to_string(), "http://example.org/<x>".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prefixes() {
        let toml = r#"
            [prefixes]
            ex = "http://example.org/"
        "#;

        let config = TripleKitConfig::load_from_str(toml).unwrap();
        let context = config.namespace_context();
        assert_eq!(context.namespace_uri("ex"), Some("http://example.org/"));
        assert_eq!(
            context.namespace_uri("rdf"),
            Some("http://www.w3.org/1999/02/22-rdf-syntax-ns#")
        );
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut config = TripleKitConfig::new();
        config.writer.inline_blank_nodes = false;
        config.prefixes.insert("ex".to_string(), "http://example.org/".to_string());

        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[writer]"));
        let reloaded = TripleKitConfig::load_from_str(&toml).unwrap();
        assert!(!reloaded.writer.inline_blank_nodes);
        assert_eq!(reloaded.prefixes.get("ex").map(String::as_str), Some("http://example.org/"));
    }

    #[test]
    fn test_default_content_parses() {
        let config = TripleKitConfig::load_from_str(TripleKitConfig::default_config_content()).unwrap();
        assert_eq!(config.parser.chunk_size, 65536);
        assert!(config.prefixes.is_empty());
    }

    #[test]
    fn test_config_paths() {
        let paths = TripleKitConfig::config_paths();
        assert!(paths[0].ends_with("triplekit.toml"));
    }
}
