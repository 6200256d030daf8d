//! triplekit
//!
//! Command-line converter between N-Triples, N-Quads and RDF/XML.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use triplekit::sink::SinkError;
use triplekit::{
    BlankNodeGenerator, Format, Graph, Iri, LogLevel, NTriplesParser, NTriplesWriter, RdfError,
    RdfXmlParser, RdfXmlWriter, TripleKitConfig, TripleSink,
};

#[derive(Parser)]
#[command(name = "triplekit")]
#[command(version)]
#[command(about = "Convert RDF between N-Triples, N-Quads and RDF/XML", long_about = None)]
struct Cli {
    /// Input files to process
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Read input from stdin
    #[arg(long)]
    stdin: bool,

    /// Input format (guessed from the file extension when omitted)
    #[arg(long, value_enum)]
    from: Option<FormatArg>,

    /// Output format
    #[arg(long, value_enum)]
    to: Option<FormatArg>,

    /// Base IRI for relative references
    #[arg(long)]
    base: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (overrides the search path)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,

    /// Load everything into a graph before writing
    #[arg(long)]
    graph: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// N-Triples
    Ntriples,
    /// N-Quads
    Nquads,
    /// RDF/XML
    Rdfxml,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Ntriples => Format::NTriples,
            FormatArg::Nquads => Format::NQuads,
            FormatArg::Rdfxml => Format::RdfXml,
        }
    }
}

enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    fn name(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }
}

/// Statements from several documents as one stream
struct Concat<'a> {
    inner: &'a mut dyn TripleSink,
}

impl TripleSink for Concat<'_> {
    fn on_prefix(&mut self, prefix: &str, uri: &str) -> Result<(), SinkError> {
        self.inner.on_prefix(prefix, uri)
    }

    fn add_non_literal(&mut self, subject: &Iri, predicate: &Iri, object: &Iri, graph: Option<&Iri>) -> Result<(), SinkError> {
        self.inner.add_non_literal(subject, predicate, object, graph)
    }

    fn add_plain_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        language: Option<&str>,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        self.inner.add_plain_literal(subject, predicate, text, language, graph)
    }

    fn add_typed_literal(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        text: &str,
        datatype: &Iri,
        graph: Option<&Iri>,
    ) -> Result<(), SinkError> {
        self.inner.add_typed_literal(subject, predicate, text, datatype, graph)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {:#}", error);
            let status = error
                .chain()
                .find_map(|cause| cause.downcast_ref::<RdfError>())
                .map(RdfError::exit_status)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(status).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    let log_level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        config.general.log_level
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(log_level.tracing_level())
        .with_target(false)
        .init();

    let base = match &cli.base {
        Some(base) => Some(Iri::parse(base).map_err(RdfError::from).context("invalid --base")?),
        None => config.base_iri().map_err(RdfError::from)?,
    };

    let mut sources: Vec<Source> = cli.inputs.iter().cloned().map(Source::File).collect();
    if cli.stdin || sources.is_empty() {
        sources.insert(0, Source::Stdin);
    }

    let to = cli.to.map(Format::from).unwrap_or(config.general.output_format);
    let from = cli.from.map(Format::from);
    let options = ReadOptions {
        from,
        base,
        config: &config,
    };

    let out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    if cli.graph {
        let mut graph = Graph::with_namespaces(config.namespace_context());
        let blank_nodes = graph.blank_nodes().clone();
        for source in &sources {
            read_source(source, &options, &blank_nodes, &mut graph)?;
        }
        tracing::info!(resources = graph.len(), statements = graph.triple_count(), "graph loaded");

        match to {
            Format::RdfXml => {
                let mut writer =
                    RdfXmlWriter::new(out, graph.namespaces().clone()).with_indent(config.writer.indent);
                writer
                    .write_graph(&graph, config.writer.inline_blank_nodes)
                    .map_err(RdfError::from)?;
                writer.into_inner().flush()?;
            }
            Format::NTriples | Format::NQuads => {
                let mut writer = line_writer(out, to);
                writer.write_graph(&graph).context("Failed to write output")?;
                writer.into_inner().flush()?;
            }
        }
        return Ok(());
    }

    let blank_nodes = BlankNodeGenerator::new();
    match to {
        Format::RdfXml => {
            let mut writer = RdfXmlWriter::new(out, config.namespace_context()).with_indent(config.writer.indent);
            convert(&sources, &options, &blank_nodes, &mut writer)?;
            tracing::info!(statements = writer.written(), "conversion finished");
            writer.into_inner().flush()?;
        }
        Format::NTriples | Format::NQuads => {
            let mut writer = line_writer(out, to);
            convert(&sources, &options, &blank_nodes, &mut writer)?;
            tracing::info!(statements = writer.written(), "conversion finished");
            writer.into_inner().flush()?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<TripleKitConfig> {
    let config = match path {
        Some(path) => {
            let mut config = TripleKitConfig::load_from_file(path).map_err(RdfError::from)?;
            config.apply_env_overrides();
            config.validate().map_err(RdfError::from)?;
            config
        }
        None => TripleKitConfig::load().map_err(RdfError::from)?,
    };
    Ok(config)
}

fn line_writer(out: Box<dyn Write>, format: Format) -> NTriplesWriter<Box<dyn Write>> {
    match format {
        Format::NQuads => NTriplesWriter::nquads(out),
        _ => NTriplesWriter::new(out),
    }
}

struct ReadOptions<'a> {
    from: Option<Format>,
    base: Option<Iri>,
    config: &'a TripleKitConfig,
}

/// Stream every source into `sink` as one document
fn convert(
    sources: &[Source],
    options: &ReadOptions<'_>,
    blank_nodes: &BlankNodeGenerator,
    sink: &mut dyn TripleSink,
) -> Result<()> {
    sink.start_stream().map_err(RdfError::from)?;
    for source in sources {
        let mut concat = Concat { inner: &mut *sink };
        read_source(source, options, blank_nodes, &mut concat)?;
    }
    sink.end_stream().map_err(RdfError::from)?;
    Ok(())
}

fn read_source<S: TripleSink + ?Sized>(
    source: &Source,
    options: &ReadOptions<'_>,
    blank_nodes: &BlankNodeGenerator,
    sink: &mut S,
) -> Result<()> {
    let config = options.config;
    let format = options
        .from
        .or_else(|| match source {
            Source::File(path) => Format::from_extension(path),
            Source::Stdin => None,
        })
        .unwrap_or(config.general.input_format);
    let name = source.name();
    tracing::debug!(source = %name, format = format.as_str(), "reading");

    let statements = match format {
        Format::NTriples | Format::NQuads => {
            let mut parser = if format == Format::NQuads || config.parser.quads {
                NTriplesParser::nquads()
            } else {
                NTriplesParser::new()
            };
            if let Some(base) = &options.base {
                parser = parser.with_base(base.clone());
            }
            let result = match source {
                Source::Stdin => parser.parse_reader(io::stdin().lock(), config.parser.chunk_size, sink),
                Source::File(path) => {
                    let file = File::open(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
                    parser.parse_reader(file, config.parser.chunk_size, sink)
                }
            };
            result
                .map_err(RdfError::from)
                .with_context(|| format!("Parse error in {}", name))?;
            parser.statements()
        }
        Format::RdfXml => {
            let mut parser = RdfXmlParser::new()
                .with_blank_nodes(blank_nodes.clone())
                .repair_iris(config.parser.repair_iris);
            let base = match source {
                Source::File(path) => options.base.clone().or_else(|| file_iri(path)),
                Source::Stdin => options.base.clone(),
            };
            if let Some(base) = base {
                parser = parser.with_base(base);
            }
            let result = match source {
                Source::Stdin => parser.parse_reader(io::stdin().lock(), sink),
                Source::File(path) => {
                    let file = File::open(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
                    parser.parse_reader(BufReader::new(file), sink)
                }
            };
            result
                .map_err(RdfError::from)
                .with_context(|| format!("Parse error in {}", name))?;
            parser.statements()
        }
    };

    tracing::info!(source = %name, statements, "parsed");
    Ok(())
}

/// `file:` IRI of a local document, used as its default base
fn file_iri(path: &Path) -> Option<Iri> {
    let absolute = fs::canonicalize(path).ok()?;
    let url = url::Url::from_file_path(absolute).ok()?;
    Iri::parse(url.as_str()).ok()
}
